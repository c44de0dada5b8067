mod colors;

use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser};
use jswhois_core::output::{JsonFormatter, OutputFormatter};
use jswhois_core::whois::IANA_WHOIS;
use jswhois_core::{BulkExecutor, JswhoisError, LookupOptions};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use colors::CatppuccinExt;

/// Exit status after an interrupted batch (128 + SIGINT).
const EXIT_INTERRUPTED: i32 = 130;

/// Release number as printed by `-V`: major and minor only.
const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION_MAJOR"),
    ".",
    env!("CARGO_PKG_VERSION_MINOR")
);

#[derive(Parser, Debug)]
#[command(name = "jswhois")]
#[command(about = "Look up WHOIS information along the referral chain and print it as JSON")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Print this help and exit
    #[arg(short = '?', long = "help", action = ArgAction::Help)]
    help: Option<bool>,

    /// Print version information and exit
    #[arg(short = 'V', long = "version")]
    version: bool,

    /// Quick lookup (i.e., do not recurse)
    #[arg(short = 'Q', long = "quick", overrides_with = "recursive")]
    quick: bool,

    /// Recursive lookup (default)
    #[arg(short = 'R', long = "recursive", overrides_with = "quick")]
    recursive: bool,

    /// Force lookups of names that do not resolve
    #[arg(short, long)]
    force: bool,

    /// Query this server first
    #[arg(short = 'h', long = "host", value_name = "server", default_value = IANA_WHOIS)]
    host: String,

    /// Only print output for the last / leaf whois server
    #[arg(short, long)]
    leaf: bool,

    /// Query the whois server on this port
    #[arg(short, long, value_name = "port", default_value = "43")]
    port: String,

    /// Be verbose (repeat for more detail)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Seconds to wait on each connect, write and read
    #[arg(short, long, value_name = "secs", default_value_t = 10)]
    timeout: u64,

    /// Stop following referrals after this many hops
    #[arg(long, value_name = "n", default_value_t = 10)]
    max_referrals: usize,

    /// Number of names looked up concurrently
    #[arg(short = 'j', long = "jobs", value_name = "n", default_value_t = 10)]
    jobs: usize,

    /// Pretty-print the JSON output
    #[arg(short = 'P', long)]
    pretty: bool,

    /// Names, addresses or other terms to look up
    #[arg(value_name = "query", required_unless_present = "version")]
    queries: Vec<String>,
}

impl Cli {
    fn lookup_options(&self) -> Result<LookupOptions, JswhoisError> {
        Ok(LookupOptions::new()
            .with_root_server(self.host.clone())
            .with_port(parse_port(&self.port)?)
            .recursive(!self.quick)
            .leaf_only(self.leaf)
            .force(self.force)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_max_referrals(self.max_referrals))
    }
}

fn parse_port(port: &str) -> Result<u16, JswhoisError> {
    port.trim()
        .parse()
        .map_err(|_| JswhoisError::InvalidPort(port.to_string()))
}

fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity))),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("jswhois version {}", VERSION);
        return Ok(());
    }

    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".ctp_red(), e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let options = cli.lookup_options()?;
    debug!(?options, "Lookup options");

    let executor = BulkExecutor::new(options).with_concurrency(cli.jobs);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; printing completed lookups");
            trigger.cancel();
        }
    });

    let outcome = executor
        .execute_with_cancel(cli.queries, &cancel)
        .await?;

    let formatter = JsonFormatter::new().pretty(cli.pretty);
    let output = formatter
        .format_results(&outcome.results)
        .context("Failed to render results")?;
    println!("{}", output);

    if outcome.cancelled {
        eprintln!(
            "{} stopped after {} lookup(s)",
            "Interrupted:".ctp_yellow(),
            outcome.results.len()
        );
        return Ok(EXIT_INTERRUPTED);
    }
    Ok(0)
}
