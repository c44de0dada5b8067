use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::chain::{ChainWalker, LookupOptions, LookupResult};
use crate::error::Result;
use crate::whois::{Transport, WhoisClient};

const DEFAULT_CONCURRENCY: usize = 10;

/// Results of a batch, in input order.
#[derive(Debug, Clone)]
pub struct BulkResult {
    pub results: Vec<LookupResult>,
    /// Set when the batch was interrupted; `results` is then the completed
    /// prefix of the input.
    pub cancelled: bool,
}

/// Runs one independent chain walk per query term.
#[derive(Debug, Clone)]
pub struct BulkExecutor<T = WhoisClient> {
    walker: ChainWalker<T>,
    concurrency: usize,
}

impl BulkExecutor<WhoisClient> {
    pub fn new(options: LookupOptions) -> Self {
        Self::with_walker(ChainWalker::new(options))
    }
}

impl<T: Transport> BulkExecutor<T> {
    pub fn with_walker(walker: ChainWalker<T>) -> Self {
        Self {
            walker,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn walker(&self) -> &ChainWalker<T> {
        &self.walker
    }

    pub async fn execute(&self, queries: Vec<String>) -> Result<BulkResult> {
        self.execute_with_cancel(queries, &CancellationToken::new())
            .await
    }

    /// Look up every query, up to `concurrency` at a time.
    ///
    /// The first failing query (a validation error) aborts the batch. When
    /// `cancel` fires, the results completed so far are returned.
    #[instrument(skip_all, fields(total = queries.len()))]
    pub async fn execute_with_cancel(
        &self,
        queries: Vec<String>,
        cancel: &CancellationToken,
    ) -> Result<BulkResult> {
        let total = queries.len();
        info!("Looking up {} names", total);
        debug!(concurrency = self.concurrency, "Starting batch");

        let lookups = stream::iter(queries)
            .map(|query| async move { self.walker.lookup(&query).await })
            .buffered(self.concurrency);
        let mut lookups = std::pin::pin!(lookups);

        let mut results = Vec::with_capacity(total);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(completed = results.len(), total = total, "Batch cancelled");
                    return Ok(BulkResult { results, cancelled: true });
                }
                next = lookups.next() => match next {
                    Some(Ok(result)) => results.push(result),
                    Some(Err(e)) => return Err(e),
                    None => break,
                },
            }
        }

        debug!(completed = results.len(), "Batch finished");
        Ok(BulkResult {
            results,
            cancelled: false,
        })
    }
}
