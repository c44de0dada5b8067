use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

pub const IANA_WHOIS: &str = "whois.iana.org";
pub const WHOIS_PORT: u16 = 43;

/// Line shape a server's replies are parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// `key: value`, one flat pair per line.
    #[default]
    TwoColumnsStrict,
    /// `key: value` plus indented continuations and `key:` list openers.
    TwoColumnsAddIfMissing,
    /// `key  : value` followed by `      : value2`.
    ColumnContinue,
    /// `key:` alone opens a section of indented `subkey: value` lines.
    SimpleSubobjects,
    /// A bare name after a blank line opens an object of indented pairs.
    TwoColumnSubobjects,
    /// `key: value` opens an object filled by `[key] value` lines.
    TwoColumnsBrackets,
    /// `key:` followed by value-only lines up to a blank line.
    Multiline,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::TwoColumnsStrict => "twoColumnsStrict",
            Format::TwoColumnsAddIfMissing => "twoColumnsAddIfMissing",
            Format::ColumnContinue => "columnContinue",
            Format::SimpleSubobjects => "simpleSubobjects",
            Format::TwoColumnSubobjects => "twoColumnSubobjects",
            Format::TwoColumnsBrackets => "twoColumnsBrackets",
            Format::Multiline => "multiline",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "twoColumnsStrict" => Ok(Format::TwoColumnsStrict),
            "twoColumnsAddIfMissing" => Ok(Format::TwoColumnsAddIfMissing),
            "columnContinue" => Ok(Format::ColumnContinue),
            "simpleSubobjects" => Ok(Format::SimpleSubobjects),
            "twoColumnSubobjects" => Ok(Format::TwoColumnSubobjects),
            "twoColumnsBrackets" => Ok(Format::TwoColumnsBrackets),
            "multiline" => Ok(Format::Multiline),
            _ => Err(format!("Unknown response format: {}", s)),
        }
    }
}

/// Parsing policy for one WHOIS server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceProfile {
    pub format: Format,
    /// Group blank-line separated blocks into objects named by their first key.
    pub create_object: bool,
    /// Keep parsing past section-end markers.
    pub ignore_end: bool,
    /// Character sets trimmed from both ends of every content line.
    pub strip_strings: &'static [&'static str],
    /// Treat single-column lines as continuations of the previous key.
    pub two_column: bool,
    /// Comment prefixes that carry content on this server.
    pub literal_prefixes: &'static [&'static str],
    /// Fields stay top-level until a line with this prefix opens grouping.
    pub group_from: Option<&'static str>,
}

const CREATE_OBJECT: &[&str] = &[
    "whois.afrinic.net",
    "whois.apnic.net",
    "whois.dns.be",
    "whois.dominio.gq",
    "whois.dot.cf",
    "whois.dot.ml",
    "whois.dot.tk",
    "whois.iana.org",
    "whois.isnic.is",
    "whois.isoc.org.il",
    "whois.lacnic.net",
    "whois.marnet.mk",
    "whois.nic.alsace",
    "whois.nic.aquarelle",
    "whois.nic.ar",
    "whois.nic.at",
    "whois.nic.bo",
    "whois.nic.bostik",
    "whois.nic.bzh",
    "whois.nic.corsica",
    "whois.nic.cr",
    "whois.nic.cz",
    "whois.nic.fr",
    "whois.nic.lancaster",
    "whois.nic.leclerc",
    "whois.nic.mma",
    "whois.nic.museum",
    "whois.nic.mw",
    "whois.nic.ovh",
    "whois.nic.paris",
    "whois.nic.pm",
    "whois.nic.re",
    "whois.nic.sm",
    "whois.nic.sn",
    "whois.nic.sncf",
    "whois.nic.tf",
    "whois.nic.tr",
    "whois.nic.ve",
    "whois.nic.wf",
    "whois.nic.yt",
    "whois.registro.br",
    "whois.ripe.net",
    "whois.rnids.rs",
    "whois.sk-nic.sk",
    "whois.tznic.or.tz",
    "whois.ua",
];

const FORMATS: &[(&str, Format)] = &[
    ("whois.bnnic.bn", Format::SimpleSubobjects),
    ("whois.cctld.uz", Format::Multiline),
    ("whois.dns.be", Format::TwoColumnSubobjects),
    ("whois.dns.pl", Format::TwoColumnsAddIfMissing),
    ("whois.domain-registry.nl", Format::Multiline),
    ("whois.dominio.gq", Format::TwoColumnSubobjects),
    ("whois.dot.cf", Format::TwoColumnSubobjects),
    ("whois.dot.ml", Format::TwoColumnSubobjects),
    ("whois.dot.tk", Format::TwoColumnSubobjects),
    ("whois.educause.edu", Format::Multiline),
    ("whois.eu", Format::SimpleSubobjects),
    ("whois.gg", Format::SimpleSubobjects),
    ("whois.je", Format::SimpleSubobjects),
    ("whois.jprs.jp", Format::TwoColumnsBrackets),
    ("whois.kr", Format::TwoColumnSubobjects),
    ("whois.kg", Format::SimpleSubobjects),
    ("whois.monic.mo", Format::Multiline),
    ("whois.mx", Format::TwoColumnSubobjects),
    ("whois.nic.as", Format::SimpleSubobjects),
    ("whois.nic.aw", Format::SimpleSubobjects),
    ("whois.nic.it", Format::TwoColumnSubobjects),
    ("whois.nic.lv", Format::TwoColumnSubobjects),
    ("whois.nic.net.sa", Format::Multiline),
    ("whois.nic.sm", Format::TwoColumnSubobjects),
    ("whois.nic.tm", Format::ColumnContinue),
    ("whois.nic.tr", Format::TwoColumnSubobjects),
    ("whois.nic.uk", Format::Multiline),
    ("whois.register.bg", Format::Multiline),
    ("whois.sgnic.sg", Format::SimpleSubobjects),
    ("whois.tld.ee", Format::TwoColumnSubobjects),
    ("whois.tonic.to", Format::Multiline),
    ("whois.twnic.net.tw", Format::Multiline),
];

// These keep printing useful data after the usual end markers.
const IGNORE_END: &[&str] = &[
    "whois.bnnic.bn",
    "whois.educause.edu",
    "whois.gg",
    "whois.minico.mo",
    "whois.nic.firmdale",
    "whois.nic.gdn",
    "whois.sgnic.sg",
];

const STRIP_STRINGS: &[(&str, &[&str])] = &[("whois.nic.tr", &["**"]), ("whois.nic.lv", &["[", "]"])];

const TWO_COLUMN: &[&str] = &[
    "whois.bnnic.bn",
    "whois.eu",
    "whois.gg",
    "whois.je",
    "whois.kg",
    "whois.mx",
    "whois.nic.as",
    "whois.nic.aw",
    "whois.nic.it",
    "whois.nic.lv",
    "whois.nic.net.sa",
    "whois.nic.sm",
    "whois.sgnic.sg",
];

const LITERAL_PREFIXES: &[(&str, &[&str])] = &[("whois.nic.tr", &["*"]), ("whois.nic.net.sa", &["*"])];

const GROUP_FROM: &[(&str, &str)] = &[("whois.ati.tn", "Details")];

pub static SOURCE_PROFILES: Lazy<HashMap<&'static str, SourceProfile>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, SourceProfile> = HashMap::new();

    for server in CREATE_OBJECT {
        m.entry(*server).or_default().create_object = true;
    }
    for (server, format) in FORMATS {
        m.entry(*server).or_default().format = *format;
    }
    for server in IGNORE_END {
        m.entry(*server).or_default().ignore_end = true;
    }
    for (server, strip) in STRIP_STRINGS {
        m.entry(*server).or_default().strip_strings = *strip;
    }
    for server in TWO_COLUMN {
        m.entry(*server).or_default().two_column = true;
    }
    for (server, prefixes) in LITERAL_PREFIXES {
        m.entry(*server).or_default().literal_prefixes = *prefixes;
    }
    for (server, marker) in GROUP_FROM {
        m.entry(*server).or_default().group_from = Some(*marker);
    }

    m
});

/// Parsing policy for `server`; unknown servers get the default profile.
pub fn get_source_profile(server: &str) -> SourceProfile {
    SOURCE_PROFILES
        .get(server.to_lowercase().as_str())
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = get_source_profile("whois.example.net");
        assert_eq!(profile, SourceProfile::default());
        assert_eq!(profile.format, Format::TwoColumnsStrict);
        assert!(!profile.create_object);
        assert!(!profile.ignore_end);
        assert!(profile.strip_strings.is_empty());
        assert!(!profile.two_column);
    }

    #[test]
    fn test_iana_groups_objects() {
        let profile = get_source_profile(IANA_WHOIS);
        assert!(profile.create_object);
        assert_eq!(profile.format, Format::TwoColumnsStrict);
    }

    #[test]
    fn test_combined_flags() {
        let profile = get_source_profile("whois.nic.tr");
        assert_eq!(profile.format, Format::TwoColumnSubobjects);
        assert!(profile.create_object);
        assert_eq!(profile.strip_strings, &["**"]);
        assert_eq!(profile.literal_prefixes, &["*"]);

        let sg = get_source_profile("whois.sgnic.sg");
        assert_eq!(sg.format, Format::SimpleSubobjects);
        assert!(sg.ignore_end);
        assert!(sg.two_column);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(get_source_profile("WHOIS.NIC.UK").format, Format::Multiline);
    }

    #[test]
    fn test_group_from_marker() {
        assert_eq!(get_source_profile("whois.ati.tn").group_from, Some("Details"));
    }

    #[test]
    fn test_format_names_round_trip() {
        for format in [
            Format::TwoColumnsStrict,
            Format::TwoColumnsAddIfMissing,
            Format::ColumnContinue,
            Format::SimpleSubobjects,
            Format::TwoColumnSubobjects,
            Format::TwoColumnsBrackets,
            Format::Multiline,
        ] {
            assert_eq!(format.as_str().parse::<Format>().unwrap(), format);
        }
        assert!("tabular".parse::<Format>().is_err());
    }
}
