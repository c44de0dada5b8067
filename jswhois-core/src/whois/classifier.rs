//! First pass over each reply line: drop comments, stop at section ends,
//! divert known commentary, and hand everything else to the format parser.

use super::servers::SourceProfile;

/// Prefixes of lines that carry nothing worth keeping.
const COMMENTS: &[&str] = &[
    "%",    // whois.iana.org
    "*",    // whois.nic.it
    "#",    // whois.nic.uk
    "[ ",   // whois.jprs.jp
    " ---", // dividers
    "- ",   // whois.kr
];

/// Prefixes after which the rest of a reply is legal boilerplate.
const END_MARKERS: &[&str] = &[
    ">>>",
    "--",
    "terms of use:",
    "this whois information is provided",
    "copyright notice",
    "[disclaimer]",
];

/// Prefixes of free-form lines kept under `comments`.
const COMMENTARY: &[&str] = &[
    "whois lookup made",
    "all rights reserved",
    "copyright",
    "for more information on whois status codes",
    "register your domain name at",
    "url of the",
    "record expires on",
    "record created on",
    "please visit",
    "available at",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    Comment,
    End,
    Commentary(&'a str),
    /// Profile strip strings already applied; may be empty.
    Content(&'a str),
}

fn has_marker(markers: &[&str], lower: &str) -> bool {
    markers.iter().any(|m| lower.starts_with(m))
}

pub fn classify<'a>(line: &'a str, profile: &SourceProfile) -> LineClass<'a> {
    let lower = line.to_lowercase();

    let is_comment = COMMENTS
        .iter()
        .filter(|prefix| !profile.literal_prefixes.contains(*prefix))
        .any(|prefix| lower.starts_with(prefix));
    if is_comment {
        return LineClass::Comment;
    }

    if !profile.ignore_end && has_marker(END_MARKERS, &lower) {
        return LineClass::End;
    }

    if has_marker(COMMENTARY, &lower) {
        return LineClass::Commentary(line);
    }

    LineClass::Content(strip(line, profile.strip_strings))
}

fn strip<'a>(mut line: &'a str, strip_strings: &[&str]) -> &'a str {
    for set in strip_strings {
        line = line
            .trim_start_matches(|c: char| set.contains(c))
            .trim_end_matches(|c: char| set.contains(c));
    }
    line
}
