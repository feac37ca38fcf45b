// src/location.rs

//! Citation fragment parsing and normalization.
//!
//! A well-formed fragment reads `volume:issue<page`, e.g. `12:01/02<[45]`.
//! Any part may be bracketed (`[12]` marks an inferred value), issues may be
//! combined (`5/6`) and pages may be roman numerals (`xii`).

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Separator between volume and issue.
pub const ISSUE_SEP: char = ':';

/// Separator between issue and page.
pub const PAGE_SEP: char = '<';

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Parsed volume/issue/page triple; each component may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub page: Option<String>,
}

impl Location {
    pub fn new(volume: Option<&str>, issue: Option<&str>, page: Option<&str>) -> Self {
        Self {
            volume: volume.map(str::to_string),
            issue: issue.map(str::to_string),
            page: page.map(str::to_string),
        }
    }

    /// Parse a raw fragment.
    pub fn parse(fragment: &str) -> Self {
        parse_location(fragment)
    }

    /// Parse and normalize in one go.
    pub fn parse_normalized(fragment: &str) -> Self {
        parse_location(fragment).normalized()
    }

    /// Catalog key vocabulary: issue digit runs without leading zeros,
    /// multi-part issues joined by `-`.
    pub fn normalized(self) -> Self {
        let issue = self
            .issue
            .map(|issue| replace_separators(&remove_leading_zeros(&issue)));
        Self { issue, ..self }
    }
}

/// Complete a fragment to the `volume:issue<page` shape.
///
/// `1` becomes `1:<`, `1<3` becomes `1:<3` and `1:5` becomes `1:5<`.
/// A fragment that already carries both separators is returned unchanged.
pub fn standardize(fragment: &str) -> String {
    match (fragment.find(ISSUE_SEP), fragment.find(PAGE_SEP)) {
        (None, None) => format!("{fragment}{ISSUE_SEP}{PAGE_SEP}"),
        (None, Some(at)) => format!("{}{ISSUE_SEP}{}", &fragment[..at], &fragment[at..]),
        (Some(_), None) => format!("{fragment}{PAGE_SEP}"),
        (Some(_), Some(_)) => fragment.to_string(),
    }
}

/// Split a fragment into volume, issue and page.
///
/// Empty segments become `None`. Values are not validated here, see
/// [`is_standard_format`].
pub fn parse_location(fragment: &str) -> Location {
    let standard = standardize(fragment);
    let (volume, rest) = standard.split_once(ISSUE_SEP).unwrap_or((&standard, ""));
    let (issue, page) = rest.split_once(PAGE_SEP).unwrap_or((rest, ""));

    let present = |s: &str| (!s.is_empty()).then(|| s.to_string());
    Location {
        volume: present(volume),
        issue: present(issue),
        page: present(page),
    }
}

/// Strip leading zeros from every digit run (`01/02` → `1/2`); `0` stays `0`.
pub fn remove_leading_zeros(value: &str) -> String {
    DIGITS
        .replace_all(value, |caps: &regex::Captures<'_>| {
            let trimmed = caps[0].trim_start_matches('0');
            let digits = if trimmed.is_empty() { "0" } else { trimmed };
            digits.to_string()
        })
        .into_owned()
}

/// Rewrite the citation's multi-issue separator `/` to the catalog's `-`.
pub fn replace_separators(value: &str) -> String {
    value.replace('/', "-")
}

/// Whether a single component holds only characters we know how to match
/// (currently: anything but whitespace).
pub fn is_plain_component(part: &str) -> bool {
    !part.is_empty() && !part.chars().any(char::is_whitespace)
}

/// Whether a fragment is fully specified and every component is plain.
pub fn is_standard_format(fragment: &str) -> bool {
    let location = parse_location(fragment);
    [&location.volume, &location.issue, &location.page]
        .iter()
        .all(|part| part.as_deref().is_some_and(is_plain_component))
}
