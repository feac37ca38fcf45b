// src/models/citation.rs

//! Citation records and their linking status.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::location::Location;

/// Linking state and diagnosis of a citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkStatus {
    ToLink,
    Success,
    ToDiagnose,
    MissingVolume,
    MissingIssue,
    MissingPage,
    MissingMultiple,
    /// Fragment uses characters we cannot match
    NonstandardFormat,
    VolumeNotDigitized,
    IssueNotDigitized,
    PageNotDigitized,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToLink => "TO_LINK",
            Self::Success => "SUCCESS",
            Self::ToDiagnose => "TO_DIAGNOSE",
            Self::MissingVolume => "MISSING_VOLUME",
            Self::MissingIssue => "MISSING_ISSUE",
            Self::MissingPage => "MISSING_PAGE",
            Self::MissingMultiple => "MISSING_MULTIPLE",
            Self::NonstandardFormat => "NONSTANDARD_FORMAT",
            Self::VolumeNotDigitized => "VOLUME_NOT_DIGITIZED",
            Self::IssueNotDigitized => "ISSUE_NOT_DIGITIZED",
            Self::PageNotDigitized => "PAGE_NOT_DIGITIZED",
        }
    }

    /// Diagnosed codes that no further step will change.
    pub fn is_diagnosis(&self) -> bool {
        !matches!(self, Self::ToLink | Self::Success | Self::ToDiagnose)
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One external pointer into a periodical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationRecord {
    /// External record identifier
    pub id: String,
    /// Fragment as it appeared in the source record
    pub raw_location: String,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub page: Option<String>,
    pub status: LinkStatus,
    pub resolved_link: Option<String>,
}

impl CitationRecord {
    /// Parse and normalize one fragment into a record ready for linking.
    pub fn new(id: impl Into<String>, raw_location: impl Into<String>) -> Self {
        let raw_location = raw_location.into();
        let Location {
            volume,
            issue,
            page,
        } = Location::parse_normalized(&raw_location);
        Self {
            id: id.into(),
            raw_location,
            volume,
            issue,
            page,
            status: LinkStatus::ToLink,
            resolved_link: None,
        }
    }

    /// Expand one source record into one citation per `;`-separated fragment.
    ///
    /// Blank fragments (e.g. after a trailing `;`) are skipped.
    pub fn expand(id: &str, locations: &str) -> Vec<Self> {
        locations
            .split(';')
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .map(|fragment| Self::new(id, fragment))
            .collect()
    }

    /// Components that are absent, by name.
    pub fn missing_components(&self) -> Vec<&'static str> {
        [
            ("volume", &self.volume),
            ("issue", &self.issue),
            ("page", &self.page),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_expands_per_fragment() {
        let records = CitationRecord::expand("R1", "1<3;1:5<7");
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].id, "R1");
        assert_eq!(records[0].volume.as_deref(), Some("1"));
        assert_eq!(records[0].issue, None);
        assert_eq!(records[0].page.as_deref(), Some("3"));

        assert_eq!(records[1].volume.as_deref(), Some("1"));
        assert_eq!(records[1].issue.as_deref(), Some("5"));
        assert_eq!(records[1].page.as_deref(), Some("7"));

        assert!(records.iter().all(|r| r.status == LinkStatus::ToLink));
    }

    #[test]
    fn test_expand_skips_blank_fragments() {
        let records = CitationRecord::expand("R2", " 2:01/02<9 ; ");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].raw_location, "2:01/02<9");
        assert_eq!(records[0].issue.as_deref(), Some("1-2"));
    }

    #[test]
    fn test_missing_components_are_named() {
        let record = CitationRecord::new("R3", "4");
        assert_eq!(record.missing_components(), ["issue", "page"]);
    }

    #[test]
    fn test_status_serializes_screaming() {
        let json = serde_json::to_string(&LinkStatus::MissingIssue).unwrap();
        assert_eq!(json, "\"MISSING_ISSUE\"");
        assert_eq!(LinkStatus::PageNotDigitized.to_string(), "PAGE_NOT_DIGITIZED");
    }
}
