// src/models/periodical.rs

//! Periodical metadata and its persisted form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::tree::{CatalogTree, DEFAULT_ROOT, DEFAULT_SEPARATOR, TreeDocument};

/// Major version of the catalog API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ApiVersion {
    V5,
    V7,
}

impl ApiVersion {
    /// Leading character of the version string the catalog reports.
    pub fn major(&self) -> char {
        match self {
            Self::V5 => '5',
            Self::V7 => '7',
        }
    }
}

impl FromStr for ApiVersion {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.trim().trim_start_matches(['v', 'V']);
        match digits.chars().next() {
            Some('5') => Ok(Self::V5),
            Some('7') => Ok(Self::V7),
            _ => Err(AppError::config(format!(
                "unsupported Kramerius version '{s}' (expected 5 or 7)"
            ))),
        }
    }
}

impl TryFrom<String> for ApiVersion {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ApiVersion> for String {
    fn from(version: ApiVersion) -> Self {
        version.major().to_string()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major())
    }
}

mod defaults {
    pub fn id_sep() -> String {
        super::DEFAULT_SEPARATOR.into()
    }
    pub fn root() -> String {
        super::DEFAULT_ROOT.into()
    }
    pub fn link_uuid() -> String {
        "uuid".into()
    }
}

/// On-disk representation of a periodical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodicalFile {
    pub name: String,
    /// Remote identifier of the periodical
    pub uuid: String,
    /// Source library (e.g. `mzk`, `nkp`)
    pub library: String,
    pub kramerius_ver: ApiVersion,
    /// Public base URL of the digital library
    pub url: String,
    /// Base URL of the search API
    pub api_url: String,
    #[serde(default = "defaults::id_sep")]
    pub id_sep: String,
    #[serde(default = "defaults::root")]
    pub root: String,
    #[serde(default = "defaults::link_uuid")]
    pub link_uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ccnb: Option<String>,
    /// Absent until the periodical has been downloaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<TreeDocument>,
}

/// A periodical together with its catalog tree.
#[derive(Debug, Clone)]
pub struct Periodical {
    pub name: String,
    pub uuid: String,
    pub library: String,
    pub version: ApiVersion,
    pub url: String,
    pub api_url: String,
    pub link_uuid: String,
    pub issn: Option<String>,
    pub ccnb: Option<String>,
    pub tree: CatalogTree,
}

impl Periodical {
    /// Build from the persisted form; a missing tree yields a root-only tree.
    pub fn from_file(file: PeriodicalFile) -> Result<Self> {
        if file.id_sep.is_empty() {
            return Err(AppError::validation(format!(
                "periodical '{}' has an empty key separator",
                file.name
            )));
        }
        BaseUrl::check(&file.url)?;
        BaseUrl::check(&file.api_url)?;

        let tree = match &file.tree {
            Some(document) => CatalogTree::from_document(document, &file.root, &file.id_sep)?,
            None => CatalogTree::new(file.root.clone(), file.uuid.clone(), file.id_sep.clone()),
        };
        log::info!("Loaded periodical {} ({} nodes)", file.name, tree.node_count());

        Ok(Self {
            name: file.name,
            uuid: file.uuid,
            library: file.library,
            version: file.kramerius_ver,
            url: BaseUrl::trim(&file.url),
            api_url: BaseUrl::trim(&file.api_url),
            link_uuid: file.link_uuid,
            issn: file.issn,
            ccnb: file.ccnb,
            tree,
        })
    }

    /// Persisted form including the tree document.
    pub fn to_file(&self) -> PeriodicalFile {
        PeriodicalFile {
            name: self.name.clone(),
            uuid: self.uuid.clone(),
            library: self.library.clone(),
            kramerius_ver: self.version,
            url: self.url.clone(),
            api_url: self.api_url.clone(),
            id_sep: self.tree.separator().to_string(),
            root: self.tree.root().to_string(),
            link_uuid: self.link_uuid.clone(),
            issn: self.issn.clone(),
            ccnb: self.ccnb.clone(),
            tree: Some(self.tree.to_document()),
        }
    }

    /// Deep link to a unit of the periodical.
    pub fn make_url(&self, uuid: &str) -> String {
        format!("{}/{}/{}", self.url, self.link_uuid, uuid)
    }

    /// Deep link for a volume/issue/page path, if the tree has that node.
    pub fn link(&self, volume: Option<&str>, issue: Option<&str>, page: Option<&str>) -> Option<String> {
        let key = self.tree.path_key(&[volume, issue, page]);
        match self.tree.get(&key) {
            Some(node) => Some(self.make_url(&node.uuid)),
            None => {
                log::debug!("Node `{key}` was not found");
                None
            }
        }
    }

    /// Replace the tree with a freshly built one.
    pub fn set_tree(&mut self, tree: CatalogTree) {
        self.tree = tree;
    }
}

impl fmt::Display for Periodical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} UUID={}, lib={}, url={}, ver={}",
            self.name, self.uuid, self.library, self.url, self.version
        )
    }
}

/// Base URL helpers.
struct BaseUrl;

impl BaseUrl {
    fn check(raw: &str) -> Result<()> {
        url::Url::parse(raw)?;
        Ok(())
    }

    fn trim(raw: &str) -> String {
        raw.trim_end_matches('/').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeModel;

    fn file() -> PeriodicalFile {
        serde_json::from_str(
            r#"{
                "name": "frenstat",
                "uuid": "uuid:a6e39600",
                "library": "mzk",
                "kramerius_ver": "7",
                "url": "https://www.digitalniknihovna.cz/mzk/",
                "api_url": "https://api.kramerius.mzk.cz"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_version_parses_common_spellings() {
        assert_eq!("7".parse::<ApiVersion>().unwrap(), ApiVersion::V7);
        assert_eq!("v5".parse::<ApiVersion>().unwrap(), ApiVersion::V5);
        assert_eq!("7.0.31".parse::<ApiVersion>().unwrap(), ApiVersion::V7);
        assert!("6".parse::<ApiVersion>().is_err());
    }

    #[test]
    fn test_defaults_apply_to_minimal_file() {
        let per = Periodical::from_file(file()).unwrap();
        assert_eq!(per.tree.root(), "root");
        assert_eq!(per.tree.separator(), "/");
        assert_eq!(per.link_uuid, "uuid");
        assert_eq!(per.tree.node_count(), 1);
        assert_eq!(per.tree.root_node().unwrap().uuid, "uuid:a6e39600");
    }

    #[test]
    fn test_make_url_tolerates_trailing_slash() {
        let per = Periodical::from_file(file()).unwrap();
        assert_eq!(
            per.make_url("uuid:x"),
            "https://www.digitalniknihovna.cz/mzk/uuid/uuid:x"
        );
    }

    #[test]
    fn test_link_finds_existing_path() {
        let mut per = Periodical::from_file(file()).unwrap();
        per.tree.insert_child("root", "uuid:v", NodeModel::Volume, "1");
        per.tree.insert_child("root/1", "uuid:p", NodeModel::Page, "3");

        assert_eq!(
            per.link(Some("1"), None, Some("3")).as_deref(),
            Some("https://www.digitalniknihovna.cz/mzk/uuid/uuid:p")
        );
        assert!(per.link(Some("1"), Some("2"), Some("3")).is_none());
    }

    #[test]
    fn test_file_round_trip_keeps_tree() {
        let mut per = Periodical::from_file(file()).unwrap();
        per.tree.insert_child("root", "uuid:v", NodeModel::Volume, "1");
        let json = serde_json::to_string(&per.to_file()).unwrap();

        let back = Periodical::from_file(serde_json::from_str(&json).unwrap()).unwrap();
        assert_eq!(back.version, ApiVersion::V7);
        assert_eq!(back.tree.get("root/1").unwrap().uuid, "uuid:v");
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let mut bad = file();
        bad.url = "not a url".into();
        assert!(Periodical::from_file(bad).is_err());
    }
}
