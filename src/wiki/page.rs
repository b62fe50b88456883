//! Wiki document model

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::wiki::WikiError;

/// Kind of wiki page; each kind lives in its own collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageType {
    Bot,
    BotGroup,
    BotSupergroup,
    Part,
    PartGroup,
    PartSupergroup,
    Location,
    Other,
}

/// Relationship columns stored only as JSON lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    Bots,
    Parts,
    Groups,
    Supergroups,
    Subpages,
}

impl ListField {
    pub fn column(&self) -> &'static str {
        match self {
            ListField::Bots => "Bots",
            ListField::Parts => "Parts",
            ListField::Groups => "Groups",
            ListField::Supergroups => "Supergroups",
            ListField::Subpages => "Subpages",
        }
    }
}

impl PageType {
    /// All page types, in collection order
    pub fn all() -> &'static [PageType] {
        &[
            PageType::Bot,
            PageType::BotGroup,
            PageType::BotSupergroup,
            PageType::Part,
            PageType::PartGroup,
            PageType::PartSupergroup,
            PageType::Location,
            PageType::Other,
        ]
    }

    /// Tag used in the flat table's `Page Type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Bot => "Bot",
            PageType::BotGroup => "Bot Group",
            PageType::BotSupergroup => "Bot Supergroup",
            PageType::Part => "Part",
            PageType::PartGroup => "Part Group",
            PageType::PartSupergroup => "Part Supergroup",
            PageType::Location => "Location",
            PageType::Other => "Other",
        }
    }

    /// Key of the page type's collection in the wiki document
    pub fn collection(&self) -> &'static str {
        match self {
            PageType::Bot => "Bots",
            PageType::BotGroup => "Bot Groups",
            PageType::BotSupergroup => "Bot Supergroups",
            PageType::Part => "Parts",
            PageType::PartGroup => "Part Groups",
            PageType::PartSupergroup => "Part Supergroups",
            PageType::Location => "Locations",
            PageType::Other => "Other",
        }
    }

    /// List-valued relationship columns this page type carries
    pub fn list_fields(&self) -> &'static [ListField] {
        match self {
            PageType::BotGroup => &[ListField::Bots],
            PageType::BotSupergroup => &[ListField::Bots, ListField::Groups, ListField::Supergroups],
            PageType::PartGroup => &[ListField::Parts],
            PageType::PartSupergroup => &[ListField::Parts, ListField::Groups, ListField::Supergroups],
            PageType::Other => &[ListField::Subpages],
            PageType::Bot | PageType::Part | PageType::Location => &[],
        }
    }

    /// Whether pages of this type carry a `Part Category`
    pub fn has_part_category(&self) -> bool {
        matches!(self, PageType::PartGroup)
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PageType {
    type Err = WikiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageType::all()
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| WikiError::UnknownPageType {
                name: String::new(),
                page_type: s.to_string(),
            })
    }
}

/// Spoiler level of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Spoiler {
    None,
    Spoiler,
    Redacted,
}

impl Spoiler {
    pub fn as_str(&self) -> &'static str {
        match self {
            Spoiler::None => "None",
            Spoiler::Spoiler => "Spoiler",
            Spoiler::Redacted => "Redacted",
        }
    }

    /// Parse a flat-table cell for the named page
    pub fn parse_cell(name: &str, value: &str) -> Result<Self, WikiError> {
        match value {
            "None" => Ok(Spoiler::None),
            "Spoiler" => Ok(Spoiler::Spoiler),
            "Redacted" => Ok(Spoiler::Redacted),
            _ => Err(WikiError::InvalidSpoiler {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }
}

/// One wiki page
///
/// Keys this crate does not know about are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WikiPage {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Content", default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(rename = "Spoiler", default, skip_serializing_if = "Option::is_none")]
    pub spoiler: Option<Spoiler>,

    #[serde(rename = "Bots", default, skip_serializing_if = "Option::is_none")]
    pub bots: Option<Vec<String>>,

    #[serde(rename = "Part Category", default, skip_serializing_if = "Option::is_none")]
    pub part_category: Option<String>,

    #[serde(rename = "Parts", default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<String>>,

    #[serde(rename = "Groups", default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,

    #[serde(rename = "Supergroups", default, skip_serializing_if = "Option::is_none")]
    pub supergroups: Option<Vec<String>>,

    #[serde(rename = "Subpages", default, skip_serializing_if = "Option::is_none")]
    pub subpages: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl WikiPage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: None,
            spoiler: None,
            bots: None,
            part_category: None,
            parts: None,
            groups: None,
            supergroups: None,
            subpages: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn list(&self, field: ListField) -> Option<&Vec<String>> {
        match field {
            ListField::Bots => self.bots.as_ref(),
            ListField::Parts => self.parts.as_ref(),
            ListField::Groups => self.groups.as_ref(),
            ListField::Supergroups => self.supergroups.as_ref(),
            ListField::Subpages => self.subpages.as_ref(),
        }
    }

    pub fn list_mut(&mut self, field: ListField) -> &mut Option<Vec<String>> {
        match field {
            ListField::Bots => &mut self.bots,
            ListField::Parts => &mut self.parts,
            ListField::Groups => &mut self.groups,
            ListField::Supergroups => &mut self.supergroups,
            ListField::Subpages => &mut self.subpages,
        }
    }
}

/// The nested wiki document
///
/// A collection key missing from the input stays missing on output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WikiDocument {
    #[serde(rename = "Bots", default, skip_serializing_if = "Option::is_none")]
    pub bots: Option<Vec<WikiPage>>,

    #[serde(rename = "Bot Groups", default, skip_serializing_if = "Option::is_none")]
    pub bot_groups: Option<Vec<WikiPage>>,

    #[serde(rename = "Bot Supergroups", default, skip_serializing_if = "Option::is_none")]
    pub bot_supergroups: Option<Vec<WikiPage>>,

    #[serde(rename = "Parts", default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<WikiPage>>,

    #[serde(rename = "Part Groups", default, skip_serializing_if = "Option::is_none")]
    pub part_groups: Option<Vec<WikiPage>>,

    #[serde(rename = "Part Supergroups", default, skip_serializing_if = "Option::is_none")]
    pub part_supergroups: Option<Vec<WikiPage>>,

    #[serde(rename = "Locations", default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<WikiPage>>,

    #[serde(rename = "Other", default, skip_serializing_if = "Option::is_none")]
    pub other: Option<Vec<WikiPage>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl WikiDocument {
    /// A document with all eight collections present and empty
    pub fn with_all_collections() -> Self {
        let mut doc = Self::default();
        for page_type in PageType::all() {
            *doc.slot_mut(*page_type) = Some(Vec::new());
        }
        doc
    }

    pub fn from_json(text: &str) -> Result<Self, WikiError> {
        serde_json::from_str(text).map_err(|e| WikiError::Json(e.to_string()))
    }

    /// Serialize with one-space indentation and a trailing newline
    pub fn to_json(&self) -> Result<String, WikiError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)
            .map_err(|e| WikiError::Json(e.to_string()))?;
        let mut text = String::from_utf8(buf).map_err(|e| WikiError::Json(e.to_string()))?;
        text.push('\n');
        Ok(text)
    }

    fn slot(&self, page_type: PageType) -> &Option<Vec<WikiPage>> {
        match page_type {
            PageType::Bot => &self.bots,
            PageType::BotGroup => &self.bot_groups,
            PageType::BotSupergroup => &self.bot_supergroups,
            PageType::Part => &self.parts,
            PageType::PartGroup => &self.part_groups,
            PageType::PartSupergroup => &self.part_supergroups,
            PageType::Location => &self.locations,
            PageType::Other => &self.other,
        }
    }

    fn slot_mut(&mut self, page_type: PageType) -> &mut Option<Vec<WikiPage>> {
        match page_type {
            PageType::Bot => &mut self.bots,
            PageType::BotGroup => &mut self.bot_groups,
            PageType::BotSupergroup => &mut self.bot_supergroups,
            PageType::Part => &mut self.parts,
            PageType::PartGroup => &mut self.part_groups,
            PageType::PartSupergroup => &mut self.part_supergroups,
            PageType::Location => &mut self.locations,
            PageType::Other => &mut self.other,
        }
    }

    /// The page type's collection, or `None` when the document lacks it
    pub fn collection(&self, page_type: PageType) -> Option<&Vec<WikiPage>> {
        self.slot(page_type).as_ref()
    }

    pub fn collection_mut(&mut self, page_type: PageType) -> Option<&mut Vec<WikiPage>> {
        self.slot_mut(page_type).as_mut()
    }

    /// Pages of one type; empty when the collection is absent
    pub fn pages(&self, page_type: PageType) -> &[WikiPage] {
        self.collection(page_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First page type, in collection order, holding a page with this name
    pub fn owner_of(&self, name: &str) -> Option<PageType> {
        PageType::all()
            .iter()
            .copied()
            .find(|t| self.pages(*t).iter().any(|p| p.name == name))
    }

    /// Sort every present collection by page name
    pub fn sort(&mut self) {
        for page_type in PageType::all() {
            if let Some(pages) = self.collection_mut(*page_type) {
                pages.sort_by(|a, b| a.name.cmp(&b.name));
            }
        }
    }

    pub fn page_count(&self) -> usize {
        PageType::all().iter().map(|t| self.pages(*t).len()).sum()
    }
}
