//! Local filtering and per-view state over a fetched snapshot

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::FeedItem;

/// Sentinel facet value that disables the facet filter
pub const ALL: &str = "all";

/// Selected facet (item type or category)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Facet {
    #[default]
    All,
    Only(String),
}

impl Facet {
    /// Parse a raw facet parameter; missing, empty and `all` bypass the filter
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some(ALL) => Facet::All,
            Some(value) => Facet::Only(value.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Facet::All => ALL,
            Facet::Only(value) => value,
        }
    }

    pub fn is(&self, value: &str) -> bool {
        self.as_str() == value
    }
}

impl Serialize for Facet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Facet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Facet::parse(Some(&raw)))
    }
}

/// Search term and facet for one rendering of a feed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedQuery {
    pub search: String,
    pub facet: Facet,
}

impl FeedQuery {
    pub fn new(search: impl Into<String>, facet: Facet) -> Self {
        Self {
            search: search.into(),
            facet,
        }
    }

    pub fn has_search(&self) -> bool {
        !self.search.is_empty()
    }
}

/// Case-insensitive substring match on title or description
pub fn matches_search<T: FeedItem>(item: &T, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let term = term.to_lowercase();
    item.title().to_lowercase().contains(&term)
        || item.description().to_lowercase().contains(&term)
}

/// Exact facet equality; an item without a facet value never matches a concrete facet
pub fn matches_facet<T: FeedItem>(item: &T, facet: &Facet) -> bool {
    match facet {
        Facet::All => true,
        Facet::Only(value) => item.facet() == Some(value.as_str()),
    }
}

/// Items passing both the search and the facet filter, in snapshot order
pub fn filter_items<'a, T: FeedItem>(items: &'a [T], query: &FeedQuery) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| matches_search(*item, &query.search) && matches_facet(*item, &query.facet))
        .collect()
}

/// Which item, if any, is open in the detail view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(Option<String>);

impl Selection {
    pub fn from_param(raw: Option<&str>) -> Self {
        let mut selection = Self::default();
        if let Some(id) = raw.filter(|id| !id.is_empty()) {
            selection.select(id);
        }
        selection
    }

    /// Select an item, replacing any previous selection
    pub fn select(&mut self, id: impl Into<String>) {
        self.0 = Some(id.into());
    }

    pub fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Resolve against a snapshot; an id no longer present resolves to nothing
    pub fn resolve<'a, T: FeedItem>(&self, items: &'a [T]) -> Option<&'a T> {
        let id = self.id()?;
        items.iter().find(|item| item.id() == id)
    }
}
