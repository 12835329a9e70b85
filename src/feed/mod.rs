//! Item feeds: snapshot loading, local filtering, posting and contact links

pub mod contact;
pub mod filter;
pub mod loader;
pub mod post;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::items::{LostFoundItem, ThriftItem};
use crate::store::Collection;

pub use filter::{filter_items, Facet, FeedQuery, Selection};
pub use loader::{FeedSnapshot, ItemFeed};
pub use post::{NewLostFoundItem, NewThriftItem, PostError, Poster};

/// A listing kind that can be shown in a feed
pub trait FeedItem: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Remote collection holding this kind
    const COLLECTION: Collection;

    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn description(&self) -> &str;

    /// Value matched by the facet filter
    fn facet(&self) -> Option<&str>;

    /// Mail compose link for contacting the poster
    fn contact_link(&self, endpoint: &str) -> String;
}

impl FeedItem for LostFoundItem {
    const COLLECTION: Collection = Collection::LostFound;

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn facet(&self) -> Option<&str> {
        Some(self.item_type.as_str())
    }

    fn contact_link(&self, endpoint: &str) -> String {
        contact::lost_found_link(endpoint, self)
    }
}

impl FeedItem for ThriftItem {
    const COLLECTION: Collection = Collection::Thrift;

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn facet(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn contact_link(&self, endpoint: &str) -> String {
        contact::thrift_link(endpoint, self)
    }
}
