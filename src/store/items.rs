//! Listing rows stored in the lost & found and thrift tables

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Whether a lost & found post reports a lost or a found item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Lost,
    Found,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Lost => "lost",
            ItemType::Found => "found",
        }
    }
}

/// Lost & found post status; `Found` means the owner got it back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LostFoundStatus {
    #[default]
    Active,
    Found,
    Closed,
}

/// Thrift listing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThriftStatus {
    #[default]
    Available,
    Pending,
    Sold,
}

/// Categories offered by the thrift page picker as (value, label)
pub const THRIFT_CATEGORIES: &[(&str, &str)] = &[
    ("Electronics", "Electronics"),
    ("Furniture", "Furniture"),
    ("Clothing", "Clothing"),
    ("Books", "Books"),
    ("Sports", "Sports & Outdoors"),
    ("Other", "Other"),
];

/// Row in `lost_found_items`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LostFoundItem {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Day the item went missing or was picked up
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub status: LostFoundStatus,
}

/// Row in `thrift_items`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThriftItem {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub status: ThriftStatus,
}

/// Primary keys arrive as text (uuid) or as JSON numbers (int8); keep either as a string
fn opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

/// Local part of an email address, used as the poster's display name
pub fn poster_name(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_lost_found_row() {
        let row = json!({
            "id": "7d0c1a3e-5a8e-4a53-9d0e-1f1f2b3c4d5e",
            "type": "lost",
            "title": "Blue Backpack",
            "description": "left in library",
            "location": "Mudd Library",
            "user_email": "jane.doe@lawrence.edu",
            "created_at": "2025-02-03T14:05:00+00:00",
            "image_url": null,
            "date": "2025-02-02",
            "user_id": "0b9f5c2e-1d7a-4c8e-9a0b-6c5d4e3f2a1b",
            "status": "active"
        });
        let item: LostFoundItem = serde_json::from_value(row).unwrap();
        assert_eq!(item.item_type, ItemType::Lost);
        assert_eq!(item.status, LostFoundStatus::Active);
        assert_eq!(item.date, NaiveDate::from_ymd_opt(2025, 2, 2));
        assert!(item.image_url.is_none());
    }

    #[test]
    fn decodes_thrift_row_with_missing_optionals() {
        let row = json!({
            "id": "42",
            "title": "Desk Lamp",
            "description": "works fine",
            "price": 12.5,
            "user_email": "sam@lawrence.edu",
            "created_at": "2025-02-03T14:05:00Z"
        });
        let item: ThriftItem = serde_json::from_value(row).unwrap();
        assert_eq!(item.category, None);
        assert_eq!(item.status, ThriftStatus::Available);
        assert_eq!(item.price, 12.5);
    }

    #[test]
    fn numeric_ids_decode_as_strings() {
        let row = json!({
            "id": 7,
            "type": "found",
            "title": "Umbrella",
            "user_email": "jane.doe@lawrence.edu",
            "created_at": "2025-02-03T14:05:00Z"
        });
        let item: LostFoundItem = serde_json::from_value(row).unwrap();
        assert_eq!(item.id, "7");

        let row = json!({
            "id": 42, "title": "Desk Lamp", "price": 12.5,
            "user_email": "sam@lawrence.edu", "created_at": "2025-02-03T14:05:00Z"
        });
        let item: ThriftItem = serde_json::from_value(row).unwrap();
        assert_eq!(item.id, "42");
    }

    #[test]
    fn rejects_structured_id() {
        let row = json!({
            "id": {"value": 1}, "title": "t", "price": 1, "user_email": "a@b",
            "created_at": "2025-02-03T14:05:00Z"
        });
        assert!(serde_json::from_value::<ThriftItem>(row).is_err());
    }

    #[test]
    fn rejects_unknown_status() {
        let row = json!({
            "id": "1", "title": "t", "price": 1, "user_email": "a@b",
            "created_at": "2025-02-03T14:05:00Z", "status": "gone"
        });
        assert!(serde_json::from_value::<ThriftItem>(row).is_err());
    }

    #[test]
    fn poster_name_is_local_part() {
        assert_eq!(poster_name("jane.doe@lawrence.edu"), "jane.doe");
        assert_eq!(poster_name("nodomain"), "nodomain");
    }
}
