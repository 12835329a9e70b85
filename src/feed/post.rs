//! Payloads for posting new listings

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::store::items::{ItemType, LostFoundStatus, ThriftStatus};
use crate::store::GatewayError;

/// Verified identity of the user posting an item
#[derive(Debug, Clone)]
pub struct Poster {
    pub user_id: Uuid,
    pub email: String,
}

/// A form submission that can become a stored row
pub trait ItemDraft: Send {
    /// Validate and stamp the poster onto the row to insert
    fn into_row(self, poster: &Poster) -> Result<Value, PostError>;
}

/// Lost & found form
#[derive(Debug, Clone, Deserialize)]
pub struct NewLostFoundItem {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Thrift form
#[derive(Debug, Clone, Deserialize)]
pub struct NewThriftItem {
    pub title: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Serialize)]
struct LostFoundRow {
    #[serde(rename = "type")]
    item_type: ItemType,
    title: String,
    description: String,
    location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<chrono::NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    user_email: String,
    user_id: Uuid,
    status: LostFoundStatus,
}

#[derive(Serialize)]
struct ThriftRow {
    title: String,
    description: String,
    price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    user_email: String,
    user_id: Uuid,
    status: ThriftStatus,
}

fn required(field: &'static str, value: String) -> Result<String, PostError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PostError::Invalid(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ItemDraft for NewLostFoundItem {
    fn into_row(self, poster: &Poster) -> Result<Value, PostError> {
        let row = LostFoundRow {
            item_type: self.item_type,
            title: required("title", self.title)?,
            description: required("description", self.description)?,
            location: required("location", self.location)?,
            date: self.date,
            image_url: optional(self.image_url),
            user_email: poster.email.clone(),
            user_id: poster.user_id,
            status: LostFoundStatus::Active,
        };
        Ok(serde_json::to_value(row)?)
    }
}

impl ItemDraft for NewThriftItem {
    fn into_row(self, poster: &Poster) -> Result<Value, PostError> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(PostError::Invalid("price must be a non-negative number".to_string()));
        }
        let row = ThriftRow {
            title: required("title", self.title)?,
            description: required("description", self.description)?,
            price: self.price,
            category: optional(self.category).filter(|c| c != super::filter::ALL),
            condition: optional(self.condition),
            image_url: optional(self.image_url),
            user_email: poster.email.clone(),
            user_id: poster.user_id,
            status: ThriftStatus::Available,
        };
        Ok(serde_json::to_value(row)?)
    }
}

/// Posting errors
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("Invalid item: {0}")]
    Invalid(String),

    #[error("Failed to encode item: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
