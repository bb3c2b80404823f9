use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Identifier of a product that has not been committed yet
pub const UNASSIGNED_ID: i32 = 0;

/// Product entity as persisted
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Assigned by the store at commit; [`UNASSIGNED_ID`] until then
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_persisted(&self) -> bool {
        self.id != UNASSIGNED_ID
    }
}

/// Product category (read-only here)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

impl Category {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Product as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResource {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Widget")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[schema(example = 9.99)]
    pub price: f64,
    #[schema(example = 3)]
    pub category_id: i32,
}

/// Payload for creating or replacing a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveProductResource {
    #[validate(length(
        min = 1,
        max = 255,
        message = "The Name field must be between 1 and 255 characters."
    ))]
    #[schema(example = "Widget")]
    pub name: String,

    #[serde(default)]
    #[validate(length(
        max = 2000,
        message = "The Description field must be at most 2000 characters."
    ))]
    pub description: Option<String>,

    #[validate(range(min = 0.0, message = "The Price field must be zero or greater."))]
    #[schema(example = 9.99)]
    pub price: f64,

    /// A missing value is treated as 0, which never names a category
    #[serde(default)]
    #[schema(example = 3)]
    pub category_id: i32,
}
