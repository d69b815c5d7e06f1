//! Domain Models
//!
//! Typed rows mirrored from the remote store schema. The cache keeps
//! payloads as opaque JSON; the façade deserializes into these types at the
//! boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ordering::DisplayOrdered;

// == Entity Status ==
/// Publication status shared by products, categories and subcategories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityStatus {
    Active,
    Draft,
    Archived,
    Inactive,
}

// == Product ==
/// A catalog product row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Category slug this product belongs to
    pub category: String,
    /// Subcategory slug, if assigned
    #[serde(default)]
    pub subcategory: Option<String>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// == Category ==
/// A top-level catalog category row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub slug: String,
    pub status: EntityStatus,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub catalogue_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// == Subcategory ==
/// A subcategory row, optionally nested under another subcategory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub category_id: i64,
    #[serde(default)]
    pub parent_subcategory_id: Option<i64>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// == Category With Count ==
/// Derived aggregate: a category joined with its active-product count and
/// a resolved display image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWithCount {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub slug: String,
    pub count: u64,
    pub image: String,
}

impl DisplayOrdered for Category {
    fn display_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn display_slug(&self) -> Option<&str> {
        Some(&self.slug)
    }
}

impl DisplayOrdered for CategoryWithCount {
    fn display_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn display_slug(&self) -> Option<&str> {
        Some(&self.slug)
    }
}
