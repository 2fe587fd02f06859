use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

use super::decode_enum;
use crate::types::ServiceCategory;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: Uuid,
    #[serde(rename = "partner")]
    pub partner_id: Uuid,
    pub title: String,
    pub category: ServiceCategory,
    pub description: Option<String>,
    pub image_url: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for PortfolioItem {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            partner_id: row.try_get("partner_id")?,
            title: row.try_get("title")?,
            category: decode_enum(row, "category")?,
            description: row.try_get("description")?,
            image_url: row.try_get("image_url")?,
            display_order: row.try_get("display_order")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewPortfolioItem {
    pub partner_id: Uuid,
    pub title: String,
    pub category: ServiceCategory,
    pub description: Option<String>,
    pub image_url: String,
    pub display_order: i32,
}

/// Editable fields; display order is fixed at creation
#[derive(Debug, Clone, Default)]
pub struct PortfolioUpdate {
    pub title: Option<String>,
    pub category: Option<ServiceCategory>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl PortfolioUpdate {
    pub fn apply(self, item: &mut PortfolioItem) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(description) = self.description {
            item.description = Some(description);
        }
        if let Some(image_url) = self.image_url {
            item.image_url = image_url;
        }
    }
}
