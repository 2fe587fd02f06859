use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    #[serde(rename = "client")]
    pub client_id: Uuid,
    #[serde(rename = "partner")]
    pub partner_id: Uuid,
    #[serde(rename = "inquiry")]
    pub inquiry_id: Option<Uuid>,
    pub rating: i16,
    pub comment: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Review {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            client_id: row.try_get("client_id")?,
            partner_id: row.try_get("partner_id")?,
            inquiry_id: row.try_get("inquiry_id")?,
            rating: row.try_get("rating")?,
            comment: row.try_get("comment")?,
            is_approved: row.try_get("is_approved")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub client_id: Uuid,
    pub partner_id: Uuid,
    pub inquiry_id: Option<Uuid>,
    pub rating: i16,
    pub comment: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub approved: Option<bool>,
    pub partner_id: Option<Uuid>,
}

impl ReviewFilter {
    pub fn matches(&self, review: &Review) -> bool {
        self.approved.map_or(true, |a| review.is_approved == a)
            && self.partner_id.map_or(true, |p| review.partner_id == p)
    }
}
