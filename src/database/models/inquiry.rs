use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

use super::decode_enum;
use crate::types::{InquiryStatus, ServiceCategory};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: Uuid,
    #[serde(rename = "client")]
    pub client_id: Uuid,
    pub category: ServiceCategory,
    pub date: NaiveDate,
    pub budget: Decimal,
    pub city: String,
    pub description: Option<String>,
    pub reference_image_url: Option<String>,
    pub status: InquiryStatus,
    pub assigned_partners: Vec<Uuid>,
    pub booked_partner: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Inquiry {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            client_id: row.try_get("client_id")?,
            category: decode_enum(row, "category")?,
            date: row.try_get("date")?,
            budget: row.try_get("budget")?,
            city: row.try_get("city")?,
            description: row.try_get("description")?,
            reference_image_url: row.try_get("reference_image_url")?,
            status: decode_enum(row, "status")?,
            assigned_partners: row.try_get("assigned_partners")?,
            booked_partner: row.try_get("booked_partner")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Inquiry {
    pub fn is_assigned_to(&self, partner_id: Uuid) -> bool {
        self.assigned_partners.contains(&partner_id)
    }
}

/// Existing assignments in order, then unseen candidates until `cap` is
/// reached. Existing entries are never dropped, even past the cap.
pub fn merge_assignment(existing: &[Uuid], candidates: &[Uuid], cap: usize) -> Vec<Uuid> {
    let mut merged: Vec<Uuid> = Vec::with_capacity(cap.max(existing.len()));
    for id in existing.iter().chain(candidates) {
        if merged.contains(id) {
            continue;
        }
        if merged.len() >= cap && !existing.contains(id) {
            break;
        }
        merged.push(*id);
    }
    merged
}

#[derive(Debug, Clone)]
pub struct NewInquiry {
    pub client_id: Uuid,
    pub category: ServiceCategory,
    pub date: NaiveDate,
    pub budget: Decimal,
    pub city: String,
    pub description: Option<String>,
    pub reference_image_url: Option<String>,
}
