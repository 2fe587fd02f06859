use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

use super::{decode_enum, decode_enum_list};
use crate::types::{ServiceCategory, VerificationStatus};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub business_name: String,
    pub services: Vec<ServiceCategory>,
    pub city: String,
    pub about: Option<String>,
    pub aadhar_number: String,
    pub portfolio_urls: Vec<String>,
    pub verification_status: VerificationStatus,
    pub verification_comment: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<Uuid>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

/// All but the last four digits replaced with `X`
pub fn mask_aadhar(value: &str) -> String {
    let total = value.chars().count();
    let hidden = total.saturating_sub(4);
    value
        .chars()
        .enumerate()
        .map(|(i, c)| if i < hidden { 'X' } else { c })
        .collect()
}

impl<'r> FromRow<'r, PgRow> for Partner {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            business_name: row.try_get("business_name")?,
            services: decode_enum_list(row, "services")?,
            city: row.try_get("city")?,
            about: row.try_get("about")?,
            aadhar_number: row.try_get("aadhar_number")?,
            portfolio_urls: row.try_get("portfolio_urls")?,
            verification_status: decode_enum(row, "verification_status")?,
            verification_comment: row.try_get("verification_comment")?,
            verified_at: row.try_get("verified_at")?,
            verified_by: row.try_get("verified_by")?,
            is_featured: row.try_get("is_featured")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl Partner {
    pub fn is_verified(&self) -> bool {
        self.verification_status == VerificationStatus::Verified
    }

    pub fn offers(&self, category: ServiceCategory) -> bool {
        self.services.contains(&category)
    }

    /// The owner's own view: identity number reduced to its last four digits
    pub fn with_masked_aadhar(mut self) -> Self {
        self.aadhar_number = mask_aadhar(&self.aadhar_number);
        self
    }

    pub fn apply_profile(&mut self, update: &PartnerUpdate) {
        if let Some(name) = &update.business_name {
            self.business_name = name.clone();
        }
        if let Some(services) = &update.services {
            self.services = services.clone();
        }
        if let Some(city) = &update.city {
            self.city = city.clone();
        }
        if let Some(about) = &update.about {
            self.about = (!about.is_empty()).then(|| about.clone());
        }
    }

    pub fn apply_verification(&mut self, decision: &VerificationDecision) {
        self.verification_status = decision.status;
        self.verified_at = decision.verified_at();
        self.verified_by = decision.verified_by();
        if decision.status == VerificationStatus::Verified {
            self.verification_comment = None;
        } else if decision.comment.is_some() {
            self.verification_comment = decision.comment.clone();
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPartner {
    pub user_id: Uuid,
    pub business_name: String,
    pub services: Vec<ServiceCategory>,
    pub city: String,
    pub about: Option<String>,
    pub aadhar_number: String,
    pub portfolio_urls: Vec<String>,
}

/// Profile fields a partner may change themselves. `None` leaves the
/// stored value alone; an empty `about` clears it.
#[derive(Debug, Clone, Default)]
pub struct PartnerUpdate {
    pub business_name: Option<String>,
    pub services: Option<Vec<ServiceCategory>>,
    pub city: Option<String>,
    pub about: Option<String>,
}

/// Admin verdict written by `PartnerRepository::record_verification`.
///
/// Verification stamps the deciding admin and clears any earlier comment;
/// rejection clears the stamp and keeps the old comment unless a new one
/// is given.
#[derive(Debug, Clone)]
pub struct VerificationDecision {
    pub status: VerificationStatus,
    pub comment: Option<String>,
    pub admin_id: Uuid,
    pub decided_at: DateTime<Utc>,
}

impl VerificationDecision {
    pub fn verified_at(&self) -> Option<DateTime<Utc>> {
        (self.status == VerificationStatus::Verified).then_some(self.decided_at)
    }

    pub fn verified_by(&self) -> Option<Uuid> {
        (self.status == VerificationStatus::Verified).then_some(self.admin_id)
    }
}

/// Admin listing filter; every field narrows the result
#[derive(Debug, Clone, Default)]
pub struct PartnerFilter {
    pub status: Option<VerificationStatus>,
    pub city: Option<String>,
    pub service: Option<ServiceCategory>,
}

impl PartnerFilter {
    pub fn matches(&self, partner: &Partner) -> bool {
        self.status.map_or(true, |s| partner.verification_status == s)
            && self
                .city
                .as_deref()
                .map_or(true, |c| partner.city.to_lowercase() == c.trim().to_lowercase())
            && self.service.map_or(true, |s| partner.offers(s))
    }
}
