use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::MatchingConfig;
use crate::database::models::{
    merge_assignment, ContactInfo, Inquiry, NewInquiry, Partner, PartnerFilter,
};
use crate::database::{CreatedOrder, DatabaseError, Store};
use crate::types::{InquiryStatus, ServiceCategory, VerificationStatus};
use crate::validation::{self, FieldError};

const DESCRIPTION_MAX: usize = 500;
const CITY_MAX: usize = 100;
/// Budgets are stored as NUMERIC(12, 2)
const BUDGET_SCALE: u32 = 2;

fn budget_max() -> Decimal {
    Decimal::new(999_999_999_999, BUDGET_SCALE)
}

#[derive(Debug, thiserror::Error)]
pub enum LeadError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error(transparent)]
    Validation(#[from] FieldError),

    #[error("cannot move inquiry from {from} to {to}")]
    Transition {
        from: InquiryStatus,
        to: InquiryStatus,
    },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Client-submitted inquiry before validation
#[derive(Debug, Clone)]
pub struct InquiryInput {
    pub category: ServiceCategory,
    pub date: NaiveDate,
    pub budget: Decimal,
    pub city: String,
    pub description: Option<String>,
    pub reference_image_url: Option<String>,
}

/// Inquiry plus the partners it is assigned to
#[derive(Debug, Clone)]
pub struct Assignment {
    pub inquiry: Inquiry,
    pub partners: Vec<Partner>,
}

/// An inquiry as an assigned partner sees it, with the client's contact details
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[serde(flatten)]
    pub inquiry: Inquiry,
    pub client_details: Option<ContactInfo>,
}

/// Who is asking for a status change
#[derive(Debug, Clone, Copy)]
pub enum Actor {
    Client(Uuid),
    /// Carries the partner's user id; the profile is looked up
    Partner(Uuid),
}

/// Lead matching and the inquiry lifecycle
pub struct LeadService {
    store: Arc<dyn Store>,
    max_partners: usize,
}

impl LeadService {
    pub fn new(store: Arc<dyn Store>, matching: &MatchingConfig) -> Self {
        Self {
            store,
            max_partners: matching.max_partners_per_lead,
        }
    }

    /// Validate, store and immediately match a new inquiry
    pub async fn create_inquiry(
        &self,
        client_id: Uuid,
        input: InquiryInput,
    ) -> Result<Assignment, LeadError> {
        let new_inquiry = validate_inquiry(client_id, input, Utc::now().date_naive())?;
        let inquiry = self.store.insert_inquiry(new_inquiry).await?;
        info!(
            inquiry_id = %inquiry.id,
            client_id = %client_id,
            category = %inquiry.category,
            city = %inquiry.city,
            "Created inquiry"
        );
        self.match_and_assign(&inquiry).await
    }

    /// Select verified partners for the inquiry and record the assignment.
    ///
    /// Partners already assigned stay assigned and keep their position; new
    /// matches are appended up to the configured cap. Only `new` inquiries
    /// are (re)assigned.
    pub async fn match_and_assign(&self, inquiry: &Inquiry) -> Result<Assignment, LeadError> {
        if inquiry.status != InquiryStatus::New {
            debug!(inquiry_id = %inquiry.id, status = %inquiry.status, "Skipping matching for non-new inquiry");
            let partners = self.resolve_partners(&inquiry.assigned_partners, &[]).await?;
            return Ok(Assignment {
                inquiry: inquiry.clone(),
                partners,
            });
        }

        let filter = PartnerFilter {
            status: Some(VerificationStatus::Verified),
            city: Some(inquiry.city.clone()),
            service: Some(inquiry.category),
        };
        let pool = self.store.list_partners(&filter, CreatedOrder::OldestFirst).await?;
        let pool_ids: Vec<Uuid> = pool.iter().map(|p| p.id).collect();
        let open_leads = self.store.count_open_leads(&pool_ids).await?;

        let ranked = rank_candidates(pool, &open_leads);
        let candidates: Vec<Uuid> = ranked.iter().map(|p| p.id).collect();
        let selected = merge_assignment(&inquiry.assigned_partners, &candidates, self.max_partners);

        let current = if selected == inquiry.assigned_partners {
            inquiry.clone()
        } else {
            match self
                .store
                .assign_partners(inquiry.id, &candidates, self.max_partners)
                .await?
            {
                Some(updated) => updated,
                None => {
                    // Deleted or already moved past `new` meanwhile
                    warn!(inquiry_id = %inquiry.id, "Inquiry changed during matching; assignment skipped");
                    self.store
                        .find_inquiry(inquiry.id)
                        .await?
                        .ok_or(LeadError::NotFound("Inquiry"))?
                }
            }
        };

        let partners = self.resolve_partners(&current.assigned_partners, &ranked).await?;
        info!(
            inquiry_id = %current.id,
            candidates = ranked.len(),
            assigned = partners.len(),
            "Matched inquiry to partners"
        );
        Ok(Assignment {
            inquiry: current,
            partners,
        })
    }

    /// Look up assigned partners, reusing already loaded rows
    async fn resolve_partners(
        &self,
        ids: &[Uuid],
        loaded: &[Partner],
    ) -> Result<Vec<Partner>, LeadError> {
        let mut partners = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(partner) = loaded.iter().find(|p| p.id == *id) {
                partners.push(partner.clone());
            } else if let Some(partner) = self.store.find_partner(*id).await? {
                partners.push(partner);
            }
        }
        Ok(partners)
    }

    pub async fn client_inquiries(&self, client_id: Uuid) -> Result<Vec<Inquiry>, LeadError> {
        Ok(self.store.list_inquiries_for_client(client_id).await?)
    }

    pub async fn client_inquiry(&self, client_id: Uuid, id: Uuid) -> Result<Inquiry, LeadError> {
        let inquiry = self.load(id).await?;
        if inquiry.client_id != client_id {
            return Err(LeadError::Forbidden(
                "Not authorized to access this inquiry".to_string(),
            ));
        }
        Ok(inquiry)
    }

    pub async fn delete_inquiry(&self, client_id: Uuid, id: Uuid) -> Result<(), LeadError> {
        let inquiry = self.load(id).await?;
        if inquiry.client_id != client_id {
            return Err(LeadError::Forbidden(
                "Not authorized to delete this inquiry".to_string(),
            ));
        }
        if !self.store.delete_inquiry(id).await? {
            return Err(LeadError::NotFound("Inquiry"));
        }
        info!(inquiry_id = %id, client_id = %client_id, "Deleted inquiry");
        Ok(())
    }

    /// Inquiries assigned to the partner owned by `user_id`
    pub async fn partner_leads(&self, user_id: Uuid) -> Result<Vec<Lead>, LeadError> {
        let partner = self.verified_partner(user_id, "access leads").await?;
        let inquiries = self.store.list_inquiries_for_partner(partner.id).await?;

        let mut client_ids: Vec<Uuid> = inquiries.iter().map(|i| i.client_id).collect();
        client_ids.sort();
        client_ids.dedup();
        let contacts: HashMap<Uuid, ContactInfo> = self
            .store
            .find_users(&client_ids)
            .await?
            .iter()
            .map(|u| (u.id, u.contact()))
            .collect();

        Ok(inquiries
            .into_iter()
            .map(|inquiry| {
                let client_details = contacts.get(&inquiry.client_id).cloned();
                Lead {
                    inquiry,
                    client_details,
                }
            })
            .collect())
    }

    /// Apply a status change requested by a client or an assigned partner
    pub async fn update_status(
        &self,
        actor: Actor,
        inquiry_id: Uuid,
        requested: Option<&str>,
    ) -> Result<Inquiry, LeadError> {
        match actor {
            Actor::Client(client_id) => {
                let next = parse_status(requested, InquiryStatus::ALL, "new, responded, booked, or closed")?;
                let inquiry = self.load(inquiry_id).await?;
                if inquiry.client_id != client_id {
                    return Err(LeadError::Forbidden(
                        "Not authorized to update this inquiry".to_string(),
                    ));
                }
                self.transition(inquiry, next, None).await
            }
            Actor::Partner(user_id) => {
                let next = parse_status(
                    requested,
                    &[InquiryStatus::Responded, InquiryStatus::Booked, InquiryStatus::Closed],
                    "responded, booked, or closed",
                )?;
                let partner = self.verified_partner(user_id, "respond to leads").await?;
                let inquiry = self.load(inquiry_id).await?;
                if !inquiry.is_assigned_to(partner.id) {
                    return Err(LeadError::Forbidden(
                        "Not authorized to respond to this inquiry".to_string(),
                    ));
                }
                let booked_by = (next == InquiryStatus::Booked).then_some(partner.id);
                self.transition(inquiry, next, booked_by).await
            }
        }
    }

    /// Compare-and-set the status, re-evaluating once if another writer won
    async fn transition(
        &self,
        inquiry: Inquiry,
        next: InquiryStatus,
        booked_by: Option<Uuid>,
    ) -> Result<Inquiry, LeadError> {
        let mut current = inquiry;

        for attempt in 0..2 {
            if current.status == next {
                debug!(inquiry_id = %current.id, status = %next, "Status unchanged");
                return Ok(current);
            }
            if !current.status.can_transition_to(next) {
                return Err(LeadError::Transition {
                    from: current.status,
                    to: next,
                });
            }

            match self
                .store
                .update_inquiry_status(current.id, current.status, next, booked_by)
                .await?
            {
                Some(updated) => {
                    info!(
                        inquiry_id = %updated.id,
                        from = %current.status,
                        to = %next,
                        booked_partner = ?updated.booked_partner,
                        "Inquiry status changed"
                    );
                    return Ok(updated);
                }
                None => {
                    debug!(inquiry_id = %current.id, attempt, "Lost status race; reloading");
                    current = self.load(current.id).await?;
                }
            }
        }

        Err(LeadError::Transition {
            from: current.status,
            to: next,
        })
    }

    async fn load(&self, id: Uuid) -> Result<Inquiry, LeadError> {
        self.store
            .find_inquiry(id)
            .await?
            .ok_or(LeadError::NotFound("Inquiry"))
    }

    async fn verified_partner(&self, user_id: Uuid, action: &str) -> Result<Partner, LeadError> {
        let partner = self
            .store
            .find_partner_by_user(user_id)
            .await?
            .ok_or(LeadError::NotFound("Partner profile"))?;
        if !partner.is_verified() {
            return Err(LeadError::Forbidden(format!(
                "Partner must be verified to {}",
                action
            )));
        }
        Ok(partner)
    }
}

fn parse_status(
    requested: Option<&str>,
    allowed: &[InquiryStatus],
    expected: &str,
) -> Result<InquiryStatus, LeadError> {
    requested
        .and_then(|s| s.trim().parse::<InquiryStatus>().ok())
        .filter(|s| allowed.contains(s))
        .ok_or_else(|| {
            LeadError::InvalidStatus(format!("Please provide a valid status ({})", expected))
        })
}

fn validate_inquiry(
    client_id: Uuid,
    input: InquiryInput,
    today: NaiveDate,
) -> Result<NewInquiry, LeadError> {
    if input.budget <= Decimal::ZERO {
        return Err(FieldError::new("budget", "Budget must be greater than zero").into());
    }
    if input.budget.normalize().scale() > BUDGET_SCALE {
        return Err(FieldError::new("budget", "Budget can have at most two decimal places").into());
    }
    if input.budget > budget_max() {
        return Err(
            FieldError::new("budget", format!("Budget cannot exceed {}", budget_max())).into(),
        );
    }
    if input.date < today {
        return Err(FieldError::new("date", "Event date cannot be in the past").into());
    }

    Ok(NewInquiry {
        client_id,
        category: input.category,
        date: input.date,
        budget: input.budget,
        city: validation::required_text("city", &input.city, CITY_MAX)?,
        description: validation::optional_text(
            "description",
            input.description.as_deref(),
            DESCRIPTION_MAX,
        )?,
        reference_image_url: validation::optional_text(
            "referenceImageUrl",
            input.reference_image_url.as_deref(),
            2048,
        )?,
    })
}

/// Featured first, then lightest open workload, then longest verified, then id
pub fn rank_candidates(mut pool: Vec<Partner>, open_leads: &HashMap<Uuid, i64>) -> Vec<Partner> {
    let load = |p: &Partner| open_leads.get(&p.id).copied().unwrap_or(0);

    pool.sort_by(|a, b| {
        b.is_featured
            .cmp(&a.is_featured)
            .then_with(|| load(a).cmp(&load(b)))
            .then_with(|| match (a.verified_at, b.verified_at) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| a.id.cmp(&b.id))
    });
    pool
}
