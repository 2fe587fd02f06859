// Store wrapper that lets service tests land a concurrent write between a
// service's read and its own write.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::memory::MemoryStore;
use crate::database::models::{
    Inquiry, NewInquiry, NewPartner, NewPortfolioItem, NewReview, NewUser, Partner, PartnerFilter,
    PartnerUpdate, PortfolioItem, Review, ReviewFilter, User, VerificationDecision,
};
use crate::database::repository::{
    CreatedOrder, InquiryRepository, PartnerRepository, PortfolioRepository, ReviewRepository,
    UserRepository,
};
use crate::types::{InquiryStatus, Role, VerificationStatus};

/// A write another request makes while the service is between read and write
pub enum Race {
    /// Move the inquiry to this status right after the next `find_inquiry`
    InquiryStatus(InquiryStatus),
    /// Record this decision right after the next `find_partner_by_user`
    Verification(VerificationDecision),
}

/// Delegates to a `MemoryStore`; an armed `Race` fires once, after the read
/// it is attached to has taken its snapshot.
#[derive(Default)]
pub struct RacingStore {
    pub inner: MemoryStore,
    armed: Mutex<Option<Race>>,
}

impl RacingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn arm(&self, race: Race) {
        *self.armed.lock().await = Some(race);
    }

    async fn take_status_race(&self) -> Option<InquiryStatus> {
        let mut slot = self.armed.lock().await;
        match slot.take() {
            Some(Race::InquiryStatus(status)) => Some(status),
            other => {
                *slot = other;
                None
            }
        }
    }

    async fn take_verification_race(&self) -> Option<VerificationDecision> {
        let mut slot = self.armed.lock().await;
        match slot.take() {
            Some(Race::Verification(decision)) => Some(decision),
            other => {
                *slot = other;
                None
            }
        }
    }
}

#[async_trait]
impl UserRepository for RacingStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        self.inner.insert_user(user).await
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        self.inner.find_user(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        self.inner.find_user_by_email(email).await
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, DatabaseError> {
        self.inner.find_users(ids).await
    }

    async fn set_user_otp(
        &self,
        id: Uuid,
        otp_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.inner.set_user_otp(id, otp_hash, expires_at).await
    }

    async fn mark_user_verified(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.inner.mark_user_verified(id).await
    }

    async fn count_users(&self, role: Option<Role>) -> Result<i64, DatabaseError> {
        self.inner.count_users(role).await
    }
}

#[async_trait]
impl PartnerRepository for RacingStore {
    async fn insert_partner(&self, partner: NewPartner) -> Result<Partner, DatabaseError> {
        self.inner.insert_partner(partner).await
    }

    async fn find_partner(&self, id: Uuid) -> Result<Option<Partner>, DatabaseError> {
        self.inner.find_partner(id).await
    }

    async fn find_partner_by_user(&self, user_id: Uuid) -> Result<Option<Partner>, DatabaseError> {
        let found = self.inner.find_partner_by_user(user_id).await?;
        if let Some(partner) = &found {
            if let Some(decision) = self.take_verification_race().await {
                self.inner.record_verification(partner.id, &decision).await?;
            }
        }
        Ok(found)
    }

    async fn list_partners(
        &self,
        filter: &PartnerFilter,
        order: CreatedOrder,
    ) -> Result<Vec<Partner>, DatabaseError> {
        self.inner.list_partners(filter, order).await
    }

    async fn update_partner_profile(
        &self,
        id: Uuid,
        update: &PartnerUpdate,
    ) -> Result<Partner, DatabaseError> {
        self.inner.update_partner_profile(id, update).await
    }

    async fn record_verification(
        &self,
        id: Uuid,
        decision: &VerificationDecision,
    ) -> Result<Partner, DatabaseError> {
        self.inner.record_verification(id, decision).await
    }

    async fn set_partner_featured(
        &self,
        id: Uuid,
        featured: bool,
    ) -> Result<Partner, DatabaseError> {
        self.inner.set_partner_featured(id, featured).await
    }

    async fn count_partners(
        &self,
        status: Option<VerificationStatus>,
    ) -> Result<i64, DatabaseError> {
        self.inner.count_partners(status).await
    }
}

#[async_trait]
impl InquiryRepository for RacingStore {
    async fn insert_inquiry(&self, inquiry: NewInquiry) -> Result<Inquiry, DatabaseError> {
        self.inner.insert_inquiry(inquiry).await
    }

    async fn find_inquiry(&self, id: Uuid) -> Result<Option<Inquiry>, DatabaseError> {
        let found = self.inner.find_inquiry(id).await?;
        if let Some(inquiry) = &found {
            if let Some(next) = self.take_status_race().await {
                self.inner
                    .update_inquiry_status(id, inquiry.status, next, None)
                    .await?;
            }
        }
        Ok(found)
    }

    async fn list_inquiries_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<Inquiry>, DatabaseError> {
        self.inner.list_inquiries_for_client(client_id).await
    }

    async fn list_inquiries_for_partner(
        &self,
        partner_id: Uuid,
    ) -> Result<Vec<Inquiry>, DatabaseError> {
        self.inner.list_inquiries_for_partner(partner_id).await
    }

    async fn assign_partners(
        &self,
        id: Uuid,
        candidates: &[Uuid],
        cap: usize,
    ) -> Result<Option<Inquiry>, DatabaseError> {
        self.inner.assign_partners(id, candidates, cap).await
    }

    async fn update_inquiry_status(
        &self,
        id: Uuid,
        expected: InquiryStatus,
        next: InquiryStatus,
        booked_partner: Option<Uuid>,
    ) -> Result<Option<Inquiry>, DatabaseError> {
        self.inner
            .update_inquiry_status(id, expected, next, booked_partner)
            .await
    }

    async fn delete_inquiry(&self, id: Uuid) -> Result<bool, DatabaseError> {
        self.inner.delete_inquiry(id).await
    }

    async fn count_inquiries(&self, status: Option<InquiryStatus>) -> Result<i64, DatabaseError> {
        self.inner.count_inquiries(status).await
    }

    async fn count_open_leads(
        &self,
        partner_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, i64>, DatabaseError> {
        self.inner.count_open_leads(partner_ids).await
    }
}

#[async_trait]
impl PortfolioRepository for RacingStore {
    async fn insert_portfolio_item(
        &self,
        item: NewPortfolioItem,
    ) -> Result<PortfolioItem, DatabaseError> {
        self.inner.insert_portfolio_item(item).await
    }

    async fn find_portfolio_item(&self, id: Uuid) -> Result<Option<PortfolioItem>, DatabaseError> {
        self.inner.find_portfolio_item(id).await
    }

    async fn list_portfolio_items(
        &self,
        partner_id: Uuid,
    ) -> Result<Vec<PortfolioItem>, DatabaseError> {
        self.inner.list_portfolio_items(partner_id).await
    }

    async fn count_portfolio_items(&self, partner_id: Uuid) -> Result<i64, DatabaseError> {
        self.inner.count_portfolio_items(partner_id).await
    }

    async fn save_portfolio_item(
        &self,
        item: &PortfolioItem,
    ) -> Result<PortfolioItem, DatabaseError> {
        self.inner.save_portfolio_item(item).await
    }

    async fn delete_portfolio_item(&self, id: Uuid) -> Result<bool, DatabaseError> {
        self.inner.delete_portfolio_item(id).await
    }
}

#[async_trait]
impl ReviewRepository for RacingStore {
    async fn insert_review(&self, review: NewReview) -> Result<Review, DatabaseError> {
        self.inner.insert_review(review).await
    }

    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, DatabaseError> {
        self.inner.find_review(id).await
    }

    async fn list_reviews(&self, filter: &ReviewFilter) -> Result<Vec<Review>, DatabaseError> {
        self.inner.list_reviews(filter).await
    }

    async fn save_review(&self, review: &Review) -> Result<Review, DatabaseError> {
        self.inner.save_review(review).await
    }

    async fn delete_review(&self, id: Uuid) -> Result<bool, DatabaseError> {
        self.inner.delete_review(id).await
    }

    async fn count_reviews(&self, approved: Option<bool>) -> Result<i64, DatabaseError> {
        self.inner.count_reviews(approved).await
    }
}
