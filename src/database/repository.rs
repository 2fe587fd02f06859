use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Inquiry, NewInquiry, NewPartner, NewPortfolioItem, NewReview, NewUser, Partner, PartnerFilter,
    PartnerUpdate, PortfolioItem, Review, ReviewFilter, User, VerificationDecision,
};
use crate::types::{InquiryStatus, Role, VerificationStatus};

/// Listing order on `created_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatedOrder {
    NewestFirst,
    OldestFirst,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `DatabaseError::Conflict` when the email is taken (case-insensitive)
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, DatabaseError>;

    async fn set_user_otp(
        &self,
        id: Uuid,
        otp_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError>;

    /// Clears any pending OTP and flags the account verified
    async fn mark_user_verified(&self, id: Uuid) -> Result<(), DatabaseError>;

    async fn count_users(&self, role: Option<Role>) -> Result<i64, DatabaseError>;
}

#[async_trait]
pub trait PartnerRepository: Send + Sync {
    /// Fails with `DatabaseError::Conflict` when the user already has a profile
    async fn insert_partner(&self, partner: NewPartner) -> Result<Partner, DatabaseError>;

    async fn find_partner(&self, id: Uuid) -> Result<Option<Partner>, DatabaseError>;

    async fn find_partner_by_user(&self, user_id: Uuid) -> Result<Option<Partner>, DatabaseError>;

    async fn list_partners(
        &self,
        filter: &PartnerFilter,
        order: CreatedOrder,
    ) -> Result<Vec<Partner>, DatabaseError>;

    // Partner writes touch disjoint column sets; none rewrites the whole row.

    /// Business name, services, city and about only
    async fn update_partner_profile(
        &self,
        id: Uuid,
        update: &PartnerUpdate,
    ) -> Result<Partner, DatabaseError>;

    /// Verification status, stamp and comment only
    async fn record_verification(
        &self,
        id: Uuid,
        decision: &VerificationDecision,
    ) -> Result<Partner, DatabaseError>;

    async fn set_partner_featured(&self, id: Uuid, featured: bool)
        -> Result<Partner, DatabaseError>;

    async fn count_partners(
        &self,
        status: Option<VerificationStatus>,
    ) -> Result<i64, DatabaseError>;
}

#[async_trait]
pub trait InquiryRepository: Send + Sync {
    async fn insert_inquiry(&self, inquiry: NewInquiry) -> Result<Inquiry, DatabaseError>;

    async fn find_inquiry(&self, id: Uuid) -> Result<Option<Inquiry>, DatabaseError>;

    /// Newest first
    async fn list_inquiries_for_client(&self, client_id: Uuid)
        -> Result<Vec<Inquiry>, DatabaseError>;

    /// Inquiries whose `assigned_partners` contains the partner, newest first
    async fn list_inquiries_for_partner(
        &self,
        partner_id: Uuid,
    ) -> Result<Vec<Inquiry>, DatabaseError>;

    /// Appends `candidates` not yet assigned, in order, until the stored list
    /// holds `cap` partners. Already-assigned partners are never removed.
    /// Only writes while the inquiry is still `new`; returns `None` when the
    /// inquiry is gone or has moved on.
    async fn assign_partners(
        &self,
        id: Uuid,
        candidates: &[Uuid],
        cap: usize,
    ) -> Result<Option<Inquiry>, DatabaseError>;

    /// Compare-and-set on status. Writes only when the stored status equals
    /// `expected`; `booked_partner` is stored when given and kept otherwise.
    /// Returns `None` when the row is gone or the status no longer matches.
    async fn update_inquiry_status(
        &self,
        id: Uuid,
        expected: InquiryStatus,
        next: InquiryStatus,
        booked_partner: Option<Uuid>,
    ) -> Result<Option<Inquiry>, DatabaseError>;

    async fn delete_inquiry(&self, id: Uuid) -> Result<bool, DatabaseError>;

    async fn count_inquiries(&self, status: Option<InquiryStatus>) -> Result<i64, DatabaseError>;

    /// Number of `new`/`responded` inquiries assigned to each partner.
    /// Partners without open leads are absent from the map.
    async fn count_open_leads(
        &self,
        partner_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, i64>, DatabaseError>;
}

#[async_trait]
pub trait PortfolioRepository: Send + Sync {
    async fn insert_portfolio_item(
        &self,
        item: NewPortfolioItem,
    ) -> Result<PortfolioItem, DatabaseError>;

    async fn find_portfolio_item(&self, id: Uuid) -> Result<Option<PortfolioItem>, DatabaseError>;

    /// Ordered by display order, then creation time
    async fn list_portfolio_items(
        &self,
        partner_id: Uuid,
    ) -> Result<Vec<PortfolioItem>, DatabaseError>;

    async fn count_portfolio_items(&self, partner_id: Uuid) -> Result<i64, DatabaseError>;

    async fn save_portfolio_item(&self, item: &PortfolioItem)
        -> Result<PortfolioItem, DatabaseError>;

    async fn delete_portfolio_item(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Fails with `DatabaseError::Conflict` on a second review of the same partner
    async fn insert_review(&self, review: NewReview) -> Result<Review, DatabaseError>;

    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, DatabaseError>;

    /// Newest first
    async fn list_reviews(&self, filter: &ReviewFilter) -> Result<Vec<Review>, DatabaseError>;

    async fn save_review(&self, review: &Review) -> Result<Review, DatabaseError>;

    async fn delete_review(&self, id: Uuid) -> Result<bool, DatabaseError>;

    async fn count_reviews(&self, approved: Option<bool>) -> Result<i64, DatabaseError>;
}

/// Everything the services need from storage
pub trait Store:
    UserRepository + PartnerRepository + InquiryRepository + PortfolioRepository + ReviewRepository
{
}

impl<T> Store for T where
    T: UserRepository
        + PartnerRepository
        + InquiryRepository
        + PortfolioRepository
        + ReviewRepository
{
}
