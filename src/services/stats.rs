use std::sync::Arc;

use serde::Serialize;

use crate::database::{DatabaseError, Store};
use crate::types::{InquiryStatus, Role, VerificationStatus};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_clients: i64,
    pub total_partners: i64,
    pub pending_verifications: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryStats {
    pub total: i64,
    pub new: i64,
    pub responded: i64,
    pub booked: i64,
    pub closed: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub pending_reviews: i64,
}

/// Admin dashboard counters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub user_stats: UserStats,
    pub inquiry_stats: InquiryStats,
    pub review_stats: ReviewStats,
}

pub struct StatsService {
    store: Arc<dyn Store>,
}

impl StatsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Counts run concurrently; any failure fails the whole snapshot
    pub async fn dashboard(&self) -> Result<DashboardStats, DatabaseError> {
        let store = self.store.as_ref();
        let (
            total_clients,
            total_partners,
            pending_verifications,
            total,
            new,
            responded,
            booked,
            closed,
            pending_reviews,
        ) = futures::try_join!(
            store.count_users(Some(Role::Client)),
            store.count_partners(None),
            store.count_partners(Some(VerificationStatus::Pending)),
            store.count_inquiries(None),
            store.count_inquiries(Some(InquiryStatus::New)),
            store.count_inquiries(Some(InquiryStatus::Responded)),
            store.count_inquiries(Some(InquiryStatus::Booked)),
            store.count_inquiries(Some(InquiryStatus::Closed)),
            store.count_reviews(Some(false)),
        )?;

        Ok(DashboardStats {
            user_stats: UserStats {
                total_clients,
                total_partners,
                pending_verifications,
            },
            inquiry_stats: InquiryStats {
                total,
                new,
                responded,
                booked,
                closed,
            },
            review_stats: ReviewStats { pending_reviews },
        })
    }
}
