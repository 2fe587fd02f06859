pub mod accounts;
pub mod leads;
pub mod partners;
pub mod portfolio;
pub mod reviews;
pub mod stats;

pub use accounts::{AccountService, AuthSession, SignupInput, UserSummary};
pub use leads::{Actor, Assignment, InquiryInput, Lead, LeadError, LeadService};
pub use partners::{OnboardInput, PartnerService, PartnerWithContact, PublicPartner, PublicProfile};
pub use portfolio::{PortfolioInput, PortfolioService};
pub use reviews::{ReviewService, ReviewView};
pub use stats::{DashboardStats, StatsService};

use crate::database::DatabaseError;
use crate::validation::FieldError;

/// Errors shared by the partner, portfolio and review services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] FieldError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
