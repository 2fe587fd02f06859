pub mod partners;
pub mod reviews;
pub mod stats;

pub use partners::{feature_put, partners_list, verifications_list, verify_put};
pub use reviews::{review_delete, review_put, reviews_list};
pub use stats::stats_get;
