// Partner-role endpoints under /api/partner

pub mod leads;
pub mod portfolio;
pub mod profile;

pub use leads::{lead_update, leads_list};
pub use portfolio::{portfolio_delete, portfolio_list, portfolio_post, portfolio_put};
pub use profile::{onboard, profile_get, profile_put};
