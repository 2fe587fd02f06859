// handlers/public/mod.rs - Public handlers (no authentication)
//
// Route Prefix: /api/auth/signup, /api/auth/login, /api/partners/:id
// Middleware: rate limiting only

pub mod auth;
pub mod partners;

pub use auth::{login, signup};
pub use partners::partner_profile;
