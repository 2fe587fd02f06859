// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Security Level: JWT Authentication Required
// Route Prefix: /api/auth/{me,verify-otp,resend-otp}, /api/partner/*, /api/inquiry/*
// Middleware: rate limit + JWT validation + role guard (partner/client groups)

pub mod auth; // Account session and OTP
pub mod inquiry; // Client inquiries and reviews
pub mod partner; // Partner profile, leads, portfolio

pub use auth::*;
pub use inquiry::*;
pub use partner::*;
