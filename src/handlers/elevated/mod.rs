// handlers/elevated/mod.rs - Elevated handlers (admin role required)
//
// Security Level: JWT Authentication + admin role
// Route Prefix: /api/admin/*
// Middleware: rate limit + JWT validation + require_admin

pub mod admin; // Dashboard, partner verification, review moderation

pub use admin::*;
