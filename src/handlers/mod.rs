// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (JWT + client/partner role) → Elevated (JWT + admin role)
//
// Route wiring lives in `app.rs`; each tier only declares handlers.

pub mod extract;

pub mod public; // Tier 1: signup, login, public partner profiles
pub mod protected; // Tier 2: /api/auth/*, /api/partner/*, /api/inquiry/*
pub mod elevated; // Tier 3: /api/admin/*
