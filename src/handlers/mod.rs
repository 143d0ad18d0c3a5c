// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer session required)
pub mod public;    // /api/register, /api/login
pub mod protected; // /api/auth/whoami, /api/notes/*, /api/bookmarks/*
