//! `SamaBrains` site server.
//!
//! Serves the static site and the contact relay API at `/api/send-email`,
//! wiring the guards and the email relay from `samabrains-core` into an Axum
//! router.

pub mod config;
pub mod error;
pub mod hardening;
pub mod middleware;
pub mod routes;
pub mod state;
