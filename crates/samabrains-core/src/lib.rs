//! Core library for the `SamaBrains` contact relay.
//!
//! Contains the contact submission model and validator, the HTML sanitizer,
//! the origin guard, the rate limiter, and the email relay with its Brevo
//! transport. This crate depends on `samabrains-store` for the counter store
//! trait and knows nothing about HTTP routing.

pub mod brevo;
pub mod email;
pub mod error;
pub mod origin;
pub mod rate_limit;
pub mod relay;
pub mod sanitize;
pub mod submission;
