//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource area.
//! Handlers validate input, delegate to the repositories in `cursus_db` and
//! the pure logic in `cursus_core`, and map errors via [`crate::error::AppError`].

pub mod admin;
pub mod analytics;
pub mod auth;
pub mod courses;
pub mod payment;
