//! Tests for the rewrite pipeline
//!
//! Organized by stage. No script engine is available here, so output is
//! checked structurally and re-parsed to prove it is valid.

mod helpers;
mod hoist_tests;
mod maybe_async_tests;
