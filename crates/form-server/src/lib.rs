//! formsync HTTP service.
//!
//! Exposes config, state, the Airtable client, and the router builder so the
//! binary and the integration tests share one middleware stack.

pub mod airtable;
pub mod config;
pub mod error;
pub mod models;
pub mod oauth;
pub mod router;
pub mod routes;
pub mod state;
pub mod store;
