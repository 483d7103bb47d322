//! Category hierarchy service: bounded-depth trees, cascading activation and a
//! read-through cache kept consistent with the store.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub(crate) mod util;
