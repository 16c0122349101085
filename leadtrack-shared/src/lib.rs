//! # LeadTrack Shared Library
//!
//! Domain types, storage access and authentication used by the LeadTrack API
//! server.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and migrations
//! - `auth`: Password hashing, JWT, request identity and access control
//! - `models`: Executives, courses, leads, comments, pipeline state,
//!   lead filtering and statistics

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the LeadTrack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
