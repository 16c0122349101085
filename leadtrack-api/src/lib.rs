//! # LeadTrack API Server Library
//!
//! HTTP surface of LeadTrack: a CRM backend where sales executives track
//! leads through the enrollment pipeline.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
