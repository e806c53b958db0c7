//! Atrium - administrative content-management backend
//!
//! This library provides the core functionality for the Atrium admin backend:
//! blog posts, media assets, business listings, documents, and inbound
//! contact messages behind a token-authenticated HTTP API.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
