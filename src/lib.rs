//! Small-business CRM backend
//!
//! Contractors, tasks, sales offers, email correspondence, support tickets
//! and notifications behind a CAPTCHA-gated login.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod store;
