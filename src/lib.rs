//! # Tenant Admin Library
//!
//! Core of the tenant directory service: tenants, workspaces and memberships
//! over SeaORM, the authenticated read API and the development seed.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod telemetry;
pub use migration;
