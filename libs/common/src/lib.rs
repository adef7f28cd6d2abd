//! Common library for the finance administration back end
//!
//! This crate holds the pieces shared by every service: PostgreSQL pool
//! configuration and lifecycle, schema migrations and the database error
//! type.

pub mod database;
pub mod error;
