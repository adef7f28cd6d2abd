//! Client service models

pub mod client;

// Re-export for convenience
pub use client::{Client, ClientProfile, NewClient, RegisterClientRequest};
