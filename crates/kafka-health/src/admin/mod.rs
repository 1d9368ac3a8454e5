//! Cluster admin interface.
//!
//! This module contains the [`AdminClient`] trait consumed by the health
//! pass and a REST Proxy backed implementation.

pub mod rest;
pub mod traits;

pub use traits::{AdminClient, AdminError, BrokerConfig, BrokerId};
