//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs: directory and
//!   catalog management, lifecycle synchronization, aggregation, check-in.
//! - Keep presentation layers decoupled from storage details.

pub mod checkin_service;
pub mod client_service;
pub mod lifecycle_service;
pub mod membership_service;
pub mod stats_service;
