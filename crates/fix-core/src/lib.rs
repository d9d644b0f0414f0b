//! # fix-core
//!
//! Core types for Fixline, the appliance-repair ticket store.
//!
//! This crate provides the foundational types shared across all Fixline crates:
//! - Entity structs for all domain objects (tickets, assignees, notifications, etc.)
//! - Status and role enums with exhaustive string mapping
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
