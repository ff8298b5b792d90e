//! # comply-core
//!
//! Core types, ID prefixes, and error types for Comply.
//!
//! This crate provides the foundational types shared across all Comply crates:
//! - Entity structs for the tenant tree (organizations, regulations, articles,
//!   obligations, systems, mappings) and the audit log
//! - Status and classification enums, including the obligation state machine
//! - ID prefix constants
//! - The explicit request context threaded through every mutation
//! - The before/after audit diff envelope
//! - Cross-cutting error types

pub mod audit_diff;
pub mod context;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
