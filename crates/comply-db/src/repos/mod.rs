//! Repository modules implementing tenant-scoped operations for all Comply entities.
//!
//! Each module adds methods to `ComplyService` via `impl ComplyService` blocks,
//! and exposes free `fetch_*` functions that take a connection so they can run
//! inside an open transaction.

pub mod article;
pub mod audit;
pub mod mapping;
pub mod obligation;
pub mod organization;
pub mod regulation;
pub mod system;
