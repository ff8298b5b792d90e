//! Update builder types for entity mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some` fields
//! generate SET clauses in the dynamic UPDATE SQL. Clearable columns use
//! `Option<Option<T>>`: `Some(None)` writes NULL.

pub mod obligation;
