//! Per-table migration pipeline steps.
//!
//! Each step is invoked once per table by the orchestrator, in this order:
//! structure, constraints, sequence creation, data copy, sequence advance.
//! Steps share no state; they communicate only through the target objects
//! the earlier steps created. All target writes go through the table's
//! transaction, so the commit boundary stays with the orchestrator.

pub mod constraints;
pub mod data;
pub mod sequences;
pub mod structure;
