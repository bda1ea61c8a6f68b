//! Core types and trait definitions for the Roster employee store.
//!
//! Holds the employee record, field and hierarchy validation, the filter
//! predicate and the [`store::EmployeeStore`] trait, plus an in-memory
//! backend. No HTTP or database code lives here.

pub mod employee;
pub mod error;
pub mod filter;
pub mod hierarchy;
pub mod memory;
pub mod pagination;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
