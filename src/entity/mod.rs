//! Entity module - backend wire records
//!
//! Rows as the REST backend returns them, with the department reference and
//! status accessors the filter pipeline needs.

pub mod department;
pub mod document;
pub mod schedule;
pub mod user;
pub mod work_plan;
