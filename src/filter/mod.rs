//! Filtering module - the metadata criteria filter, the path filter, and
//! the condition expression language they share.
//!
//! Both filters are built once from run-level options and are read-only
//! afterwards, so they can be shared freely across concurrent candidate
//! evaluations.

pub mod conditions;
pub mod error;
pub mod path;
pub mod tags;

pub use conditions::{Condition, ConditionError};
pub use error::FilterError;
pub use path::{PathFilter, PathFilterConfig};
pub use tags::{CriteriaConfig, CriteriaConfigBuilder, TagFilter};
