//! Transformation module.
//!
//! - Enrich: derive TOTAL PRICE, drop address columns
//! - Partition: group by ORDER ID into finalized order sheets
//! - Pipeline: parse, load, enrich, partition and emit in one call

pub mod enrich;
pub mod partition;
pub mod pipeline;

pub use enrich::enrich;
pub use partition::{partition, sanitize_customer_name};
