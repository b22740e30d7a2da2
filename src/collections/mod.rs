//! Lookup structures behind header fields, routes and the file catalogue.

pub mod assoc;
pub mod chained;

pub use assoc::{AssocList, SetOutcome};
pub use chained::{ChainedTable, Keyed, bucket_index, fnv1a};
