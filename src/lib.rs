//! qresult - hierarchical results over flat relational rows
//!
//! A flat row source plus a [`catalog::FieldCatalog`] describing its
//! columns is turned into nested rows, either through tree joins
//! ([`result::TreeResult`]) or nested-set intervals
//! ([`result::NestedSetResult`]). Rows can be fetched in several
//! projections or serialized to XML ([`markup`]).

pub mod catalog;
pub mod cli;
pub mod fixture;
pub mod markup;
pub mod observability;
pub mod result;
pub mod source;
