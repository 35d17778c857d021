//! The weighted sampling engine.
//!
//! - alias : Walker alias tables, O(n) construction, O(1) draws.
//! - tables : the edge weight distribution and the degree^0.75 noise distribution on nodes, with their alias tables.
//! - batch : the stateful generator alternating one positive and negative_ratio negative batches.

pub mod alias;

pub mod tables;

pub mod batch;
