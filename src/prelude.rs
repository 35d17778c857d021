//! To ease access to most frequently items
//!

pub use crate::error::SamplingError;

pub use crate::graph::{WeightedGraph, NodeIndexation};
pub use crate::tools::edge::Edge;

pub use crate::sampling::alias::{AliasTable, Distribution};
pub use crate::sampling::tables::*;
pub use crate::sampling::batch::*;

pub use crate::embedding::*;

pub use crate::line::params::*;
pub use crate::line::model::LineModel;
pub use crate::line::trainer::Line;

pub use crate::init_logger;
