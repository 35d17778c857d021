//! Errors raised by the sampling engine.
//!
//! Construction errors (distribution, graph, config) are fatal and surface before any draw.
//! The only error a pull can return is [SamplingError::UnreachableNegativeSample] when a retry cap is set.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplingError {
    /// empty, negative, non finite or zero sum weights.
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    /// bad parameters given to generator or trainer.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// edge endpoints out of range, bad weights or no edge at all.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// no candidate outside {node} ∪ neighbours(node) can be drawn from the noise distribution,
    /// or the retry cap was exhausted.
    #[error("cannot draw a negative sample for node {node}")]
    UnreachableNegativeSample { node: usize },
} // end of enum SamplingError
