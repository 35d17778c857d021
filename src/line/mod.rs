//! This module gathers the LINE embedding described in the paper:
//!
//! *LINE: Large-scale Information Network Embedding. WWW 2015*.  <https://arxiv.org/abs/1503.03578>
//!    J. Tang, M. Qu, M. Wang, M. Zhang, J. Yan, Q. Mei.
//!
//! It is the consumer of the batch stream produced by the sampling module:
//! a dual embedding lookup table (first order, second order vertex and context) trained by sgd.

pub mod params;

pub mod model;

pub mod trainer;
