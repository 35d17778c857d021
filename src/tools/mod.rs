//! small tools on edges and degrees shared by the graph and the sampling tables.

pub mod edge;

pub mod degrees;
