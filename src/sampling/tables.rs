//! The two distributions LINE samples from and their alias tables.
//!
//! - the edge distribution, used to draw positive samples: an edge is drawn proportionally to its weight.
//! - the noise distribution on nodes, used to draw negative targets: a node is drawn proportionally
//!   to a power (0.75 by default) of the weight it carries.

use std::time::SystemTime;
use cpu_time::ProcessTime;

use rand::Rng;

use crate::error::SamplingError;
use crate::graph::WeightedGraph;
use crate::sampling::alias::{AliasTable, Distribution};


/// default exponent applied to node weights in the noise distribution
pub const NOISE_POWER : f64 = 0.75;


#[cfg_attr(doc, katexit::katexit)]
/// The noise distribution over nodes.
/// With $w_{v}$ the sum of weights of edges incident to $v$ (out going edges for a directed graph)
/// the probability of $v$ is :
/// $$ P(v) = \frac{w_{v}^{power}}{\sum_{u} w_{u}^{power}}$$
/// A node with no weight has probability 0 and is never drawn.
pub fn node_noise_distribution(graph : &WeightedGraph, power : f64) -> Result<Distribution, SamplingError> {
    if !power.is_finite() || power <= 0. {
        return Err(SamplingError::InvalidConfig(format!("noise power must be positive, got {:.3e}", power)));
    }
    let weights : Vec<f64> = (0..graph.get_nb_nodes()).map(|v| graph.get_node_weight(v).powf(power)).collect();
    Distribution::from_weights(&weights)
} // end of node_noise_distribution


/// The edge distribution : weight of edge divided by total weight of edges.
pub fn edge_distribution(graph : &WeightedGraph) -> Result<Distribution, SamplingError> {
    let weights : Vec<f64> = graph.get_edges().iter().map(|e| e.weight()).collect();
    Distribution::from_weights(&weights)
} // end of edge_distribution



/// Alias tables on nodes and edges, built once from a graph and read only afterwards.
pub struct SamplingTables {
    /// noise distribution on nodes
    node_table : AliasTable,
    /// distribution on edges
    edge_table : AliasTable,
    /// for each node, true if it is the source of an edge and has no possible negative target
    unreachable : Vec<bool>,
} // end of struct SamplingTables


impl SamplingTables {

    pub fn new(graph : &WeightedGraph, power : f64) -> Result<Self, SamplingError> {
        //
        let sys_start = SystemTime::now();
        let cpu_start = ProcessTime::now();
        //
        let node_distribution = node_noise_distribution(graph, power)?;
        let edge_distribution = edge_distribution(graph)?;
        let node_table = AliasTable::build(&node_distribution);
        let edge_table = AliasTable::build(&edge_distribution);
        let unreachable = unreachable_sources(graph, &node_distribution);
        //
        let nb_unreachable = unreachable.iter().filter(|u| **u).count();
        if nb_unreachable > 0 {
            log::warn!("SamplingTables : {} source nodes have no possible negative sample", nb_unreachable);
        }
        log::info!("SamplingTables built, nb nodes : {}, nb edges : {}, sys time(ms) {:?} cpu time(ms) {:?}",
                node_table.len(), edge_table.len(),
                sys_start.elapsed().map(|d| d.as_millis()).unwrap_or(0), cpu_start.elapsed().as_millis());
        //
        Ok(SamplingTables{node_table, edge_table, unreachable})
    } // end of new


    /// tables with the default noise power 0.75
    pub fn from_graph(graph : &WeightedGraph) -> Result<Self, SamplingError> {
        SamplingTables::new(graph, NOISE_POWER)
    }

    ///
    pub fn get_node_table(&self) -> &AliasTable { &self.node_table }

    ///
    pub fn get_edge_table(&self) -> &AliasTable { &self.edge_table }

    /// draws a node from the noise distribution
    pub fn sample_node<R : Rng + ?Sized>(&self, rng : &mut R) -> usize { self.node_table.sample(rng) }

    /// draws an edge index from the edge distribution
    pub fn sample_edge<R : Rng + ?Sized>(&self, rng : &mut R) -> usize { self.edge_table.sample(rng) }

    /// true if node is an edge source whose exclusion set {node} ∪ neighbours(node) covers
    /// every node the noise distribution can draw.
    pub fn is_unreachable(&self, node : usize) -> bool { self.unreachable[node] }

    /// list of sources without possible negative sample
    pub fn get_unreachable_sources(&self) -> Vec<usize> {
        self.unreachable.iter().enumerate().filter(|(_, u)| **u).map(|(v, _)| v).collect()
    }

} // end of impl SamplingTables



// A node s can get a negative sample if some node with positive noise probability is outside {s} ∪ neighbours(s).
// Only nodes appearing as edge sources are asked for negatives so only those are flagged.
fn unreachable_sources(graph : &WeightedGraph, noise : &Distribution) -> Vec<bool> {
    let positive : Vec<bool> = noise.get_probabilities().iter().map(|p| *p > 0.).collect();
    let nb_positive = positive.iter().filter(|p| **p).count();
    //
    let mut is_source = vec![false; graph.get_nb_nodes()];
    for edge in graph.get_edges() {
        is_source[edge.source()] = true;
    }
    //
    let mut unreachable = vec![false; graph.get_nb_nodes()];
    for (node, row) in graph.get_csmat().outer_iterator().enumerate() {
        if !is_source[node] {
            continue;
        }
        let nb_excluded = positive[node] as usize + row.indices().iter().filter(|v| **v != node && positive[**v]).count();
        if nb_excluded >= nb_positive {
            log::debug!("node {} has no possible negative sample, nb excluded : {}", node, nb_excluded);
            unreachable[node] = true;
        }
    }
    unreachable
} // end of unreachable_sources



// end of mod tests
