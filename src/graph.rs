//! The read-only weighted graph the sampler works on.
//!
//! Nodes are identified by their rank in 0..nb_nodes. Edges are kept in the order they were given,
//! an edge index is a position in this list and is what the edge alias table samples.
//! The adjacency is stored in a row compressed matrix: row i lists the neighbours of node i.
//! For a symetric (undirected) graph each edge is stored once in the edge list but is entered
//! in both directions in the adjacency matrix.
//!
//! A graph can be built from:
//! - a list of [Edge] between node ranks,
//! - a list of edges between arbitrary node identifiers, ranks are then given by an IndexSet in order of appearance,
//! - a `TriMatI<f64, usize>` triplet matrix,
//! - a petgraph `Graph<N, f64, Ty, Ix>`.

use std::hash::Hash;

use indexmap::IndexSet;
use sprs::{TriMatI, CsMatI};

use petgraph::graph::{Graph, IndexType};
use petgraph::visit::EdgeRef;
use petgraph::EdgeType;

use crate::error::SamplingError;
use crate::tools::edge::Edge;
use crate::tools::degrees::{get_csmat_weighted_degrees, WeightedDegree};


/// association of original node identifiers to node ranks.
/// given a node id we get its rank using IndexSet::get_index_of,
/// given a rank we get original node id by using IndexSet::get_index.
pub type NodeIndexation<NodeId> = IndexSet<NodeId>;


pub struct WeightedGraph {
    nb_nodes : usize,
    /// true if graph is undirected
    symetric : bool,
    /// edges as given at construction
    edges : Vec<Edge>,
    /// adjacency, symetrized if graph is undirected. Duplicate edges are summed.
    csrmat : CsMatI<f64, usize>,
    /// weighted degrees deduced from csrmat
    degrees : Vec<WeightedDegree>,
} // end of struct WeightedGraph



impl WeightedGraph {

    /// builds a graph from edges between nodes ranks in 0..nb_nodes.
    /// Weights must be finite and non negative, there must be at least one edge.
    pub fn from_edges(nb_nodes : usize, edges : Vec<Edge>, symetric : bool) -> Result<Self, SamplingError> {
        //
        log::debug!("WeightedGraph::from_edges nb_nodes : {}, nb_edges : {}, symetric : {}", nb_nodes, edges.len(), symetric);
        //
        if edges.is_empty() {
            return Err(SamplingError::InvalidGraph(String::from("graph has no edge")));
        }
        let mut trimat = TriMatI::<f64, usize>::with_capacity((nb_nodes, nb_nodes), if symetric { 2 * edges.len() } else { edges.len() });
        for (rank, edge) in edges.iter().enumerate() {
            if edge.source() >= nb_nodes || edge.target() >= nb_nodes {
                log::error!("edge {} : {:?} has node out of range, nb_nodes : {}", rank, edge, nb_nodes);
                return Err(SamplingError::InvalidGraph(format!("edge {} has a node rank >= {}", rank, nb_nodes)));
            }
            if !edge.weight().is_finite() || edge.weight() < 0. {
                log::error!("edge {} : {:?} has invalid weight", rank, edge);
                return Err(SamplingError::InvalidGraph(format!("edge {} has weight {}", rank, edge.weight())));
            }
            trimat.add_triplet(edge.source(), edge.target(), edge.weight());
            if symetric && edge.source() != edge.target() {
                trimat.add_triplet(edge.target(), edge.source(), edge.weight());
            }
        }
        let csrmat : CsMatI<f64, usize> = trimat.to_csr();
        let degrees = get_csmat_weighted_degrees(&csrmat);
        //
        log::info!("graph loaded, nb nodes : {}, nb edges : {}, nnz adjacency : {}", nb_nodes, edges.len(), csrmat.nnz());
        //
        Ok(WeightedGraph{nb_nodes, symetric, edges, csrmat, degrees})
    } // end of from_edges


    /// builds a graph from edges given with original node identifiers.
    /// Ranks are allocated in order of first appearance and the indexation is returned with the graph.
    pub fn from_id_edges<NodeId>(id_edges : &[(NodeId, NodeId, f64)], symetric : bool) -> Result<(Self, NodeIndexation<NodeId>), SamplingError>
        where NodeId : Hash + Eq + Clone {
        //
        let mut nodeindexation = NodeIndexation::<NodeId>::with_capacity(id_edges.len());
        let mut edges = Vec::<Edge>::with_capacity(id_edges.len());
        for (node1, node2, weight) in id_edges {
            let (rank1, _) = nodeindexation.insert_full(node1.clone());
            let (rank2, _) = nodeindexation.insert_full(node2.clone());
            edges.push(Edge::new(rank1, rank2, *weight));
        }
        let graph = WeightedGraph::from_edges(nodeindexation.len(), edges, symetric)?;
        Ok((graph, nodeindexation))
    } // end of from_id_edges


    /// builds a graph from a triplet matrix of shape (nb_nodes, nb_nodes).
    /// In the symetric case the matrix is expected to store both (i,j) and (j,i), as a symetric adjacency matrix does,
    /// and only triplets with row <= col are kept as edges.
    pub fn from_trimat(trimat : &TriMatI<f64, usize>, symetric : bool) -> Result<Self, SamplingError> {
        let (nb_rows, nb_cols) = trimat.shape();
        if nb_rows != nb_cols {
            return Err(SamplingError::InvalidGraph(format!("matrix is not square : ({}, {})", nb_rows, nb_cols)));
        }
        let edges : Vec<Edge> = trimat.row_inds().iter()
                .zip(trimat.col_inds().iter())
                .zip(trimat.data().iter())
                .filter(|((row, col), _)| !symetric || row <= col)
                .map(|((row, col), w)| Edge::new(*row, *col, *w))
                .collect();
        WeightedGraph::from_edges(nb_rows, edges, symetric)
    } // end of from_trimat


    /// builds a graph from a petgraph graph with f64 edge weights.
    /// Symetry is deduced from the graph edge type, node ranks are petgraph node indexes.
    pub fn from_petgraph<N, Ty, Ix>(graph : &Graph<N, f64, Ty, Ix>) -> Result<Self, SamplingError>
        where Ty : EdgeType, Ix : IndexType {
        let edges : Vec<Edge> = graph.edge_references()
                .map(|e| Edge::new(e.source().index(), e.target().index(), *e.weight()))
                .collect();
        WeightedGraph::from_edges(graph.node_count(), edges, !graph.is_directed())
    } // end of from_petgraph


    /// number of nodes
    pub fn get_nb_nodes(&self) -> usize { self.nb_nodes }

    /// number of edges, as given at construction
    pub fn get_nb_edges(&self) -> usize { self.edges.len() }

    ///
    pub fn is_symetric(&self) -> bool { self.symetric }

    /// all edges
    pub fn get_edges(&self) -> &[Edge] { &self.edges }

    /// edge of index rank
    pub fn get_edge(&self, rank : usize) -> &Edge { &self.edges[rank] }

    /// the adjacency matrix
    pub fn get_csmat(&self) -> &CsMatI<f64, usize> { &self.csrmat }

    /// weighted degrees (in, out) of each node
    pub fn get_weighted_degrees(&self) -> &[WeightedDegree] { &self.degrees }

    /// sum of weights carried by a node: weight of incident edges for a symetric graph,
    /// weight of out going edges otherwise.
    pub fn get_node_weight(&self, node : usize) -> f64 { self.degrees[node].degree_out() }

    /// neighbours of a node (targets of out going edges, all adjacent nodes if symetric), sorted by rank.
    pub fn get_neighbours(&self, node : usize) -> Vec<usize> {
        self.csrmat.outer_view(node).map(|row| row.indices().to_vec()).unwrap_or_default()
    }

    /// returns true if there is an edge from node to other
    pub fn is_neighbour(&self, node : usize, other : usize) -> bool {
        self.csrmat.get(node, other).is_some()
    }

    /// returns true if candidate is in {node} ∪ neighbours(node), the set a negative sample for node must avoid.
    pub fn is_excluded(&self, node : usize, candidate : usize) -> bool {
        node == candidate || self.is_neighbour(node, candidate)
    }

} // end of impl WeightedGraph



// end of mod tests
