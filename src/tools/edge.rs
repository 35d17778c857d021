//! just an edge


/// local edge type corresponding to node1, node2, weight of edge from node1 to node2.  
/// Nodes are given by their rank in the graph.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edge(pub usize, pub usize, pub f64);

impl Edge {
    pub fn new(source : usize, target : usize, weight : f64) -> Self {
        Edge(source, target, weight)
    }

    /// node at the beginning of the edge
    pub fn source(&self) -> usize { self.0 }

    /// node at the end of the edge
    pub fn target(&self) -> usize { self.1 }

    ///
    pub fn weight(&self) -> f64 { self.2 }
} // end of impl Edge
