//! Describes the Embedded vectors.
//!
//! Embedded vectors are stored in an Array2\<F\>, each row corresponds to a node identified by its rank.
//! For LINE, F is f64 and the row of a node is its first order, second order (vertex) or concatenated embedding
//! depending on the order mode.
//!
//! The embedded data can be paired with the node indexation of the graph to get an [Embedding]
//! answering in terms of original node identifiers.


use ndarray::{Array2, ArrayView1};
use indexmap::IndexSet;


/// to represent the distance in embedded space between 2 vectors
pub type Distance<F> = fn(&[F], &[F]) -> f64;


/// The Embedded trait. It defines the interface satisfied by embedded data.
/// Embedded nodes are identified by their rank.
/// F is the type contained in embedded vectors
pub trait EmbeddedT<F> {
    /// get dimension of vectors of the Embedded
    fn get_dimension(&self) -> usize;
    /// get number of nodes
    fn get_nb_nodes(&self) -> usize;
    /// get distance in embedded space between nodes identified by their rank
    fn get_noderank_distance(&self, node_rank1 : usize, node_rank2 : usize) -> f64;
    /// get embedding of node of rank node_rank
    fn get_embedded_node(&self, node_rank : usize) -> ArrayView1<F>;
} // end of trait EmbeddedT



/// symetric embedded data without information on the node indexation.
pub struct Embedded<F> {
    /// array (n,d) with n number of nodes, d dimension of Embedded
    data : Array2<F>,
    /// distance between vectors in embedded space.
    distance : Distance<F>,
} // end of Embedded


impl<F> Embedded<F> {
    pub fn new(data : Array2<F>, distance : Distance<F>) -> Self {
        Embedded{data, distance}
    }

    /// get the array of embedded vectors
    pub fn get_embedded(&self) -> &Array2<F> {
        &self.data
    }

    /// get distance function
    pub fn get_distance(&self) -> Distance<F> {
        self.distance
    }
} // end of impl Embedded



impl<F : Clone> EmbeddedT<F> for Embedded<F> {

    fn get_dimension(&self) -> usize {
        self.data.dim().1
    }

    fn get_nb_nodes(&self) -> usize {
        self.data.dim().0
    }

    fn get_noderank_distance(&self, node1 : usize, node2 : usize) -> f64 {
        let v1 = self.data.row(node1).to_vec();
        let v2 = self.data.row(node2).to_vec();
        (self.distance)(&v1, &v2)
    }

    fn get_embedded_node(&self, node_rank : usize) -> ArrayView1<F> {
        self.data.row(node_rank)
    }
} // end of impl EmbeddedT for Embedded



/// L2 distance
pub fn l2_distance(v1 : &[f64], v2 : &[f64]) -> f64 {
    assert_eq!(v1.len(), v2.len());
    v1.iter().zip(v2.iter()).map(|(a, b)| (a - b) * (a - b)).sum::<f64>().sqrt()
}

/// 1 - cosine similarity. Null vectors are at distance 1 of everything.
pub fn cosine_distance(v1 : &[f64], v2 : &[f64]) -> f64 {
    assert_eq!(v1.len(), v2.len());
    let dot : f64 = v1.iter().zip(v2.iter()).map(|(a, b)| a * b).sum();
    let n1 = v1.iter().map(|a| a * a).sum::<f64>().sqrt();
    let n2 = v2.iter().map(|a| a * a).sum::<f64>().sqrt();
    if n1 <= 0. || n2 <= 0. {
        return 1.;
    }
    1. - dot / (n1 * n2)
} // end of cosine_distance



//====================================================================================


/// The trait EmbedderT is something whose method embed has as output something satisfying the trait EmbeddedT\<F\>.
pub trait EmbedderT<F> {
    type Output : EmbeddedT<F>;
    ///
    fn embed(&mut self) -> Result<Self::Output, anyhow::Error>;
} // end of trait EmbedderT<F>


//==============================================================================

/// The structure collecting the result of the embedding process
///
/// - nodeindexation : an IndexSet storing Node identifier and associating it to a rank in Array representing embedded nodes.
/// - embedded : the embedded data.
pub struct Embedding<F, NodeId : std::hash::Hash + std::cmp::Eq, EmbeddedData : EmbeddedT<F>> {
    nodeindexation : IndexSet<NodeId>,
    ///
    embedded : EmbeddedData,
    ///
    mark : std::marker::PhantomData<F>,
} // end of Embedding


impl<NodeId, EmbeddedData, F> Embedding<F, NodeId, EmbeddedData> where EmbeddedData : EmbeddedT<F>,
        NodeId : std::hash::Hash + std::cmp::Eq {

    /// runs embedder and pairs its result with the node indexation
    pub fn new(nodeindexation : IndexSet<NodeId>, embedder : &mut dyn EmbedderT<F, Output = EmbeddedData>) -> Result<Self, anyhow::Error> {
        let embedded = embedder.embed().map_err(|err| {
            log::error!("embedding failed : {:?}", err);
            err
        })?;
        if embedded.get_nb_nodes() != nodeindexation.len() {
            return Err(anyhow::anyhow!("indexation has {} nodes, embedded data {}", nodeindexation.len(), embedded.get_nb_nodes()));
        }
        Ok(Embedding{nodeindexation, embedded, mark : std::marker::PhantomData})
    } // end of new

    /// to retrieve the indexation
    pub fn get_node_indexation(&self) -> &IndexSet<NodeId> {
        &self.nodeindexation
    }

    /// retrieves the embedded data
    pub fn get_embedded_data(&self) -> &EmbeddedData {
        &self.embedded
    }

    /// get distance between nodes, given their original node id. None if a node is unknown.
    pub fn get_node_distance(&self, node1 : NodeId, node2 : NodeId) -> Option<f64> {
        let rank1 = self.nodeindexation.get_index_of(&node1)?;
        let rank2 = self.nodeindexation.get_index_of(&node2)?;
        Some(self.embedded.get_noderank_distance(rank1, rank2))
    }

    /// get rank of a node_id.
    pub fn get_node_rank(&self, node_id : NodeId) -> Option<usize> {
        self.nodeindexation.get_index_of(&node_id)
    }

    /// get node_id given its rank in indexation (and matrix representation)
    pub fn get_node_id(&self, rank : usize) -> Option<&NodeId> {
        self.nodeindexation.get_index(rank)
    }

} // end of impl Embedding



#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_distances() {
        let data = ndarray::arr2(&[[1., 0.], [0., 1.], [2., 0.]]);
        let embedded = Embedded::new(data, cosine_distance);
        assert_eq!(embedded.get_nb_nodes(), 3);
        assert_eq!(embedded.get_dimension(), 2);
        assert!(embedded.get_noderank_distance(0, 2).abs() < 1.0e-12);
        assert!((embedded.get_noderank_distance(0, 1) - 1.).abs() < 1.0e-12);
        assert!((l2_distance(&[0., 3.], &[4., 0.]) - 5.).abs() < 1.0e-12);
        assert_eq!(cosine_distance(&[0., 0.], &[1., 0.]), 1.);
    } // end of test_distances

} // end of mod tests
