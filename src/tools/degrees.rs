//! compute weighted degrees in and out from a csmat


use sprs::CsMatI;


/// sum of weights of edges entering (in) and leaving (out) a node.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct WeightedDegree {
    pub w_in : f64,
    pub w_out : f64,
}

impl WeightedDegree {
    fn new(w_in : f64, w_out : f64) -> Self { WeightedDegree{w_in, w_out} }
    /// get weight entering node
    pub fn degree_in(&self) -> f64 { self.w_in }
    /// get weight leaving node
    pub fn degree_out(&self) -> f64 { self.w_out }
} // end of impl WeightedDegree



/// returns for each row the weighted degrees (in, out).
/// Contrary to unweighted degrees used in link validation, self loops are counted:
/// a self loop is an edge carrying weight like any other.
/// If the matrix stores a symetric graph (both (i,j) and (j,i) present) degree_out is the
/// weight of all edges incident to the node.
pub(crate) fn get_csmat_weighted_degrees(csmat : &CsMatI<f64, usize>) -> Vec<WeightedDegree> {
    //
    assert!(csmat.is_csr());
    //
    let (nb_row, _) = csmat.shape();
    let mut degrees = (0..nb_row).map(|_| WeightedDegree::new(0., 0.)).collect::<Vec<WeightedDegree>>();
    //
    let mut iter = csmat.iter();
    while let Some((val, (i,j))) = iter.next() {
        degrees[i].w_out += *val;  // more out for i
        degrees[j].w_in += *val;   // more in for j
    }
    degrees
}  // end of get_csmat_weighted_degrees



// end of mod tests
