//! The batch generator: a pull driven iterator producing LINE training batches.
//!
//! Each pull consumes one phase of the cycle Positive, Negative(1), ..., Negative(k) with k the negative ratio.
//!
//! - A Positive pull takes the next window of batch_size edges in the shuffled edge order of the epoch.
//!   Each entry of the window is corrected once by the edge alias table: with probability 1 - accept\[e\]
//!   the entry is replaced **in the permutation itself** by alias\[e\]. The correction persists until the epoch ends.
//!   The two ends of each edge give a (source, target, +1) triple.
//! - A Negative pull reuses the sources of the last Positive pull, in the same order, and draws for each source s
//!   a target from the noise distribution, rejecting candidates in {s} ∪ neighbours(s). Labels are -1.
//!
//! When the window of a Positive pull reaches the last edge the epoch is over. When the cycle started by that pull
//! completes, a new permutation is drawn, the cursor goes back to 0 and the stored sources are cleared.

use rand::Rng;
use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;

use crate::error::SamplingError;
use crate::graph::WeightedGraph;
use crate::line::params::{LineParams, OrderMode};
use crate::sampling::tables::SamplingTables;


/// label of an observed edge
pub const POSITIVE_LABEL : i8 = 1;

/// label of a sampled non edge
pub const NEGATIVE_LABEL : i8 = -1;


/// position in the cycle of pulls
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Positive,
    /// j-th negative batch after the positive one, j in 1..=negative_ratio
    Negative(usize),
}


/// aligned sources, targets and labels.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBatch {
    sources : Vec<usize>,
    targets : Vec<usize>,
    labels : Vec<i8>,
    /// phase the batch was produced in
    phase : Phase,
    /// epoch the batch belongs to
    epoch : usize,
} // end of struct SampleBatch


impl SampleBatch {

    fn new(sources : Vec<usize>, targets : Vec<usize>, label : i8, phase : Phase, epoch : usize) -> Self {
        debug_assert_eq!(sources.len(), targets.len());
        let labels = vec![label; sources.len()];
        SampleBatch{sources, targets, labels, phase, epoch}
    }

    ///
    pub fn get_sources(&self) -> &[usize] { &self.sources }

    ///
    pub fn get_targets(&self) -> &[usize] { &self.targets }

    ///
    pub fn get_labels(&self) -> &[i8] { &self.labels }

    ///
    pub fn get_phase(&self) -> Phase { self.phase }

    ///
    pub fn get_epoch(&self) -> usize { self.epoch }

    /// number of triples
    pub fn len(&self) -> usize { self.sources.len() }

    ///
    pub fn is_empty(&self) -> bool { self.sources.is_empty() }

    /// iterates on (source, target, label)
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, i8)> + '_ {
        self.sources.iter().zip(self.targets.iter()).zip(self.labels.iter()).map(|((s, t), l)| (*s, *t, *l))
    }

    /// the label streams a consumer learning with order mode expects: one per learned proximity,
    /// all equal to the batch labels.
    pub fn label_streams(&self, order : OrderMode) -> Vec<&[i8]> {
        (0..order.nb_label_streams()).map(|_| self.labels.as_slice()).collect()
    }

} // end of impl SampleBatch



/// mutable state of the generator, reset at each epoch.
#[derive(Debug, Clone)]
pub(crate) struct IteratorState {
    /// number of completed epochs
    epoch : usize,
    /// order of edges in the current epoch, entries are corrected in place by positive pulls.
    permutation : Vec<usize>,
    /// beginning of next positive window in permutation
    cursor : usize,
    /// phase of next pull
    phase : Phase,
    /// sources of last positive pull
    sources : Vec<usize>,
    /// set when a positive window reached the end of permutation
    exhausted : bool,
} // end of struct IteratorState


impl IteratorState {

    fn new<R : Rng + ?Sized>(nb_edges : usize, rng : &mut R) -> Self {
        IteratorState{epoch : 0, permutation : shuffled_edges(nb_edges, rng), cursor : 0, phase : Phase::Positive,
                sources : Vec::new(), exhausted : false}
    }

    // goes to next epoch with a fresh permutation, corrections of the previous epoch are dropped.
    fn new_epoch<R : Rng + ?Sized>(&mut self, rng : &mut R) {
        self.epoch += 1;
        self.permutation = shuffled_edges(self.permutation.len(), rng);
        self.cursor = 0;
        self.sources.clear();
        self.exhausted = false;
        log::debug!("starting epoch {}", self.epoch);
    } // end of new_epoch

} // end of impl IteratorState


// a uniform random permutation of edge indexes
fn shuffled_edges<R : Rng + ?Sized>(nb_edges : usize, rng : &mut R) -> Vec<usize> {
    let mut permutation : Vec<usize> = (0..nb_edges).collect();
    permutation.shuffle(rng);
    permutation
}



/// Produces an unbounded stream of [SampleBatch].
/// The graph and the tables are borrowed read only, the generator owns its state and its random generator.
pub struct BatchGenerator<'a> {
    graph : &'a WeightedGraph,
    tables : &'a SamplingTables,
    batch_size : usize,
    negative_ratio : usize,
    max_retries : Option<usize>,
    state : IteratorState,
    /// the only source of randomness, seeded from params
    rng : Xoshiro256PlusPlus,
} // end of struct BatchGenerator


impl <'a> BatchGenerator<'a> {

    /// tables must have been built from graph.
    pub fn new(graph : &'a WeightedGraph, tables : &'a SamplingTables, params : &LineParams) -> Result<Self, SamplingError> {
        //
        params.check()?;
        if tables.get_edge_table().len() != graph.get_nb_edges() || tables.get_node_table().len() != graph.get_nb_nodes() {
            log::error!("BatchGenerator::new tables sizes ({}, {}) do not match graph ({}, {})", tables.get_node_table().len(),
                    tables.get_edge_table().len(), graph.get_nb_nodes(), graph.get_nb_edges());
            return Err(SamplingError::InvalidConfig(String::from("sampling tables were not built from this graph")));
        }
        if params.get_negative_ratio() > 0 {
            if let Some(node) = tables.get_unreachable_sources().first() {
                log::error!("BatchGenerator::new node {} cannot get a negative sample", node);
                return Err(SamplingError::UnreachableNegativeSample{node : *node});
            }
        }
        //
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(params.get_seed());
        let state = IteratorState::new(graph.get_nb_edges(), &mut rng);
        log::debug!("BatchGenerator::new batch_size : {}, negative_ratio : {}, max_retries : {:?}", params.get_batch_size(),
                params.get_negative_ratio(), params.get_max_retries());
        //
        Ok(BatchGenerator{graph, tables, batch_size : params.get_batch_size(), negative_ratio : params.get_negative_ratio(),
                max_retries : params.get_max_retries(), state, rng})
    } // end of new


    /// returns the batch of current phase and moves to next phase.
    /// An error leaves the phase unchanged.
    pub fn pull(&mut self) -> Result<SampleBatch, SamplingError> {
        let batch = match self.state.phase {
            Phase::Positive => self.positive_batch(),
            Phase::Negative(j) => self.negative_batch(j)?,
        };
        self.advance();
        Ok(batch)
    } // end of pull


    fn positive_batch(&mut self) -> SampleBatch {
        let tables = self.tables;
        let edge_table = tables.get_edge_table();
        let nb_edges = self.state.permutation.len();
        let start = self.state.cursor;
        let end = (start + self.batch_size).min(nb_edges);
        //
        let mut sources = Vec::<usize>::with_capacity(end - start);
        let mut targets = Vec::<usize>::with_capacity(end - start);
        for idx in start..end {
            let e = self.state.permutation[idx];
            let r : f64 = self.rng.gen();
            if r >= edge_table.accept(e) {
                self.state.permutation[idx] = edge_table.alias(e);
            }
            let edge = self.graph.get_edge(self.state.permutation[idx]);
            sources.push(edge.source());
            targets.push(edge.target());
        }
        log::trace!("positive batch epoch {}, window [{}, {})", self.state.epoch, start, end);
        //
        self.state.cursor = end;
        self.state.exhausted = end >= nb_edges;
        self.state.sources = sources.clone();
        SampleBatch::new(sources, targets, POSITIVE_LABEL, Phase::Positive, self.state.epoch)
    } // end of positive_batch


    fn negative_batch(&mut self, j : usize) -> Result<SampleBatch, SamplingError> {
        let graph = self.graph;
        let tables = self.tables;
        let node_table = tables.get_node_table();
        //
        let mut targets = Vec::<usize>::with_capacity(self.state.sources.len());
        for &source in self.state.sources.iter() {
            let mut nb_try = 0;
            let target = loop {
                let candidate = node_table.sample(&mut self.rng);
                nb_try += 1;
                if !graph.is_excluded(source, candidate) {
                    break candidate;
                }
                if let Some(max_retries) = self.max_retries {
                    if nb_try >= max_retries {
                        log::error!("no negative sample found for node {} after {} draws", source, nb_try);
                        return Err(SamplingError::UnreachableNegativeSample{node : source});
                    }
                }
            };
            targets.push(target);
        }
        log::trace!("negative batch {} epoch {}, size {}", j, self.state.epoch, targets.len());
        //
        Ok(SampleBatch::new(self.state.sources.clone(), targets, NEGATIVE_LABEL, Phase::Negative(j), self.state.epoch))
    } // end of negative_batch


    // next phase in cycle, a new epoch begins when the cycle of the last window is complete.
    fn advance(&mut self) {
        let next = match self.state.phase {
            Phase::Positive if self.negative_ratio == 0 => Phase::Positive,
            Phase::Positive => Phase::Negative(1),
            Phase::Negative(j) if j < self.negative_ratio => Phase::Negative(j + 1),
            Phase::Negative(_) => Phase::Positive,
        };
        if next == Phase::Positive && self.state.exhausted {
            self.state.new_epoch(&mut self.rng);
        }
        self.state.phase = next;
    } // end of advance


    /// number of completed epochs
    pub fn epoch(&self) -> usize { self.state.epoch }

    /// position of next positive window in permutation
    pub fn cursor(&self) -> usize { self.state.cursor }

    /// phase of next pull
    pub fn phase(&self) -> Phase { self.state.phase }

    /// edge order of the current epoch, with the corrections made so far
    pub fn permutation(&self) -> &[usize] { &self.state.permutation }

    /// number of pulls in an epoch : ceil(nb_edges / batch_size) * (1 + negative_ratio)
    pub fn pulls_per_epoch(&self) -> usize {
        let nb_edges = self.state.permutation.len();
        ((nb_edges + self.batch_size - 1) / self.batch_size) * (1 + self.negative_ratio)
    }

} // end of impl BatchGenerator



impl <'a> Iterator for BatchGenerator<'a> {
    type Item = Result<SampleBatch, SamplingError>;

    /// never returns None
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.pull())
    }
} // end of impl Iterator for BatchGenerator



#[cfg(test)]
mod tests {

    use super::*;

    use crate::tools::edge::Edge;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // two disjoint stars and a few chords, plenty of non neighbours for every source
    fn sparse_graph() -> WeightedGraph {
        let mut edges = Vec::<Edge>::new();
        for i in 1..10 {
            edges.push(Edge::new(0, i, i as f64));
            edges.push(Edge::new(10, 10 + i, 1.));
        }
        edges.push(Edge::new(3, 14, 2.));
        edges.push(Edge::new(5, 17, 0.5));
        edges.push(Edge::new(19, 8, 4.));
        WeightedGraph::from_edges(20, edges, true).unwrap()
    }

    #[test]
    fn test_batch_shapes_and_labels() {
        log_init_test();
        //
        let graph = sparse_graph();
        let tables = SamplingTables::from_graph(&graph).unwrap();
        let params = LineParams::new(4, 3, OrderMode::Both, 1235437);
        let mut generator = BatchGenerator::new(&graph, &tables, &params).unwrap();
        let mut last_sources = Vec::<usize>::new();
        for _ in 0..100 {
            let phase = generator.phase();
            let batch = generator.pull().unwrap();
            assert_eq!(batch.get_phase(), phase);
            assert_eq!(batch.get_sources().len(), batch.get_targets().len());
            assert_eq!(batch.get_sources().len(), batch.get_labels().len());
            assert!(batch.len() <= 4 && !batch.is_empty());
            match phase {
                Phase::Positive => {
                    assert!(batch.get_labels().iter().all(|l| *l == POSITIVE_LABEL));
                    for (s, t, _) in batch.iter() {
                        assert!(graph.is_neighbour(s, t));
                    }
                    last_sources = batch.get_sources().to_vec();
                },
                Phase::Negative(j) => {
                    assert!(j >= 1 && j <= 3);
                    assert!(batch.get_labels().iter().all(|l| *l == NEGATIVE_LABEL));
                    assert_eq!(batch.get_sources(), last_sources.as_slice());
                },
            }
            assert_eq!(batch.label_streams(OrderMode::Both).len(), 2);
        }
    } // end of test_batch_shapes_and_labels


    #[test]
    fn test_negatives_avoid_neighbours() {
        log_init_test();
        //
        let graph = sparse_graph();
        let tables = SamplingTables::from_graph(&graph).unwrap();
        let params = LineParams::new(8, 5, OrderMode::Second, 77);
        let generator = BatchGenerator::new(&graph, &tables, &params).unwrap();
        let mut nb_negatives = 0;
        for batch in generator.take(600) {
            let batch = batch.unwrap();
            for (s, t, label) in batch.iter() {
                if label == NEGATIVE_LABEL {
                    assert!(t != s);
                    assert!(!graph.get_neighbours(s).contains(&t));
                    nb_negatives += 1;
                }
            }
        }
        assert!(nb_negatives > 0);
    } // end of test_negatives_avoid_neighbours


    #[test]
    fn test_negatives_directed_exclusion() {
        log_init_test();
        // each node i points to i+1 and i+2 (mod 6), so i-1 and i-2 are in-neighbours only
        let mut edges = Vec::<Edge>::new();
        for i in 0..6 {
            edges.push(Edge::new(i, (i + 1) % 6, 1.));
            edges.push(Edge::new(i, (i + 2) % 6, 1.));
        }
        let graph = WeightedGraph::from_edges(6, edges, false).unwrap();
        let tables = SamplingTables::from_graph(&graph).unwrap();
        let params = LineParams::new(4, 3, OrderMode::Second, 9731);
        let generator = BatchGenerator::new(&graph, &tables, &params).unwrap();
        let mut nb_negatives = 0;
        let mut nb_in_neighbours = 0;
        for batch in generator.take(400) {
            let batch = batch.unwrap();
            for (s, t, label) in batch.iter() {
                if label == NEGATIVE_LABEL {
                    assert!(t != s);
                    assert!(t != (s + 1) % 6 && t != (s + 2) % 6);
                    assert!(!graph.is_neighbour(s, t));
                    if graph.is_neighbour(t, s) {
                        nb_in_neighbours += 1;
                    }
                    nb_negatives += 1;
                }
            }
        }
        log::info!("nb negatives : {}, in-neighbours among them : {}", nb_negatives, nb_in_neighbours);
        assert!(nb_negatives > 0);
        // in-neighbours are 2 of the 3 admissible targets
        assert!(nb_in_neighbours > 0);
    } // end of test_negatives_directed_exclusion


    #[test]
    fn test_epoch_boundary() {
        log_init_test();
        //
        let graph = sparse_graph();
        let nb_edges = graph.get_nb_edges();
        let batch_size = 5;
        let tables = SamplingTables::from_graph(&graph).unwrap();
        let params = LineParams::new(batch_size, 2, OrderMode::First, 5);
        let mut generator = BatchGenerator::new(&graph, &tables, &params).unwrap();
        let nb_windows = (nb_edges + batch_size - 1) / batch_size;
        assert_eq!(generator.pulls_per_epoch(), nb_windows * 3);
        //
        let first_permutation = generator.permutation().to_vec();
        let mut nb_positive = 0;
        let mut nb_seen = 0;
        while nb_positive < nb_windows {
            let batch = generator.pull().unwrap();
            assert_eq!(batch.get_epoch(), 0);
            if batch.get_phase() == Phase::Positive {
                nb_positive += 1;
                nb_seen += batch.len();
            }
        }
        assert_eq!(nb_seen, nb_edges);
        // the negative phases of the last window still belong to epoch 0
        assert_eq!(generator.epoch(), 0);
        assert_eq!(generator.pull().unwrap().get_epoch(), 0);
        assert_eq!(generator.pull().unwrap().get_epoch(), 0);
        // cycle complete, next pull is the first positive of epoch 1
        assert_eq!(generator.epoch(), 1);
        assert_eq!(generator.cursor(), 0);
        assert_eq!(generator.phase(), Phase::Positive);
        assert_ne!(generator.permutation(), first_permutation.as_slice());
        let mut sorted = generator.permutation().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..nb_edges).collect::<Vec<usize>>());
        let batch = generator.pull().unwrap();
        assert_eq!(batch.get_phase(), Phase::Positive);
        assert_eq!(batch.get_epoch(), 1);
        assert_eq!(generator.cursor(), batch_size);
    } // end of test_epoch_boundary


    #[test]
    fn test_epoch_boundary_without_negatives() {
        log_init_test();
        //
        let graph = sparse_graph();
        let tables = SamplingTables::from_graph(&graph).unwrap();
        let params = LineParams::new(graph.get_nb_edges(), 0, OrderMode::Second, 5);
        let mut generator = BatchGenerator::new(&graph, &tables, &params).unwrap();
        let batch = generator.pull().unwrap();
        assert_eq!(batch.len(), graph.get_nb_edges());
        assert_eq!(generator.epoch(), 1);
        assert_eq!(generator.cursor(), 0);
        assert_eq!(generator.pull().unwrap().get_phase(), Phase::Positive);
    } // end of test_epoch_boundary_without_negatives


    #[test]
    fn test_corrections_stay_valid() {
        log_init_test();
        //
        let graph = sparse_graph();
        let tables = SamplingTables::from_graph(&graph).unwrap();
        let params = LineParams::new(7, 0, OrderMode::Second, 99);
        let mut generator = BatchGenerator::new(&graph, &tables, &params).unwrap();
        let before = generator.permutation().to_vec();
        let batch = generator.pull().unwrap();
        let after = generator.permutation();
        for idx in 0..7 {
            // an entry is either kept or replaced by its alias
            assert!(after[idx] == before[idx] || after[idx] == tables.get_edge_table().alias(before[idx]));
            let edge = graph.get_edge(after[idx]);
            assert_eq!(batch.get_sources()[idx], edge.source());
            assert_eq!(batch.get_targets()[idx], edge.target());
        }
        // outside the window nothing moved
        assert_eq!(&after[7..], &before[7..]);
    } // end of test_corrections_stay_valid


    #[test]
    fn test_reproducible_with_seed() {
        log_init_test();
        //
        let graph = sparse_graph();
        let tables = SamplingTables::from_graph(&graph).unwrap();
        let params = LineParams::new(6, 4, OrderMode::Second, 456231);
        let run = |params : &LineParams| -> Vec<SampleBatch> {
            BatchGenerator::new(&graph, &tables, params).unwrap().take(200).map(|b| b.unwrap()).collect()
        };
        let run1 = run(&params);
        let run2 = run(&params);
        assert_eq!(run1, run2);
        let other = LineParams::new(6, 4, OrderMode::Second, 1);
        assert_ne!(run1, run(&other));
    } // end of test_reproducible_with_seed


    #[test]
    fn test_invalid_config() {
        log_init_test();
        //
        let graph = sparse_graph();
        let tables = SamplingTables::from_graph(&graph).unwrap();
        let params = LineParams::new(0, 1, OrderMode::Second, 1);
        assert!(matches!(BatchGenerator::new(&graph, &tables, &params), Err(SamplingError::InvalidConfig(_))));
        // tables of another graph
        let small = WeightedGraph::from_edges(3, vec![Edge::new(0, 1, 1.)], false).unwrap();
        let params = LineParams::new(2, 1, OrderMode::Second, 1);
        assert!(matches!(BatchGenerator::new(&small, &tables, &params), Err(SamplingError::InvalidConfig(_))));
    } // end of test_invalid_config


    #[test]
    fn test_unreachable_negative() {
        log_init_test();
        // in a triangle every node is adjacent to all others
        let edges = vec![Edge::new(0, 1, 1.), Edge::new(1, 2, 1.), Edge::new(2, 0, 1.)];
        let graph = WeightedGraph::from_edges(3, edges, true).unwrap();
        let tables = SamplingTables::from_graph(&graph).unwrap();
        let mut params = LineParams::new(2, 1, OrderMode::Second, 1);
        params.set_max_retries(None);
        let res = BatchGenerator::new(&graph, &tables, &params);
        assert!(matches!(res, Err(SamplingError::UnreachableNegativeSample{..})));
        // without negative phases the graph is usable
        let params = LineParams::new(2, 0, OrderMode::Second, 1);
        assert!(BatchGenerator::new(&graph, &tables, &params).is_ok());
    } // end of test_unreachable_negative


    #[test]
    fn test_retry_cap() {
        log_init_test();
        // nodes 0 and 1 are linked to all nodes but 3, which carries a tiny weight so it is reachable but very unlikely
        let edges = vec![Edge::new(0, 1, 1.), Edge::new(0, 2, 1.), Edge::new(1, 2, 1.), Edge::new(3, 2, 1.0e-12)];
        let graph = WeightedGraph::from_edges(4, edges, true).unwrap();
        let tables = SamplingTables::from_graph(&graph).unwrap();
        assert!(!tables.is_unreachable(0));
        let mut params = LineParams::new(4, 1, OrderMode::Second, 3);
        params.set_max_retries(Some(3));
        let mut generator = BatchGenerator::new(&graph, &tables, &params).unwrap();
        // first pull is positive and cannot fail
        let batch = generator.pull().unwrap();
        assert_eq!(batch.get_phase(), Phase::Positive);
        // sources of the full positive window include 0 or 1 whose only candidate is 3
        let res = generator.pull();
        assert!(matches!(res, Err(SamplingError::UnreachableNegativeSample{..})));
        // failed pull did not move the phase
        assert_eq!(generator.phase(), Phase::Negative(1));
    } // end of test_retry_cap

} // end of mod tests
