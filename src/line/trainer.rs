//! LINE training loop: pulls batches from a [BatchGenerator] and applies them to a [LineModel].

use std::time::SystemTime;
use cpu_time::ProcessTime;

use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;

use crate::embedding::{Embedded, EmbedderT};
use crate::graph::WeightedGraph;
use crate::line::model::LineModel;
use crate::line::params::LineParams;
use crate::sampling::batch::BatchGenerator;
use crate::sampling::tables::SamplingTables;


pub struct Line {
    graph : WeightedGraph,
    tables : SamplingTables,
    model : LineModel,
    params : LineParams,
} // end of struct Line


impl Line {

    /// checks parameters, builds the sampling tables and initializes the model.
    pub fn new(params : LineParams, graph : WeightedGraph) -> Result<Self, anyhow::Error> {
        params.check()?;
        let tables = SamplingTables::new(&graph, params.get_power())?;
        // model initialization uses a stream disjoint from the one of the batch generator
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(params.get_seed());
        rng.jump();
        let model = LineModel::new(graph.get_nb_nodes(), params.get_dimension(), params.get_order(), &mut rng);
        log::info!("Line::new nb nodes : {}, nb edges : {}, params : {:?}", graph.get_nb_nodes(), graph.get_nb_edges(), params);
        Ok(Line{graph, tables, model, params})
    } // end of new


    ///
    pub fn get_params(&self) -> &LineParams { &self.params }

    ///
    pub fn get_graph(&self) -> &WeightedGraph { &self.graph }

    ///
    pub fn get_tables(&self) -> &SamplingTables { &self.tables }

    ///
    pub fn get_model(&self) -> &LineModel { &self.model }


    /// runs nb_epochs epochs, each made of pulls_per_epoch pulls. Returns the mean batch loss of each epoch.
    pub fn train(&mut self) -> Result<Vec<f64>, anyhow::Error> {
        //
        let sys_start = SystemTime::now();
        let cpu_start = ProcessTime::now();
        //
        let mut generator = BatchGenerator::new(&self.graph, &self.tables, &self.params)?;
        let nb_pulls = generator.pulls_per_epoch();
        let learning_rate = self.params.get_learning_rate();
        let mut losses = Vec::<f64>::with_capacity(self.params.get_nb_epochs());
        for epoch in 0..self.params.get_nb_epochs() {
            let mut epoch_loss = 0.;
            for _ in 0..nb_pulls {
                let batch = generator.pull()?;
                epoch_loss += self.model.train_batch(&batch, learning_rate);
            }
            epoch_loss /= nb_pulls as f64;
            log::debug!("epoch {} mean loss : {:.5e}", epoch, epoch_loss);
            losses.push(epoch_loss);
        }
        //
        log::info!("Line::train {} epochs, sys time(s) {:.2e} cpu time(s) {:.2e}", self.params.get_nb_epochs(),
                sys_start.elapsed().map(|d| d.as_secs_f64()).unwrap_or(0.), cpu_start.elapsed().as_secs_f64());
        if let Some(last) = losses.last() {
            log::info!("Line::train last epoch mean loss : {:.5e}", last);
        }
        Ok(losses)
    } // end of train


    /// embedded vectors of current model
    pub fn get_embedded(&self) -> Embedded<f64> {
        self.model.get_embedded()
    }

} // end of impl Line



impl EmbedderT<f64> for Line {
    type Output = Embedded<f64>;
    /// trains then returns embedded vectors
    fn embed(&mut self) -> Result<Embedded<f64>, anyhow::Error> {
        self.train()?;
        Ok(self.get_embedded())
    }
} // end of impl EmbedderT<f64> for Line



// end of mod tests
