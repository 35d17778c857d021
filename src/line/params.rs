//! defines parameters for LINE embedding and for the batch generator feeding it.
//!
//! The generator uses batch_size, negative_ratio, max_retries, power and seed.
//! The trainer adds dimension, nb_epochs and learning_rate.

use serde::{Deserialize, Serialize};

use crate::error::SamplingError;
use crate::sampling::tables::NOISE_POWER;


/// Which proximity is learned.
/// It does not change sampling, it only gives the number of label streams the consumer expects per batch
/// and which embedding tables are trained.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderMode {
    /// first order proximity, one embedding table shared by both ends of an edge
    First,
    /// second order proximity, a vertex table and a context table
    Second,
    /// both proximities, embeddings are concatenated
    Both,
}

impl OrderMode {
    /// number of label streams a batch feeds
    pub fn nb_label_streams(&self) -> usize {
        match self {
            OrderMode::First | OrderMode::Second => 1,
            OrderMode::Both => 2,
        }
    }
} // end of impl OrderMode



#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineParams {
    /// maximal number of samples in a batch
    pub batch_size : usize,
    /// number of negative batches following each positive batch
    pub negative_ratio : usize,
    /// proximity order
    pub order : OrderMode,
    /// exponent applied to node weights in noise distribution
    pub power : f64,
    /// maximal number of draws to find one negative target. None means no limit.
    pub max_retries : Option<usize>,
    /// seed of the random generator. The same seed gives the same batch sequence.
    pub seed : u64,
    /// dimension of embedding
    pub dimension : usize,
    /// number of sweeps over all edges
    pub nb_epochs : usize,
    /// sgd step
    pub learning_rate : f64,
} // end of LineParams


impl Default for LineParams {
    fn default() -> Self {
        LineParams{batch_size : 1024, negative_ratio : 5, order : OrderMode::Second, power : NOISE_POWER,
                max_retries : Some(LineParams::DEFAULT_MAX_RETRIES), seed : 4664397, dimension : 128, nb_epochs : 50,
                learning_rate : 0.025}
    }
}


impl LineParams {
    pub const DEFAULT_MAX_RETRIES : usize = 1000;

    /// sampling parameters, trainer parameters get their default values.
    pub fn new(batch_size : usize, negative_ratio : usize, order : OrderMode, seed : u64) -> Self {
        LineParams{batch_size, negative_ratio, order, seed, .. Default::default()}
    }

    /// checks values, to be called before any use.
    pub fn check(&self) -> Result<(), SamplingError> {
        if self.batch_size == 0 {
            return Err(SamplingError::InvalidConfig(String::from("batch size must be > 0")));
        }
        if self.dimension == 0 {
            return Err(SamplingError::InvalidConfig(String::from("dimension must be > 0")));
        }
        if !self.power.is_finite() || self.power <= 0. {
            return Err(SamplingError::InvalidConfig(format!("noise power must be > 0, got {:.3e}", self.power)));
        }
        if self.max_retries == Some(0) {
            return Err(SamplingError::InvalidConfig(String::from("max_retries must be > 0 if given")));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0. {
            return Err(SamplingError::InvalidConfig(format!("learning rate must be > 0, got {:.3e}", self.learning_rate)));
        }
        Ok(())
    } // end of check

    //
    pub fn get_batch_size(&self) -> usize { self.batch_size }

    //
    pub fn get_negative_ratio(&self) -> usize { self.negative_ratio }

    //
    pub fn get_order(&self) -> OrderMode { self.order }

    //
    pub fn get_power(&self) -> f64 { self.power }

    //
    pub fn get_max_retries(&self) -> Option<usize> { self.max_retries }

    //
    pub fn get_seed(&self) -> u64 { self.seed }

    //
    pub fn get_dimension(&self) -> usize { self.dimension }

    //
    pub fn get_nb_epochs(&self) -> usize { self.nb_epochs }

    //
    pub fn get_learning_rate(&self) -> f64 { self.learning_rate }

    /// None gives an unbounded rejection loop.
    /// Construction of a generator still refuses sources with no possible negative sample so the loop cannot hang.
    pub fn set_max_retries(&mut self, max_retries : Option<usize>) { self.max_retries = max_retries }

    /// useful to set trainer values after construction
    pub fn set_training(&mut self, dimension : usize, nb_epochs : usize, learning_rate : f64) {
        self.dimension = dimension;
        self.nb_epochs = nb_epochs;
        self.learning_rate = learning_rate;
    }

} // end of impl LineParams



#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_check_params() {
        assert!(LineParams::default().check().is_ok());
        let params = LineParams::new(0, 5, OrderMode::First, 1);
        assert!(matches!(params.check(), Err(SamplingError::InvalidConfig(_))));
        let mut params = LineParams::new(16, 0, OrderMode::Both, 1);
        assert!(params.check().is_ok());
        params.set_max_retries(Some(0));
        assert!(params.check().is_err());
        params.set_max_retries(None);
        params.set_training(8, 2, -0.1);
        assert!(params.check().is_err());
    } // end of test_check_params

    #[test]
    fn test_label_streams() {
        assert_eq!(OrderMode::First.nb_label_streams(), 1);
        assert_eq!(OrderMode::Second.nb_label_streams(), 1);
        assert_eq!(OrderMode::Both.nb_label_streams(), 2);
    }

} // end of mod tests
