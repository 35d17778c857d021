//! The dual embedding lookup table trained on batches of the generator.
//!
//! - first order : score(i,j) = <u_i, u_j> with one table u.
//! - second order : score(i,j) = <v_i, c_j> with a vertex table v and a context table c.
//!
//! A triple (i, j, y) with y = +1 or -1 costs -log(sigmoid(y * score(i,j))) and is applied with one sgd step.

use ndarray::{s, Array1, Array2};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::embedding::{Embedded, cosine_distance};
use crate::line::params::OrderMode;
use crate::sampling::batch::SampleBatch;


/// tables are initialized uniformly in [-INIT_RANGE, INIT_RANGE]
const INIT_RANGE : f64 = 0.05;


// log(sigmoid(x)) without overflow
fn log_sigmoid(x : f64) -> f64 {
    if x >= 0. {
        -(-x).exp().ln_1p()
    }
    else {
        x - x.exp().ln_1p()
    }
}

fn sigmoid(x : f64) -> f64 {
    if x >= 0. {
        1. / (1. + (-x).exp())
    }
    else {
        let e = x.exp();
        e / (1. + e)
    }
}


pub struct LineModel {
    order : OrderMode,
    /// first order table
    first : Array2<f64>,
    /// second order vertex table
    second : Array2<f64>,
    /// second order context table
    context : Array2<f64>,
} // end of struct LineModel


impl LineModel {

    pub fn new<R : Rng + ?Sized>(nb_nodes : usize, dimension : usize, order : OrderMode, rng : &mut R) -> Self {
        let uniform = Uniform::<f64>::new_inclusive(-INIT_RANGE, INIT_RANGE);
        let first = Array2::from_shape_simple_fn((nb_nodes, dimension), || uniform.sample(&mut *rng));
        let second = Array2::from_shape_simple_fn((nb_nodes, dimension), || uniform.sample(&mut *rng));
        let context = Array2::from_shape_simple_fn((nb_nodes, dimension), || uniform.sample(&mut *rng));
        LineModel{order, first, second, context}
    } // end of new


    ///
    pub fn get_order(&self) -> OrderMode { self.order }

    /// first order score of (i, j)
    pub fn first_order_score(&self, i : usize, j : usize) -> f64 {
        self.first.row(i).dot(&self.first.row(j))
    }

    /// second order score of (i, j)
    pub fn second_order_score(&self, i : usize, j : usize) -> f64 {
        self.second.row(i).dot(&self.context.row(j))
    }


    /// one sgd step per triple of batch. Returns the mean loss of the batch, summed over the learned orders.
    pub fn train_batch(&mut self, batch : &SampleBatch, learning_rate : f64) -> f64 {
        if batch.is_empty() {
            return 0.;
        }
        let mut loss = 0.;
        for (i, j, label) in batch.iter() {
            let y = label as f64;
            if self.order != OrderMode::Second {
                loss += LineModel::sgd_step(&mut self.first, None, i, j, y, learning_rate);
            }
            if self.order != OrderMode::First {
                loss += LineModel::sgd_step(&mut self.second, Some(&mut self.context), i, j, y, learning_rate);
            }
        }
        loss / batch.len() as f64
    } // end of train_batch


    // gradient step on -log(sigmoid(y * <a_i, b_j>)), b is a when context is None.
    fn sgd_step(vertex : &mut Array2<f64>, context : Option<&mut Array2<f64>>, i : usize, j : usize, y : f64, learning_rate : f64) -> f64 {
        let a_i : Array1<f64> = vertex.row(i).to_owned();
        let b_j : Array1<f64> = match &context {
            Some(c) => c.row(j).to_owned(),
            None => vertex.row(j).to_owned(),
        };
        let score = a_i.dot(&b_j);
        let g = learning_rate * y * (1. - sigmoid(y * score));
        vertex.row_mut(i).scaled_add(g, &b_j);
        match context {
            Some(c) => c.row_mut(j).scaled_add(g, &a_i),
            None => vertex.row_mut(j).scaled_add(g, &a_i),
        }
        -log_sigmoid(y * score)
    } // end of sgd_step


    /// embedded vectors : first order table, second order vertex table, or both concatenated.
    pub fn get_embedded(&self) -> Embedded<f64> {
        let data = match self.order {
            OrderMode::First => self.first.clone(),
            OrderMode::Second => self.second.clone(),
            OrderMode::Both => {
                let mut data = Array2::<f64>::zeros((self.first.nrows(), self.first.ncols() + self.second.ncols()));
                data.slice_mut(s![.., ..self.first.ncols()]).assign(&self.first);
                data.slice_mut(s![.., self.first.ncols()..]).assign(&self.second);
                data
            },
        };
        Embedded::new(data, cosine_distance)
    } // end of get_embedded

} // end of impl LineModel



#[cfg(test)]
mod tests {

    use super::*;

    use rand_xoshiro::Xoshiro256PlusPlus;
    use rand_xoshiro::rand_core::SeedableRng;

    use crate::embedding::EmbeddedT;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_log_sigmoid() {
        assert!((log_sigmoid(0.) + 2f64.ln()).abs() < 1.0e-12);
        assert!(log_sigmoid(800.).abs() < 1.0e-12);
        assert!((log_sigmoid(-800.) + 800.).abs() < 1.0e-9);
        assert!((sigmoid(2.) + sigmoid(-2.) - 1.).abs() < 1.0e-12);
    }

    #[test]
    fn test_embedded_shapes() {
        log_init_test();
        //
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(17);
        let model = LineModel::new(5, 4, OrderMode::Both, &mut rng);
        let embedded = model.get_embedded();
        assert_eq!(embedded.get_nb_nodes(), 5);
        assert_eq!(embedded.get_dimension(), 8);
        let row = embedded.get_embedded_node(2);
        for k in 0..4 {
            assert_eq!(row[k], model.first[[2, k]]);
            assert_eq!(row[4 + k], model.second[[2, k]]);
        }
        let model = LineModel::new(5, 4, OrderMode::First, &mut rng);
        assert_eq!(model.get_embedded().get_dimension(), 4);
    } // end of test_embedded_shapes

} // end of mod tests
