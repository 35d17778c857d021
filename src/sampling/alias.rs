//! Walker alias method for O(1) sampling of a discrete distribution.
//!
//! The table stores for each outcome i an acceptance threshold accept\[i\] in \[0,1\] and a fallback outcome alias\[i\].
//! A draw picks i uniformly in \[0,n) and a uniform r in \[0,1), it returns i if r < accept\[i\] and alias\[i\] otherwise.
//! Construction is O(n), each draw is O(1) whatever n.

use rand::Rng;

use crate::error::SamplingError;


/// An ordered sequence of probabilities summing to 1, indexed by outcome.
#[derive(Clone, Debug)]
pub struct Distribution {
    probs : Vec<f64>,
} // end of struct Distribution


impl Distribution {
    /// admitted gap between the sum of probabilities and 1.
    pub const TOLERANCE : f64 = 1.0e-6;

    /// takes already normalized probabilities.
    pub fn new(probs : Vec<f64>) -> Result<Self, SamplingError> {
        let sum = check_weights(&probs)?;
        if (sum - 1.).abs() > Distribution::TOLERANCE {
            return Err(SamplingError::InvalidDistribution(format!("probabilities sum to {:.6e}", sum)));
        }
        Ok(Distribution{probs})
    } // end of new

    /// normalizes non negative weights.
    pub fn from_weights(weights : &[f64]) -> Result<Self, SamplingError> {
        let sum = check_weights(weights)?;
        let probs = weights.iter().map(|w| w / sum).collect();
        Ok(Distribution{probs})
    } // end of from_weights

    /// number of outcomes
    pub fn len(&self) -> usize { self.probs.len() }

    ///
    pub fn is_empty(&self) -> bool { self.probs.is_empty() }

    ///
    pub fn get_probabilities(&self) -> &[f64] { &self.probs }

    /// probability of outcome i
    pub fn get(&self, i : usize) -> f64 { self.probs[i] }

} // end of impl Distribution



// checks weights are usable and returns their sum
fn check_weights(weights : &[f64]) -> Result<f64, SamplingError> {
    if weights.is_empty() {
        return Err(SamplingError::InvalidDistribution(String::from("no weight")));
    }
    let mut sum = 0.;
    for (i, w) in weights.iter().enumerate() {
        if !w.is_finite() {
            return Err(SamplingError::InvalidDistribution(format!("weight {} is not finite : {}", i, w)));
        }
        if *w < 0. {
            return Err(SamplingError::InvalidDistribution(format!("weight {} is negative : {:.3e}", i, w)));
        }
        sum += w;
    }
    if !sum.is_finite() || sum <= 0. {
        return Err(SamplingError::InvalidDistribution(format!("weights cannot be normalized, sum : {:.3e}", sum)));
    }
    Ok(sum)
} // end of check_weights



/// O(1) sampler built once from a [Distribution], immutable afterwards.
#[derive(Clone, Debug)]
pub struct AliasTable {
    /// acceptance threshold of each outcome
    accept : Vec<f64>,
    /// outcome returned when the threshold rejects
    alias : Vec<usize>,
} // end of struct AliasTable


impl AliasTable {

    /// builds the table in O(n).
    pub fn build(distribution : &Distribution) -> Self {
        let n = distribution.len();
        let mut accept = vec![0.; n];
        // an outcome with accept = 1 never uses its alias, we let it point to itself
        let mut alias : Vec<usize> = (0..n).collect();
        let mut scaled : Vec<f64> = distribution.get_probabilities().iter().map(|p| p * n as f64).collect();
        //
        let mut small = Vec::<usize>::with_capacity(n);
        let mut large = Vec::<usize>::with_capacity(n);
        for (i, p) in scaled.iter().enumerate() {
            if *p < 1. {
                small.push(i);
            }
            else {
                large.push(i);
            }
        }
        // each small outcome is completed to 1 by a large one which gives up the missing part
        while let (Some(s), Some(l)) = (small.last().copied(), large.last().copied()) {
            small.pop();
            large.pop();
            accept[s] = scaled[s];
            alias[s] = l;
            scaled[l] -= 1. - scaled[s];
            if scaled[l] < 1. {
                small.push(l);
            }
            else {
                large.push(l);
            }
        }
        // what remains is 1 up to rounding errors, remaining small ones included
        for i in large.into_iter().chain(small.into_iter()) {
            accept[i] = 1.;
        }
        //
        log::trace!("AliasTable::build done, nb outcomes : {}", n);
        AliasTable{accept, alias}
    } // end of build


    /// checks and normalizes weights then builds the table
    pub fn from_weights(weights : &[f64]) -> Result<Self, SamplingError> {
        let distribution = Distribution::from_weights(weights)?;
        Ok(AliasTable::build(&distribution))
    }


    /// draws an outcome in O(1)
    pub fn sample<R : Rng + ?Sized>(&self, rng : &mut R) -> usize {
        let i = rng.gen_range(0..self.accept.len());
        let r : f64 = rng.gen();
        if r < self.accept[i] {
            i
        }
        else {
            self.alias[i]
        }
    } // end of sample


    /// acceptance threshold of outcome i
    pub fn accept(&self, i : usize) -> f64 { self.accept[i] }

    /// fallback outcome of i
    pub fn alias(&self, i : usize) -> usize { self.alias[i] }

    /// number of outcomes
    pub fn len(&self) -> usize { self.accept.len() }

    ///
    pub fn is_empty(&self) -> bool { self.accept.is_empty() }

    /// the distribution encoded by the table: outcome i gets accept\[i\]/n from its own column and
    /// (1 - accept\[j\])/n from each column j aliasing to it.
    pub fn probabilities(&self) -> Vec<f64> {
        let n = self.accept.len() as f64;
        let mut probs = vec![0.; self.accept.len()];
        for (i, a) in self.accept.iter().enumerate() {
            probs[i] += a / n;
            probs[self.alias[i]] += (1. - a) / n;
        }
        probs
    } // end of probabilities

} // end of impl AliasTable



// end of mod tests
