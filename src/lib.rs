//! lib target
//!
//! LINE graph embedding. The core is the sampling engine in [sampling]:
//! alias tables over edges and nodes driving a batch generator of positive and negative samples.


use env_logger::Builder;

#[macro_use]
extern crate lazy_static;

lazy_static! {
    static ref LOG: u64 = init_log();
}

// install a logger facility
fn init_log() -> u64 {
    Builder::from_default_env().init();
    log::info!("logger initialized from default environment");
    1
}

/// initializes the logger once, honoring RUST_LOG. Later calls do nothing.
pub fn init_logger() {
    lazy_static::initialize(&LOG);
}

pub mod error;

pub mod tools;

pub mod graph;

pub mod sampling;

pub mod embedding;

pub mod line;

pub mod prelude;
