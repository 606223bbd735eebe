// SPDX-License-Identifier: Apache-2.0

//! Boolean circuit network classifiers.
//!
//! A network is a stack of layers of two-input boolean gates. Training
//! searches gate assignments by stochastic hill climbing so that each label
//! of a dataset maps to its own output vector.

pub mod bit_array;
pub mod dataset;
pub mod gate_function;
pub mod label_table;
pub mod layer;
pub mod network;
pub mod qbn_error;
pub mod scorer;
pub mod serdes;
pub mod stats;
pub mod trainer;
pub mod trials;

pub use bit_array::BitArray;
pub use dataset::{left_vs_right, Dataset};
pub use gate_function::{GateFunction, RandomGateOptions};
pub use label_table::LabelTable;
pub use layer::Layer;
pub use network::{CircuitNetwork, LayerStack};
pub use qbn_error::QbnError;
pub use scorer::{score, ScoreResult};
pub use serdes::{load_network, save_network};
pub use stats::{get_network_stats, NetworkStats};
pub use trainer::{train, StepOutcome, Termination, TrainOptions, Trainer, TrainingResults};
pub use trials::{run_independent_trials, TrialOptions, TrialOutcome};

/// Crate version, as reported by the driver.
pub fn qbn_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
