// SPDX-License-Identifier: Apache-2.0

//! Stochastic hill climbing over gate assignments.
//!
//! Each iteration records the current score, stops if the goal is met, then
//! mutates a full copy of the layer stack and rescores it. The copy replaces
//! the live network only if its score is valid and strictly more accurate;
//! otherwise it is dropped, so a rejected trial never touches the live
//! network.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::gate_function::{GateFunction, RandomGateOptions};
use crate::network::{CircuitNetwork, LayerStack};
use crate::qbn_error::QbnError;
use crate::scorer::{score, ScoreResult};

#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    /// Accuracy at which training stops successfully.
    pub goal: f64,
    /// Single-gate mutations applied to each candidate.
    pub changes_per_iteration: usize,
    /// Maximum number of trajectory entries (iterations) to record.
    pub max_iterations: usize,
    pub seed: u64,
    pub gate_options: RandomGateOptions,
}

impl Default for TrainOptions {
    fn default() -> Self {
        TrainOptions {
            goal: 0.95,
            changes_per_iteration: 1,
            max_iterations: 10000,
            seed: 1,
            gate_options: RandomGateOptions::default(),
        }
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The current accuracy reached the goal.
    Converged,
    /// The iteration cap was reached first.
    Exhausted,
}

/// What a single call to `Trainer::step` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Accepted,
    /// The candidate's labels collided.
    RejectedInvalid,
    /// The candidate was valid but not strictly more accurate.
    RejectedNotBetter,
    Finished(Termination),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainStats {
    pub iterations: usize,
    pub accepted: usize,
    pub rejected_invalid: usize,
    pub rejected_not_better: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResults {
    /// Score of the live network when training stopped.
    pub score: ScoreResult,
    /// One entry per iteration, in order.
    pub trajectory: Vec<ScoreResult>,
    pub stats: TrainStats,
    pub termination: Termination,
}

impl TrainingResults {
    pub fn accuracy(&self) -> f64 {
        self.score.accuracy
    }

    /// Accuracies of the trajectory, in order.
    pub fn accuracies(&self) -> Vec<f64> {
        self.trajectory.iter().map(|s| s.accuracy).collect()
    }
}

impl fmt::Display for TrainingResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Termination:       {:?} after {} iterations ({} accepted, {} invalid, {} not better)",
            self.termination,
            self.stats.iterations,
            self.stats.accepted,
            self.stats.rejected_invalid,
            self.stats.rejected_not_better
        )?;
        write!(f, "{}", self.score)
    }
}

/// Replaces one uniformly chosen gate of `layers` with a fresh random gate.
pub fn mutate_random_gate<R: Rng + ?Sized>(
    layers: &mut LayerStack,
    rng: &mut R,
    options: &RandomGateOptions,
) -> Result<(), QbnError> {
    let layer = rng.gen_range(0..layers.layer_count());
    let index = rng.gen_range(0..layers.layer_len(layer));
    let gate = GateFunction::random(rng, options);
    let previous = layers.set_gate(layer, index, gate)?;
    log::trace!(
        "mutate: layer {} gate {}: {} -> {}",
        layer,
        index,
        previous,
        gate
    );
    Ok(())
}

/// Drives training one iteration at a time so that callers can stop between
/// iterations.
pub struct Trainer<'a> {
    network: &'a mut CircuitNetwork,
    dataset: &'a Dataset,
    options: TrainOptions,
    rng: Pcg64Mcg,
    current: ScoreResult,
    trajectory: Vec<ScoreResult>,
    stats: TrainStats,
    finished: Option<Termination>,
}

impl<'a> Trainer<'a> {
    /// Scores the starting network; fails only if the dataset is empty.
    pub fn new(
        network: &'a mut CircuitNetwork,
        dataset: &'a Dataset,
        options: TrainOptions,
    ) -> Result<Self, QbnError> {
        let current = score(network.layers(), dataset)?;
        log::debug!(
            "train: starting accuracy {:.2} (valid: {}), goal {:.2}",
            current.accuracy,
            current.valid,
            options.goal
        );
        Ok(Trainer {
            network,
            dataset,
            rng: Pcg64Mcg::seed_from_u64(options.seed),
            options,
            current,
            trajectory: Vec::new(),
            stats: TrainStats::default(),
            finished: None,
        })
    }

    pub fn current(&self) -> &ScoreResult {
        &self.current
    }

    pub fn trajectory(&self) -> &[ScoreResult] {
        &self.trajectory
    }

    pub fn stats(&self) -> &TrainStats {
        &self.stats
    }

    pub fn network(&self) -> &CircuitNetwork {
        &*self.network
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    fn finish(&mut self, termination: Termination) -> StepOutcome {
        if termination == Termination::Converged && self.current.valid {
            // Covers a starting network that already meets the goal: it is
            // trained even though no mutation was ever accepted.
            self.network
                .set_classifier(self.current.classifications.clone());
        }
        log::info!(
            "train: {:?} after {} iterations; accuracy {:.2}",
            termination,
            self.stats.iterations,
            self.current.accuracy
        );
        self.finished = Some(termination);
        StepOutcome::Finished(termination)
    }

    /// Runs one iteration. Once finished, further calls keep returning the
    /// same `Finished` outcome without doing any work.
    pub fn step(&mut self) -> Result<StepOutcome, QbnError> {
        if let Some(termination) = self.finished {
            return Ok(StepOutcome::Finished(termination));
        }
        if self.trajectory.len() >= self.options.max_iterations {
            return Ok(self.finish(Termination::Exhausted));
        }

        self.trajectory.push(self.current.clone());
        self.stats.iterations += 1;
        let iteration = self.stats.iterations;
        if self.current.accuracy >= self.options.goal {
            return Ok(self.finish(Termination::Converged));
        }

        let mut candidate = self.network.layers().clone();
        for _ in 0..self.options.changes_per_iteration {
            mutate_random_gate(&mut candidate, &mut self.rng, &self.options.gate_options)?;
        }
        let result = score(&candidate, self.dataset)?;

        if !result.valid {
            self.stats.rejected_invalid += 1;
            log::debug!("train: iter {}: rejected (labels collide)", iteration);
            return Ok(StepOutcome::RejectedInvalid);
        }
        if result.accuracy <= self.current.accuracy {
            self.stats.rejected_not_better += 1;
            log::debug!(
                "train: iter {}: rejected ({:.2} <= {:.2})",
                iteration,
                result.accuracy,
                self.current.accuracy
            );
            return Ok(StepOutcome::RejectedNotBetter);
        }

        log::info!(
            "train: iter {}: accepted; accuracy {:.2} -> {:.2}",
            iteration,
            self.current.accuracy,
            result.accuracy
        );
        self.network
            .commit(candidate, result.classifications.clone());
        self.current = result;
        self.stats.accepted += 1;
        Ok(StepOutcome::Accepted)
    }

    /// Steps until a terminal outcome.
    pub fn run(&mut self) -> Result<Termination, QbnError> {
        loop {
            if let StepOutcome::Finished(termination) = self.step()? {
                return Ok(termination);
            }
        }
    }

    /// Steps while `running` stays true. Returns `None` if stopped from
    /// outside before a terminal outcome.
    pub fn run_while(&mut self, running: &AtomicBool) -> Result<Option<Termination>, QbnError> {
        while running.load(Ordering::SeqCst) {
            if let StepOutcome::Finished(termination) = self.step()? {
                return Ok(Some(termination));
            }
        }
        log::info!(
            "train: interrupted after {} iterations; accuracy {:.2}",
            self.stats.iterations,
            self.current.accuracy
        );
        Ok(None)
    }

    /// Consumes the trainer. A trainer that was stopped early reports
    /// `Exhausted`.
    pub fn into_results(self) -> TrainingResults {
        TrainingResults {
            score: self.current,
            trajectory: self.trajectory,
            stats: self.stats,
            termination: self.finished.unwrap_or(Termination::Exhausted),
        }
    }
}

/// Trains `network` in place against `dataset`.
///
/// Reaching the iteration cap is a normal termination; only structural
/// problems (such as an empty dataset) are errors.
pub fn train(
    network: &mut CircuitNetwork,
    dataset: &Dataset,
    options: &TrainOptions,
) -> Result<TrainingResults, QbnError> {
    let mut trainer = Trainer::new(network, dataset, options.clone())?;
    trainer.run()?;
    Ok(trainer.into_results())
}
