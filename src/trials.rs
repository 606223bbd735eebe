// SPDX-License-Identifier: Apache-2.0

//! Independent training trials run in parallel.
//!
//! Trial `k` is seeded with `seed ^ k`, builds its own random network and
//! trains it against its own copy of the dataset on a dedicated thread. The
//! training seed is the next draw after the network is built. The
//! winner is picked after all trials join, so the outcome depends only on
//! the seed and the trial count.

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::dataset::Dataset;
use crate::network::CircuitNetwork;
use crate::qbn_error::QbnError;
use crate::trainer::{TrainOptions, Trainer, TrainingResults};

#[derive(Debug, Clone, PartialEq)]
pub struct TrialOptions {
    pub trials: usize,
    pub train: TrainOptions,
}

impl Default for TrialOptions {
    fn default() -> Self {
        TrialOptions {
            trials: 1,
            train: TrainOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    pub trial: usize,
    pub network: CircuitNetwork,
    pub results: TrainingResults,
}

/// True if `a` beats `b`: valid beats invalid, then higher accuracy, then
/// the shorter trajectory, then the lower trial index.
fn is_better(a: &TrialOutcome, b: &TrialOutcome) -> bool {
    if a.results.score.valid != b.results.score.valid {
        return a.results.score.valid;
    }
    match a
        .results
        .accuracy()
        .partial_cmp(&b.results.accuracy())
        .unwrap_or(CmpOrdering::Equal)
    {
        CmpOrdering::Greater => return true,
        CmpOrdering::Less => return false,
        CmpOrdering::Equal => {}
    }
    if a.results.trajectory.len() != b.results.trajectory.len() {
        return a.results.trajectory.len() < b.results.trajectory.len();
    }
    a.trial < b.trial
}

fn run_trial(
    trial: usize,
    layer_sizes: &[usize],
    dataset: &Dataset,
    mut options: TrainOptions,
    running: &AtomicBool,
) -> Result<TrialOutcome, QbnError> {
    let seed = options.seed ^ trial as u64;
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let mut network = CircuitNetwork::random(layer_sizes, &mut rng, &options.gate_options)?;
    // Mutations continue from the construction stream instead of replaying it.
    options.seed = rng.gen();
    log::debug!(
        "trial {}: seed {:#x}, training seed {:#x}; start\n{}",
        trial,
        seed,
        options.seed,
        network
    );
    let mut trainer = Trainer::new(&mut network, dataset, options)?;
    trainer.run_while(running)?;
    let results = trainer.into_results();
    log::info!(
        "trial {}: {:?}; accuracy {:.2} (valid: {}) after {} iterations",
        trial,
        results.termination,
        results.accuracy(),
        results.score.valid,
        results.stats.iterations
    );
    Ok(TrialOutcome {
        trial,
        network,
        results,
    })
}

/// Runs `options.trials` independent trainings and returns the best one.
///
/// Clearing `running` stops every trial between iterations; each still
/// reports the best network it reached.
pub fn run_independent_trials(
    layer_sizes: &[usize],
    dataset: &Dataset,
    options: &TrialOptions,
    running: Arc<AtomicBool>,
) -> Result<TrialOutcome, QbnError> {
    if dataset.is_empty() {
        return Err(QbnError::EmptyDataset);
    }
    let trial_count = options.trials.max(1);

    let mut handles = Vec::with_capacity(trial_count);
    for trial in 0..trial_count {
        let layer_sizes = layer_sizes.to_vec();
        let dataset = dataset.clone();
        let train = options.train.clone();
        let running = running.clone();
        handles.push(thread::spawn(move || {
            run_trial(trial, &layer_sizes, &dataset, train, &running)
        }));
    }

    let mut best: Option<TrialOutcome> = None;
    for handle in handles {
        let outcome = match handle.join() {
            Ok(result) => result?,
            Err(panic) => std::panic::resume_unwind(panic),
        };
        best = match best {
            Some(current) if !is_better(&outcome, &current) => Some(current),
            _ => Some(outcome),
        };
    }
    // trial_count >= 1, so at least one outcome was joined.
    best.ok_or(QbnError::EmptyNetwork)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::left_vs_right;

    fn running() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(true))
    }

    fn sample_dataset() -> Dataset {
        let mut rng = Pcg64Mcg::seed_from_u64(11);
        left_vs_right(6, &mut rng).unwrap().0
    }

    fn options(trials: usize) -> TrialOptions {
        TrialOptions {
            trials,
            train: TrainOptions {
                goal: 1.01,
                max_iterations: 60,
                seed: 5,
                ..TrainOptions::default()
            },
        }
    }

    #[test]
    fn test_trials_are_deterministic() {
        let _ = env_logger::builder().is_test(true).try_init();
        let d = sample_dataset();
        let a = run_independent_trials(&[6, 6], &d, &options(4), running()).unwrap();
        let b = run_independent_trials(&[6, 6], &d, &options(4), running()).unwrap();
        assert_eq!(a, b);
        assert!(a.trial < 4);
    }

    #[test]
    fn test_winner_is_at_least_as_good_as_every_trial() {
        let d = sample_dataset();
        let best = run_independent_trials(&[6, 6], &d, &options(3), running()).unwrap();
        for trial in 0..3 {
            let mut single = options(1);
            single.train.seed = 5 ^ trial as u64;
            let mut outcome = run_independent_trials(&[6, 6], &d, &single, running()).unwrap();
            outcome.trial = trial;
            assert!(!is_better(&outcome, &best), "trial {} beats the winner", trial);
        }
    }

    #[test]
    fn test_single_trial_matches_direct_training() {
        let d = sample_dataset();
        let outcome = run_independent_trials(&[6], &d, &options(1), running()).unwrap();
        assert_eq!(outcome.trial, 0);
        let mut rng = Pcg64Mcg::seed_from_u64(5);
        let mut network =
            CircuitNetwork::random(&[6], &mut rng, &Default::default()).unwrap();
        let train_options = TrainOptions {
            seed: rng.gen(),
            ..options(1).train
        };
        let results = crate::trainer::train(&mut network, &d, &train_options).unwrap();
        assert_eq!(outcome.results, results);
        assert_eq!(outcome.network, network);
    }

    #[test]
    fn test_ranking() {
        let d = sample_dataset();
        let base = run_independent_trials(&[6], &d, &options(1), running()).unwrap();

        let mut higher = base.clone();
        higher.trial = 7;
        higher.results.score.accuracy = base.results.accuracy() + 0.1;
        assert!(is_better(&higher, &base));

        let mut shorter = base.clone();
        shorter.trial = 3;
        shorter.results.trajectory.pop();
        assert!(is_better(&shorter, &base));

        let mut later = base.clone();
        later.trial = 1;
        assert!(is_better(&base, &later));
        assert!(!is_better(&later, &base));

        let mut invalid = higher.clone();
        invalid.results.score.valid = false;
        let mut valid = base.clone();
        valid.results.score.valid = true;
        assert!(is_better(&valid, &invalid));
    }

    #[test]
    fn test_empty_dataset() {
        assert_eq!(
            run_independent_trials(&[2], &Dataset::new(), &options(2), running()),
            Err(QbnError::EmptyDataset)
        );
    }
}
