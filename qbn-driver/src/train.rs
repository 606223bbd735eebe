// SPDX-License-Identifier: Apache-2.0

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use clap::ArgMatches;

use crate::common::load_dataset;
use crate::training_config::{get_layer_sizes, get_seed, get_trial_options, TrainingConfig};

pub fn handle_train(matches: &ArgMatches, config: &Option<TrainingConfig>) -> anyhow::Result<()> {
    let dataset_arg = matches
        .get_one::<String>("dataset")
        .ok_or_else(|| anyhow!("a dataset is required"))?;
    let options = get_trial_options(matches, config)?;
    let loaded = load_dataset(dataset_arg, get_seed(matches, config)?)?;
    let width = loaded
        .training
        .width()
        .ok_or_else(|| anyhow!("dataset {} has no samples", dataset_arg))?;
    // Without an explicit topology, use one layer with a gate per input bit.
    let layer_sizes = get_layer_sizes(matches, config)?.unwrap_or_else(|| vec![width]);
    log::info!(
        "train: layers {:?}, {} trial(s), options {:?}",
        layer_sizes,
        options.trials,
        options.train
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
        eprintln!("\nCtrl+C received; stopping after the current iteration...");
    })?;

    let outcome =
        qbn::run_independent_trials(&layer_sizes, &loaded.training, &options, running.clone())?;
    if !running.load(Ordering::SeqCst) {
        println!("Interrupted; reporting the best network reached so far.");
    }

    println!("Best trial:        {}", outcome.trial);
    println!("{}", outcome.results);
    println!();
    println!("Network:");
    println!("{}", outcome.network);
    if let Some(test) = &loaded.test {
        let test_score = outcome.network.score(test)?;
        println!();
        println!("Test set:");
        println!("{}", test_score);
    }

    if let Some(output) = matches.get_one::<String>("output") {
        qbn::save_network(Path::new(output), &outcome.network)?;
        println!("Wrote network to {}", output);
    }
    if let Some(trajectory) = matches.get_one::<String>("trajectory") {
        let file = std::fs::File::create(trajectory)
            .map_err(|e| anyhow!("failed to create {}: {}", trajectory, e))?;
        serde_json::to_writer_pretty(file, &outcome.results.accuracies())?;
        println!("Wrote trajectory to {}", trajectory);
    }
    Ok(())
}
