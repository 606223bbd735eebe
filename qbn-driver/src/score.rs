// SPDX-License-Identifier: Apache-2.0

use anyhow::anyhow;
use clap::ArgMatches;

use crate::common::{load_dataset, load_network};
use crate::training_config::{get_seed, TrainingConfig};

/// Scores a saved network. Generated datasets are scored on all of their
/// samples, training and test halves together.
pub fn handle_score(matches: &ArgMatches, config: &Option<TrainingConfig>) -> anyhow::Result<()> {
    let network_path = matches
        .get_one::<String>("network")
        .ok_or_else(|| anyhow!("a network file is required"))?;
    let dataset_arg = matches
        .get_one::<String>("dataset")
        .ok_or_else(|| anyhow!("a dataset is required"))?;
    let network = load_network(network_path)?;
    let dataset = load_dataset(dataset_arg, get_seed(matches, config)?)?.into_combined()?;
    let result = network.score(&dataset)?;
    println!("{}", result);
    Ok(())
}
