// SPDX-License-Identifier: Apache-2.0

use anyhow::anyhow;
use clap::ArgMatches;
use qbn::BitArray;

use crate::common::load_network;

pub const NO_LABEL: &str = "<no label>";

pub fn handle_classify(matches: &ArgMatches) -> anyhow::Result<()> {
    let network_path = matches
        .get_one::<String>("network")
        .ok_or_else(|| anyhow!("a network file is required"))?;
    let bits = matches
        .get_one::<String>("bits")
        .ok_or_else(|| anyhow!("an input bit string is required"))?;
    let network = load_network(network_path)?;
    let input: BitArray = bits.parse()?;
    let output = network.evaluate(&input);
    log::info!("classify: {} -> {}", input, output);
    match network.classify(&input)? {
        Some(label) => println!("{}", label),
        None => println!("{}", NO_LABEL),
    }
    Ok(())
}
