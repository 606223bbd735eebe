// SPDX-License-Identifier: Apache-2.0

use anyhow::anyhow;
use clap::ArgMatches;

use crate::common::load_network;

pub fn handle_stats(matches: &ArgMatches) -> anyhow::Result<()> {
    let network_path = matches
        .get_one::<String>("network")
        .ok_or_else(|| anyhow!("a network file is required"))?;
    let network = load_network(network_path)?;
    let stats = qbn::get_network_stats(&network);
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
