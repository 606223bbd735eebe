// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use serde::Serialize;

use crate::network::CircuitNetwork;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct NetworkStats {
    pub layer_count: usize,
    pub gate_count: usize,
    pub gates_per_layer: Vec<usize>,
    /// Gate name to number of occurrences across all layers.
    pub gate_histogram: BTreeMap<String, usize>,
    pub trained: bool,
    pub classifier_entries: usize,
}

pub fn get_network_stats(network: &CircuitNetwork) -> NetworkStats {
    let mut gate_histogram: BTreeMap<String, usize> = BTreeMap::new();
    for gate in network.layers().gates() {
        *gate_histogram.entry(gate.name().to_string()).or_insert(0) += 1;
    }
    NetworkStats {
        layer_count: network.layer_count(),
        gate_count: network.layers().gates().len(),
        gates_per_layer: network.gates_per_layer(),
        gate_histogram,
        trained: network.is_trained(),
        classifier_entries: network.classifier().map_or(0, |table| table.len()),
    }
}
