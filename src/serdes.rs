// SPDX-License-Identifier: Apache-2.0

//! On-disk persistence of networks.
//!
//! The format is picked from the file extension: `.json` is pretty-printed
//! JSON, anything else (conventionally `.qbnbin`) is bincode.

use std::path::Path;

use crate::network::CircuitNetwork;
use crate::qbn_error::QbnError;

fn is_json(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
}

pub fn save_network(path: &Path, network: &CircuitNetwork) -> Result<(), QbnError> {
    let bytes = if is_json(path) {
        serde_json::to_vec_pretty(network)?
    } else {
        bincode::serialize(network)?
    };
    std::fs::write(path, bytes)?;
    log::debug!("save_network: wrote {}", path.display());
    Ok(())
}

pub fn load_network(path: &Path) -> Result<CircuitNetwork, QbnError> {
    let bytes = std::fs::read(path)?;
    let network = if is_json(path) {
        serde_json::from_slice(&bytes)?
    } else {
        bincode::deserialize(&bytes)?
    };
    log::debug!("load_network: read {}", path.display());
    Ok(network)
}
