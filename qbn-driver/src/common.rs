// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use anyhow::anyhow;
use qbn::{CircuitNetwork, Dataset};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

pub const SAMPLE_PREFIX: &str = "sample://";

/// A dataset named on the command line. Generated samples come with a
/// held-out test half.
pub struct LoadedDataset {
    pub training: Dataset,
    pub test: Option<Dataset>,
}

impl LoadedDataset {
    /// Training and test samples together.
    pub fn into_combined(self) -> anyhow::Result<Dataset> {
        let mut all = self.training;
        if let Some(test) = self.test {
            for (input, label) in test.iter() {
                all.insert(input.clone(), label)?;
            }
        }
        Ok(all)
    }
}

fn load_sample(name: &str, seed: u64) -> anyhow::Result<LoadedDataset> {
    let (generator, arg) = name
        .split_once(':')
        .ok_or_else(|| anyhow!("sample dataset {:?} needs a width, e.g. left_vs_right:6", name))?;
    match generator {
        "left_vs_right" => {
            let width: usize = arg
                .parse()
                .map_err(|e| anyhow!("invalid sample width {:?}: {}", arg, e))?;
            let mut rng = Pcg64Mcg::seed_from_u64(seed);
            let (training, test) = qbn::left_vs_right(width, &mut rng)?;
            Ok(LoadedDataset {
                training,
                test: Some(test),
            })
        }
        _ => Err(anyhow!("unknown sample dataset {:?}", generator)),
    }
}

/// Loads `sample://<generator>:<arg>`, a `.json` file or a text file.
pub fn load_dataset(arg: &str, seed: u64) -> anyhow::Result<LoadedDataset> {
    if let Some(name) = arg.strip_prefix(SAMPLE_PREFIX) {
        return load_sample(name, seed);
    }
    let path = Path::new(arg);
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read dataset {}: {}", path.display(), e))?;
    let is_json = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    let training = if is_json {
        Dataset::from_json(&text)?
    } else {
        Dataset::from_text(&text)?
    };
    log::info!(
        "loaded {} samples with labels {:?} from {}",
        training.len(),
        training.labels(),
        path.display()
    );
    Ok(LoadedDataset {
        training,
        test: None,
    })
}

pub fn load_network(path: &str) -> anyhow::Result<CircuitNetwork> {
    qbn::load_network(Path::new(path))
        .map_err(|e| anyhow!("failed to load network {}: {}", path, e))
}
