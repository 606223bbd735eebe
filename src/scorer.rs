// SPDX-License-Identifier: Apache-2.0

//! Majority-vote accuracy scoring.
//!
//! Every sample is evaluated and the outputs are bucketed by true label. The
//! most frequent output of a bucket is that label's *signature*; ties go to
//! the output seen first (datasets are insertion ordered, so this is
//! reproducible). A label's accuracy is the share of its bucket that hits
//! the signature. Labels whose signatures coincide cannot be told apart, so
//! they all score 0.0 and the result is marked invalid.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bit_array::BitArray;
use crate::dataset::Dataset;
use crate::label_table::LabelTable;
use crate::network::LayerStack;
use crate::qbn_error::QbnError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Mean of the per-label accuracies, rounded to two decimals.
    pub accuracy: f64,
    pub class_accuracies: BTreeMap<String, f64>,
    /// Non-colliding signatures mapped to their labels.
    pub classifications: LabelTable,
    /// False iff two labels share a signature.
    pub valid: bool,
}

impl fmt::Display for ScoreResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Valid?:            {}", self.valid)?;
        writeln!(f, "Overall Accuracy:  {:.2}", self.accuracy)?;
        write!(f, "Accuracy By Class: {{")?;
        for (i, (label, accuracy)) in self.class_accuracies.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:.2}", label, accuracy)?;
        }
        writeln!(f, "}}")?;
        writeln!(f)?;
        writeln!(f, "Classifications:")?;
        write!(f, "{}", self.classifications)
    }
}

/// Rounds to two decimals, ties to even (0.125 -> 0.12, 0.375 -> 0.38).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Returns the most frequent output and its count; the earliest output wins
/// ties. `outputs` must be non-empty.
fn signature(outputs: &[BitArray]) -> (&BitArray, usize) {
    let mut counts: HashMap<&BitArray, usize> = HashMap::new();
    let mut first_seen: Vec<&BitArray> = Vec::new();
    for output in outputs {
        let count = counts.entry(output).or_insert(0);
        if *count == 0 {
            first_seen.push(output);
        }
        *count += 1;
    }
    let mut best = first_seen[0];
    let mut best_count = counts[best];
    for candidate in &first_seen[1..] {
        let count = counts[candidate];
        if count > best_count {
            best = *candidate;
            best_count = count;
        }
    }
    (best, best_count)
}

/// Scores `layers` against `dataset`. Pure: the same inputs always give the
/// same result.
pub fn score(layers: &LayerStack, dataset: &Dataset) -> Result<ScoreResult, QbnError> {
    if dataset.is_empty() {
        return Err(QbnError::EmptyDataset);
    }

    // Buckets in order of first label appearance.
    let mut buckets: Vec<(&str, Vec<BitArray>)> = Vec::new();
    let mut bucket_index: HashMap<&str, usize> = HashMap::new();
    for (input, label) in dataset.iter() {
        let output = layers.evaluate(input);
        let i = *bucket_index.entry(label).or_insert_with(|| {
            buckets.push((label, Vec::new()));
            buckets.len() - 1
        });
        buckets[i].1.push(output);
    }

    let signatures: Vec<(&str, &BitArray, usize, usize)> = buckets
        .iter()
        .map(|(label, outputs)| {
            let (sig, hits) = signature(outputs);
            (*label, sig, hits, outputs.len())
        })
        .collect();

    let mut labels_per_signature: HashMap<&BitArray, usize> = HashMap::new();
    for (_, sig, _, _) in &signatures {
        *labels_per_signature.entry(*sig).or_insert(0) += 1;
    }

    let mut valid = true;
    let mut class_accuracies = BTreeMap::new();
    let mut classifications = LabelTable::new();
    for (label, sig, hits, total) in &signatures {
        if labels_per_signature[sig] > 1 {
            log::trace!("score: label {:?} collides on signature {}", label, sig);
            valid = false;
            class_accuracies.insert(label.to_string(), 0.0);
        } else {
            class_accuracies.insert(label.to_string(), round2(*hits as f64 / *total as f64));
            classifications.insert((*sig).clone(), label.to_string());
        }
    }

    let mean = class_accuracies.values().sum::<f64>() / class_accuracies.len() as f64;
    Ok(ScoreResult {
        accuracy: round2(mean),
        class_accuracies,
        classifications,
        valid,
    })
}
