// SPDX-License-Identifier: Apache-2.0

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bit_array::BitArray;

/// Maps network output vectors to labels.
///
/// Produced by the scorer; the table derived from the accepted training step
/// becomes the network's classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelTable {
    entries: BTreeMap<BitArray, String>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the label previously stored under `output`, if any.
    pub fn insert(&mut self, output: BitArray, label: String) -> Option<String> {
        self.entries.insert(output, label)
    }

    pub fn get(&self, output: &BitArray) -> Option<&str> {
        self.entries.get(output).map(String::as_str)
    }

    pub fn contains(&self, output: &BitArray) -> bool {
        self.entries.contains_key(output)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, BitArray, String> {
        self.entries.iter()
    }
}

impl FromIterator<(BitArray, String)> for LabelTable {
    fn from_iter<I: IntoIterator<Item = (BitArray, String)>>(iter: I) -> Self {
        LabelTable {
            entries: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for LabelTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (output, label)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} -> {}", output, label)?;
        }
        write!(f, "}}")
    }
}
