// SPDX-License-Identifier: Apache-2.0

//! Labelled samples.
//!
//! A `Dataset` is an insertion-ordered map from input bit vector to label.
//! The order matters: the scorer visits samples in this order, which fixes
//! the first-seen tie-break for majority votes and therefore the
//! reproducibility of training runs.

use std::collections::HashMap;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::bit_array::BitArray;
use crate::qbn_error::QbnError;

/// Widest input supported by the exhaustive generators.
pub const MAX_GENERATED_WIDTH: usize = 24;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    samples: Vec<(BitArray, String)>,
    index: HashMap<BitArray, usize>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sample, replacing the label in place if `input` is already
    /// present.
    pub fn insert(&mut self, input: BitArray, label: impl Into<String>) -> Result<(), QbnError> {
        let label = label.into();
        if label.is_empty() {
            return Err(QbnError::EmptyLabel);
        }
        if let Some(expected) = self.width() {
            if input.len() != expected {
                return Err(QbnError::WidthMismatch {
                    expected,
                    got: input.len(),
                });
            }
        }
        match self.index.get(&input) {
            Some(&i) => self.samples[i].1 = label,
            None => {
                self.index.insert(input.clone(), self.samples.len());
                self.samples.push((input, label));
            }
        }
        Ok(())
    }

    pub fn get(&self, input: &BitArray) -> Option<&str> {
        self.index
            .get(input)
            .map(|&i| self.samples[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Width shared by every sample, `None` while the dataset is empty.
    pub fn width(&self) -> Option<usize> {
        self.samples.first().map(|(input, _)| input.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BitArray, &str)> + '_ {
        self.samples
            .iter()
            .map(|(input, label)| (input, label.as_str()))
    }

    /// Distinct labels in order of first appearance.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for (_, label) in self.iter() {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }

    /// Parses the line-oriented text form: `<bits> <label>` per line, with
    /// blank lines and `#` comments ignored. The label is the remainder of
    /// the line after the bits, trimmed.
    pub fn from_text(text: &str) -> Result<Self, QbnError> {
        let mut dataset = Dataset::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parse_error = |message: String| QbnError::ParseDataset {
                line: lineno + 1,
                message,
            };
            let (bits, label) = line
                .split_once(char::is_whitespace)
                .ok_or_else(|| parse_error("expected `<bits> <label>`".to_string()))?;
            let input: BitArray = bits.parse().map_err(|e: QbnError| parse_error(e.to_string()))?;
            dataset
                .insert(input, label.trim())
                .map_err(|e| parse_error(e.to_string()))?;
        }
        Ok(dataset)
    }

    pub fn from_json(text: &str) -> Result<Self, QbnError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for (input, label) in self.iter() {
            text.push_str(&format!("{} {}\n", input, label));
        }
        text
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = (&'a BitArray, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a BitArray, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.samples.len()))?;
        for (input, label) in &self.samples {
            map.serialize_entry(input, label)?;
        }
        map.end()
    }
}

struct DatasetVisitor;

impl<'de> Visitor<'de> for DatasetVisitor {
    type Value = Dataset;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map from bit strings to labels")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Dataset, A::Error> {
        let mut dataset = Dataset::new();
        while let Some((input, label)) = access.next_entry::<BitArray, String>()? {
            dataset
                .insert(input, label)
                .map_err(serde::de::Error::custom)?;
        }
        Ok(dataset)
    }
}

impl<'de> Deserialize<'de> for Dataset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DatasetVisitor)
    }
}

fn left_right_label(bits: &[bool]) -> &'static str {
    let half = bits.len() / 2;
    let any_left = bits[..half].iter().any(|b| *b);
    let any_right = bits[half..].iter().any(|b| *b);
    match (any_left, any_right) {
        (true, false) => "left",
        (false, true) => "right",
        (true, true) => "both",
        (false, false) => "neither",
    }
}

/// Generates every `width`-bit vector labelled by where its set bits are:
/// `left` (first half only), `right` (second half only), `both` or
/// `neither`. The vectors are shuffled and split into two disjoint halves,
/// returned as `(training, test)`.
pub fn left_vs_right<R: Rng + ?Sized>(
    width: usize,
    rng: &mut R,
) -> Result<(Dataset, Dataset), QbnError> {
    if width == 0 || width > MAX_GENERATED_WIDTH {
        return Err(QbnError::InvalidWidth(width));
    }
    let mut combinations: Vec<Vec<bool>> = (0..1u64 << width)
        .map(|value| (0..width).map(|i| (value >> (width - 1 - i)) & 1 == 1).collect())
        .collect();
    combinations.shuffle(rng);

    let split = combinations.len() / 2;
    let mut training = Dataset::new();
    let mut test = Dataset::new();
    for (i, sample) in combinations.iter().enumerate() {
        let target = if i < split { &mut training } else { &mut test };
        target.insert(BitArray::from_bools(sample), left_right_label(sample))?;
    }
    log::debug!(
        "left_vs_right: width {} -> {} training / {} test samples",
        width,
        training.len(),
        test.len()
    );
    Ok((training, test))
}
