// SPDX-License-Identifier: Apache-2.0

//! Value-typed bit vectors.
//!
//! `BitArray` is used for network inputs, network outputs and as the key type
//! of label tables and datasets, so equality and hashing are structural: two
//! arrays are equal iff they have the same length and identical bits.

use std::fmt;
use std::str::FromStr;

use bitvec::vec::BitVec;
use serde::{Deserialize, Serialize};

use crate::qbn_error::QbnError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BitArray {
    /// Index 0 is the first position of the vector (leftmost in text form).
    bits: BitVec,
}

impl BitArray {
    pub fn from_bools(bools: &[bool]) -> Self {
        Self {
            bits: bools.iter().copied().collect(),
        }
    }

    /// Builds an array of `len` bits where bit `i` is `f(i)`.
    pub fn from_fn(len: usize, f: impl FnMut(usize) -> bool) -> Self {
        Self {
            bits: (0..len).map(f).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Returns bit `i`; panics if `i` is out of bounds.
    pub fn get(&self, i: usize) -> bool {
        self.bits[i]
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().by_vals()
    }
}

impl From<Vec<bool>> for BitArray {
    fn from(bools: Vec<bool>) -> Self {
        BitArray::from_bools(&bools)
    }
}

impl From<&[bool]> for BitArray {
    fn from(bools: &[bool]) -> Self {
        BitArray::from_bools(bools)
    }
}

impl FromStr for BitArray {
    type Err = QbnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bits = BitVec::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '0' => bits.push(false),
                '1' => bits.push(true),
                _ => return Err(QbnError::InvalidBitString(s.to_string())),
            }
        }
        Ok(BitArray { bits })
    }
}

impl TryFrom<String> for BitArray {
    type Error = QbnError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<BitArray> for String {
    fn from(value: BitArray) -> Self {
        value.to_string()
    }
}

impl fmt::Display for BitArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_text_form_is_index_zero_first() {
        let a = BitArray::from_bools(&[true, false, false, true, true]);
        assert_eq!(a.to_string(), "10011");
        assert_eq!("10011".parse::<BitArray>().unwrap(), a);
    }

    #[test]
    fn test_rejects_non_binary_characters() {
        assert_eq!(
            "10x1".parse::<BitArray>(),
            Err(QbnError::InvalidBitString("10x1".to_string()))
        );
    }

    #[test]
    fn test_structural_equality_and_hash() {
        let a: BitArray = "0110".parse().unwrap();
        let b = BitArray::from_fn(4, |i| i == 1 || i == 2);
        assert_eq!(a, b);
        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));

        // Same prefix, different length: never equal.
        let shorter: BitArray = "011".parse().unwrap();
        assert_ne!(shorter, b);
    }

    #[test]
    fn test_empty_array() {
        let empty: BitArray = "".parse().unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.to_string(), "");
    }

    #[test]
    fn test_json_uses_text_form() {
        let a: BitArray = "1001".parse().unwrap();
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "\"1001\"");
        let back: BitArray = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
        assert!(serde_json::from_str::<BitArray>("\"12\"").is_err());
    }
}
