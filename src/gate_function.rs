// SPDX-License-Identifier: Apache-2.0

//! The sixteen two-input boolean functions.
//!
//! A gate is identified by a code in `[0, 15]` and the code *is* its truth
//! table: reading the code as four bits `b3 b2 b1 b0`, the output for inputs
//! `(a, b)` is bit `3 - (2a + b)`. So `(F,F)` selects `b3`, `(F,T)` selects
//! `b2`, `(T,F)` selects `b1` and `(T,T)` selects `b0`.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::qbn_error::QbnError;

pub const GATE_COUNT: u8 = 16;

const NAMES: [&str; GATE_COUNT as usize] = [
    "FALSE", "AND", "AND_NOT", "A", "NOT_AND", "B", "XOR", "OR", "NOR", "XNOR", "NOT_B", "OR_NOT",
    "NOT_A", "NOT_OR", "NAND", "TRUE",
];

/// Upper bound on rejection-sampling draws in `GateFunction::random` before
/// we pick directly from the permitted codes.
const MAX_RANDOM_DRAWS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GateFunction(u8);

/// Controls which codes `GateFunction::random` may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomGateOptions {
    /// Excludes constant FALSE (0) and TRUE (15).
    pub exclude_constants: bool,
    /// Excludes the gates that ignore one of their inputs: A (3), B (5),
    /// NOT_B (10) and NOT_A (12).
    pub exclude_unary: bool,
}

impl Default for RandomGateOptions {
    fn default() -> Self {
        RandomGateOptions {
            exclude_constants: true,
            exclude_unary: true,
        }
    }
}

impl RandomGateOptions {
    pub fn permits(&self, gate: GateFunction) -> bool {
        !((self.exclude_constants && gate.is_constant()) || (self.exclude_unary && gate.is_unary()))
    }

    /// All codes this configuration may produce, in ascending order.
    pub fn permitted(&self) -> Vec<GateFunction> {
        GateFunction::all().filter(|g| self.permits(*g)).collect()
    }
}

impl GateFunction {
    pub const FALSE: GateFunction = GateFunction(0);
    pub const AND: GateFunction = GateFunction(1);
    pub const XOR: GateFunction = GateFunction(6);
    pub const OR: GateFunction = GateFunction(7);
    pub const NOR: GateFunction = GateFunction(8);
    pub const XNOR: GateFunction = GateFunction(9);
    pub const NAND: GateFunction = GateFunction(14);
    pub const TRUE: GateFunction = GateFunction(15);

    pub fn new(code: u8) -> Result<Self, QbnError> {
        if code < GATE_COUNT {
            Ok(GateFunction(code))
        } else {
            Err(QbnError::InvalidCode(code))
        }
    }

    /// Iterates over all sixteen gates in code order.
    pub fn all() -> impl Iterator<Item = GateFunction> {
        (0..GATE_COUNT).map(GateFunction)
    }

    pub fn code(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn apply(self, a: bool, b: bool) -> bool {
        let row = ((a as u8) << 1) | (b as u8);
        (self.0 >> (3 - row)) & 1 == 1
    }

    /// Outputs for `(F,F)`, `(F,T)`, `(T,F)`, `(T,T)` in that order.
    pub fn truth_table(self) -> [bool; 4] {
        [
            self.apply(false, false),
            self.apply(false, true),
            self.apply(true, false),
            self.apply(true, true),
        ]
    }

    pub fn name(self) -> &'static str {
        NAMES[self.0 as usize]
    }

    pub fn is_constant(self) -> bool {
        self.0 == 0 || self.0 == 15
    }

    pub fn is_unary(self) -> bool {
        matches!(self.0, 3 | 5 | 10 | 12)
    }

    /// Draws a gate uniformly from the codes `options` permits.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, options: &RandomGateOptions) -> GateFunction {
        for _ in 0..MAX_RANDOM_DRAWS {
            let candidate = GateFunction(rng.gen_range(0..GATE_COUNT));
            if options.permits(candidate) {
                return candidate;
            }
        }
        // The permitted set always contains the binary gates, so it is never
        // empty.
        let permitted = options.permitted();
        permitted[rng.gen_range(0..permitted.len())]
    }
}

impl TryFrom<u8> for GateFunction {
    type Error = QbnError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        GateFunction::new(code)
    }
}

impl From<GateFunction> for u8 {
    fn from(gate: GateFunction) -> Self {
        gate.0
    }
}

impl FromStr for GateFunction {
    type Err = QbnError;

    /// Accepts either a decimal code (`"14"`) or a name (`"NAND"`, any case).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u8>() {
            return GateFunction::new(code);
        }
        NAMES
            .iter()
            .position(|name| name.eq_ignore_ascii_case(s))
            .map(|code| GateFunction(code as u8))
            .ok_or_else(|| QbnError::InvalidGateName(s.to_string()))
    }
}

impl fmt::Display for GateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;
    use test_case::test_case;

    const F: bool = false;
    const T: bool = true;

    #[test_case(0, [F, F, F, F]; "false")]
    #[test_case(1, [F, F, F, T]; "and")]
    #[test_case(2, [F, F, T, F]; "a and not b")]
    #[test_case(3, [F, F, T, T]; "a")]
    #[test_case(4, [F, T, F, F]; "not a and b")]
    #[test_case(5, [F, T, F, T]; "b")]
    #[test_case(6, [F, T, T, F]; "xor")]
    #[test_case(7, [F, T, T, T]; "or")]
    #[test_case(8, [T, F, F, F]; "nor")]
    #[test_case(9, [T, F, F, T]; "xnor")]
    #[test_case(10, [T, F, T, F]; "not b")]
    #[test_case(11, [T, F, T, T]; "a or not b")]
    #[test_case(12, [T, T, F, F]; "not a")]
    #[test_case(13, [T, T, F, T]; "not a or b")]
    #[test_case(14, [T, T, T, F]; "nand")]
    #[test_case(15, [T, T, T, T]; "true")]
    fn test_truth_table(code: u8, expected: [bool; 4]) {
        let gate = GateFunction::new(code).unwrap();
        assert_eq!(gate.apply(false, false), expected[0]);
        assert_eq!(gate.apply(false, true), expected[1]);
        assert_eq!(gate.apply(true, false), expected[2]);
        assert_eq!(gate.apply(true, true), expected[3]);
        assert_eq!(gate.truth_table(), expected);
    }

    #[test]
    fn test_invalid_codes_fail() {
        assert_eq!(GateFunction::new(16), Err(QbnError::InvalidCode(16)));
        assert_eq!(GateFunction::try_from(255u8), Err(QbnError::InvalidCode(255)));
    }

    #[test]
    fn test_names() {
        assert_eq!(GateFunction::AND.name(), "AND");
        assert_eq!(GateFunction::XOR.to_string(), "XOR");
        assert_eq!(GateFunction::NAND.name(), "NAND");
        assert_eq!("nand".parse::<GateFunction>().unwrap(), GateFunction::NAND);
        assert_eq!("6".parse::<GateFunction>().unwrap(), GateFunction::XOR);
        assert!(matches!(
            "MAYBE".parse::<GateFunction>(),
            Err(QbnError::InvalidGateName(_))
        ));
        assert_eq!("16".parse::<GateFunction>(), Err(QbnError::InvalidCode(16)));
    }

    #[test]
    fn test_serialized_code_round_trips() {
        let nand = GateFunction::new(14).unwrap();
        let json = serde_json::to_string(&nand).unwrap();
        assert_eq!(json, "14");
        let back: GateFunction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, nand);
        assert_eq!(back.truth_table(), nand.truth_table());
        assert!(serde_json::from_str::<GateFunction>("16").is_err());
    }

    #[test]
    fn test_default_random_excludes_degenerate_gates() {
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let options = RandomGateOptions::default();
        for _ in 0..1000 {
            let gate = GateFunction::random(&mut rng, &options);
            assert!(!gate.is_constant(), "drew constant gate {}", gate);
            assert!(!gate.is_unary(), "drew unary gate {}", gate);
        }
        assert_eq!(options.permitted().len(), 10);
    }

    #[test]
    fn test_unrestricted_random_covers_all_codes() {
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        let options = RandomGateOptions {
            exclude_constants: false,
            exclude_unary: false,
        };
        let mut seen = [false; 16];
        for _ in 0..2000 {
            seen[GateFunction::random(&mut rng, &options).code() as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_exclude_only_constants() {
        let options = RandomGateOptions {
            exclude_constants: true,
            exclude_unary: false,
        };
        let permitted: Vec<u8> = options.permitted().into_iter().map(u8::from).collect();
        assert_eq!(permitted, (1..15).collect::<Vec<u8>>());
    }
}
