// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use rand::Rng;

use crate::bit_array::BitArray;
use crate::gate_function::{GateFunction, RandomGateOptions};
use crate::qbn_error::QbnError;

/// Applies a bank of gates across `input` with circular adjacent pairing.
///
/// Output bit `i` is `gates[i % L](input[i], input[(i + 1) % N])`, so the
/// output has the same width as the input regardless of the bank size `L`.
/// When `L > N` only the first `N` gates participate.
///
/// `gates` must be non-empty.
pub(crate) fn apply_gate_bank(gates: &[GateFunction], input: &BitArray) -> BitArray {
    let n = input.len();
    BitArray::from_fn(n, |i| {
        let gate = gates[i % gates.len()];
        gate.apply(input.get(i), input.get((i + 1) % n))
    })
}

/// A bank of gates applied across a data vector.
///
/// The layer length is a gate-bank size, not a data width; see
/// `apply_gate_bank` for the wiring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    gates: Vec<GateFunction>,
}

impl Layer {
    pub fn new(gates: Vec<GateFunction>) -> Result<Self, QbnError> {
        if gates.is_empty() {
            return Err(QbnError::EmptyLayer);
        }
        Ok(Layer { gates })
    }

    pub fn from_codes(codes: &[u8]) -> Result<Self, QbnError> {
        let gates = codes
            .iter()
            .map(|code| GateFunction::new(*code))
            .collect::<Result<Vec<_>, _>>()?;
        Layer::new(gates)
    }

    pub fn random<R: Rng + ?Sized>(
        size: usize,
        rng: &mut R,
        options: &RandomGateOptions,
    ) -> Result<Self, QbnError> {
        let gates = (0..size)
            .map(|_| GateFunction::random(rng, options))
            .collect();
        Layer::new(gates)
    }

    pub fn evaluate(&self, input: &BitArray) -> BitArray {
        apply_gate_bank(&self.gates, input)
    }

    pub fn gates(&self) -> &[GateFunction] {
        &self.gates
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    pub fn into_gates(self) -> Vec<GateFunction> {
        self.gates
    }
}

pub(crate) fn fmt_gate_codes(gates: &[GateFunction], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[")?;
    for (i, gate) in gates.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", gate.code())?;
    }
    write!(f, "]")
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_gate_codes(&self.gates, f)
    }
}
