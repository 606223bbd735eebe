// SPDX-License-Identifier: Apache-2.0

//! Layered gate networks.
//!
//! Layers are stored in a flat arena (`LayerStack`): one gate array plus the
//! offsets where each layer starts. Cloning a stack is a bulk copy of two
//! vectors, which is what the trainer does before every trial mutation.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bit_array::BitArray;
use crate::dataset::Dataset;
use crate::gate_function::{GateFunction, RandomGateOptions};
use crate::label_table::LabelTable;
use crate::layer::{apply_gate_bank, fmt_gate_codes, Layer};
use crate::qbn_error::QbnError;
use crate::scorer::{score, ScoreResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerStack {
    gates: Vec<GateFunction>,
    /// `offsets[i]..offsets[i + 1]` is the gate range of layer `i`; always
    /// starts with 0 and has `layer_count() + 1` entries.
    offsets: Vec<usize>,
}

impl LayerStack {
    pub fn new(layers: Vec<Layer>) -> Result<Self, QbnError> {
        if layers.is_empty() {
            return Err(QbnError::EmptyNetwork);
        }
        let mut gates = Vec::new();
        let mut offsets = Vec::with_capacity(layers.len() + 1);
        offsets.push(0);
        for layer in layers {
            gates.extend(layer.into_gates());
            offsets.push(gates.len());
        }
        Ok(LayerStack { gates, offsets })
    }

    pub fn layer_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Panics if `i >= layer_count()`.
    pub fn layer(&self, i: usize) -> &[GateFunction] {
        &self.gates[self.offsets[i]..self.offsets[i + 1]]
    }

    pub fn layer_len(&self, i: usize) -> usize {
        self.offsets[i + 1] - self.offsets[i]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[GateFunction]> + '_ {
        self.offsets
            .windows(2)
            .map(move |w| &self.gates[w[0]..w[1]])
    }

    /// All gates, layer by layer.
    pub fn gates(&self) -> &[GateFunction] {
        &self.gates
    }

    /// Replaces one gate, returning the gate it replaced.
    pub fn set_gate(
        &mut self,
        layer: usize,
        index: usize,
        gate: GateFunction,
    ) -> Result<GateFunction, QbnError> {
        if layer >= self.layer_count() || index >= self.layer_len(layer) {
            return Err(QbnError::GateIndexOutOfRange { layer, index });
        }
        let slot = &mut self.gates[self.offsets[layer] + index];
        Ok(std::mem::replace(slot, gate))
    }

    /// Folds `input` through every layer in order.
    pub fn evaluate(&self, input: &BitArray) -> BitArray {
        let mut value = input.clone();
        for gates in self.iter() {
            value = apply_gate_bank(gates, &value);
        }
        value
    }
}

impl fmt::Display for LayerStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, gates) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            fmt_gate_codes(gates, f)?;
        }
        Ok(())
    }
}

/// Serialized shape of a network: gate codes per layer plus the optional
/// classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NetworkRepr {
    layers: Vec<Vec<GateFunction>>,
    classifier: Option<LabelTable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NetworkRepr", into = "NetworkRepr")]
pub struct CircuitNetwork {
    layers: LayerStack,
    classifier: Option<LabelTable>,
}

impl CircuitNetwork {
    pub fn new(layers: Vec<Layer>) -> Result<Self, QbnError> {
        Ok(CircuitNetwork {
            layers: LayerStack::new(layers)?,
            classifier: None,
        })
    }

    pub fn from_codes(codes: &[Vec<u8>]) -> Result<Self, QbnError> {
        let layers = codes
            .iter()
            .map(|layer| Layer::from_codes(layer))
            .collect::<Result<Vec<_>, _>>()?;
        CircuitNetwork::new(layers)
    }

    /// Builds an untrained network with one random gate bank per entry of
    /// `layer_sizes`.
    pub fn random<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        rng: &mut R,
        options: &RandomGateOptions,
    ) -> Result<Self, QbnError> {
        let layers = layer_sizes
            .iter()
            .map(|size| Layer::random(*size, rng, options))
            .collect::<Result<Vec<_>, _>>()?;
        CircuitNetwork::new(layers)
    }

    pub fn evaluate(&self, input: &BitArray) -> BitArray {
        self.layers.evaluate(input)
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.layer_count()
    }

    pub fn gates_per_layer(&self) -> Vec<usize> {
        (0..self.layer_count())
            .map(|i| self.layers.layer_len(i))
            .collect()
    }

    pub fn classifier(&self) -> Option<&LabelTable> {
        self.classifier.as_ref()
    }

    pub fn is_trained(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn score(&self, dataset: &Dataset) -> Result<ScoreResult, QbnError> {
        score(&self.layers, dataset)
    }

    /// Evaluates `input` and looks the output up in the classifier.
    ///
    /// Returns `Ok(None)` when the output matches no trained signature.
    pub fn classify(&self, input: &BitArray) -> Result<Option<&str>, QbnError> {
        let classifier = self
            .classifier
            .as_ref()
            .ok_or(QbnError::UntrainedNetwork)?;
        Ok(classifier.get(&self.evaluate(input)))
    }

    /// Installs an accepted candidate: both the gates and the table derived
    /// from scoring them.
    pub(crate) fn commit(&mut self, layers: LayerStack, classifier: LabelTable) {
        self.layers = layers;
        self.classifier = Some(classifier);
    }

    pub(crate) fn set_classifier(&mut self, classifier: LabelTable) {
        self.classifier = Some(classifier);
    }
}

impl TryFrom<NetworkRepr> for CircuitNetwork {
    type Error = QbnError;

    fn try_from(repr: NetworkRepr) -> Result<Self, Self::Error> {
        let layers = repr
            .layers
            .into_iter()
            .map(Layer::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CircuitNetwork {
            layers: LayerStack::new(layers)?,
            classifier: repr.classifier,
        })
    }
}

impl From<CircuitNetwork> for NetworkRepr {
    fn from(network: CircuitNetwork) -> Self {
        NetworkRepr {
            layers: network.layers.iter().map(|gates| gates.to_vec()).collect(),
            classifier: network.classifier,
        }
    }
}

impl fmt::Display for CircuitNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.layers)
    }
}
