// SPDX-License-Identifier: Apache-2.0

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QbnError {
    /// Gate code outside of `[0, 15]`.
    InvalidCode(u8),
    /// Gate name that is neither a known mnemonic nor a code.
    InvalidGateName(String),
    /// Classification was attempted before any classifier was attached.
    UntrainedNetwork,
    EmptyLayer,
    EmptyNetwork,
    EmptyDataset,
    EmptyLabel,
    WidthMismatch {
        expected: usize,
        got: usize,
    },
    GateIndexOutOfRange {
        layer: usize,
        index: usize,
    },
    InvalidBitString(String),
    InvalidWidth(usize),
    ParseDataset {
        line: usize,
        message: String,
    },
    Io(String),
    Serde(String),
}

impl std::fmt::Display for QbnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QbnError::InvalidCode(code) => {
                write!(f, "qbn error: gate code {} is not in [0, 15]", code)
            }
            QbnError::InvalidGateName(name) => {
                write!(f, "qbn error: unknown gate name {:?}", name)
            }
            QbnError::UntrainedNetwork => {
                write!(f, "qbn error: network has no classifier; train it first")
            }
            QbnError::EmptyLayer => write!(f, "qbn error: layer must have at least one gate"),
            QbnError::EmptyNetwork => {
                write!(f, "qbn error: network must have at least one layer")
            }
            QbnError::EmptyDataset => write!(f, "qbn error: dataset has no samples"),
            QbnError::EmptyLabel => write!(f, "qbn error: sample labels must be non-empty"),
            QbnError::WidthMismatch { expected, got } => write!(
                f,
                "qbn error: sample width mismatch; expected {} bits, got {}",
                expected, got
            ),
            QbnError::GateIndexOutOfRange { layer, index } => write!(
                f,
                "qbn error: gate index {} out of range for layer {}",
                index, layer
            ),
            QbnError::InvalidBitString(s) => {
                write!(f, "qbn error: invalid bit string {:?}; expected only 0/1", s)
            }
            QbnError::InvalidWidth(width) => {
                write!(f, "qbn error: unsupported sample width {}", width)
            }
            QbnError::ParseDataset { line, message } => {
                write!(f, "qbn error: dataset line {}: {}", line, message)
            }
            QbnError::Io(message) => write!(f, "qbn error: I/O: {}", message),
            QbnError::Serde(message) => write!(f, "qbn error: serialization: {}", message),
        }
    }
}

impl std::error::Error for QbnError {}

impl From<std::io::Error> for QbnError {
    fn from(e: std::io::Error) -> Self {
        QbnError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for QbnError {
    fn from(e: serde_json::Error) -> Self {
        QbnError::Serde(e.to_string())
    }
}

impl From<bincode::Error> for QbnError {
    fn from(e: bincode::Error) -> Self {
        QbnError::Serde(e.to_string())
    }
}
