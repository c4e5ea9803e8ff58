use std::io;

use crate::compression::Compression;

/// Errors from frame encoding and decoding.
///
/// Every malformed input surfaces as one of these; decoding never returns a
/// partially reconstructed message.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WireError {
    #[error("invalid length: needed {needed} bytes, {available} available")]
    InvalidLength { needed: usize, available: usize },

    #[error("size header is incorrect: declared {declared} bytes, got {actual}")]
    SizeMismatch { declared: u32, actual: usize },

    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("unsupported compression method: {0}")]
    UnsupportedCompression(String),

    #[error("invalid base58 character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("{method} stream failed: {source}")]
    Compression {
        method: Compression,
        #[source]
        source: io::Error,
    },

    #[error("value {0} is out of range")]
    ValueOutOfRange(String),

    #[error("message id mismatch: frame carries {embedded}, payload hashes to {computed}")]
    ChecksumMismatch { embedded: String, computed: String },

    #[error("frame of {declared} bytes exceeds limit of {limit}")]
    FrameTooLarge { declared: u32, limit: u32 },

    #[error("{method} output exceeds limit of {limit} bytes")]
    DecompressedTooLarge { method: Compression, limit: usize },
}

impl WireError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedFrame(reason.into())
    }
}

/// Errors from loading a [`CodecConfig`](crate::CodecConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Wire(#[from] WireError),
}
