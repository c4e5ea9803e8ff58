use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::compression::Registry;
use crate::error::ConfigError;
use crate::frame::FrameCodec;
use crate::stream::{FrameReader, DEFAULT_MAX_FRAME_LEN};

/// Codec settings, read from TOML:
///
/// ```toml
/// compression = ["zlib", "gzip"]
/// verify_message_ids = true
/// max_frame_len = 1048576
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Registry of usable algorithms, in preference order.
    pub compression: Vec<String>,
    pub verify_message_ids: bool,
    pub max_frame_len: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            compression: Registry::default().names().into_iter().map(String::from).collect(),
            verify_message_ids: false,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

impl CodecConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn registry(&self) -> Result<Registry, ConfigError> {
        Ok(Registry::from_names(&self.compression)?)
    }

    pub fn build_codec(&self) -> Result<FrameCodec, ConfigError> {
        let codec = FrameCodec::new(self.registry()?)
            .with_message_id_verification(self.verify_message_ids)
            .with_max_body_len(self.max_frame_len);
        log::debug!(
            "wire: codec registry {:?}, verify ids {}",
            codec.registry().algorithms().iter().map(|m| m.name()).collect::<Vec<_>>(),
            self.verify_message_ids
        );
        Ok(codec)
    }

    pub fn build_reader(&self) -> FrameReader {
        FrameReader::new(self.max_frame_len)
    }
}
