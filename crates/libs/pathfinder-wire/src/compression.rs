//! Compression algorithms and the ordered registry of supported ones.
//!
//! Frames carry no compression tag. Sender and receiver each hold an ordered
//! candidate list and agree out of band; the registry only decides which
//! names this process can actually run.

use core::fmt;
use std::io::{self, Read, Write};

use bzip2::bufread::BzDecoder;
use bzip2::write::BzEncoder;
use flate2::bufread::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use serde::{Deserialize, Serialize};

use crate::error::WireError;
use crate::stream::DEFAULT_MAX_FRAME_LEN;

/// Read at most `cap` bytes of decoder output into `out`.
fn read_capped<R: Read>(decoder: &mut R, cap: u64, out: &mut Vec<u8>) -> io::Result<()> {
    decoder.take(cap).read_to_end(out).map(|_| ())
}

/// A stream compressor known to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Compression {
    Gzip,
    Zlib,
    Bzip2,
}

impl Compression {
    pub const ALL: [Compression; 3] = [Self::Gzip, Self::Zlib, Self::Bzip2];

    /// Wire name used in candidate lists.
    pub fn name(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Zlib => "zlib",
            Self::Bzip2 => "bz2",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.name() == name)
    }

    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>, WireError> {
        let result = match self {
            Self::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(data).and_then(|_| encoder.finish())
            }
            Self::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(data).and_then(|_| encoder.finish())
            }
            Self::Bzip2 => {
                let mut encoder = BzEncoder::new(Vec::new(), bzip2::Compression::default());
                encoder.write_all(data).and_then(|_| encoder.finish())
            }
        };
        result.map_err(|source| WireError::Compression { method: self, source })
    }

    /// Decompress one stream, capped at [`DEFAULT_MAX_FRAME_LEN`] output bytes.
    pub fn decompress(self, data: &[u8]) -> Result<Vec<u8>, WireError> {
        self.decompress_with_limit(data, DEFAULT_MAX_FRAME_LEN as usize)
    }

    /// Decompress exactly one stream of at most `limit` output bytes.
    ///
    /// `data` must hold nothing but that stream: bytes left over after its
    /// end are an error, as is output longer than `limit`.
    pub fn decompress_with_limit(self, data: &[u8], limit: usize) -> Result<Vec<u8>, WireError> {
        let cap = (limit as u64).saturating_add(1);
        let mut out = Vec::new();
        let remaining = match self {
            Self::Gzip => {
                let mut decoder = GzDecoder::new(data);
                read_capped(&mut decoder, cap, &mut out).map(|()| decoder.into_inner().len())
            }
            Self::Zlib => {
                let mut decoder = ZlibDecoder::new(data);
                read_capped(&mut decoder, cap, &mut out).map(|()| decoder.into_inner().len())
            }
            Self::Bzip2 => {
                let mut decoder = BzDecoder::new(data);
                read_capped(&mut decoder, cap, &mut out).map(|()| decoder.into_inner().len())
            }
        }
        .map_err(|source| WireError::Compression { method: self, source })?;

        if out.len() > limit {
            log::warn!("wire: {} output exceeds {} byte limit", self, limit);
            return Err(WireError::DecompressedTooLarge { method: self, limit });
        }
        if remaining > 0 {
            return Err(WireError::Compression {
                method: self,
                source: io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("{remaining} trailing bytes after end of stream"),
                ),
            });
        }
        Ok(out)
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for Compression {
    type Error = WireError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::from_name(&name).ok_or(WireError::UnsupportedCompression(name))
    }
}

impl From<Compression> for String {
    fn from(method: Compression) -> Self {
        method.name().to_string()
    }
}

/// Ordered set of algorithms this process is able to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    algorithms: Vec<Compression>,
}

impl Registry {
    pub fn new(algorithms: impl IntoIterator<Item = Compression>) -> Self {
        let mut unique = Vec::new();
        for method in algorithms {
            if !unique.contains(&method) {
                unique.push(method);
            }
        }
        Self { algorithms: unique }
    }

    /// Every algorithm this crate implements.
    pub fn all() -> Self {
        Self::new(Compression::ALL)
    }

    /// Build from wire names, rejecting any name this crate cannot run.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, WireError> {
        let algorithms = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                Compression::from_name(name)
                    .ok_or_else(|| WireError::UnsupportedCompression(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(algorithms))
    }

    pub fn algorithms(&self) -> &[Compression] {
        &self.algorithms
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.algorithms.iter().map(|method| method.name()).collect()
    }

    pub fn lookup(&self, name: &str) -> Option<Compression> {
        self.algorithms.iter().copied().find(|method| method.name() == name)
    }

    /// First of the sender's candidates, in the sender's order, that the
    /// registry supports.
    pub fn select_for_encode<S: AsRef<str>>(&self, candidates: &[S]) -> Option<Compression> {
        self.first_supported(candidates)
    }

    /// First of the receiver's candidates, in the receiver's order, that the
    /// registry supports. `None` means the body is read as uncompressed.
    pub fn select_for_decode<S: AsRef<str>>(&self, candidates: &[S]) -> Option<Compression> {
        self.first_supported(candidates)
    }

    fn first_supported<S: AsRef<str>>(&self, candidates: &[S]) -> Option<Compression> {
        candidates.iter().find_map(|candidate| self.lookup(candidate.as_ref()))
    }

    /// Compress with an explicitly named algorithm.
    pub fn compress(&self, name: &str, data: &[u8]) -> Result<Vec<u8>, WireError> {
        self.require(name)?.compress(data)
    }

    /// Decompress with an explicitly named algorithm.
    pub fn decompress(&self, name: &str, data: &[u8]) -> Result<Vec<u8>, WireError> {
        self.require(name)?.decompress(data)
    }

    fn require(&self, name: &str) -> Result<Compression, WireError> {
        self.lookup(name).ok_or_else(|| WireError::UnsupportedCompression(name.to_string()))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new([Compression::Gzip, Compression::Zlib])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_is_gzip_then_zlib() {
        assert_eq!(Registry::default().names(), vec!["gzip", "zlib"]);
    }

    #[test]
    fn sender_order_decides_the_winner() {
        let registry = Registry::default();
        assert_eq!(registry.select_for_encode(&["foo", "gzip"]), Some(Compression::Gzip));
        assert_eq!(registry.select_for_encode(&["zlib", "gzip"]), Some(Compression::Zlib));
        assert_eq!(registry.select_for_decode(&["gzip", "zlib"]), Some(Compression::Gzip));
    }

    #[test]
    fn no_overlap_selects_nothing() {
        let registry = Registry::default();
        let empty: [&str; 0] = [];
        assert_eq!(registry.select_for_encode(&empty), None);
        assert_eq!(registry.select_for_encode(&["foo", "bz2"]), None);
        assert_eq!(registry.select_for_decode(&["lzma"]), None);
    }

    #[test]
    fn every_algorithm_roundtrips() {
        let inputs: [&[u8]; 3] = [b"", b"test", &[0xAB; 4096]];
        for method in Compression::ALL {
            for input in inputs {
                let compressed = method.compress(input).expect("compress");
                assert_eq!(method.decompress(&compressed).expect("decompress"), input, "{method}");
            }
        }
    }

    #[test]
    fn gzip_and_zlib_produce_different_streams() {
        let gzip = Compression::Gzip.compress(b"test").expect("compress");
        let zlib = Compression::Zlib.compress(b"test").expect("compress");
        assert_eq!(&gzip[..2], &[0x1F, 0x8B]);
        assert_ne!(gzip, zlib);
    }

    #[test]
    fn malformed_input_is_an_error() {
        for method in Compression::ALL {
            let err = method.decompress(b"definitely not compressed").expect_err("decompress should fail");
            assert!(matches!(err, WireError::Compression { method: m, .. } if m == method));
        }
    }

    #[test]
    fn bytes_after_the_stream_are_rejected() {
        for method in Compression::ALL {
            let mut packed = method.compress(b"test1test2").expect("compress");
            packed.extend_from_slice(b"GARBAGE-APPENDED");
            let err = method.decompress(&packed).expect_err("trailing bytes accepted");
            assert!(matches!(err, WireError::Compression { method: m, .. } if m == method));
        }
    }

    #[test]
    fn output_is_capped() {
        let zeros = vec![0u8; 64 * 1024];
        for method in Compression::ALL {
            let packed = method.compress(&zeros).expect("compress");
            assert!(packed.len() < 4096, "{method} packed to {} bytes", packed.len());
            assert!(matches!(
                method.decompress_with_limit(&packed, 1024),
                Err(WireError::DecompressedTooLarge { limit: 1024, .. })
            ));
            let exact = method.decompress_with_limit(&packed, zeros.len()).expect("at limit");
            assert_eq!(exact.len(), zeros.len());
        }
    }

    #[test]
    fn explicit_names_must_be_registered() {
        let registry = Registry::default();
        assert!(matches!(
            registry.compress("bz2", b"data"),
            Err(WireError::UnsupportedCompression(name)) if name == "bz2"
        ));
        assert!(matches!(
            registry.decompress("foo", b"data"),
            Err(WireError::UnsupportedCompression(_))
        ));
        let packed = registry.compress("zlib", b"data").expect("compress");
        assert_eq!(registry.decompress("zlib", &packed).expect("decompress"), b"data");
    }

    #[test]
    fn registry_from_names() {
        let registry = Registry::from_names(&["bz2", "gzip", "bz2"]).expect("registry");
        assert_eq!(registry.algorithms(), &[Compression::Bzip2, Compression::Gzip]);
        assert!(matches!(
            Registry::from_names(&["gzip", "snappy"]),
            Err(WireError::UnsupportedCompression(name)) if name == "snappy"
        ));
    }
}
