//! Compression codecs for cache files.
//!
//! A cache file is stored under exactly one of three encodings, told apart
//! by the extension appended to the `.cache` path.

use std::fmt;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::error::CacheError;

/// On-disk encoding of a cache file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Plain JSON text.
    #[default]
    None,
    /// gzip, stored with a `.gz` suffix.
    Gzip,
    /// xz, stored with an `.xz` suffix.
    Xz,
}

impl Compression {
    /// All encodings, in the order existing files are probed.
    pub const ALL: [Compression; 3] = [Compression::None, Compression::Gzip, Compression::Xz];

    /// The name used in configuration and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
            Compression::Xz => "xz",
        }
    }

    /// The suffix appended to the cache file path.
    pub fn extension(self) -> &'static str {
        match self {
            Compression::None => "",
            Compression::Gzip => ".gz",
            Compression::Xz => ".xz",
        }
    }

    /// Path of the cache file stored under this encoding.
    pub fn apply_to(self, cache_file: &Path) -> PathBuf {
        let mut os = cache_file.as_os_str().to_owned();
        os.push(self.extension());
        PathBuf::from(os)
    }

    /// Encodes `text` for storage.
    pub fn compress(self, text: &str, path: &Path) -> Result<Vec<u8>, CacheError> {
        let io_err = |source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        };
        match self {
            Compression::None => Ok(text.as_bytes().to_vec()),
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(text.as_bytes()).map_err(io_err)?;
                encoder.finish().map_err(io_err)
            }
            Compression::Xz => {
                let mut out = Vec::new();
                lzma_rs::xz_compress(&mut text.as_bytes(), &mut out).map_err(io_err)?;
                Ok(out)
            }
        }
    }

    /// Decodes stored bytes back to JSON text.
    pub fn decompress(self, bytes: &[u8], path: &Path) -> Result<String, CacheError> {
        let codec_err = |reason: String| CacheError::Codec {
            path: path.to_path_buf(),
            reason,
        };
        let raw = match self {
            Compression::None => bytes.to_vec(),
            Compression::Gzip => {
                let mut out = Vec::new();
                GzDecoder::new(bytes)
                    .read_to_end(&mut out)
                    .map_err(|e| codec_err(e.to_string()))?;
                out
            }
            Compression::Xz => {
                let mut out = Vec::new();
                lzma_rs::xz_decompress(&mut &bytes[..], &mut out)
                    .map_err(|e| codec_err(e.to_string()))?;
                out
            }
        };
        String::from_utf8(raw).map_err(|e| codec_err(e.to_string()))
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Compression {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| CacheError::UnsupportedCompression {
                name: s.to_string(),
            })
    }
}
