//! Reading and decoding config files.
//!
//! [`read_bounded`] performs the filesystem checks shared by every load: the
//! path must exist, must not be a directory, and must not exceed the size cap.
//! The cap is checked against the file's metadata before any byte is read and
//! the read itself is limited to the cap, so a file growing after the check
//! is still rejected.
//!
//! [`FileFormat`] then turns the bytes into the target type. In strict mode
//! `serde_ignored` reports keys the target type did not consume.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::AppConfigError;

/// Default cap on config file size: 10 MiB.
pub const DEFAULT_MAX_CONFIG_FILE_SIZE: u64 = 10 * 1024 * 1024;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type CustomDecoder = Arc<dyn Fn(&[u8]) -> Result<serde_json::Value, BoxError> + Send + Sync>;

/// How config files are decoded.
#[derive(Clone, Default)]
pub enum FileFormat {
    #[default]
    Json,
    Toml,
    /// Any format that can produce a `serde_json::Value`, e.g.
    /// `FileFormat::custom(|bytes| Ok(serde_yaml::from_slice(bytes)?))`.
    Custom(CustomDecoder),
}

impl FileFormat {
    pub fn custom<F>(decode: F) -> Self
    where
        F: Fn(&[u8]) -> Result<serde_json::Value, BoxError> + Send + Sync + 'static,
    {
        FileFormat::Custom(Arc::new(decode))
    }

    /// Decode `bytes` read from `path` into `T`.
    pub(crate) fn decode<T: DeserializeOwned>(
        &self,
        bytes: &[u8],
        path: &Path,
        strict: bool,
    ) -> Result<T, AppConfigError> {
        let decode_error = |source: BoxError| AppConfigError::DecodeError {
            path: path.to_path_buf(),
            source,
        };
        let mut unknown: Vec<String> = Vec::new();
        let mut record = |ignored: serde_ignored::Path<'_>| unknown.push(ignored.to_string());

        let value: T = match self {
            FileFormat::Json => {
                let mut de = serde_json::Deserializer::from_slice(bytes);
                let result = if strict {
                    serde_ignored::deserialize(&mut de, &mut record)
                } else {
                    T::deserialize(&mut de)
                };
                let value = result.map_err(|e| decode_error(e.into()))?;
                de.end().map_err(|e| decode_error(e.into()))?;
                value
            }
            FileFormat::Toml => {
                let text = std::str::from_utf8(bytes).map_err(|e| decode_error(e.into()))?;
                let de = toml::Deserializer::new(text);
                let result = if strict {
                    serde_ignored::deserialize(de, &mut record)
                } else {
                    T::deserialize(de)
                };
                result.map_err(|e| decode_error(e.into()))?
            }
            FileFormat::Custom(custom) => {
                let tree = custom(bytes).map_err(decode_error)?;
                let result = if strict {
                    serde_ignored::deserialize(tree, &mut record)
                } else {
                    T::deserialize(tree)
                };
                result.map_err(|e| decode_error(e.into()))?
            }
        };

        if !unknown.is_empty() {
            return Err(AppConfigError::UnknownKeys {
                path: path.to_path_buf(),
                keys: unknown,
            });
        }
        Ok(value)
    }
}

impl fmt::Debug for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Json => f.write_str("Json"),
            FileFormat::Toml => f.write_str("Toml"),
            FileFormat::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Read a whole config file, refusing directories and files above `limit`.
pub(crate) fn read_bounded(path: &Path, limit: u64) -> Result<Vec<u8>, AppConfigError> {
    let io_error = |source: std::io::Error| AppConfigError::IoError {
        path: path.to_path_buf(),
        source,
    };
    let too_large = |size: u64| AppConfigError::FileTooLarge {
        path: path.to_path_buf(),
        size,
        limit,
    };

    let meta = std::fs::metadata(path).map_err(io_error)?;
    if meta.is_dir() {
        return Err(AppConfigError::IsDirectory {
            path: path.to_path_buf(),
        });
    }
    if meta.len() > limit {
        return Err(too_large(meta.len()));
    }

    let file = File::open(path).map_err(io_error)?;
    let mut bytes = Vec::with_capacity(meta.len() as usize);
    file.take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(io_error)?;
    if bytes.len() as u64 > limit {
        return Err(too_large(bytes.len() as u64));
    }
    Ok(bytes)
}
