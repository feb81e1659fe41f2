use std::path::PathBuf;

use thiserror::Error;

use crate::schema::{AccessError, Kind};

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("'{path}' is a directory")]
    IsDirectory { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("File '{path}' is too large for a config file ({size} bytes, limit {limit})")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Failed to decode {path}: {source}")]
    DecodeError {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Unknown keys in {path}: {}", keys.join(", "))]
    UnknownKeys { path: PathBuf, keys: Vec<String> },

    #[error(transparent)]
    CliParse(#[from] clap::Error),

    #[error("argument {flag} must be {expected}, '{value}': {reason}")]
    InvalidArgument {
        flag: String,
        value: String,
        expected: Kind,
        reason: String,
    },

    #[error("environment variable {variable} must be {expected}, '{value}': {reason}")]
    InvalidEnvironment {
        variable: String,
        value: String,
        expected: Kind,
        reason: String,
    },

    #[error("Field '{field}' is not addressable: an enclosing value is absent")]
    Unaddressable { field: String },

    #[error("Field '{field}' cannot be reached: {source}")]
    InvalidPath { field: String, source: AccessError },

    #[error("Flag '{flag}' is declared more than once")]
    DuplicateFlag { flag: String },

    #[error("Flag '{flag}' is not a valid flag name: {reason}")]
    InvalidFlagName { flag: String, reason: &'static str },

    #[error("Schema type {type_name} contains itself through '{field}'")]
    CyclicSchema {
        type_name: &'static str,
        field: String,
    },

    #[error("Unsupported: {0}")]
    Unsupported(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_names_flag_and_value() {
        let err = AppConfigError::InvalidArgument {
            flag: "count".into(),
            value: "-5".into(),
            expected: Kind::Uint,
            reason: "invalid digit found in string".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("count"));
        assert!(msg.contains("'-5'"));
        assert!(msg.contains("unsigned integer"));
    }

    #[test]
    fn file_too_large_formats() {
        let err = AppConfigError::FileTooLarge {
            path: "/etc/app/config.json".into(),
            size: 20,
            limit: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("config.json"));
        assert!(msg.contains("too large"));
    }

    #[test]
    fn unknown_keys_lists_all() {
        let err = AppConfigError::UnknownKeys {
            path: "app.toml".into(),
            keys: vec!["typo".into(), "database.nope".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("typo, database.nope"));
    }

    #[test]
    fn unsupported_formats() {
        let err = AppConfigError::Unsupported("naive command-line syntax");
        assert!(err.to_string().contains("naive"));
    }
}
