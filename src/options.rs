//! Builder options.
//!
//! [`Options`] is a plain value. Every setter consumes it and returns the
//! updated copy, so one base `Options` can be cloned into several builders
//! without any of them observing another's changes.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::sync::Arc;

use crate::decode::{DEFAULT_MAX_CONFIG_FILE_SIZE, FileFormat};

/// How command-line arguments are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CliSyntax {
    /// `--name=value`, `--name value`, `-n=value`, bare `--flag` for booleans.
    #[default]
    Flags,
    /// Bare positional `name=value` words. Not supported; building with it
    /// fails with [`AppConfigError::Unsupported`](crate::AppConfigError::Unsupported).
    Naive,
}

/// Which source wins when both the command line and the environment set the
/// same field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precedence {
    /// Environment variables are applied after CLI flags and win.
    #[default]
    EnvOverCli,
    /// CLI flags are applied after environment variables and win.
    CliOverEnv,
}

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

#[derive(Clone)]
pub struct Options {
    pub(crate) config_file_args: Vec<String>,
    pub(crate) cli_args: Option<Vec<OsString>>,
    pub(crate) cli_syntax: CliSyntax,
    pub(crate) env_enabled: bool,
    pub(crate) env_lookup: EnvLookup,
    pub(crate) precedence: Precedence,
    pub(crate) max_config_file_size: u64,
    pub(crate) file_format: FileFormat,
    pub(crate) strict: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl Options {
    /// Defaults: process arguments (without the program name), process
    /// environment, JSON files up to 10 MiB, environment over CLI.
    pub fn new() -> Self {
        Self {
            config_file_args: Vec::new(),
            cli_args: Some(std::env::args_os().skip(1).collect()),
            cli_syntax: CliSyntax::default(),
            env_enabled: true,
            env_lookup: Arc::new(|name: &str| std::env::var(name).ok()),
            precedence: Precedence::default(),
            max_config_file_size: DEFAULT_MAX_CONFIG_FILE_SIZE,
            file_format: FileFormat::default(),
            strict: false,
        }
    }

    /// Parse these arguments instead of the process arguments. The program
    /// name must not be included.
    pub fn cli_arguments<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.cli_args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Skip command-line arguments entirely.
    pub fn no_cli_arguments(mut self) -> Self {
        self.cli_args = None;
        self
    }

    pub fn cli_syntax(mut self, syntax: CliSyntax) -> Self {
        self.cli_syntax = syntax;
        self
    }

    /// Skip environment variables entirely.
    pub fn no_env(mut self) -> Self {
        self.env_enabled = false;
        self
    }

    /// Replace the environment lookup.
    pub fn env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env_lookup = Arc::new(lookup);
        self
    }

    /// Use a fixed set of variables instead of the process environment.
    pub fn env_vars<I, K, V>(self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.env_lookup(move |name| vars.get(name).cloned())
    }

    pub fn precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    /// Reject config files larger than `bytes`.
    pub fn max_config_file_size(mut self, bytes: u64) -> Self {
        self.max_config_file_size = bytes;
        self
    }

    pub fn file_format(mut self, format: FileFormat) -> Self {
        self.file_format = format;
        self
    }

    /// Fail loads whose file contains keys the target type does not know.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Flags whose value names a config file to load before the remaining
    /// flags are applied. The first one given a non-empty value wins.
    pub fn config_file_arguments<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config_file_args = names.into_iter().map(Into::into).collect();
        self
    }

    /// Comma-separated form of [`config_file_arguments`](Self::config_file_arguments):
    /// `"config,c"`.
    pub fn config_file_argument(self, names: &str) -> Self {
        self.config_file_arguments(names.split(',').map(str::trim).filter(|n| !n.is_empty()))
    }

    pub(crate) fn lookup_env(&self, name: &str) -> Option<String> {
        (self.env_lookup)(name)
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("config_file_args", &self.config_file_args)
            .field("cli_args", &self.cli_args)
            .field("cli_syntax", &self.cli_syntax)
            .field("env_enabled", &self.env_enabled)
            .field("precedence", &self.precedence)
            .field("max_config_file_size", &self.max_config_file_size)
            .field("file_format", &self.file_format)
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = Options::new();
        assert!(opts.cli_args.is_some());
        assert!(opts.env_enabled);
        assert_eq!(opts.cli_syntax, CliSyntax::Flags);
        assert_eq!(opts.precedence, Precedence::EnvOverCli);
        assert_eq!(opts.max_config_file_size, 10 * 1024 * 1024);
        assert!(matches!(opts.file_format, FileFormat::Json));
        assert!(!opts.strict);
    }

    #[test]
    fn setters_leave_the_original_untouched() {
        let base = Options::new().cli_arguments(["--a=1"]);
        let derived = base.clone().no_env().no_cli_arguments();
        assert!(base.env_enabled);
        assert_eq!(base.cli_args, Some(vec![OsString::from("--a=1")]));
        assert!(!derived.env_enabled);
        assert!(derived.cli_args.is_none());
    }

    #[test]
    fn config_file_argument_splits_commas() {
        let opts = Options::new().config_file_argument("config, c,");
        assert_eq!(opts.config_file_args, ["config", "c"]);
    }

    #[test]
    fn env_vars_replace_process_environment() {
        let opts = Options::new().env_vars([("APP_PORT", "8080")]);
        assert_eq!(opts.lookup_env("APP_PORT").as_deref(), Some("8080"));
        assert_eq!(opts.lookup_env("PATH"), None);
    }

    #[test]
    fn env_lookup_is_shared_by_clones() {
        let opts = Options::new().env_lookup(|name| (name == "X").then(|| "1".to_string()));
        let copy = opts.clone().strict(true);
        assert_eq!(copy.lookup_env("X").as_deref(), Some("1"));
    }
}
