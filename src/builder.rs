//! The merge orchestrator: [`AppConfig::builder`] and [`AppConfigBuilder`].

use std::ffi::OsString;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cli::{CliSchema, ParsedArguments};
use crate::decode::read_bounded;
use crate::env::apply_env;
use crate::error::AppConfigError;
use crate::options::{CliSyntax, Options, Precedence};
use crate::property::PropertyList;
use crate::schema::Settings;

/// Entry point for building a configuration value.
pub struct AppConfig;

impl AppConfig {
    /// Start a builder for `T` with default [`Options`].
    ///
    /// Walks `T`'s schema once; fails when the schema is cyclic.
    pub fn builder<T>() -> Result<AppConfigBuilder<T>, AppConfigError>
    where
        T: Settings + Default + Clone + DeserializeOwned,
    {
        AppConfigBuilder::with_options(Options::new())
    }
}

/// Layers a base value, command-line flags and environment variables into a
/// configuration value of type `T`.
///
/// Sources are applied in this order:
///
/// 1. the base value: `T::default()`, or the last file passed to
///    [`load`](Self::load);
/// 2. a config file named by one of the
///    [`config_file_arguments`](Options::config_file_arguments) flags, if any;
/// 3. command-line flags and environment variables, in the order selected by
///    [`Precedence`]. By default the environment is applied last and wins.
pub struct AppConfigBuilder<T> {
    options: Options,
    properties: PropertyList,
    base: T,
}

impl<T> AppConfigBuilder<T>
where
    T: Settings + Default + Clone + DeserializeOwned,
{
    pub fn with_options(options: Options) -> Result<Self, AppConfigError> {
        let properties = PropertyList::of::<T>()?;
        debug!(properties = properties.len(), "builder created");
        Ok(Self {
            options,
            properties,
            base: T::default(),
        })
    }

    /// Apply an option combinator, e.g. `.with(|o| o.no_env())`.
    pub fn with(mut self, f: impl FnOnce(Options) -> Options) -> Self {
        self.options = f(self.options);
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn properties(&self) -> &PropertyList {
        &self.properties
    }

    /// The value every build starts from.
    pub fn base(&self) -> &T {
        &self.base
    }

    /// Replace the base value with the contents of the file at `path`.
    ///
    /// On failure the previous base value is kept.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), AppConfigError> {
        self.base = self.read_file(path.as_ref())?;
        Ok(())
    }

    fn read_file(&self, path: &Path) -> Result<T, AppConfigError> {
        let bytes = read_bounded(path, self.options.max_config_file_size)?;
        let value = self
            .options
            .file_format
            .decode(&bytes, path, self.options.strict)?;
        debug!(path = %path.display(), bytes = bytes.len(), "config file loaded");
        Ok(value)
    }

    /// Build a new value from all configured sources.
    pub fn build(&self) -> Result<T, AppConfigError> {
        self.resolve()
    }

    /// Like [`build`](Self::build), storing the result in `target`.
    ///
    /// `target` is only written when every source applied cleanly.
    pub fn apply_to(&self, target: &mut T) -> Result<(), AppConfigError> {
        *target = self.resolve()?;
        Ok(())
    }

    /// Arguments left over after flag parsing: the first positional argument
    /// and everything following it.
    pub fn remaining_arguments(&self) -> Result<Vec<OsString>, AppConfigError> {
        let Some(args) = self.cli_arguments()? else {
            return Ok(Vec::new());
        };
        let schema = CliSchema::new(&self.properties, &self.options.config_file_args)?;
        Ok(schema.parse(args)?.remaining())
    }

    fn cli_arguments(&self) -> Result<Option<&[OsString]>, AppConfigError> {
        let Some(args) = self.options.cli_args.as_deref() else {
            return Ok(None);
        };
        match self.options.cli_syntax {
            CliSyntax::Flags => Ok(Some(args)),
            CliSyntax::Naive => Err(AppConfigError::Unsupported("naive command-line syntax")),
        }
    }

    fn resolve(&self) -> Result<T, AppConfigError> {
        let mut staged = self.base.clone();

        let mut parsed: Option<ParsedArguments<'_>> = None;
        if let Some(args) = self.cli_arguments()? {
            let schema = CliSchema::new(&self.properties, &self.options.config_file_args)?;
            let arguments = schema.parse(args)?;
            if let Some(file) = arguments.config_file() {
                debug!(path = file, "config file named on the command line");
                staged = self.read_file(Path::new(file))?;
            }
            parsed = Some(arguments);
        }

        match self.options.precedence {
            Precedence::EnvOverCli => {
                self.apply_cli(parsed.as_ref(), &mut staged)?;
                self.apply_env(&mut staged)?;
            }
            Precedence::CliOverEnv => {
                self.apply_env(&mut staged)?;
                self.apply_cli(parsed.as_ref(), &mut staged)?;
            }
        }

        debug!(precedence = ?self.options.precedence, "configuration built");
        Ok(staged)
    }

    fn apply_cli(
        &self,
        parsed: Option<&ParsedArguments<'_>>,
        target: &mut T,
    ) -> Result<(), AppConfigError> {
        match parsed {
            Some(arguments) => arguments.apply_to(target),
            None => Ok(()),
        }
    }

    fn apply_env(&self, target: &mut T) -> Result<(), AppConfigError> {
        if !self.options.env_enabled {
            return Ok(());
        }
        apply_env(&self.properties, |name| self.options.lookup_env(name), target)
    }
}
