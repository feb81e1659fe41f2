//! Command-line resolution.
//!
//! Every property registers one flag per candidate name, in priority order:
//!
//! 1. the `arg` tag, as a long flag (`--name`);
//! 2. the `short` tag, as a short flag (`-n`) when it is one character long,
//!    as a long flag otherwise;
//! 3. `--p:<field name>` when neither tag is present.
//!
//! Tokenizing is left to [clap](https://docs.rs/clap): the schema is a
//! runtime-built [`Command`] whose argument ids are the spelled flags. After
//! parsing, each property takes the value of its first candidate that carries
//! a non-empty string. That value is converted according to the property's
//! [`Kind`] and written through its path. A flag given as `false` or `0` still
//! counts as present.
//!
//! Fields of the same kind may share a spelling, as two nested structs of one
//! type do with their `--p:<name>` flags. Such a flag writes every field that
//! uses it. A spelling shared by fields of different kinds, or by a field and
//! a config-file flag, is a [`DuplicateFlag`](AppConfigError::DuplicateFlag).
//!
//! Boolean flags may be given bare (`--verbose`) or with an attached value
//! (`--verbose=false`). Other flags take one value, attached or as the next
//! argument, and accept values starting with `-`. When a flag repeats, the last
//! occurrence wins. The first positional argument ends flag parsing; it and
//! everything after it is reported by [`ParsedArguments::remaining`].

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::Path;

use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::trace;

use crate::error::AppConfigError;
use crate::property::{Property, PropertyList, TagKey};
use crate::schema::{Kind, Settings};

const REMAINING: &str = "remaining";

#[derive(Debug, Clone, PartialEq, Eq)]
enum FlagStyle {
    Long,
    Short(char),
}

/// One spelling under which a field can be set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    name: String,
    style: FlagStyle,
}

impl Flag {
    fn long(name: impl Into<String>) -> Self {
        Flag {
            name: name.into(),
            style: FlagStyle::Long,
        }
    }

    fn short_or_long(name: &str) -> Self {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Flag {
                name: name.to_string(),
                style: FlagStyle::Short(c),
            },
            _ => Flag::long(name),
        }
    }

    /// The flag name without dashes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The flag as typed on the command line, e.g. `--host` or `-H`.
    pub fn spelled(&self) -> String {
        match self.style {
            FlagStyle::Long => format!("--{}", self.name),
            FlagStyle::Short(c) => format!("-{c}"),
        }
    }

    /// Flag names must be non-empty and free of dashes at the start, `=` and
    /// whitespace.
    fn validate(&self) -> Result<(), AppConfigError> {
        let reason = if self.name.trim().is_empty() {
            "name is empty"
        } else if self.name.starts_with('-') {
            "name starts with '-'"
        } else if self.name.contains('=') {
            "name contains '='"
        } else if self.name.chars().any(char::is_whitespace) {
            "name contains whitespace"
        } else {
            return Ok(());
        };
        Err(AppConfigError::InvalidFlagName {
            flag: self.name.clone(),
            reason,
        })
    }

    fn to_arg(&self, kind: Kind) -> Arg {
        let arg = Arg::new(self.spelled()).action(ArgAction::Set);
        let arg = match self.style {
            FlagStyle::Long => arg.long(self.name.clone()),
            FlagStyle::Short(c) => arg.short(c),
        };
        match kind {
            Kind::Bool => arg
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true"),
            _ => arg.num_args(1).allow_hyphen_values(true),
        }
    }
}

/// Candidate flags of `property`, highest priority first.
pub fn candidate_flags(property: &Property) -> Vec<Flag> {
    let tags = property.tags();
    let mut flags = Vec::with_capacity(2);
    if let Some(arg) = tags.get(TagKey::Arg) {
        flags.push(Flag::long(arg));
    }
    if let Some(short) = tags.get(TagKey::Short) {
        flags.push(Flag::short_or_long(short));
    }
    if flags.is_empty() {
        flags.push(Flag::long(format!("p:{}", property.name())));
    }
    flags
}

/// The flag schema derived from a [`PropertyList`].
pub(crate) struct CliSchema<'a> {
    command: Command,
    properties: &'a PropertyList,
    config_file_flags: Vec<Flag>,
}

impl<'a> CliSchema<'a> {
    pub(crate) fn new(
        properties: &'a PropertyList,
        config_file_args: &[String],
    ) -> Result<Self, AppConfigError> {
        let mut command = Command::new(program_name())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .args_override_self(true);
        let mut file_flags = HashSet::new();
        let mut field_flags: HashMap<String, Kind> = HashMap::new();

        let config_file_flags: Vec<Flag> = config_file_args.iter().map(Flag::long).collect();
        for flag in &config_file_flags {
            flag.validate()?;
            if !file_flags.insert(flag.spelled()) {
                return Err(AppConfigError::DuplicateFlag {
                    flag: flag.spelled(),
                });
            }
            command = command.arg(flag.to_arg(Kind::Str).help("configuration file name"));
        }

        // Fields of the same kind may share a spelling: one clap argument
        // then feeds all of them.
        for property in properties {
            for flag in candidate_flags(property) {
                flag.validate()?;
                let spelled = flag.spelled();
                if file_flags.contains(&spelled) {
                    return Err(AppConfigError::DuplicateFlag { flag: spelled });
                }
                match field_flags.get(&spelled) {
                    Some(kind) if *kind == property.kind() => continue,
                    Some(_) => return Err(AppConfigError::DuplicateFlag { flag: spelled }),
                    None => {}
                }
                field_flags.insert(spelled, property.kind());
                command = command.arg(flag.to_arg(property.kind()).help(property.name()));
            }
        }

        command = command.arg(
            Arg::new(REMAINING)
                .num_args(1..)
                .trailing_var_arg(true)
                .value_parser(clap::value_parser!(OsString))
                .hide(true),
        );

        Ok(Self {
            command,
            properties,
            config_file_flags,
        })
    }

    /// Tokenize `args` against the schema. Nothing is written yet.
    pub(crate) fn parse(&self, args: &[OsString]) -> Result<ParsedArguments<'a>, AppConfigError> {
        let matches = self.command.clone().try_get_matches_from(args)?;
        let config_file = self
            .config_file_flags
            .iter()
            .find_map(|flag| present(&matches, flag))
            .map(str::to_string);
        Ok(ParsedArguments {
            matches,
            properties: self.properties,
            config_file,
        })
    }
}

fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string()
}

/// The value of `flag`, if it was given and is not empty.
fn present<'m>(matches: &'m ArgMatches, flag: &Flag) -> Option<&'m str> {
    matches
        .try_get_one::<String>(&flag.spelled())
        .ok()
        .flatten()
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Tokenized arguments, ready to be applied to a target value.
pub(crate) struct ParsedArguments<'a> {
    matches: ArgMatches,
    properties: &'a PropertyList,
    config_file: Option<String>,
}

impl ParsedArguments<'_> {
    /// Path given to the first config-file flag that carried a value.
    pub(crate) fn config_file(&self) -> Option<&str> {
        self.config_file.as_deref()
    }

    /// Arguments from the first positional onwards.
    pub(crate) fn remaining(&self) -> Vec<OsString> {
        self.matches
            .try_get_many::<OsString>(REMAINING)
            .ok()
            .flatten()
            .map(|values| values.cloned().collect())
            .unwrap_or_default()
    }

    /// Write every property that received a flag into `target`.
    pub(crate) fn apply_to<T: Settings>(&self, target: &mut T) -> Result<(), AppConfigError> {
        for property in self.properties {
            let Some((flag, raw)) = candidate_flags(property)
                .into_iter()
                .find_map(|flag| present(&self.matches, &flag).map(|raw| (flag, raw)))
            else {
                continue;
            };

            let invalid = |reason: String| AppConfigError::InvalidArgument {
                flag: flag.name().to_string(),
                value: raw.to_string(),
                expected: property.kind(),
                reason,
            };
            let value = property.kind().parse(raw).map_err(|e| invalid(e.reason))?;
            trace!(flag = %flag.spelled(), field = property.name(), "applying argument");
            self.properties.write(target, property, value, invalid)?;
        }
        Ok(())
    }
}
