//! # appconfig server demo
//!
//! A pretend server that resolves its configuration with appconfig and prints
//! the result. It exists to demonstrate and manually verify the library.
//!
//! ```sh
//! cargo run --example server
//! cargo run --example server -- --port=9000 -v
//! SERVER_PORT=7000 cargo run --example server -- --port=9000
//! cargo run --example server -- --config=server.json start
//! RUST_LOG=appconfig=trace cargo run --example server -- -H=0.0.0.0
//! ```
//!
//! Environment variables win over flags unless `--cli-wins` is passed first:
//! the demo checks for it before handing the remaining arguments over.

mod config;

use std::ffi::OsString;
use std::process::ExitCode;

use appconfig::{AppConfig, AppConfigError, Precedence, PropertyList, candidate_flags};

use config::ServerConfig;

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("appconfig=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn print_sources(properties: &PropertyList) {
    println!("{:<28} {:<24} env", "field", "flags");
    for property in properties {
        let flags: Vec<String> = candidate_flags(property)
            .iter()
            .map(|flag| flag.spelled())
            .collect();
        println!(
            "{:<28} {:<24} {}",
            properties.qualified_name(property),
            flags.join(", "),
            properties.env_variable(property)
        );
    }
    println!();
}

fn run() -> Result<(), AppConfigError> {
    let mut args: Vec<OsString> = std::env::args_os().skip(1).collect();
    let precedence = if args.first().is_some_and(|a| a == "--cli-wins") {
        args.remove(0);
        Precedence::CliOverEnv
    } else {
        Precedence::EnvOverCli
    };

    let builder = AppConfig::builder::<ServerConfig>()?.with(|o| {
        o.cli_arguments(args)
            .config_file_argument("config,c")
            .precedence(precedence)
    });

    print_sources(builder.properties());

    let mut server = builder.build()?;
    server.started_by = std::env::var("USER").unwrap_or_else(|_| "unknown".into());

    println!("{} starting as {}", server.name, server.started_by);
    match serde_json::to_string_pretty(&server) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("cannot render configuration: {e}"),
    }

    let rest = builder.remaining_arguments()?;
    if !rest.is_empty() {
        println!("remaining arguments: {rest:?}");
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
