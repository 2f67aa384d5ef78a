//! Command-line interface for tidal
//! This binary loads a JSON or YAML template and streams its snapshots to stdout.
//!
//! Usage:
//!   tidal `<template>` [--namespace `<ns>`]... [--flatten]   - Stream snapshots as JSON lines
//!   tidal `<template>` --limit -1 --max 20                  - Endless sequence, first 20 snapshots
//!
//! Settings are read from the built-in defaults, then `--config <file>`, then the flags.

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::io::{self, Write};
use tidal::template::loader::TemplateLoader;
use tidal::{BuildOptions, Options, Value};
use tidal_config::{Loader, TidalConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = Command::new("tidal")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Stream resolved JSON snapshots from a template file")
        .arg_required_else_help(true)
        .arg(
            Arg::new("template")
                .help("Path to a JSON or YAML template (.yaml/.yml are read as YAML)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("namespace")
                .long("namespace")
                .short('n')
                .help("Top-level key to include (repeatable; default: all keys)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("flatten")
                .long("flatten")
                .help("Merge the selected namespaces at the root instead of nesting them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("limit")
                .long("limit")
                .short('l')
                .help("Snapshots to produce (-1 streams forever; default: until generators complete)")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i64)),
        )
        .arg(
            Arg::new("max")
                .long("max")
                .help("Stop after this many snapshots, whatever the limit (0 disables the cap)")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .short('p')
                .help("Pretty-print each snapshot")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log builder and sequence activity to stderr")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    init_tracing(matches.get_flag("verbose"));

    let config = load_config(&matches).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });
    let template = matches
        .get_one::<String>("template")
        .expect("template is a required argument");
    let namespaces: Vec<String> = matches
        .get_many::<String>("namespace")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    handle_stream_command(template, namespaces, &config);
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Defaults, then the config file, then command line flags
fn load_config(matches: &ArgMatches) -> Result<TidalConfig, tidal_config::ConfigError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(limit) = matches.get_one::<i64>("limit") {
        loader = loader.set_override("build.limit", *limit)?;
    }
    if let Some(max) = matches.get_one::<u64>("max") {
        loader = loader.set_override("build.max_snapshots", *max)?;
    }
    if matches.get_flag("flatten") {
        loader = loader.set_override("build.nest", false)?;
    }
    if matches.get_flag("pretty") {
        loader = loader.set_override("output.pretty", true)?;
    }
    loader.build()
}

/// Handle the stream command
fn handle_stream_command(path: &str, namespaces: Vec<String>, config: &TidalConfig) {
    tracing::debug!(path, ?namespaces, build = ?config.build, output = ?config.output, "stream");
    let builder = TemplateLoader::from_path(path)
        .and_then(|loader| loader.into_builder(Options::new()))
        .unwrap_or_else(|e| {
            eprintln!("Template error: {}", e);
            std::process::exit(1);
        });

    let mut options = BuildOptions::new()
        .namespaces(namespaces)
        .nest(config.build.nest);
    options.limit = config.build.limit();
    let snapshots = builder.build_with(options).unwrap_or_else(|e| {
        eprintln!("Build error: {}", e);
        std::process::exit(1);
    });

    let cap = config.build.max_snapshots().unwrap_or(usize::MAX);
    let mut written_count = 0usize;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for snapshot in snapshots.take(cap) {
        let written = render(&snapshot, config.output.pretty).and_then(|text| {
            out.write_all(text.as_bytes())?;
            out.write_all(config.output.separator.as_bytes())
        });
        if let Err(e) = written {
            // Reader went away, e.g. `tidal t.json | head`
            if e.kind() == io::ErrorKind::BrokenPipe {
                tracing::debug!(snapshots = written_count, "stdout closed");
                return;
            }
            eprintln!("Output error: {}", e);
            std::process::exit(1);
        }
        written_count += 1;
    }
    tracing::debug!(snapshots = written_count, "stream finished");
    if let Err(e) = out.flush() {
        if e.kind() != io::ErrorKind::BrokenPipe {
            eprintln!("Output error: {}", e);
            std::process::exit(1);
        }
    }
}

fn render(snapshot: &Value, pretty: bool) -> io::Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(snapshot)
    } else {
        serde_json::to_string(snapshot)
    };
    text.map_err(io::Error::from)
}
