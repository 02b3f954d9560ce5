//! Scriptcat CLI - Command line interface
//!
//! Project settings come from `scriptcat.json` when present; flags override them.

use clap::{Args, Parser, Subcommand};
use scriptcat_api::{
    discover_test_modules, module_list_json, ApiError, BuildConfig, Session,
    TemplateValue, DEFAULT_TEST_PATTERN,
};
use scriptcat_config::Phase;
use scriptcat_vfs::{LoggedLayer, NativeFileSystem, VfsBuilder, VirtualFileSystem};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};

mod config;
mod logging;

use crate::config::{parse_define, parse_level, parse_phase_level, LogConfig};
use crate::logging::LogFormat;

#[derive(Parser)]
#[command(
    name = "scriptcat",
    about = "Resolve and concatenate JavaScript modules",
    version
)]
struct Cli {
    /// Project file
    #[arg(long, global = true, default_value = "scriptcat.json")]
    config: PathBuf,

    /// Global log level: off, error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn", value_parser = parse_level)]
    log_level: LevelFilter,

    /// Per-phase log level, e.g. `resolve=debug` (repeatable)
    #[arg(long = "log-phase", global = true, value_parser = parse_phase_level)]
    log_phases: Vec<(Phase, LevelFilter)>,

    #[arg(long, global = true, value_enum, default_value = "compact")]
    log_format: LogFormat,

    /// Also append logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by the resolving commands
#[derive(Args)]
struct Target {
    /// Root modules by dotted name; replaces the project file's roots
    roots: Vec<String>,

    /// Directory module names resolve against
    #[arg(long)]
    base: Option<PathBuf>,

    /// Build a symbol index so `goog.require` lines resolve
    #[arg(long)]
    symbols: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Concatenate the roots and everything they need
    Build {
        #[command(flatten)]
        target: Target,

        /// Wrap the output in a function scope
        #[arg(long)]
        wrap: bool,

        /// Template define, KEY=VALUE or KEY (repeatable)
        #[arg(long = "define", short = 'D', value_parser = parse_define)]
        defines: Vec<(String, TemplateValue)>,

        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List the files the roots need, in load order
    Deps {
        #[command(flatten)]
        target: Target,

        /// Print a JSON array instead of one path per line
        #[arg(long)]
        json: bool,
    },

    /// Dump the symbol index as JSON
    Index {
        #[arg(long)]
        base: Option<PathBuf>,
    },

    /// Print the test modules of packages as a JSON array
    Tests {
        #[arg(required = true)]
        packages: Vec<String>,

        #[arg(long)]
        base: Option<PathBuf>,

        /// Child module file pattern
        #[arg(long, default_value = DEFAULT_TEST_PATTERN)]
        pattern: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig {
        global: cli.log_level,
        phases: cli.log_phases.iter().copied().collect(),
    };
    if let Err(e) = logging::init(&log_config, cli.log_format, cli.log_file.as_deref()) {
        eprintln!("Error: cannot initialise logging: {}", e);
        process::exit(1);
    }

    let fs: Arc<dyn VirtualFileSystem> = Arc::new(
        VfsBuilder::new(NativeFileSystem::new())
            .with(LoggedLayer::new())
            .build(),
    );

    if let Err(e) = run(cli, fs) {
        eprintln!("{}", e.to_report());
        process::exit(1);
    }
}

fn run(cli: Cli, fs: Arc<dyn VirtualFileSystem>) -> Result<(), ApiError> {
    let mut config = load_config(&*fs, &cli.config)?;

    match cli.command {
        Command::Build {
            target,
            wrap,
            defines,
            output,
        } => {
            apply_target(&mut config, target);
            config.wrap |= wrap;
            config.defines.extend(defines);
            if output.is_some() {
                config.output = output;
            }

            let mut session = Session::from_config(Arc::clone(&fs), &config)?;
            let built = session.build_config(&config)?;
            match &config.output {
                Some(path) => {
                    fs.write_file(path, built.text.as_bytes())
                        .map_err(scriptcat_api::ScriptError::from)?;
                    info!(target: "scriptcat::cli", path = %path.display(), scripts = built.scripts.len(), "wrote output");
                }
                None => print!("{}", built.text),
            }
        }

        Command::Deps { target, json } => {
            apply_target(&mut config, target);
            let mut session = Session::from_config(Arc::clone(&fs), &config)?;
            let roots = session.config_roots(&config);
            if roots.is_empty() {
                return Err(ApiError::NothingToBuild);
            }

            let mut files = Vec::new();
            for script in session.resolve(&roots)? {
                if let Some(path) = script.absolute_filename()? {
                    files.push(path.display().to_string());
                }
            }
            if json {
                println!("{}", module_list_json(&files));
            } else {
                for file in files {
                    println!("{}", file);
                }
            }
        }

        Command::Index { base } => {
            if let Some(base) = base {
                config.base = base;
            }
            let session = Session::new(fs, config.base.clone(), config.resolver.clone())
                .with_symbol_index()?;
            let symbols: BTreeMap<&str, &str> = session
                .index()
                .map(|index| index.symbols().collect())
                .unwrap_or_default();
            debug!(target: "scriptcat::cli", symbols = symbols.len(), "index dump");
            println!(
                "{}",
                serde_json::to_string_pretty(&symbols).unwrap_or_else(|_| "{}".to_string())
            );
        }

        Command::Tests {
            packages,
            base,
            pattern,
        } => {
            if let Some(base) = base {
                config.base = base;
            }
            let mut session = Session::new(fs, config.base.clone(), config.resolver.clone());
            let modules = discover_test_modules(&mut session, &packages, Some(pattern.as_str()))?;
            println!("{}", module_list_json(&modules));
        }
    }
    Ok(())
}

/// Read the project file. A relative `base` is taken relative to the file.
fn load_config(fs: &dyn VirtualFileSystem, path: &Path) -> Result<BuildConfig, ApiError> {
    let exists = fs.is_file(path);
    let mut config = BuildConfig::load(fs, path)?;
    if exists && config.base.is_relative() {
        let dir = path.parent().unwrap_or(Path::new(""));
        config.base = dir.join(&config.base);
    }
    debug!(target: "scriptcat::cli", from_file = exists, base = %config.base.display(), "config loaded");
    Ok(config)
}

fn apply_target(config: &mut BuildConfig, target: Target) {
    if !target.roots.is_empty() {
        config.roots = target.roots;
    }
    if let Some(base) = target.base {
        config.base = base;
    }
    config.symbols |= target.symbols;
}
