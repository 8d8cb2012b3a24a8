//! Command-line host for Quire modules and plugins.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use quire_extension::{
    ExtensionAggregator, ExtensionConfig, ExtensionDescriptor, ExtensionKind, ExtensionManager,
    Module, Plugin,
};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, long_about = None)]
#[command(about = "Quire extension host - load, run and inspect modules and plugins")]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Configuration file (TOML).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Load an extension, call its entry point and unload it.
    Run {
        /// Logical name or path of the library.
        name: String,
        /// Extension kind.
        #[arg(short, long, value_enum, default_value_t = KindArg::Plugin)]
        kind: KindArg,
        /// Load and run a second time after unloading.
        #[arg(long)]
        reload: bool,
    },
    /// Load an extension and print its descriptor.
    Inspect {
        /// Logical name or path of the library.
        name: String,
        /// Extension kind.
        #[arg(short, long, value_enum, default_value_t = KindArg::Plugin)]
        kind: KindArg,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Print the effective loader configuration.
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Module,
    Plugin,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Run { name, kind, reload } => match kind {
            KindArg::Module => run_extension::<Module>(&config, &name, reload),
            KindArg::Plugin => run_extension::<Plugin>(&config, &name, reload),
        },
        Command::Inspect { name, kind, json } => match kind {
            KindArg::Module => inspect_extension::<Module>(&config, &name, json),
            KindArg::Plugin => inspect_extension::<Plugin>(&config, &name, json),
        },
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    // JSON logs for container environments
    let json_logging = std::env::var("QUIRE_LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let default_level = if verbose { "quire=debug" } else { "quire=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .init();
    }
}

/// Defaults, then the optional file, then environment overrides.
fn load_config(path: Option<&std::path::Path>) -> Result<ExtensionConfig> {
    let mut config = match path {
        Some(path) => ExtensionConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ExtensionConfig::default(),
    };
    config
        .apply_env()
        .context("invalid configuration from environment")?;
    Ok(config)
}

fn manager<K: ExtensionKind>(config: &ExtensionConfig) -> ExtensionManager<K> {
    ExtensionManager::new(config, Arc::new(ExtensionAggregator::new()))
}

fn run_extension<K: ExtensionKind>(
    config: &ExtensionConfig,
    name: &str,
    reload: bool,
) -> Result<()> {
    let manager = manager::<K>(config);
    let rounds = if reload { 2 } else { 1 };

    for round in 1..=rounds {
        let handle = manager
            .try_load(name)
            .with_context(|| format!("failed to load {} '{}'", K::NAME, name))?;
        let code_name = handle
            .extension()
            .and_then(|extension| extension.code_name().map(str::to_string))
            .unwrap_or_else(|| name.to_string());
        tracing::debug!(kind = K::NAME, name, round, "Running extension");
        handle.run();
        manager.unload(handle);
        println!("Ran {} '{}' (round {}/{})", K::NAME, code_name, round, rounds);
    }

    Ok(())
}

fn inspect_extension<K: ExtensionKind>(
    config: &ExtensionConfig,
    name: &str,
    json: bool,
) -> Result<()> {
    let manager = manager::<K>(config);
    let handle = manager
        .try_load(name)
        .with_context(|| format!("failed to load {} '{}'", K::NAME, name))?;
    let descriptor = manager
        .descriptor(handle.name())
        .with_context(|| format!("{} '{}' vanished during inspection", K::NAME, name))?;
    manager.unload(handle);

    if json {
        println!("{}", serde_json::to_string_pretty(&descriptor)?);
    } else {
        print_descriptor(&descriptor);
    }
    Ok(())
}

fn print_descriptor<K: ExtensionKind>(descriptor: &ExtensionDescriptor<K>) {
    fn line(label: &str, value: Option<impl std::fmt::Display>) {
        match value {
            Some(value) => println!("{:<14} {}", label, value),
            None => println!("{:<14} -", label),
        }
    }

    line("Kind:", Some(K::NAME));
    line("Code name:", descriptor.code_name());
    line("Name:", descriptor.name());
    line("Type:", descriptor.kind_type());
    line("Version:", descriptor.version());
    line("License:", descriptor.license());
    line("Compiled:", descriptor.compiled_date());
    line("Author:", descriptor.author());
    line("URL:", descriptor.url());
    line("Description:", descriptor.description());
}
