use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use auth_config::{
    AuthConfigFactory, AuthConfigFactoryConfig, AuthConfigProvider, InMemoryConfigSource, RawProperties,
    RegistrationId, RegistrationKey, build_factory, init_file_logging,
};
use clap::{Args, Parser, Subcommand};

/// Auth Config CLI - inspect and edit auth config provider registrations
#[derive(Parser)]
#[command(name = "auth-config-cli")]
#[command(about = "Inspect and edit auth config provider registrations")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Start from an empty in-memory store instead of the configured file
    #[arg(long)]
    in_memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Scope {
    /// Message layer; omit for all layers
    #[arg(long)]
    layer: Option<String>,

    /// Application context; omit for all contexts
    #[arg(long)]
    app_context: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List active registrations as JSON
    List,
    /// Resolve the provider for a layer and app context
    Lookup(Scope),
    /// Register a provider class and persist it to the store
    Register {
        /// Provider class name
        #[arg(long = "class")]
        class_name: String,

        #[command(flatten)]
        scope: Scope,

        #[arg(long)]
        description: Option<String>,

        /// Initialization property as KEY=VALUE (repeatable)
        #[arg(long = "property", value_parser = parse_property)]
        properties: Vec<(String, String)>,
    },
    /// Remove a registration by id, or by layer and app context
    Remove {
        /// Registration id as printed by `list`
        #[arg(long, conflicts_with_all = ["layer", "app_context"])]
        id: Option<String>,

        #[command(flatten)]
        scope: Scope,
    },
    /// Reload the store and print what changed
    Refresh,
    /// Validate configuration and store, then exit
    Check,
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref path) = cli.config
        && !Path::new(path).is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    // Layered config: defaults -> YAML (if provided) -> env
    let mut config = AuthConfigFactoryConfig::load(cli.config.as_deref())?;
    if let Some(level) = verbosity_level(cli.verbose) {
        config.log_level = level.into();
    }

    let _log_guard = init_file_logging(&config).context("failed to initialize logging")?;
    tracing::info!("auth config cli starting");

    let catalog = static_auth_config_plugin::catalog();
    let factory = if cli.in_memory {
        AuthConfigFactory::new(Arc::new(InMemoryConfigSource::new()), catalog)
    } else {
        build_factory(&config, catalog)?
    };

    run(&factory, cli.command)
}

fn verbosity_level(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("debug"),
        _ => Some("trace"),
    }
}

fn run(factory: &AuthConfigFactory, command: Commands) -> Result<()> {
    match command {
        Commands::List => list(factory),
        Commands::Lookup(scope) => {
            lookup(factory, &scope);
            Ok(())
        }
        Commands::Register {
            class_name,
            scope,
            description,
            properties,
        } => {
            let properties: RawProperties = properties
                .into_iter()
                .map(|(k, v)| (k, serde_json::Value::String(v)))
                .collect();
            let id = factory.register_class(
                &class_name,
                Some(properties),
                scope.layer.as_deref(),
                scope.app_context.as_deref(),
                description.as_deref(),
            )?;
            println!("{id}");
            Ok(())
        }
        Commands::Remove { id, scope } => {
            let id = id.map_or_else(
                || {
                    RegistrationId::for_key(&RegistrationKey::new(
                        scope.layer.as_deref(),
                        scope.app_context.as_deref(),
                    ))
                },
                RegistrationId::from_raw,
            );
            if factory.remove_registration(&id) {
                println!("removed {id} (store unchanged)");
            } else {
                println!("no registration {id}");
            }
            Ok(())
        }
        Commands::Refresh => {
            let summary = factory.refresh()?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Commands::Check => {
            println!("Configuration is valid");
            println!("registrations: {}", factory.len());
            println!("provider classes: {}", factory.catalog().class_names().join(", "));
            Ok(())
        }
    }
}

fn list(factory: &AuthConfigFactory) -> Result<()> {
    let rows = factory.registrations();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn lookup(factory: &AuthConfigFactory, scope: &Scope) {
    let provider = factory.get_config_provider(
        scope.layer.as_deref(),
        scope.app_context.as_deref(),
        None,
    );
    if let Some(p) = provider {
        println!("{}", p.class_name());
    } else {
        println!("none");
    }
}
