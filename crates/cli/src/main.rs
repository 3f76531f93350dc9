use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use thematic_engine::ThemedResolver;
use thematic_util::{ThemePreferences, default_config_path, load_config, load_config_from_path};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod commands;

use cli::{Cli, Command, InitConfigArgs, PreferArgs, ResolveArgs};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Cli::parse();

    // init-config must work before a valid config exists.
    if let Command::InitConfig(InitConfigArgs { force }) = &args.command {
        let path = args.config.clone().unwrap_or_else(default_config_path);
        return print_json(&commands::init_config(&path, *force)?);
    }

    let config = match &args.config {
        Some(path) => load_config_from_path(path)?,
        None => load_config()?,
    };
    let registry = Arc::new(catalog::demo_registry()?);
    let resolver = Arc::new(ThemedResolver::from_config(Arc::clone(&registry), &config)?);
    let preferences = ThemePreferences::open_default().unwrap_or_else(|error| {
        warn!(error = %error, "preferences unavailable; using in-memory store");
        ThemePreferences::in_memory()
    });
    debug!(components = registry.len(), themes = resolver.catalog().len(), "catalog loaded");

    let output = match args.command {
        Command::Components => commands::components_report(&registry),
        Command::Themes => {
            let active = commands::select_theme(None, &config, &preferences);
            commands::themes_report(resolver.catalog(), &active)
        }
        Command::Resolve(ResolveArgs { identity, theme, inputs }) => {
            let theme = commands::select_theme(theme.as_deref(), &config, &preferences);
            let inputs = commands::parse_inputs(&inputs)?;
            commands::resolve_report(resolver, &identity, theme, inputs).await?
        }
        Command::Prefer(PreferArgs { theme, clear }) => commands::prefer_theme(&preferences, resolver.catalog(), theme, clear)?,
        Command::InitConfig(_) => unreachable!("handled before loading configuration"),
    };
    print_json(&output)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
