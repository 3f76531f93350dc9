use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Resolve themed components against the built-in demo catalog.
///
/// All command output is JSON on stdout; logs go to stderr and follow
/// `RUST_LOG`.
#[derive(Parser, Debug)]
#[command(name = "thematic", version, about)]
pub struct Cli {
    /// Path to the configuration file (defaults to THEMATIC_CONFIG_PATH or
    /// the platform config directory)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List registered components, their bindings and overridden themes
    Components,

    /// List configured themes with their ancestry
    Themes,

    /// Resolve a component through a wrapper and print the bound implementation
    Resolve(ResolveArgs),

    /// Show, set or clear the preferred theme
    Prefer(PreferArgs),

    /// Write a starter configuration file
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Component identity, e.g. ComcolPageContentComponent
    pub identity: String,

    /// Theme to resolve for (overrides every other theme source)
    #[arg(long, short = 't')]
    pub theme: Option<String>,

    /// Input value as name=value; JSON values are parsed, anything else is a string
    #[arg(long = "input", short = 'i', value_name = "NAME=VALUE")]
    pub inputs: Vec<String>,
}

#[derive(Args, Debug)]
pub struct PreferArgs {
    /// Theme to remember as preferred
    #[arg(conflicts_with = "clear")]
    pub theme: Option<String>,

    /// Forget the preferred theme
    #[arg(long)]
    pub clear: bool,
}

#[derive(Args, Debug)]
pub struct InitConfigArgs {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resolve_with_inputs() {
        let cli = Cli::parse_from([
            "thematic",
            "resolve",
            "ComcolPageContentComponent",
            "--theme",
            "custom",
            "-i",
            "title=X",
            "--input",
            "hasInnerHtml=true",
        ]);
        let Command::Resolve(args) = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(args.identity, "ComcolPageContentComponent");
        assert_eq!(args.theme.as_deref(), Some("custom"));
        assert_eq!(args.inputs, vec!["title=X", "hasInnerHtml=true"]);
    }

    #[test]
    fn prefer_rejects_theme_with_clear() {
        assert!(Cli::try_parse_from(["thematic", "prefer", "custom", "--clear"]).is_err());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["thematic", "themes", "--config", "/tmp/thematic.yaml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/thematic.yaml")));
        assert!(matches!(cli.command, Command::Themes));
    }
}
