use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "stac",
    about = "Read, render and validate STAC catalogs",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Configuration file (defaults to ./stac.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show a single document
    Show(ShowArgs),
    /// Print the catalog tree below a document
    Tree(TreeArgs),
    /// Assign hrefs to a catalog tree under a new root
    Render(RenderArgs),
    /// Validate documents against the STAC JSON schemas
    Validate(ValidateArgs),
    /// Show tool and STAC versions
    Version,
}

#[derive(Args)]
pub struct ShowArgs {
    pub href: String,
}

#[derive(Args)]
pub struct TreeArgs {
    pub href: String,
}

#[derive(Args)]
pub struct RenderArgs {
    pub href: String,
    /// Directory the rendered tree is rooted at
    #[arg(long)]
    pub root: String,
    /// Write every rendered document to its new location
    #[arg(long)]
    pub write: bool,
    /// Set every document's stac_version to the configured version
    #[arg(long)]
    pub upgrade: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    pub href: String,
    /// Local schema directory, overriding the configuration
    #[arg(long)]
    pub schemas: Option<PathBuf>,
    /// Validate every document below `href` as well
    #[arg(short, long)]
    pub recursive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_show() {
        let cli = Cli::try_parse_from(["stac", "show", "catalog.json"]).unwrap();
        if let Command::Show(args) = cli.command {
            assert_eq!(args.href, "catalog.json");
        } else { panic!("wrong command"); }
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_tree() {
        let cli = Cli::try_parse_from(["stac", "tree", "catalog.json"]).unwrap();
        assert!(matches!(cli.command, Command::Tree(_)));
    }

    #[test]
    fn parse_render() {
        let cli = Cli::try_parse_from(["stac", "render", "in/catalog.json", "--root", "out"]).unwrap();
        if let Command::Render(args) = cli.command {
            assert_eq!(args.href, "in/catalog.json");
            assert_eq!(args.root, "out");
            assert!(!args.write);
            assert!(!args.upgrade);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_render_write_upgrade() {
        let cli = Cli::try_parse_from([
            "stac", "render", "in/catalog.json", "--root", "out", "--write", "--upgrade",
        ])
        .unwrap();
        if let Command::Render(args) = cli.command {
            assert!(args.write);
            assert!(args.upgrade);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn render_requires_root() {
        assert!(Cli::try_parse_from(["stac", "render", "in/catalog.json"]).is_err());
    }

    #[test]
    fn parse_validate() {
        let cli = Cli::try_parse_from(["stac", "validate", "item.json"]).unwrap();
        if let Command::Validate(args) = cli.command {
            assert_eq!(args.href, "item.json");
            assert_eq!(args.schemas, None);
            assert!(!args.recursive);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_validate_schemas_recursive() {
        let cli = Cli::try_parse_from([
            "stac", "validate", "catalog.json", "--schemas", "/opt/schemas", "-r",
        ])
        .unwrap();
        if let Command::Validate(args) = cli.command {
            assert_eq!(args.schemas, Some(PathBuf::from("/opt/schemas")));
            assert!(args.recursive);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_version() {
        let cli = Cli::try_parse_from(["stac", "version"]).unwrap();
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn parse_global_format_json() {
        let cli = Cli::try_parse_from(["stac", "tree", "catalog.json", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        let cli = Cli::try_parse_from(["stac", "--format", "json", "version"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn parse_unknown_format_fails() {
        assert!(Cli::try_parse_from(["stac", "--format", "yaml", "version"]).is_err());
    }

    #[test]
    fn parse_verbose_and_config() {
        let cli = Cli::try_parse_from(["stac", "-v", "--config", "ci.toml", "version"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("ci.toml")));
    }

    #[test]
    fn parse_no_command_fails() {
        assert!(Cli::try_parse_from(["stac"]).is_err());
    }
}
