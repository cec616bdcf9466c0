//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Live preview for TSX/JSX components
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: prevue.toml)
    #[arg(short = 'C', long, global = true, default_value = "prevue.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Source directory (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the preview server with live refresh
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Start a new render cycle when sources change
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },

    /// Print the synthesized preview document
    #[command(visible_alias = "r")]
    Render {
        /// Write the document to a file instead of stdout
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Render cycle number embedded in the document
        #[arg(long, default_value_t = 1)]
        cycle: u64,
    },

    /// Run one render cycle headlessly and report its outcome
    #[command(visible_alias = "c")]
    Check {
        /// Print the outcome as JSON
        #[arg(short, long)]
        json: bool,

        /// Keep checking every new render cycle until interrupted
        #[arg(short, long)]
        watch: bool,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve { .. })
    }
    pub const fn is_render(&self) -> bool {
        matches!(self.command, Commands::Render { .. })
    }
    pub const fn is_check(&self) -> bool {
        matches!(self.command, Commands::Check { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::parse_from(["prevue", "serve", "-p", "8080", "--watch", "false"]);
        let Commands::Serve { port, watch, interface } = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(port, Some(8080));
        assert_eq!(watch, Some(false));
        assert_eq!(interface, None);
        assert_eq!(cli.config, PathBuf::from("prevue.toml"));
    }

    #[test]
    fn test_bare_watch_flag_means_true() {
        let cli = Cli::parse_from(["prevue", "s", "-w"]);
        assert!(matches!(cli.command, Commands::Serve { watch: Some(true), .. }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["prevue", "check", "--json", "-v", "-d", "web"]);
        assert!(cli.verbose);
        assert_eq!(cli.dir, Some(PathBuf::from("web")));
        assert!(matches!(
            cli.command,
            Commands::Check {
                json: true,
                watch: false
            }
        ));
    }

    #[test]
    fn test_check_watch() {
        let cli = Cli::parse_from(["prevue", "c", "-w"]);
        assert!(matches!(cli.command, Commands::Check { watch: true, .. }));
    }

    #[test]
    fn test_render_defaults() {
        let cli = Cli::parse_from(["prevue", "render"]);
        assert!(matches!(
            cli.command,
            Commands::Render {
                output: None,
                cycle: 1
            }
        ));
    }
}
