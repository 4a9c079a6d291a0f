//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Hierarchical URL index: turn crawl results and sitemaps into a host/path tree
#[derive(Parser, Debug)]
#[command(name = "sitetree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding a local .sitetree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the URL tree of a plain URL list or sitemap
    Tree {
        /// URL source (one URL per line, or sitemap XML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Only keep URLs containing this text (case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,

        /// Expand the ancestors of this URL (repeatable)
        #[arg(short, long)]
        reveal: Vec<String>,

        /// Expand every node
        #[arg(short, long)]
        all: bool,

        /// Load and save expansion state in this file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        state: Option<PathBuf>,

        /// Print the tree as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the node ids to expand to reveal a URL
    Chain {
        /// URL to reveal
        url: String,
    },

    /// Print counts for a URL source
    Stats {
        /// URL source (one URL per line, or sitemap XML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a commented config template
    Template,
    /// Show config file locations
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_repeated_reveal_when_parsing_then_collects_all() {
        let cli = Cli::parse_from([
            "sitetree",
            "-dd",
            "tree",
            "urls.txt",
            "--reveal",
            "https://a.com/x",
            "-r",
            "https://b.com/y",
        ]);
        assert_eq!(cli.debug, 2);
        match cli.command {
            Some(Commands::Tree { reveal, all, .. }) => {
                assert_eq!(reveal.len(), 2);
                assert!(!all);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
