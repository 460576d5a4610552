//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::MemberId;

/// Organisational hierarchy manager: members, queries, import/export and rebalancing
#[derive(Parser, Debug)]
#[command(name = "teamtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Team file (default: team_file from config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath, env = "TEAMTREE_TEAM")]
    pub team: Option<PathBuf>,

    /// Directory holding .teamtree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, move, delete, demote and list members
    Member {
        #[command(subcommand)]
        command: MemberCommands,
    },

    /// Import, export, show and rebalance the whole team
    Team {
        #[command(subcommand)]
        command: TeamCommands,
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
pub enum MemberCommands {
    /// Add a member (under the root when no manager is given)
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Manager id
        #[arg(long)]
        manager: Option<MemberId>,
    },

    /// Move a member and its subtree under another manager
    Move {
        id: MemberId,
        /// New manager id
        #[arg(long)]
        manager: MemberId,
    },

    /// Delete a member; its employees move up one level
    Delete { id: MemberId },

    /// Demote a member to a leaf under another manager
    Demote {
        id: MemberId,
        /// New manager id
        #[arg(long)]
        manager: MemberId,
    },

    /// List members (filters are case-insensitive substrings)
    List {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        manager_email: Option<String>,
        #[arg(long)]
        employee_email: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// Replace the team with the contents of a JSON file
    Import {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Export the team as JSON
    Export {
        /// Output file (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Validate a JSON team file without importing it
    Check {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Rebalance toward INDEX direct reports per manager
    Rebalance {
        /// Balance index (default: balance_index from config)
        #[arg(allow_negative_numbers = true)]
        index: Option<i64>,
    },

    /// Show the team as a tree
    Tree,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Create a local config template
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
