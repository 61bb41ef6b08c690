// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Forgeyard CLI - inventory and project-board migration for a forge organization

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use forgeyard::commands::{self, Session};
use forgeyard::config::{default_config_path, load_settings, Config, RunOptions};
use forgeyard::output::Format;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "forgeyard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "FORGEYARD_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// API access token
    #[arg(short, long, env = "GITHUB_ACCESS_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Organization to work on
    #[arg(long, global = true)]
    org: Option<String>,

    /// Skip archived repositories and closed projects
    #[arg(long, global = true)]
    skip_archived: bool,

    /// Stop after this many items (0 = no limit)
    #[arg(long, default_value_t = 0, global = true)]
    limit: usize,

    /// Append records to this file instead of stdout
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    /// Record encoding
    #[arg(long, value_enum, default_value_t = Format::Json, global = true)]
    format: Format,

    /// Pretty-print JSON
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the organization's repositories
    ListRepos,

    /// Report the CI posture of repositories
    ScanCi {
        /// Repository names (`name` or `owner/name`)
        repos: Vec<String>,

        /// File with one repository name per line
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// List every repository and report its CI posture
    ListAndScan,

    /// Report which version of a Go module each repository pins
    ListModuleRefs {
        /// Module path to look for
        #[arg(long)]
        module: String,
    },

    /// Raw GET against the API
    Query {
        /// API path or absolute URL
        path: String,

        /// Ask for the raw media type
        #[arg(long)]
        raw: bool,
    },

    /// Transfer a repository to another organization
    TransferRepo {
        /// Repository (`name` or `owner/name`)
        repo: String,

        /// Destination organization
        new_owner: String,

        /// Team to grant access in the destination (repeatable)
        #[arg(long = "team")]
        teams: Vec<u64>,
    },

    /// Project board commands
    #[command(subcommand)]
    Projects(ProjectCommands),

    /// Show the effective configuration
    Config {
        /// Single key to print
        key: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// List the organization's projects
    List,

    /// Fetch one project
    Get {
        /// Project identity
        id: String,

        /// Skip columns and cards
        #[arg(long)]
        shallow: bool,
    },

    /// Delete every column of a project
    Clear {
        /// Project identity
        id: u64,
    },

    /// Copy a project's columns and cards to another project
    Migrate(MigrateArgs),
}

#[derive(Args)]
struct MigrateArgs {
    /// Source project identity, or a snapshot path with --from-file
    source: String,

    /// Destination project; a new one is created when omitted
    #[arg(long)]
    dest: Option<u64>,

    /// Read the source from a snapshot written by `projects get`
    #[arg(long)]
    from_file: bool,
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            token: self.token.clone(),
            org: self.org.clone(),
            skip_archived: self.skip_archived,
            limit: self.limit,
            output: self.out.clone(),
            format: self.format,
            pretty: self.pretty,
            color: !self.no_color,
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match verbose {
        0 if quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    // Commands that never touch the network
    match &cli.command {
        Commands::Completions { shell } => return commands::completions::run(*shell, Cli::command()),
        Commands::Config { key } => {
            let settings = load_settings(cli.config.as_deref()).context("Failed to load configuration")?;
            let file = cli.config.clone().or_else(default_config_path);
            let token_set = cli.token.as_deref().is_some_and(|t| !t.trim().is_empty());
            return commands::config::run(&settings, file.as_deref(), key.as_deref(), token_set);
        }
        _ => {}
    }

    let settings = load_settings(cli.config.as_deref()).context("Failed to load configuration")?;
    let config = Config::resolve(settings, cli.run_options())?;
    tracing::debug!(?config, "resolved configuration");

    let mut session = Session::open(config)?;
    let result = dispatch(&mut session, cli.command);
    let flushed = session.finish();
    result?;
    flushed?;
    Ok(())
}

fn dispatch(session: &mut Session, command: Commands) -> Result<()> {
    match command {
        Commands::ListRepos => commands::repos::run(session),
        Commands::ScanCi { repos, file } => commands::scan::run(session, repos, file.as_deref()),
        Commands::ListAndScan => commands::scan::list_and_scan(session),
        Commands::ListModuleRefs { module } => commands::modules::run(session, &module),
        Commands::Query { path, raw } => commands::query::run(session, &path, raw),
        Commands::TransferRepo {
            repo,
            new_owner,
            teams,
        } => commands::transfer::run(session, &repo, &new_owner, &teams),
        Commands::Projects(project) => match project {
            ProjectCommands::List => commands::projects::list(session),
            ProjectCommands::Get { id, shallow } => commands::projects::get(session, &id, shallow),
            ProjectCommands::Clear { id } => commands::projects::clear(session, id),
            ProjectCommands::Migrate(args) => {
                commands::projects::migrate_project(session, &args.source, args.dest, args.from_file)
            }
        },
        Commands::Config { .. } | Commands::Completions { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_migrate() {
        let cli = Cli::try_parse_from([
            "forgeyard",
            "projects",
            "migrate",
            "snapshot.json",
            "--from-file",
            "--dest",
            "42",
            "--org",
            "acme",
        ])
        .unwrap();
        let Commands::Projects(ProjectCommands::Migrate(args)) = cli.command else {
            panic!("expected projects migrate");
        };
        assert_eq!(args.source, "snapshot.json");
        assert_eq!(args.dest, Some(42));
        assert!(args.from_file);
        assert_eq!(cli.org.as_deref(), Some("acme"));
    }

    #[test]
    fn test_parse_transfer_teams() {
        let cli = Cli::try_parse_from([
            "forgeyard", "transfer-repo", "widget", "acme-archive", "--team", "7", "--team", "9",
        ])
        .unwrap();
        let Commands::TransferRepo { teams, .. } = cli.command else {
            panic!("expected transfer-repo");
        };
        assert_eq!(teams, vec![7, 9]);
    }
}
