//! Command dispatch: each invocation imports the team file, runs one
//! operation and exports the file again if the team changed.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::{IoResultExt, MemberInput};
use crate::cli::args::{Cli, Commands, ConfigCommands, MemberCommands, TeamCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{Member, MemberArena, MemberQuery};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::tree_traits::TreeDisplay;

/// One row of `member list`.
#[derive(Debug, Serialize)]
struct MemberRow {
    id: String,
    name: String,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    manager_email: Option<String>,
    employees: usize,
}

impl MemberRow {
    fn new(tree: &MemberArena, member: &Member) -> Self {
        Self {
            id: member.id().to_string(),
            name: member.name.clone(),
            email: member.email.clone(),
            manager_email: member
                .manager()
                .and_then(|m| tree.get(m))
                .map(|m| m.email.clone()),
            employees: member.employees().len(),
        }
    }
}

/// Loaded services plus the team file they were loaded from.
struct Session {
    container: ServiceContainer,
    team_file: PathBuf,
}

impl Session {
    fn open(cli: &Cli) -> CliResult<Self> {
        let settings = load_settings(cli)?;
        let team_file = cli
            .team
            .clone()
            .unwrap_or_else(|| settings.team_file.clone());
        let container = ServiceContainer::new(settings);
        let loaded = container.load_team(&team_file)?;
        debug!("session: team_file={} loaded={}", team_file.display(), loaded);
        Ok(Self {
            container,
            team_file,
        })
    }

    fn save(&self) -> CliResult<()> {
        self.container.save_team(&self.team_file)?;
        Ok(())
    }
}

fn project_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.project_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("determine current directory", e).into()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let dir = project_dir(cli)?;
    Ok(Settings::load(Some(&dir))?)
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Member { command }) => execute_member(&Session::open(cli)?, command),
        Some(Commands::Team { command }) => execute_team(&Session::open(cli)?, command),
        Some(Commands::Config { command }) => execute_config(cli, command),
        Some(Commands::Completion { shell }) => {
            print_completions(*shell);
            Ok(())
        }
        None => Ok(()),
    }
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

#[instrument(skip(session))]
fn execute_member(session: &Session, command: &MemberCommands) -> CliResult<()> {
    let hierarchy = &session.container.hierarchy;
    let team = &session.container.team;
    match command {
        MemberCommands::Add {
            name,
            email,
            manager,
        } => {
            let input = MemberInput::new(name.as_str(), email.as_str());
            let id = hierarchy.write(|store| team.create_member(store, &input, *manager))?;
            session.save()?;
            output::action("Added", &id);
        }
        MemberCommands::Move { id, manager } => {
            let moved = hierarchy.write(|store| {
                store
                    .update_manager(*id, *manager)
                    .map(|m| m.to_string())
            })?;
            session.save()?;
            output::action("Moved", &moved);
        }
        MemberCommands::Delete { id } => {
            let removed = hierarchy.write(|store| store.delete_member(*id))?;
            session.save()?;
            output::action("Deleted", &removed);
        }
        MemberCommands::Demote { id, manager } => {
            let demoted = hierarchy.write(|store| {
                store
                    .demote_manager(*id, *manager)
                    .map(|m| m.to_string())
            })?;
            session.save()?;
            output::action("Demoted", &demoted);
        }
        MemberCommands::List {
            name,
            email,
            manager_email,
            employee_email,
            json,
        } => {
            let query = MemberQuery {
                name: name.clone(),
                email: email.clone(),
                manager_email: manager_email.clone(),
                employee_email: employee_email.clone(),
            };
            let rows = hierarchy.read(|store| {
                Ok(store
                    .get_members(&query)
                    .into_iter()
                    .map(|m| MemberRow::new(store.tree(), m))
                    .collect::<Vec<_>>())
            })?;
            print_rows(&rows, *json)?;
        }
    }
    Ok(())
}

fn print_rows(rows: &[MemberRow], json: bool) -> CliResult<()> {
    if json {
        let rendered = serde_json::to_string_pretty(rows)
            .map_err(|e| CliError::Usage(format!("render members: {}", e)))?;
        output::info(&rendered);
        return Ok(());
    }
    if rows.is_empty() {
        output::warning("no members matched");
        return Ok(());
    }
    let lines = rows
        .iter()
        .map(|r| {
            format!(
                "{}  {} <{}>  manager: {}  employees: {}",
                r.id,
                r.name,
                r.email,
                r.manager_email.as_deref().unwrap_or("-"),
                r.employees
            )
        })
        .join("\n");
    output::info(&lines);
    Ok(())
}

#[instrument(skip(session))]
fn execute_team(session: &Session, command: &TeamCommands) -> CliResult<()> {
    let container = &session.container;
    let hierarchy = &container.hierarchy;
    match command {
        TeamCommands::Import { file } => {
            let root = hierarchy.write(|store| container.team.import_file(store, file))?;
            session.save()?;
            let count = hierarchy.read(|store| Ok(store.len()))?;
            output::success(&format!("Imported {} members (root {})", count, root));
        }
        TeamCommands::Export { output: target } => {
            let pretty = container.settings.pretty;
            let json = hierarchy.read(|store| container.team.export_json(store, pretty))?;
            match target {
                Some(path) => {
                    write_file(container, path, &json)?;
                    output::action("Exported", &path.display());
                }
                None => output::info(&json),
            }
        }
        TeamCommands::Check { file } => {
            let text = container
                .fs
                .read_to_string(file)
                .with_path_context("read team file", file)?;
            let tree = container.team.parse_team(&text)?;
            output::success(&format!(
                "{}: {} members, {} levels",
                file.display(),
                tree.len(),
                tree.height()
            ));
        }
        TeamCommands::Rebalance { index } => {
            let index = index.unwrap_or(container.settings.balance_index);
            let rendered = hierarchy.write(|store| {
                store.rebalance(index)?;
                Ok(store.tree().to_tree_string().to_string())
            })?;
            session.save()?;
            output::header(&format!("Rebalanced (index {})", index));
            output::info(rendered.trim_end());
        }
        TeamCommands::Tree => {
            let rendered = hierarchy.read(|store| Ok(store.tree().to_tree_string().to_string()))?;
            output::info(rendered.trim_end());
        }
    }
    Ok(())
}

fn write_file(container: &ServiceContainer, path: &Path, content: &str) -> CliResult<()> {
    container
        .fs
        .write(path, &format!("{}\n", content))
        .with_path_context("write export", path)?;
    Ok(())
}

fn execute_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(settings.to_toml()?.trim_end());
        }
        ConfigCommands::Path => {
            let dir = project_dir(cli)?;
            let global = global_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string());
            output::detail(&format!("global: {}", global));
            output::detail(&format!("local:  {}", local_config_path(&dir).display()));
        }
        ConfigCommands::Init { force } => {
            let path = local_config_path(&project_dir(cli)?);
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
        }
    }
    Ok(())
}
