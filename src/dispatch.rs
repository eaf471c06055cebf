//! Startup driver: registry population, alias expansion, parsing and
//! hand-off to the selected sub-command executable.
//!
//! A [`Dispatcher`] moves through [`DispatchState`] in one direction:
//!
//! ```text
//! Uninitialized → BaseCommandsRegistered → AliasesRegistered
//!     → ArgumentsExpanded | ExpansionSkipped → Dispatched
//! ```
//!
//! Any error ends the run; nothing is retried.

use std::path::{Path, PathBuf};

use clap::{Arg, ArgAction};

use crate::alias::{self, ENTRYPOINT_ARGS};
use crate::config::PackageConfigReader;
use crate::errors::DispatchError;
use crate::registry::{CommandDefinition, CommandKind, Registry};

/// Progress of a dispatcher through one process run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Uninitialized,
    BaseCommandsRegistered,
    AliasesRegistered,
    ArgumentsExpanded,
    ExpansionSkipped,
    Dispatched,
}

/// A parsed request to run a sub-command executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    /// Run the executable with inherited stdio and return its exit code.
    ///
    /// A child killed by a signal reports exit code 1.
    pub async fn spawn(&self) -> Result<i32, DispatchError> {
        tracing::debug!(
            program = %self.program.display(),
            args = ?self.args,
            "Dispatching command"
        );

        let status = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .status()
            .await
            .map_err(|source| DispatchError::SpawnFailed {
                path: self.program.clone(),
                source,
            })?;

        Ok(status.code().unwrap_or(1))
    }
}

/// Whether the dispatcher's own `-v/--verbose` flag appears before the
/// command name.
pub fn wants_verbose(raw_args: &[String]) -> bool {
    raw_args
        .iter()
        .skip(ENTRYPOINT_ARGS)
        .take_while(|arg| arg.starts_with('-'))
        .any(|arg| arg == "-v" || arg == "--verbose")
}

/// Render the parser's command table from the registry.
///
/// Each entry becomes a subcommand that accepts arbitrary trailing arguments,
/// including `--help`, so they reach the sub-command executable untouched.
pub fn build_command(registry: &Registry) -> clap::Command {
    let root = clap::Command::new(registry.resolver().cli_name().to_string())
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .disable_help_subcommand(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Show debug output from the dispatcher"),
        );

    registry.commands().iter().fold(root, |root, entry| {
        root.subcommand(
            clap::Command::new(entry.name.clone())
                .about(entry.description.clone())
                .disable_help_flag(true)
                .arg(
                    Arg::new("args")
                        .value_name("ARGS")
                        .num_args(0..)
                        .trailing_var_arg(true)
                        .allow_hyphen_values(true),
                ),
        )
    })
}

/// Owns the registry for one run and drives it from startup to dispatch.
#[derive(Debug)]
pub struct Dispatcher {
    registry: Registry,
    reader: PackageConfigReader,
    commands: Vec<(CommandDefinition, bool)>,
    state: DispatchState,
}

impl Dispatcher {
    /// Dispatcher for the `and-cli` binary in `project_dir`, reading
    /// configuration from the nearest project file or `AND_CLI_CONFIG`.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        let project_dir = project_dir.as_ref();
        Self::with_registry(
            Registry::new(project_dir),
            PackageConfigReader::from_env(project_dir),
        )
    }

    pub fn with_registry(registry: Registry, reader: PackageConfigReader) -> Self {
        Self {
            registry,
            reader,
            commands: Vec::new(),
            state: DispatchState::Uninitialized,
        }
    }

    /// Register an additional command alongside the base commands.
    pub fn with_command(mut self, def: CommandDefinition, override_if_registered: bool) -> Self {
        self.commands.push((def, override_if_registered));
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Read configuration and populate the registry.
    pub async fn prepare(&mut self) -> Result<(), DispatchError> {
        let config = self.reader.read().await;
        let installed = config.is_installed_dependency(self.registry.resolver().cli_name());

        self.registry.initialize(installed)?.register_all_base(false)?;
        for (def, override_if_registered) in &self.commands {
            self.registry
                .try_register(def.clone(), *override_if_registered);
        }
        self.state = DispatchState::BaseCommandsRegistered;

        self.registry.register_aliases_from_config(&config, false);
        self.state = DispatchState::AliasesRegistered;
        Ok(())
    }

    /// Replace `raw_args` with an alias expansion when it names one.
    pub fn expand(&mut self, raw_args: Vec<String>) -> Vec<String> {
        let Some(expanded) = alias::expand_if_alias(&self.registry, &raw_args) else {
            self.state = DispatchState::ExpansionSkipped;
            return raw_args;
        };

        tracing::info!(
            "Expanding alias '{}' to '{}'",
            raw_args[ENTRYPOINT_ARGS],
            expanded.join(" ")
        );
        self.state = DispatchState::ArgumentsExpanded;

        raw_args
            .into_iter()
            .take(ENTRYPOINT_ARGS)
            .chain(expanded)
            .collect()
    }

    /// Parse an effective argument vector into an invocation.
    pub fn parse(&self, args: &[String]) -> Result<Invocation, DispatchError> {
        let matches = build_command(&self.registry).try_get_matches_from(args)?;

        let name = matches
            .subcommand_name()
            .ok_or_else(|| {
                clap::Error::new(clap::error::ErrorKind::MissingSubcommand)
                    .with_cmd(&build_command(&self.registry))
            })?
            .to_string();

        // The first token equal to the subcommand name is the subcommand
        // itself; root flags never collide with command names.
        let passthrough = args
            .iter()
            .skip(ENTRYPOINT_ARGS)
            .position(|arg| *arg == name)
            .map(|index| args[ENTRYPOINT_ARGS + index + 1..].to_vec())
            .unwrap_or_default();

        let Some(entry) = self.registry.get(&name) else {
            return Err(clap::Error::new(clap::error::ErrorKind::InvalidSubcommand)
                .with_cmd(&build_command(&self.registry))
                .into());
        };

        match &entry.kind {
            CommandKind::Base { path } => Ok(Invocation {
                command: entry.name.clone(),
                program: path.clone(),
                args: passthrough,
            }),
            CommandKind::Alias { expansion } => Err(DispatchError::AliasNotExpanded {
                alias: entry.name.clone(),
                expansion: expansion.clone(),
            }),
        }
    }

    /// Run the full startup sequence and the selected sub-command.
    pub async fn run(mut self, raw_args: Vec<String>) -> Result<i32, DispatchError> {
        self.prepare().await?;
        let args = self.expand(raw_args);
        let invocation = self.parse(&args)?;
        let code = invocation.spawn().await?;
        self.state = DispatchState::Dispatched;
        Ok(code)
    }
}
