//! The live command table exposed to the argument parser.
//!
//! A [`Registry`] owns every command the dispatcher knows about for one
//! process run: base commands from the [catalog](crate::catalog), aliases from
//! project configuration, and anything an embedding crate registers itself.
//!
//! Two invariants hold after every mutation:
//!
//! - names are unique under case-insensitive comparison
//! - entries are ordered by case-insensitive name
//!
//! ```
//! use and_cli::registry::{CommandDefinition, Registry};
//!
//! let mut registry = Registry::new("/work/project");
//! registry
//!     .initialize(false)?
//!     .register_all_base(false)?
//!     .register_alias(
//!         CommandDefinition::new("testdb", "dotnet --cli -- test db migrate"),
//!         false,
//!     );
//!
//! assert!(registry.get("DOTNET").is_some());
//! assert!(registry.get("testdb").unwrap().is_alias());
//! # Ok::<(), and_cli::errors::RegistryError>(())
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::{self, CLI_NAME};
use crate::config::ProjectConfig;
use crate::errors::RegistryError;
use crate::resolver::{InstallMode, PathResolver};

/// Prefix added to alias descriptions so they stand out in help output.
pub const ALIAS_MARKER: &str = "(alias) ";

/// A command name and its human-readable description.
///
/// For aliases the description is the expansion string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    pub command: String,
    pub description: String,
}

impl CommandDefinition {
    pub fn new(command: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            description: description.into(),
        }
    }
}

/// What selecting a registered command does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// Run the executable at `path`.
    Base { path: PathBuf },
    /// Replace the argument vector with `expansion`.
    Alias { expansion: String },
}

/// An entry in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredCommand {
    pub name: String,
    /// Description as shown in help output (aliases carry [`ALIAS_MARKER`]).
    pub description: String,
    pub kind: CommandKind,
    key: String,
}

impl RegisteredCommand {
    fn new(name: String, description: String, kind: CommandKind) -> Self {
        let key = name.to_lowercase();
        Self {
            name,
            description,
            kind,
            key,
        }
    }

    pub fn is_alias(&self) -> bool {
        matches!(self.kind, CommandKind::Alias { .. })
    }

    /// Executable path, for base commands.
    pub fn path(&self) -> Option<&Path> {
        match &self.kind {
            CommandKind::Base { path } => Some(path),
            CommandKind::Alias { .. } => None,
        }
    }

    /// Expansion string, for aliases.
    pub fn expansion(&self) -> Option<&str> {
        match &self.kind {
            CommandKind::Alias { expansion } => Some(expansion),
            CommandKind::Base { .. } => None,
        }
    }

    /// The definition this entry was registered from, with the alias marker
    /// stripped from the description.
    pub fn definition(&self) -> CommandDefinition {
        let description = match self.kind {
            CommandKind::Alias { .. } => self
                .description
                .strip_prefix(ALIAS_MARKER)
                .unwrap_or(&self.description),
            CommandKind::Base { .. } => &self.description,
        };
        CommandDefinition::new(self.name.clone(), description)
    }
}

/// Outcome of a single registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The name was new.
    Added,
    /// An existing entry was replaced because override was requested.
    Replaced,
    /// Nothing changed; a warning was logged.
    Skipped,
}

impl Registration {
    pub fn is_registered(&self) -> bool {
        !matches!(self, Registration::Skipped)
    }
}

/// Ordered, case-insensitively unique table of commands.
#[derive(Debug, Clone)]
pub struct Registry {
    commands: Arc<Vec<RegisteredCommand>>,
    resolver: PathResolver,
    mode: Option<InstallMode>,
}

impl Registry {
    /// Create an empty registry for the `and-cli` binary rooted at
    /// `project_dir`.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self::with_cli_name(CLI_NAME, project_dir)
    }

    /// Create an empty registry whose executables are named
    /// `<cli_name>-<command>`.
    pub fn with_cli_name(cli_name: impl Into<String>, project_dir: impl AsRef<Path>) -> Self {
        Self {
            commands: Arc::new(Vec::new()),
            resolver: PathResolver::new(cli_name, project_dir),
            mode: None,
        }
    }

    // =========================================
    // Initialization
    // =========================================

    /// Set the path-resolution mode. May be called once per registry.
    pub fn initialize(&mut self, is_installed_dependency: bool) -> Result<&mut Self, RegistryError> {
        if self.mode.is_some() {
            return Err(RegistryError::AlreadyInitialized);
        }
        let mode = InstallMode::from_installed_flag(is_installed_dependency);
        tracing::debug!(%mode, "Initialized command registry");
        self.mode = Some(mode);
        Ok(self)
    }

    pub fn is_initialized(&self) -> bool {
        self.mode.is_some()
    }

    /// Current path-resolution mode. An uninitialized registry resolves
    /// paths as a development checkout.
    pub fn mode(&self) -> InstallMode {
        self.mode.unwrap_or_default()
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Executable path for `command` under the current mode.
    pub fn resolve_path(&self, command: &str) -> PathBuf {
        self.resolver.resolve(command, self.mode())
    }

    // =========================================
    // Registration
    // =========================================

    /// Register a command whose executable follows the naming convention.
    pub fn register(&mut self, def: CommandDefinition, override_if_registered: bool) -> &mut Self {
        self.try_register(def, override_if_registered);
        self
    }

    /// Like [`register`](Self::register), reporting what happened.
    pub fn try_register(
        &mut self,
        def: CommandDefinition,
        override_if_registered: bool,
    ) -> Registration {
        if def.command.trim().is_empty() {
            tracing::warn!("Ignoring command registration with an empty name");
            return Registration::Skipped;
        }

        let path = self.resolve_path(&def.command);
        let entry = RegisteredCommand::new(def.command, def.description, CommandKind::Base { path });
        self.insert(entry, override_if_registered)
    }

    /// Register each definition in order. Empty input is a no-op.
    pub fn register_many(
        &mut self,
        defs: &[CommandDefinition],
        override_if_registered: bool,
    ) -> &mut Self {
        for def in defs {
            self.try_register(def.clone(), override_if_registered);
        }
        self
    }

    /// Register a command from the built-in catalog.
    ///
    /// An empty or unknown name is a packaging defect and returns a fatal
    /// [`RegistryError::UnknownBaseCommand`].
    pub fn register_base(
        &mut self,
        name: &str,
        override_if_registered: bool,
    ) -> Result<&mut Self, RegistryError> {
        let base = catalog::find(name)
            .filter(|_| !name.is_empty())
            .ok_or_else(|| RegistryError::UnknownBaseCommand {
                name: name.to_string(),
                available: catalog::available_names(),
            })?;

        self.try_register(base.to_definition(), override_if_registered);
        Ok(self)
    }

    /// Register every command in the built-in catalog.
    pub fn register_all_base(
        &mut self,
        override_if_registered: bool,
    ) -> Result<&mut Self, RegistryError> {
        for base in catalog::BASE_COMMANDS {
            self.register_base(base.name, override_if_registered)?;
        }
        Ok(self)
    }

    /// Register a user alias. `def.description` is the expansion string.
    pub fn register_alias(
        &mut self,
        def: CommandDefinition,
        override_if_registered: bool,
    ) -> &mut Self {
        self.try_register_alias(def, override_if_registered);
        self
    }

    /// Like [`register_alias`](Self::register_alias), reporting what happened.
    pub fn try_register_alias(
        &mut self,
        def: CommandDefinition,
        override_if_registered: bool,
    ) -> Registration {
        if def.command.trim().is_empty() {
            tracing::warn!("Ignoring alias registration with an empty name");
            return Registration::Skipped;
        }
        if def.description.split_whitespace().next().is_none() {
            tracing::warn!(
                "Alias '{}' has an empty expansion and was not registered",
                def.command
            );
            return Registration::Skipped;
        }

        let description = format!("{}{}", ALIAS_MARKER, def.description);
        let entry = RegisteredCommand::new(
            def.command,
            description,
            CommandKind::Alias {
                expansion: def.description,
            },
        );
        self.insert(entry, override_if_registered)
    }

    /// Register every alias from a parsed project configuration.
    pub fn register_aliases_from_config(
        &mut self,
        config: &ProjectConfig,
        override_if_registered: bool,
    ) -> &mut Self {
        self.register_aliases(&config.aliases, override_if_registered)
    }

    /// Register aliases from a name -> expansion map. Empty input is a no-op.
    pub fn register_aliases(
        &mut self,
        aliases: &BTreeMap<String, String>,
        override_if_registered: bool,
    ) -> &mut Self {
        for (command, expansion) in aliases {
            self.try_register_alias(
                CommandDefinition::new(command.clone(), expansion.clone()),
                override_if_registered,
            );
        }
        self
    }

    fn insert(&mut self, entry: RegisteredCommand, override_if_registered: bool) -> Registration {
        let outcome = match self.position(&entry.name) {
            Some(_) if !override_if_registered => {
                tracing::warn!(
                    "Command '{}' is already registered; keeping the existing registration",
                    entry.name
                );
                return Registration::Skipped;
            }
            Some(index) => {
                Arc::make_mut(&mut self.commands).remove(index);
                Registration::Replaced
            }
            None => Registration::Added,
        };

        tracing::debug!(command = %entry.name, alias = entry.is_alias(), ?outcome, "Registered command");

        let commands = Arc::make_mut(&mut self.commands);
        let index = commands.partition_point(|existing| existing.key <= entry.key);
        commands.insert(index, entry);
        outcome
    }

    // =========================================
    // Removal
    // =========================================

    /// Remove a command by name, ignoring case.
    ///
    /// The backing collection is only replaced when an entry was actually
    /// removed, so [`snapshot`](Self::snapshot) identity is stable across
    /// no-op removals.
    pub fn remove(&mut self, name: &str) -> &mut Self {
        if name.is_empty() || self.position(name).is_none() {
            return self;
        }

        let key = name.to_lowercase();
        let remaining: Vec<RegisteredCommand> = self
            .commands
            .iter()
            .filter(|cmd| cmd.key != key)
            .cloned()
            .collect();
        self.commands = Arc::new(remaining);
        self
    }

    /// Remove every command.
    pub fn clear(&mut self) -> &mut Self {
        self.commands = Arc::new(Vec::new());
        self
    }

    // =========================================
    // Queries
    // =========================================

    fn position(&self, name: &str) -> Option<usize> {
        let key = name.to_lowercase();
        self.commands
            .binary_search_by(|cmd| cmd.key.as_str().cmp(key.as_str()))
            .ok()
    }

    /// Look up a command by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&RegisteredCommand> {
        if name.is_empty() {
            return None;
        }
        self.position(name).map(|index| &self.commands[index])
    }

    /// The original definition of a registered alias.
    pub fn alias_definition(&self, name: &str) -> Option<CommandDefinition> {
        self.get(name)
            .filter(|cmd| cmd.is_alias())
            .map(RegisteredCommand::definition)
    }

    /// All registered commands in sorted order.
    pub fn commands(&self) -> &[RegisteredCommand] {
        &self.commands
    }

    /// Shared handle to the current backing collection.
    pub fn snapshot(&self) -> Arc<Vec<RegisteredCommand>> {
        Arc::clone(&self.commands)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &RegisteredCommand> {
        self.commands.iter().filter(|cmd| cmd.is_alias())
    }

    pub fn has_aliases(&self) -> bool {
        self.aliases().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Every base command definition from the catalog, whether registered
    /// or not.
    pub fn base_definitions(&self) -> Vec<CommandDefinition> {
        catalog::base_definitions()
    }
}
