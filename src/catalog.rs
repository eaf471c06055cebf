//! Built-in base commands shipped with the and-cli distribution.
//!
//! Every entry here corresponds to an `and-cli-<name>` executable that is
//! built and packaged alongside the dispatcher. The table is static and never
//! mutated; the [`Registry`](crate::registry::Registry) copies entries out of
//! it when registering base commands.

use crate::registry::CommandDefinition;

/// Name of the dispatcher binary. Also the prefix of every sub-command
/// executable (`and-cli-dotnet`, `and-cli-nuget`, ...).
pub const CLI_NAME: &str = "and-cli";

/// A base command definition from the built-in catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseCommand {
    pub name: &'static str,
    pub description: &'static str,
}

impl BaseCommand {
    /// Convert into an owned definition suitable for registration.
    pub fn to_definition(&self) -> CommandDefinition {
        CommandDefinition::new(self.name, self.description)
    }
}

/// The catalog, kept in alphabetical order.
pub const BASE_COMMANDS: &[BaseCommand] = &[
    BaseCommand {
        name: "copy",
        description: "Copy files and/or directories",
    },
    BaseCommand {
        name: "deploy",
        description: "Deploy various application types",
    },
    BaseCommand {
        name: "dotnet",
        description: "Run various dotnet commands for the project",
    },
    BaseCommand {
        name: "dotnet-test",
        description: "Run various dotnet test runner commands for the project",
    },
    BaseCommand {
        name: "github",
        description: "Commands for interacting with AndcultureCode github resources",
    },
    BaseCommand {
        name: "install",
        description: "Collection of commands related to installation and configuration of the and-cli",
    },
    BaseCommand {
        name: "jest",
        description: "Run various jest commands for the project",
    },
    BaseCommand {
        name: "migration",
        description: "Run commands to manage Entity Framework migrations",
    },
    BaseCommand {
        name: "nuget",
        description: "Manages publishing of nuget dotnet core projects",
    },
    BaseCommand {
        name: "webpack",
        description: "Run various webpack commands for the project",
    },
    BaseCommand {
        name: "webpack-test",
        description: "Run various webpack test commands for the project",
    },
    BaseCommand {
        name: "workspace",
        description: "Manage AndcultureCode projects workspace",
    },
];

/// Look up a base command by name, ignoring case the same way the
/// registry does.
pub fn find(name: &str) -> Option<&'static BaseCommand> {
    let key = name.to_lowercase();
    BASE_COMMANDS
        .iter()
        .find(|cmd| cmd.name.to_lowercase() == key)
}

/// All base commands as owned definitions, in catalog order.
pub fn base_definitions() -> Vec<CommandDefinition> {
    BASE_COMMANDS.iter().map(BaseCommand::to_definition).collect()
}

/// Comma-separated list of base command names, for error messages.
pub fn available_names() -> String {
    BASE_COMMANDS
        .iter()
        .map(|cmd| cmd.name)
        .collect::<Vec<_>>()
        .join(", ")
}
