//! Typed error hierarchy for the and-cli dispatcher.
//!
//! Two top-level enums cover the two layers:
//! - `RegistryError`: command registration and initialization failures
//! - `DispatchError`: argument parsing and failures while handing control
//!   to a sub-command
//!
//! Neither layer exits the process. The binary's driver inspects the error
//! and decides the exit status.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the command registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("'{name}' is not a valid base command. Available commands are: {available}")]
    UnknownBaseCommand { name: String, available: String },

    #[error("The command registry has already been initialized")]
    AlreadyInitialized,
}

impl RegistryError {
    /// Whether this error indicates a packaging/configuration defect that
    /// must terminate the process.
    pub fn is_fatal(&self) -> bool {
        match self {
            RegistryError::UnknownBaseCommand { .. } | RegistryError::AlreadyInitialized => true,
        }
    }
}

/// Errors from the dispatch driver.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Failed to run '{path}': {source}")]
    SpawnFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Alias '{alias}' must be invoked on its own, without extra arguments or dispatcher flags such as --verbose; it expands to '{expansion}'"
    )]
    AliasNotExpanded { alias: String, expansion: String },

    #[error(transparent)]
    Usage(#[from] clap::Error),
}

impl DispatchError {
    /// Process exit code for this error. Usage errors (including `--help`
    /// and `--version`) keep the parser's own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            DispatchError::Usage(err) => err.exit_code(),
            _ => 1,
        }
    }

    /// Print the error for the user.
    pub fn report(&self) {
        match self {
            DispatchError::Usage(err) => {
                let _ = err.print();
            }
            other => eprintln!("Error: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_error_unknown_base_command_lists_alternatives() {
        let err = RegistryError::UnknownBaseCommand {
            name: "nope".to_string(),
            available: "copy, deploy".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'nope'"));
        assert!(msg.contains("copy, deploy"));
        assert!(err.is_fatal());
    }

    #[test]
    fn registry_error_already_initialized_is_fatal() {
        assert!(RegistryError::AlreadyInitialized.is_fatal());
    }

    #[test]
    fn dispatch_error_converts_from_registry_error() {
        let err: DispatchError = RegistryError::AlreadyInitialized.into();
        match &err {
            DispatchError::Registry(RegistryError::AlreadyInitialized) => {}
            _ => panic!("Expected DispatchError::Registry(AlreadyInitialized)"),
        }
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn dispatch_error_spawn_failed_carries_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = DispatchError::SpawnFailed {
            path: PathBuf::from("/project/and-cli-dotnet"),
            source: io_err,
        };
        match &err {
            DispatchError::SpawnFailed { path, source } => {
                assert_eq!(path, &PathBuf::from("/project/and-cli-dotnet"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected SpawnFailed"),
        }
        assert!(err.to_string().contains("and-cli-dotnet"));
    }

    #[test]
    fn dispatch_error_usage_keeps_parser_exit_code() {
        let err: DispatchError =
            clap::Error::new(clap::error::ErrorKind::DisplayHelp).into();
        assert_eq!(err.exit_code(), 0);

        let err: DispatchError =
            clap::Error::new(clap::error::ErrorKind::InvalidSubcommand).into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&RegistryError::AlreadyInitialized);
        assert_std_error(&DispatchError::AliasNotExpanded {
            alias: "testdb".into(),
            expansion: "dotnet --cli".into(),
        });
    }
}
