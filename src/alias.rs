//! Argument-vector rewriting for user aliases.
//!
//! An alias is a single token. `and-cli testdb` becomes
//! `and-cli dotnet --cli -- test db migrate` when the project configuration
//! declares `testdb = "dotnet --cli -- test db migrate"`. Invocations with
//! more than one token are treated as fully specified commands and never
//! reinterpreted. That includes the dispatcher's own flags: `and-cli -v
//! testdb` is two tokens and is not expanded.
//!
//! Expansions are split on whitespace without any quoting rules, so an alias
//! cannot expand to an argument that itself contains whitespace.

use crate::registry::{CommandKind, Registry};

/// Number of leading argv entries that belong to the entrypoint rather than
/// the user (the program path).
pub const ENTRYPOINT_ARGS: usize = 1;

/// The single user-supplied token, if there is exactly one.
pub fn single_user_token(raw_args: &[String]) -> Option<&str> {
    match raw_args.get(ENTRYPOINT_ARGS..) {
        Some([token]) => Some(token.as_str()),
        _ => None,
    }
}

/// Split an alias expansion into arguments.
pub fn split_expansion(expansion: &str) -> Vec<String> {
    expansion.split_whitespace().map(str::to_string).collect()
}

/// The expanded argument vector if `raw_args` invokes a registered alias.
///
/// Returns `None` when no aliases are registered, when there is not exactly
/// one user token, or when the token matches no alias exactly. The registry
/// is only read.
pub fn expand_if_alias(registry: &Registry, raw_args: &[String]) -> Option<Vec<String>> {
    if !registry.has_aliases() {
        return None;
    }

    let token = single_user_token(raw_args)?;

    registry
        .aliases()
        .find(|cmd| cmd.name == token)
        .and_then(|cmd| match &cmd.kind {
            CommandKind::Alias { expansion } => Some(split_expansion(expansion)),
            CommandKind::Base { .. } => None,
        })
}
