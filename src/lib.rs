//! Command registry and dispatcher for the and-cli developer CLI.
//!
//! The `and-cli` binary is a thin front end: every sub-command is a separate
//! `and-cli-<command>` executable. This crate decides which sub-commands
//! exist, where their executables live, and how single-token aliases from
//! project configuration expand before parsing.
//!
//! Crates that build their own CLI on top of and-cli can embed the
//! [`dispatch::Dispatcher`] and register additional commands with
//! [`dispatch::Dispatcher::with_command`].

pub mod alias;
pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod logging;
pub mod registry;
pub mod resolver;
