//! Injection engine for cloud inventory source updates.
//!
//! An inventory update takes a source definition (which cloud to ask,
//! which regions, which extra variables) plus an optional credential, and
//! runs `ansible-inventory` against it. Everything the command needs is
//! prepared up front: a per-update private data directory holding config
//! files and secrets, and a fully explicit environment. The pipeline is
//! pure until the directory is materialized, which is what makes the
//! injected content testable against reference fixtures.

pub mod commands;
pub mod credential;
pub mod error;
pub mod inject;
pub mod output;
pub mod rundir;
pub mod runner;
pub mod source;
pub mod update;
pub mod vars;
pub mod verify;
