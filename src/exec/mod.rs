// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the master command and
//! the dependent tasks, using `tokio::process::Command`, and reporting back
//! to the orchestration runtime via `RuntimeEvent`s.
//!
//! - [`shell`] builds `sh -c` commands.
//! - [`master`] spawns the master task and streams its stdout lines.
//! - [`backend`] provides the `TaskLauncher` trait and a concrete
//!   `RealTaskLauncher` that the runtime uses in production, and which
//!   tests can replace with a fake implementation.
//! - [`registry`] tracks which task slots currently hold a live process.

pub mod backend;
pub mod master;
pub mod registry;
pub mod shell;

pub use backend::{RealTaskLauncher, TaskHandle, TaskLauncher};
pub use master::{spawn_master, MasterProcess};
pub use registry::{StartReport, TaskRegistry};
