//! External tool discovery and execution
//!
//! The release pipeline never archives or computes parity itself; it drives
//! the `rar` and `par2` command-line tools. This module finds them and runs
//! them.
//!
//! - [`Platform`]: detected once, decides which bundled binaries apply
//! - [`ToolResolver`]: resolves and caches [`ResolvedTools`]
//! - [`CommandRunner`]: the subprocess seam, with [`ProcessRunner`] for real
//!   execution and [`DryRunRunner`] for test mode

mod platform;
mod resolver;
mod runner;

pub use platform::Platform;
pub use resolver::{ResolvedTools, ToolResolver};
pub use runner::{CommandOutput, CommandRunner, DryRunRunner, ProcessRunner, ToolCommand};
