//! Supervised invocation of the external Opal compiler.
//!
//! The compiler is an already-built executable reached only through its
//! command line. This crate owns the two invocation shapes — batch/capture
//! (token queries, bounded by a timeout) and streaming/interactive (program
//! execution, line-forwarded as output arrives) — plus the argument encoding
//! both shapes need and the single-slot "at most one live run" supervision
//! gating them.

mod config;
mod encode;
mod supervisor;

pub use config::CompilerConfig;
pub use encode::{argv_lines, shell_quoted};
pub use supervisor::{OutputLine, RunOutcome, StopOutcome, Supervisor};

/// Errors at the subprocess boundary.
///
/// Everything the compiler subprocess can do wrong is converted to one of
/// these here; callers never see a raw I/O fault from inside a run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The compiler executable could not be launched.
	#[error("failed to spawn `{command}`: {source}")]
	Spawn {
		command: String,
		#[source]
		source: std::io::Error,
	},
	/// A batch run exceeded its deadline and was killed.
	#[error("compiler run timed out after {secs}s")]
	TimedOut { secs: u64 },
	/// Reading from or reaping the child failed mid-run.
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// Result alias for subprocess operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
