//! Compiler invocation configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default deadline for batch (token-query) runs.
const DEFAULT_BATCH_TIMEOUT_SECS: u64 = 3;

/// Configuration for invoking the Opal compiler.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
	/// Path or name of the compiler executable.
	pub command: String,
	/// Build directory passed as `-buildDir` to execution modes.
	pub build_dir: Option<PathBuf>,
	/// Deadline in seconds for batch runs. Streaming runs have no implicit
	/// timeout; they end on process exit or an explicit stop.
	pub batch_timeout_secs: u64,
}

impl CompilerConfig {
	/// Creates a configuration for the given compiler executable.
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			build_dir: None,
			batch_timeout_secs: DEFAULT_BATCH_TIMEOUT_SECS,
		}
	}

	/// Sets the build directory for execution modes.
	pub fn build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.build_dir = Some(dir.into());
		self
	}

	/// Sets the batch run deadline.
	pub fn batch_timeout_secs(mut self, secs: u64) -> Self {
		self.batch_timeout_secs = secs;
		self
	}

	/// The batch deadline as a [`Duration`].
	pub fn batch_timeout(&self) -> Duration {
		Duration::from_secs(self.batch_timeout_secs)
	}
}
