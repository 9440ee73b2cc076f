//! Host-facing facade for the Opal compiler subprocess client.
//!
//! Wires the argument encoder, the process supervisor, and the token decoder
//! into the two operations the host editor consumes: compute highlighting
//! spans for a document, and execute a document in one of the compiler's
//! run modes. A shared single-slot supervisor gates both, so the newest
//! request always wins and at most one compiler process is ever live.

use std::sync::atomic::{AtomicBool, Ordering};

use opal_runner::Supervisor;
use tokio::sync::mpsc;

pub use opal_runner::{CompilerConfig, Error, OutputLine, Result, RunOutcome, StopOutcome};
pub use opal_tokens::{Category, DisplaySpan, RawToken};

/// Compiler run mode for document execution.
///
/// Token queries are not a run mode; they go through [`CompilerClient::highlight`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
	/// Tree-walking interpretation of the AST.
	Ast,
	/// Bytecode compilation and VM execution.
	Bytecode,
	/// Assembly emission and execution.
	Asm,
}

impl ExecMode {
	/// The compiler's command-line flag for this mode.
	pub const fn flag(self) -> &'static str {
		match self {
			Self::Ast => "-ast",
			Self::Bytecode => "-bytecode",
			Self::Asm => "-asm",
		}
	}
}

/// Client for one host session against the Opal compiler.
///
/// Owns the supervisor slot and the process-wide quiet flag. One instance per
/// host session; all entry points may be called concurrently and resolve
/// last-request-wins.
pub struct CompilerClient {
	config: CompilerConfig,
	supervisor: Supervisor,
	quiet: AtomicBool,
}

impl CompilerClient {
	pub fn new(config: CompilerConfig) -> Self {
		Self {
			config,
			supervisor: Supervisor::new(),
			quiet: AtomicBool::new(false),
		}
	}

	/// Sets whether execution runs pass `-q` to the compiler.
	pub fn set_quiet(&self, quiet: bool) {
		self.quiet.store(quiet, Ordering::Relaxed);
	}

	/// Current quiet setting.
	pub fn quiet(&self) -> bool {
		self.quiet.load(Ordering::Relaxed)
	}

	/// Computes highlighting spans for a document.
	///
	/// Never fails: any subprocess or decode problem (missing executable,
	/// timeout, malformed token JSON) is logged and degrades to an empty
	/// span list. Empty documents short-circuit without spawning.
	pub async fn highlight(&self, text: &str) -> Vec<DisplaySpan> {
		if text.is_empty() {
			return Vec::new();
		}

		let command_line = format!(
			"\"{}\" -tokens -fc {}",
			self.config.command,
			opal_runner::shell_quoted(text)
		);

		let stdout = match self.supervisor.run_batch(&command_line, self.config.batch_timeout()).await {
			Ok(stdout) => stdout,
			Err(e) => {
				tracing::warn!(error = %e, "highlighting degraded to no tokens");
				return Vec::new();
			}
		};

		match opal_tokens::parse_raw_tokens(&stdout) {
			Ok(tokens) => opal_tokens::decode(&tokens),
			Err(e) => {
				tracing::warn!(error = %e, "discarding unparseable token output");
				Vec::new()
			}
		}
	}

	/// Executes a document in the given mode, streaming output to `sink`.
	///
	/// Lines arrive on the sink as the program produces them. Resolves to the
	/// run outcome when the process ends; a newer `execute` or an explicit
	/// [`stop`](Self::stop) resolves it as [`RunOutcome::Stopped`]. Spawn
	/// failures surface as an error, since execution is an explicit user
	/// action expecting feedback.
	pub async fn execute(
		&self,
		text: &str,
		filename: &str,
		mode: ExecMode,
		sink: &mpsc::UnboundedSender<OutputLine>,
	) -> Result<RunOutcome> {
		let mut args: Vec<String> = vec![mode.flag().to_string()];
		if self.quiet() {
			args.push("-q".to_string());
		}
		args.push("-fc".to_string());
		args.extend(opal_runner::argv_lines(text));
		if let Some(dir) = &self.config.build_dir {
			args.push("-buildDir".to_string());
			args.push(dir.display().to_string());
		}

		tracing::info!(%filename, mode = mode.flag(), "executing document");
		self.supervisor.run_streaming(&self.config.command, &args, sink).await
	}

	/// Cancels the live run, if any.
	pub async fn stop(&self) -> StopOutcome {
		self.supervisor.stop().await
	}
}
