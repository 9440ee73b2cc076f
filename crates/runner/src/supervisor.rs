//! Single-slot supervision of compiler subprocess runs.

use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

/// A line forwarded from a streaming run, tagged by source stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
	/// A line of program output from stdout.
	Stdout(String),
	/// A fatal diagnostic from stderr. Ends the run.
	Error(String),
}

/// How a streaming run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
	/// The process exited with code 0.
	Succeeded,
	/// The process was terminated externally (cancellation or a superseding
	/// run); not an error.
	Stopped,
	/// The process exited with a non-zero code.
	Failed(i32),
	/// The process wrote to stderr; the run was killed on first line.
	StderrError(String),
}

/// Result of an explicit stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
	/// A live run was cancelled.
	Stopped,
	/// No run was live; the supervisor is ready for the next one.
	NothingToStop,
}

/// The single live run. Owns the child and its cancellation token.
struct RunHandle {
	generation: u64,
	child: Child,
	cancel: CancellationToken,
}

impl RunHandle {
	/// Signals termination without waiting for death.
	fn terminate(&mut self) {
		self.cancel.cancel();
		let _ = self.child.start_kill();
	}
}

/// Supervises compiler subprocess runs, enforcing at most one live child.
///
/// Starting a new run supersedes any live one: the old run's token is
/// cancelled and its child signalled, without waiting for it to die. Slot
/// clearing is generation-gated so a finishing old run never clears a slot a
/// newer run occupies, and a killed-but-unreaped old process cannot deliver
/// into a newer run's sink (each run reads its own pipes under its own
/// token).
pub struct Supervisor {
	slot: Mutex<Option<RunHandle>>,
	generations: AtomicU64,
}

impl Supervisor {
	pub fn new() -> Self {
		Self {
			slot: Mutex::new(None),
			generations: AtomicU64::new(0),
		}
	}

	/// Runs a shell-interpreted command string to completion, capturing stdout.
	///
	/// Used for token queries. The deadline covers the whole run; on timeout
	/// the child is killed and [`Error::TimedOut`] returned. stderr is
	/// ignored on this path.
	pub async fn run_batch(&self, command_line: &str, timeout: Duration) -> Result<String> {
		self.supersede().await;

		tracing::debug!(command = %command_line, "starting batch compiler run");

		let mut child = Command::new("sh")
			.arg("-c")
			.arg(command_line)
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::null())
			.kill_on_drop(true)
			.spawn()
			.map_err(|e| Error::Spawn {
				command: command_line.to_string(),
				source: e,
			})?;

		let mut stdout = child.stdout.take().ok_or_else(|| Error::Spawn {
			command: command_line.to_string(),
			source: std::io::Error::other("failed to capture stdout"),
		})?;

		let generation = self.arm(child).await;

		let mut output = String::new();
		match tokio::time::timeout(timeout, stdout.read_to_string(&mut output)).await {
			Ok(Ok(_)) => {}
			Ok(Err(e)) => {
				self.kill(generation).await;
				return Err(e.into());
			}
			Err(_) => {
				self.kill(generation).await;
				return Err(Error::TimedOut { secs: timeout.as_secs() });
			}
		}

		// Reap unless a newer run or a stop already took the child.
		if let Some(mut handle) = self.reclaim(generation).await {
			let _ = handle.child.wait().await;
		}

		Ok(output)
	}

	/// Runs the program with an argv array, forwarding output line by line.
	///
	/// Each non-empty stdout line is sent to `sink` as it arrives. The first
	/// stderr line is fatal: it is forwarded as [`OutputLine::Error`], the
	/// child is killed, and the outcome is [`RunOutcome::StderrError`].
	/// No implicit timeout; the run ends on process exit, cancellation, or
	/// stderr.
	pub async fn run_streaming(
		&self,
		program: &str,
		args: &[String],
		sink: &mpsc::UnboundedSender<OutputLine>,
	) -> Result<RunOutcome> {
		self.supersede().await;

		tracing::debug!(command = %program, args = args.len(), "starting streaming compiler run");

		let mut child = Command::new(program)
			.args(args)
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.kill_on_drop(true)
			.spawn()
			.map_err(|e| Error::Spawn {
				command: program.to_string(),
				source: e,
			})?;

		let stdout = child.stdout.take().ok_or_else(|| Error::Spawn {
			command: program.to_string(),
			source: std::io::Error::other("failed to capture stdout"),
		})?;
		let stderr = child.stderr.take().ok_or_else(|| Error::Spawn {
			command: program.to_string(),
			source: std::io::Error::other("failed to capture stderr"),
		})?;

		let cancel = CancellationToken::new();
		let generation = self.arm_with(child, cancel.clone()).await;

		let mut out_lines = BufReader::new(stdout).lines();
		let mut err_lines = BufReader::new(stderr).lines();
		let mut stderr_open = true;

		let outcome = loop {
			tokio::select! {
				// Checked first so a superseded run stops forwarding even
				// when its pipes still hold buffered lines.
				biased;

				_ = cancel.cancelled() => {
					break RunOutcome::Stopped;
				}

				line = err_lines.next_line(), if stderr_open => match line {
					Ok(Some(message)) => {
						let _ = sink.send(OutputLine::Error(message.clone()));
						self.kill(generation).await;
						break RunOutcome::StderrError(message);
					}
					Ok(None) => stderr_open = false,
					Err(e) => {
						self.kill(generation).await;
						return Err(e.into());
					}
				},

				line = out_lines.next_line() => match line {
					Ok(Some(line)) => {
						if !line.is_empty() && sink.send(OutputLine::Stdout(line)).is_err() {
							// Receiver gone; nobody is listening to this run.
							self.kill(generation).await;
							break RunOutcome::Stopped;
						}
					}
					Ok(None) => {
						break match self.reclaim(generation).await {
							Some(mut handle) => map_exit(handle.child.wait().await?),
							None => RunOutcome::Stopped,
						};
					}
					Err(e) => {
						self.kill(generation).await;
						return Err(e.into());
					}
				},
			}
		};

		tracing::info!(?outcome, "streaming compiler run ended");
		Ok(outcome)
	}

	/// Cancels the live run, if any.
	///
	/// Idempotent: with no live run this reports [`StopOutcome::NothingToStop`]
	/// and the supervisor stays ready for the next invocation. Termination is
	/// signalled, not awaited.
	pub async fn stop(&self) -> StopOutcome {
		let mut slot = self.slot.lock().await;
		match slot.take() {
			Some(mut handle) => {
				handle.terminate();
				tracing::info!(generation = handle.generation, "stopped compiler run");
				StopOutcome::Stopped
			}
			None => StopOutcome::NothingToStop,
		}
	}

	/// Cancels and discards any live run before a new one starts.
	async fn supersede(&self) {
		let mut slot = self.slot.lock().await;
		if let Some(mut old) = slot.take() {
			tracing::info!(generation = old.generation, "superseding live compiler run");
			old.terminate();
		}
	}

	/// Installs a child in the slot under a fresh generation.
	async fn arm(&self, child: Child) -> u64 {
		self.arm_with(child, CancellationToken::new()).await
	}

	async fn arm_with(&self, child: Child, cancel: CancellationToken) -> u64 {
		let generation = self.generations.fetch_add(1, Ordering::AcqRel) + 1;
		let mut slot = self.slot.lock().await;
		// A race between two starters resolves last-wins here.
		if let Some(mut old) = slot.take() {
			old.terminate();
		}
		*slot = Some(RunHandle {
			generation,
			child,
			cancel,
		});
		generation
	}

	/// Takes the slot back if this generation still occupies it.
	async fn reclaim(&self, generation: u64) -> Option<RunHandle> {
		let mut slot = self.slot.lock().await;
		match slot.as_ref() {
			Some(handle) if handle.generation == generation => slot.take(),
			_ => None,
		}
	}

	/// Terminates this generation's child if it still occupies the slot.
	async fn kill(&self, generation: u64) {
		if let Some(mut handle) = self.reclaim(generation).await {
			handle.terminate();
		}
	}
}

impl Default for Supervisor {
	fn default() -> Self {
		Self::new()
	}
}

/// Maps a reaped exit status onto a run outcome.
fn map_exit(status: ExitStatus) -> RunOutcome {
	match status.code() {
		Some(0) => RunOutcome::Succeeded,
		Some(code) => RunOutcome::Failed(code),
		// Killed by signal: externally terminated, peaceful.
		None => RunOutcome::Stopped,
	}
}
