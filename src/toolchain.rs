//! External toolchain invocation.
//!
//! The checker never interprets compiler output; it only needs the
//! pass/fail verdict and the captured diagnostics. Tools always run in a
//! caller-supplied scratch directory so build artifacts stay out of
//! student directories, which is why source files must arrive as
//! absolute paths.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::debug;
use wait_timeout::ChildExt;

/// Verdict of one external tool run. On failure `output` carries the
/// tool's combined stdout/stderr verbatim.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub success: bool,
    pub output: String,
}

pub trait Toolchain {
    /// Shared front-end pass over all files, run once before per-module
    /// compilation.
    fn analyze(&self, files: &[PathBuf], work_dir: &Path) -> Result<ToolOutcome>;

    /// Full compile. With a module name, elaborates that single top module
    /// (assuming `analyze` already ran in `work_dir`); otherwise compiles
    /// the given files in one combined pass.
    fn compile(&self, files: &[PathBuf], module: Option<&str>, work_dir: &Path)
        -> Result<ToolOutcome>;
}

/// Synopsys VCS: `vlogan` for the shared analyze pass, `vcs` for
/// elaboration/compilation.
pub struct VcsToolchain {
    timeout: Duration,
}

const ANALYZER: &str = "vlogan";
const COMPILER: &str = "vcs";
const VCS_FLAGS: &[&str] = &["-q", "-sverilog", "-nc"];

impl VcsToolchain {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Binaries that must be on PATH for compile checks to run.
    pub const BINARIES: &'static [&'static str] = &[ANALYZER, COMPILER];
}

impl Toolchain for VcsToolchain {
    fn analyze(&self, files: &[PathBuf], work_dir: &Path) -> Result<ToolOutcome> {
        let mut cmd = Command::new(ANALYZER);
        cmd.args(VCS_FLAGS).args(files).current_dir(work_dir);
        run_tool(cmd, ANALYZER, self.timeout)
    }

    fn compile(
        &self,
        files: &[PathBuf],
        module: Option<&str>,
        work_dir: &Path,
    ) -> Result<ToolOutcome> {
        let mut cmd = Command::new(COMPILER);
        cmd.args(VCS_FLAGS);
        match module {
            Some(module) => {
                cmd.arg(module);
            }
            None => {
                cmd.args(files);
            }
        }
        cmd.current_dir(work_dir);
        run_tool(cmd, COMPILER, self.timeout)
    }
}

/// Run one external tool to completion, capturing combined output. A run
/// that exceeds `timeout` is killed and reported as a failed outcome with
/// a note appended to the diagnostics.
fn run_tool(mut cmd: Command, name: &str, timeout: Duration) -> Result<ToolOutcome> {
    debug!("running {name} with timeout {}s", timeout.as_secs());
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to invoke {name}; is it on PATH?"))?;

    // Drain the pipes while waiting; waiting first can deadlock once the
    // tool fills the pipe buffer.
    let stdout_rx = drain(child.stdout.take());
    let stderr_rx = drain(child.stderr.take());

    let status = child
        .wait_timeout(timeout)
        .with_context(|| format!("failed to wait for {name}"))?;

    let (success, note) = match status {
        Some(status) => (status.success(), None),
        None => {
            let _ = child.kill();
            let _ = child.wait();
            (
                false,
                Some(format!("[{name} killed after {}s timeout]", timeout.as_secs())),
            )
        }
    };

    let mut output = stdout_rx.recv().unwrap_or_default();
    output.push_str(&stderr_rx.recv().unwrap_or_default());
    if let Some(note) = note {
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        output.push_str(&note);
    }

    Ok(ToolOutcome { success, output })
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    match stream {
        Some(mut stream) => {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = stream.read_to_end(&mut buf);
                let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
            });
        }
        None => {
            let _ = tx.send(String::new());
        }
    }
    rx
}
