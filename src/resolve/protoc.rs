use crate::errors::{HarvestError, Result};
use crate::resolve::{CompiledDescription, SchemaCompiler};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs `protoc` and reads back the descriptor set it writes.
#[derive(Debug, Clone)]
pub struct ProtocCompiler {
    program: PathBuf,
    timeout: Duration,
}

impl ProtocCompiler {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn command(&self, output: &Path, roots: &[PathBuf], import_paths: &[PathBuf]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-o").arg(output).arg("--include_imports");
        for import_path in import_paths {
            cmd.arg("-I").arg(import_path);
        }
        cmd.args(roots);
        cmd
    }

    /// Wait for `child`, killing it once the timeout expires.
    fn wait_bounded(&self, child: &mut std::process::Child) -> Result<ExitStatus> {
        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if start.elapsed() >= self.timeout {
                tracing::error!(
                    "{} still running after {}s, killing it",
                    self.program.display(),
                    self.timeout.as_secs()
                );
                // The process may exit between try_wait and kill.
                let _ = child.kill();
                child.wait()?;
                return Err(HarvestError::Timeout {
                    timeout: self.timeout,
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

impl SchemaCompiler for ProtocCompiler {
    fn compile(&self, roots: &[PathBuf], import_paths: &[PathBuf]) -> Result<CompiledDescription> {
        // Removed on drop, whichever way this function exits.
        let scratch = tempfile::Builder::new().prefix("proto-import-").tempdir()?;
        let output = scratch.path().join("proto.pb");
        let log_path = scratch.path().join("protoc.log");

        // stdout and stderr share one file so diagnostics keep their order.
        let log = File::create(&log_path)?;
        let mut cmd = self.command(&output, roots, import_paths);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::from(log.try_clone()?))
            .stderr(Stdio::from(log));

        let mut child = cmd.spawn().map_err(|e| {
            HarvestError::compile(format!("could not run {}: {e}", self.program.display()))
        })?;
        let status = self.wait_bounded(&mut child)?;

        if !status.success() {
            let diagnostics = std::fs::read_to_string(&log_path).unwrap_or_default();
            return Err(HarvestError::Compile {
                message: format!("{} exited with {status}", self.program.display()),
                diagnostics: diagnostics.trim_end().to_string(),
            });
        }

        let bytes = std::fs::read(&output).map_err(|e| {
            HarvestError::compile(format!("no descriptor set written to {}: {e}", output.display()))
        })?;
        CompiledDescription::decode(&bytes)
    }
}
