// src/engine.rs

//! Spawning and releasing the external renderer engine.

use crate::config::EngineConfig;
use crate::error::Result;
use log::{debug, info, warn};
use std::io::{self, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};

/// A running renderer engine whose stdin receives the command stream.
///
/// Writes go straight to the pipe. Releasing the engine, either through
/// [`EngineProcess::finish`] or by dropping it, closes the pipe so the engine
/// sees end of input, then waits for it to exit.
#[derive(Debug)]
pub struct EngineProcess {
    child: Child,
    stdin: Option<ChildStdin>,
}

impl EngineProcess {
    pub fn spawn(config: &EngineConfig) -> Result<Self> {
        let mut command = Command::new(&config.program);
        command
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = &config.working_directory {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("failed to spawn engine {}: {}", config.program.display(), e),
            )
        })?;
        let stdin = child.stdin.take();
        info!(
            "EngineProcess: spawned {} (pid {})",
            config.program.display(),
            child.id()
        );
        Ok(EngineProcess { child, stdin })
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Closes the pipe and waits for the engine to exit.
    pub fn finish(mut self) -> io::Result<ExitStatus> {
        self.release()
    }

    fn release(&mut self) -> io::Result<ExitStatus> {
        // Dropping stdin closes our end of the pipe.
        drop(self.stdin.take());
        let status = self.child.wait()?;
        if status.success() {
            debug!("EngineProcess: pid {} exited cleanly", self.id());
        } else {
            warn!("EngineProcess: pid {} exited with {}", self.id(), status);
        }
        Ok(status)
    }

    fn pipe(&mut self) -> io::Result<&mut ChildStdin> {
        self.stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "engine pipe already closed"))
    }
}

impl Write for EngineProcess {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pipe()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.pipe()?.flush()
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        // finish() has already reaped the child.
        if self.stdin.is_none() {
            return;
        }
        if let Err(e) = self.release() {
            warn!("EngineProcess: failed to wait for pid {}: {}", self.id(), e);
        }
    }
}
