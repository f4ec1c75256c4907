//! Generation engines available to the binary.

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use schematic_catalog::EngineConfig;
use schematic_core::{EngineError, GenerationEngine, GenerationRequest, PrintEngine};
use tracing::debug;

/// Runs an external program and hands it the request as JSON on stdin.
///
/// Stdout and stderr are inherited. The program's exit code is returned
/// as-is; a program killed by a signal counts as exit code 1.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    command: String,
    args: Vec<String>,
}

impl ProcessEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
        }
    }
}

impl GenerationEngine for ProcessEngine {
    fn run(&mut self, request: &GenerationRequest) -> Result<i32, EngineError> {
        debug!(command = %self.command, args = ?self.args, "spawning engine");
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|err| format!("failed to start engine '{}': {err}", self.command))?;

        let payload = serde_json::to_vec(request)?;
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&payload),
            None => Ok(()),
        };
        // Stdin is closed here so the engine sees end of input
        match written {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::BrokenPipe => {
                debug!(command = %self.command, "engine closed stdin before reading the request");
            }
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(err.into());
            }
        }

        let status = child.wait()?;
        Ok(status.code().unwrap_or(1))
    }
}

/// The configured engine, or one that prints requests to stdout.
pub fn from_config(config: Option<&EngineConfig>) -> Box<dyn GenerationEngine> {
    match config {
        Some(config) => Box::new(ProcessEngine::new(config)),
        None => Box::new(PrintEngine::new(std::io::stdout())),
    }
}
