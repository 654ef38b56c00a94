//! Execution context backed by an interpreter process.
//!
//! Each cell's source is passed as the last argument of a configured
//! command (`sh -c <source>` by default). All cells of a notebook share one
//! working directory, which is how state carries over between cells.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};

use super::context::ExecutionContext;

/// How cells are handed to the interpreter.
#[derive(Debug, Clone)]
pub struct CommandConfig {
    /// Interpreter binary.
    pub program: String,
    /// Arguments placed before the cell source.
    pub args: Vec<String>,
    /// Working directory shared by every cell. Defaults to the current one.
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables.
    pub env: Vec<(String, String)>,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            program: "sh".to_string(),
            args: vec!["-c".to_string()],
            working_dir: None,
            env: Vec::new(),
        }
    }
}

impl CommandConfig {
    /// Interpreter invoked as `<program> <args...> <source>`.
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Runs each cell in a fresh interpreter process.
///
/// Stdout is the cell's result; a non-zero exit is a failure carrying
/// stderr. After [`release`](ExecutionContext::release) every call fails
/// with [`Error::Released`].
#[derive(Debug)]
pub struct CommandContext {
    config: CommandConfig,
    released: AtomicBool,
}

impl CommandContext {
    pub fn new(config: CommandConfig) -> Self {
        Self {
            config,
            released: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &CommandConfig {
        &self.config
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl Default for CommandContext {
    fn default() -> Self {
        Self::new(CommandConfig::default())
    }
}

#[async_trait]
impl ExecutionContext for CommandContext {
    async fn execute(&self, source: &str) -> Result<String> {
        if self.is_released() {
            return Err(Error::Released);
        }

        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.args).arg(source).kill_on_drop(true);
        if let Some(ref dir) = self.config.working_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.config.env {
            cmd.env(key, value);
        }

        let output = cmd.output().await?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("{} exited with {}", self.config.program, output.status)
        } else {
            stderr
        };
        Err(Error::Execution(message))
    }

    fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            tracing::debug!(program = %self.config.program, "execution context released");
        }
    }
}
