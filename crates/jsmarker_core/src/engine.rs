//! Lint engine backed by an external command.
//!
//! The command is run as `command args... <name>` with the decoded source on
//! stdin and the options as JSON in `JSMARKER_OPTIONS`. It prints issues on
//! stdout, either as one JSON array or as a stream of JSON objects:
//!
//! ```json
//! {"line": 3, "character": 7, "reason": "Expected '===' and instead saw '=='."}
//! ```
//!
//! The exit status is ignored when stdout parses; linters commonly exit
//! non-zero when they found something.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use serde_json::Value;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::BuildError;
use crate::invoker::LintEngine;
use crate::issue::Issue;
use crate::options::LintOptions;

/// Environment variable carrying the resolved options.
pub const OPTIONS_ENV: &str = "JSMARKER_OPTIONS";

#[derive(Debug, Clone)]
pub struct CommandEngine {
    command: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandEngine {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            working_dir: None,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }

    /// Runs the command from `dir`, so relative names resolve against it.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn spawn_and_collect(
        &self,
        name: &str,
        source: &str,
        options: &LintOptions,
    ) -> Result<String, BuildError> {
        let options_json = serde_json::to_string(options)
            .map_err(|e| BuildError::engine(format!("Failed to serialize options: {}", e)))?;

        let mut command = Command::new(&self.command);
        command
            .args(&self.args)
            .arg(name)
            .env(OPTIONS_ENV, options_json)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let mut child = command
            .spawn()
            .map_err(|e| BuildError::engine(format!("Failed to start '{}': {}", self.command, e)))?;

        // Feed stdin from another thread so a chatty engine cannot deadlock on a full pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let source = source.to_string();
            thread::spawn(move || stdin.write_all(source.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| BuildError::engine(format!("'{}' did not finish: {}", self.command, e)))?;

        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                // The engine may exit without reading everything.
                Ok(Err(e)) => debug!("Engine closed stdin early: {}", e),
                Err(_) => return Err(BuildError::engine("stdin writer panicked")),
            }
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!("{} stderr: {}", self.command, stderr.trim());
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| BuildError::engine(format!("Engine output is not UTF-8: {}", e)))?;

        if stdout.trim().is_empty() && !output.status.success() {
            return Err(BuildError::engine(format!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(stdout)
    }
}

impl LintEngine for CommandEngine {
    fn lint(
        &self,
        name: &str,
        source: &str,
        options: &LintOptions,
    ) -> Result<Vec<Issue>, BuildError> {
        let stdout = self.spawn_and_collect(name, source, options)?;
        parse_issues(&stdout)
    }
}

/// Parses engine output: JSON arrays and objects, in any mix.
pub fn parse_issues(output: &str) -> Result<Vec<Issue>, BuildError> {
    let mut issues = Vec::new();

    for value in serde_json::Deserializer::from_str(output).into_iter::<Value>() {
        let value =
            value.map_err(|e| BuildError::engine(format!("Malformed engine output: {}", e)))?;
        match value {
            Value::Array(items) => {
                for item in items {
                    issues.push(parse_issue(item)?);
                }
            }
            Value::Object(_) => issues.push(parse_issue(value)?),
            other => {
                return Err(BuildError::engine(format!(
                    "Expected an issue object, got {}",
                    other
                )));
            }
        }
    }

    Ok(issues)
}

fn parse_issue(value: Value) -> Result<Issue, BuildError> {
    serde_json::from_value(value).map_err(|e| BuildError::engine(format!("Invalid issue: {}", e)))
}
