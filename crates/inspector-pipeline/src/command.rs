/*
 * command.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Transforms performed by an external program.
 *
 * The program receives the worker request as JSON on stdin
 * (`{"code", "filename", "options"}`) and prints `{"code", "map"}` JSON on
 * stdout, or `{"error"}` to report a compile error. It is expected to
 * enable source maps and to record `filename` as the map's source name.
 * Any other failure (spawn error, non-zero exit, unparsable output) is
 * reported as a transform error.
 */

use std::io::{self, Write};
use std::process::{Command, Stdio};

use inspector_source_map::MapPayload;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::config::TransformCommand;
use crate::protocol::WorkerRequest;
use crate::transform::{TransformError, TransformOptions, TransformOutput, Transformer};

/// Reply printed by the transform program
#[derive(Debug, Deserialize)]
struct CommandReply {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    map: Option<MapPayload>,
    #[serde(default)]
    error: Option<String>,
}

/// Runs one process per compile
#[derive(Debug, Clone)]
pub struct CommandTransformer {
    program: String,
    args: Vec<String>,
}

impl CommandTransformer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(command: &TransformCommand) -> Self {
        Self::new(command.program.clone(), command.args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Transformer for CommandTransformer {
    fn transform(
        &mut self,
        source: &str,
        options: &TransformOptions<'_>,
    ) -> Result<TransformOutput, TransformError> {
        let request = WorkerRequest {
            code: source.to_string(),
            filename: options.file_name.to_string(),
            options: options.plugin_options.clone(),
        };
        let payload = serde_json::to_vec(&request)
            .map_err(|e| TransformError::new(format!("Failed to serialize request: {e}")))?;

        trace!(program = %self.program, "Spawning transform");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                TransformError::new(format!("Failed to start transform '{}': {e}", self.program))
            })?;

        // Feed stdin on its own thread while stdout and stderr drain, so
        // neither side blocks on a full pipe. Dropping stdin signals EOF.
        let stdin = child.stdin.take();
        let (written, output) = std::thread::scope(|scope| {
            let writer = scope.spawn(|| match stdin {
                Some(mut stdin) => stdin.write_all(&payload),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (written, output)
        });
        let output = output.map_err(|e| {
            TransformError::new(format!("Failed to wait for transform '{}': {e}", self.program))
        })?;

        // A program that fails before reading its input closes the pipe;
        // its exit status and stderr explain the failure better than the
        // write error does.
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            debug!(program = %self.program, status = %output.status, "Transform exited with failure");
            return Err(TransformError::new(if stderr.is_empty() {
                format!("Transform '{}' exited with {}", self.program, output.status)
            } else {
                stderr.to_string()
            }));
        }

        match written {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!(program = %self.program, "Transform exited without reading all input");
            }
            Err(e) => {
                return Err(TransformError::new(format!(
                    "Failed to write to transform '{}' stdin: {e}",
                    self.program
                )));
            }
            Ok(()) => {}
        }

        let reply: CommandReply = serde_json::from_slice(&output.stdout).map_err(|e| {
            TransformError::new(format!(
                "Failed to parse output of transform '{}': {e}",
                self.program
            ))
        })?;

        if let Some(error) = reply.error {
            return Err(TransformError::new(error));
        }

        Ok(TransformOutput {
            code: reply.code.unwrap_or_default(),
            map: reply.map,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn options(plugin_options: &serde_json::Value) -> TransformOptions<'_> {
        TransformOptions {
            file_name: "Demo.tsx",
            source_file_name: "Demo.tsx",
            source_maps: true,
            plugin_options,
        }
    }

    fn shell(script: &str) -> CommandTransformer {
        CommandTransformer::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[test]
    fn test_request_reaches_program() {
        // `cat` echoes the request back; its `code` field doubles as the reply
        let plugin_options = serde_json::json!({});
        let output = shell("cat")
            .transform("let a = 1;", &options(&plugin_options))
            .unwrap();
        assert_eq!(output.code, "let a = 1;");
        assert_eq!(output.map, None);
    }

    #[test]
    fn test_reply_with_map() {
        let plugin_options = serde_json::json!({});
        let script = r#"cat > /dev/null; printf '%s' '{"code":"x;","map":{"version":3,"sources":["Demo.tsx"],"names":[],"mappings":"AAAA"}}'"#;
        let output = shell(script)
            .transform("x", &options(&plugin_options))
            .unwrap();
        assert_eq!(output.code, "x;");
        let map = output.map.unwrap().into_source_map().unwrap();
        assert_eq!(map.sources, vec!["Demo.tsx".to_string()]);
    }

    #[test]
    fn test_reported_error() {
        let plugin_options = serde_json::json!({});
        let script = r#"cat > /dev/null; printf '%s' '{"error":"Unexpected token (1:4)"}'"#;
        let err = shell(script)
            .transform("x", &options(&plugin_options))
            .unwrap_err();
        assert_eq!(err.message, "Unexpected token (1:4)");
    }

    #[test]
    fn test_non_zero_exit_uses_stderr() {
        let plugin_options = serde_json::json!({});
        let err = shell("cat > /dev/null; echo 'plugin crashed' >&2; exit 3")
            .transform("x", &options(&plugin_options))
            .unwrap_err();
        assert_eq!(err.message, "plugin crashed");
    }

    #[test]
    fn test_early_exit_with_large_input_uses_stderr() {
        // The program exits without reading a request larger than the pipe buffer
        let plugin_options = serde_json::json!({});
        let source = "x".repeat(1 << 20);
        let err = shell("echo 'Cannot find module babel' >&2; exit 1")
            .transform(&source, &options(&plugin_options))
            .unwrap_err();
        assert_eq!(err.message, "Cannot find module babel");
    }

    #[test]
    fn test_large_output_while_reading_input() {
        // Echoing a request larger than the pipe buffer needs stdout drained
        // while stdin is still being written
        let plugin_options = serde_json::json!({});
        let source = "y".repeat(1 << 20);
        let output = shell("cat")
            .transform(&source, &options(&plugin_options))
            .unwrap();
        assert_eq!(output.code.len(), 1 << 20);
    }

    #[test]
    fn test_unparsable_output() {
        let plugin_options = serde_json::json!({});
        let err = shell("cat > /dev/null; echo not json")
            .transform("x", &options(&plugin_options))
            .unwrap_err();
        assert!(err.message.starts_with("Failed to parse output of transform 'sh'"));
    }

    #[test]
    fn test_missing_program() {
        let plugin_options = serde_json::json!({});
        let err = CommandTransformer::new("/nonexistent/transform", Vec::new())
            .transform("x", &options(&plugin_options))
            .unwrap_err();
        assert!(err.message.starts_with("Failed to start transform"));
    }
}
