use std::{
    io::Write,
    process::{Command, Stdio},
    thread,
};

use patungan_application::{ParseFailure, ParsedData, ReceiptDocument, ReceiptParser};

use crate::wire::parse_service_response;

#[derive(Debug, thiserror::Error)]
#[error("`{program}` exited with {status}: {stderr}")]
struct CommandFailed {
    program: String,
    status: std::process::ExitStatus,
    stderr: String,
}

/// Delegates extraction to an external program.
///
/// The receipt is written to the program's stdin and its stdout must be the
/// parsing service's JSON response.
#[derive(Clone, Debug)]
pub struct CommandReceiptParser {
    program: String,
    args: Vec<String>,
}

impl CommandReceiptParser {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits a whitespace-separated command line. `None` when it is blank.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program, parts))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl ReceiptParser for CommandReceiptParser {
    fn parse(&self, document: &ReceiptDocument<'_>) -> Result<ParsedData, ParseFailure> {
        let service = |err: std::io::Error| ParseFailure::Service {
            source: Box::new(err),
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(service)?;

        let mut stdin = child.stdin.take().ok_or_else(|| ParseFailure::Malformed {
            detail: "parser stdin is unavailable".to_owned(),
        })?;
        let bytes = document.bytes;
        // Feed stdin from a second thread so a chatty parser cannot block on a full stdout pipe.
        let output = thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(bytes));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            output.and_then(|output| {
                // A parser that exits without reading everything is judged by its status.
                match written {
                    Err(err) if output.status.success() => Err(err),
                    _ => Ok(output),
                }
            })
        })
        .map_err(service)?;

        if !output.status.success() {
            let failure = CommandFailed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            };
            tracing::warn!(error = %failure, "Receipt parser command failed");
            return Err(ParseFailure::Service {
                source: Box::new(failure),
            });
        }

        tracing::debug!(
            program = %self.program,
            input_bytes = bytes.len(),
            output_bytes = output.stdout.len(),
            "Receipt parser command finished"
        );
        parse_service_response(&output.stdout)
    }
}
