//! Executing or printing generated command groups.

use super::commands::Command;
use crate::error::{Result, TaxCompareError};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process;

/// Append-only log of a workflow run, written to the output directory.
pub struct WorkflowLogger {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl WorkflowLogger {
    /// Create a new log file `log_<YYYYmmddHHMMSS>.txt` in `output_dir`.
    ///
    /// Existing logs are never overwritten: if the name is taken, a counter
    /// is appended (`log_<stamp>_1.txt`, `log_<stamp>_2.txt`, ...).
    pub fn create(output_dir: &Path) -> Result<Self> {
        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S").to_string();
        let mut attempt = 0usize;
        loop {
            let name = if attempt == 0 {
                format!("log_{}.txt", stamp)
            } else {
                format!("log_{}_{}.txt", stamp, attempt)
            };
            let path = output_dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    return Ok(Self {
                        path,
                        writer: BufWriter::new(file),
                    })
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Create a log file at an explicit path.
    pub fn create_at(path: PathBuf) -> Result<Self> {
        let writer = BufWriter::new(File::create(&path)?);
        Ok(Self { path, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append text to the log.
    pub fn write(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Flush buffered output to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Strategy for dealing with generated command groups.
pub trait CommandHandler {
    /// Handle the groups in order, recording progress in `logger`.
    fn handle(&mut self, groups: &[Vec<Command>], logger: &mut WorkflowLogger) -> Result<()>;
}

/// Runs each command through `sh -c`, stopping at the first failure.
#[derive(Debug, Clone, Default)]
pub struct SerialRunner;

impl CommandHandler for SerialRunner {
    fn handle(&mut self, groups: &[Vec<Command>], logger: &mut WorkflowLogger) -> Result<()> {
        for command in groups.iter().flatten() {
            log::info!("{}", command.description);
            logger.write(&format!("{}\n", command))?;

            let output = process::Command::new("sh")
                .arg("-c")
                .arg(&command.command)
                .output()?;

            logger.write(&format!(
                "Stdout:\n{}\nStderr:\n{}\n",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            ))?;

            if !output.status.success() {
                logger.flush()?;
                return Err(TaxCompareError::Workflow(format!(
                    "Failed to execute command:\n{}\n\nExit status: {}\nStderr:\n{}",
                    command.command,
                    output.status,
                    String::from_utf8_lossy(&output.stderr)
                )));
            }
        }
        logger.flush()
    }
}

/// Prints commands without running them.
pub struct PrintCommands<W: Write> {
    out: W,
}

impl PrintCommands<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> PrintCommands<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the handler and return its writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CommandHandler for PrintCommands<W> {
    fn handle(&mut self, groups: &[Vec<Command>], logger: &mut WorkflowLogger) -> Result<()> {
        for command in groups.iter().flatten() {
            writeln!(self.out, "{}\n", command)?;
            logger.write(&format!("{}\n", command))?;
        }
        self.out.flush()?;
        logger.flush()
    }
}
