use actix::Recipient;
use futures::channel::mpsc::{self, UnboundedSender};
use futures::StreamExt;
use log::{debug, info, warn};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

use crate::engine::coordinator::{EngineLink, EngineOutput};
use crate::engine::protocol::EngineCommand;
use crate::error::EngineError;

/// A UCI engine running as a child process.
///
/// Commands are queued on a channel drained by a writer task, and every line
/// the engine prints is posted to `output`, so neither direction blocks the
/// actor that owns the link. Dropping the link closes the channel, which ends
/// the writer task and kills the process.
pub struct UciProcess {
    commands: UnboundedSender<String>,
}

impl UciProcess {
    pub fn spawn(path: &Path, output: Recipient<EngineOutput>) -> Result<Self, EngineError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                path: path.display().to_string(),
                source,
            })?;
        let mut stdin = child.stdin.take().ok_or(EngineError::MissingPipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(EngineError::MissingPipe("stdout"))?;
        info!("Started engine process {}", path.display());

        let (commands, mut queued) = mpsc::unbounded::<String>();

        actix::spawn(async move {
            while let Some(line) = queued.next().await {
                debug!("engine <- {}", line);
                let written = async {
                    stdin.write_all(line.as_bytes()).await?;
                    stdin.write_all(b"\n").await?;
                    stdin.flush().await
                };
                if let Err(e) = written.await {
                    warn!("Failed to write to engine: {}", e);
                    break;
                }
            }
            drop(stdin);
            if let Err(e) = child.kill().await {
                debug!("Engine process already gone: {}", e);
            }
        });

        actix::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if output.send(EngineOutput(line)).await.is_err() {
                            debug!("Engine output has no listener anymore");
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("Engine closed its output");
                        break;
                    }
                    Err(e) => {
                        warn!("Failed to read engine output: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(Self { commands })
    }
}

impl EngineLink for UciProcess {
    fn send(&mut self, command: &EngineCommand) -> Result<(), EngineError> {
        self.commands
            .unbounded_send(command.to_string())
            .map_err(|_| EngineError::Disconnected)
    }
}
