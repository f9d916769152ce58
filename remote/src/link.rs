use protocol::Command;
use std::path::PathBuf;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

pub type Writer = Box<dyn AsyncWrite + Send + Unpin>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("transport failure: {0}")]
    TransportFailure(#[from] std::io::Error),
}

/// BLE serial link to the hand controller.
///
/// Commands arrive through `cmd_queue` and are written as plain ASCII.
/// Nothing is read back: the controller does not acknowledge commands.
pub struct Link {
    writer: Writer,
    cmd_queue: mpsc::Receiver<Command>,
    offline: bool,
}

impl Link {
    /// Opens the serial device of the link, or a sink when `device` is `None`.
    pub async fn open(
        device: Option<PathBuf>,
        cmd_queue: mpsc::Receiver<Command>,
    ) -> Result<Self, crate::error::Error> {
        let Some(device) = device else {
            info!("Offline mode, commands are only logged");
            return Ok(Link {
                writer: Box::new(tokio::io::sink()),
                cmd_queue,
                offline: true,
            });
        };

        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .open(&device)
            .await
            .map_err(|err| crate::error::Error::MissingOutputDevice {
                device: device.clone(),
                err,
            })?;
        info!("Opened link device {}", device.display());

        Ok(Link::new(Box::new(file), cmd_queue))
    }

    pub fn new(writer: Writer, cmd_queue: mpsc::Receiver<Command>) -> Self {
        Link {
            writer,
            cmd_queue,
            offline: false,
        }
    }

    /// Sends queued commands until every sender is gone. Returns the number
    /// of commands written.
    pub async fn run(&mut self) -> u64 {
        let mut sent = 0;
        while let Some(cmd) = self.cmd_queue.recv().await {
            match self.send(&cmd).await {
                Ok(()) => sent += 1,
                Err(e) => error!("could not send {cmd}: {e:?}"),
            }
        }
        info!("Command queue closed");
        sent
    }

    pub async fn send(&mut self, cmd: &Command) -> Result<(), Error> {
        if self.offline {
            info!("Sending: {cmd}");
        } else {
            debug!("Sending: {cmd}");
        }
        self.writer.write_all(cmd.to_string().as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
