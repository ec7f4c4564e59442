//! Preview playback backend
//!
//! Rodio's output stream is not `Send`, so a dedicated thread owns it and
//! the sink. The controller talks to the thread over a command channel and
//! receives lifecycle events (track ended, decode failure) over a tokio
//! channel. `Play` always tears down the previous sink before starting the
//! new preview, so two sessions are never audible at once.

use std::io::Cursor;
use std::sync::mpsc;
use std::time::Duration;
use anyhow::Result;
use rodio::{Decoder, OutputStream, Sink};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub enum PlayerCommand {
    Play { melody_id: String, bytes: Vec<u8> },
    Stop,
    Shutdown,
}

#[derive(Clone, Debug)]
pub enum PlayerEvent {
    TrackEnded { melody_id: String },
    PlaybackFailed { melody_id: String, reason: String },
}

pub struct AudioBackend {
    commands: mpsc::Sender<PlayerCommand>,
    events: Option<UnboundedReceiver<PlayerEvent>>,
}

impl AudioBackend {
    /// Spawn the playback thread. Fails when no audio output device is
    /// available.
    pub fn new() -> Result<Self> {
        let (command_tx, command_rx) = mpsc::channel::<PlayerCommand>();
        let (event_tx, event_rx) = unbounded_channel::<PlayerEvent>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

        std::thread::Builder::new()
            .name("melomarket-audio".to_string())
            .spawn(move || playback_thread(command_rx, event_tx, ready_tx))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(reason)) => return Err(anyhow::anyhow!("Audio output unavailable: {}", reason)),
            Err(_) => return Err(anyhow::anyhow!("Audio thread died during startup")),
        }

        tracing::info!("Audio backend initialized");
        Ok(Self { commands: command_tx, events: Some(event_rx) })
    }

    /// The event channel can be taken exactly once, by the event listener.
    pub fn take_event_channel(&mut self) -> Option<UnboundedReceiver<PlayerEvent>> {
        self.events.take()
    }

    pub fn play(&self, melody_id: String, bytes: Vec<u8>) -> Result<()> {
        self.commands
            .send(PlayerCommand::Play { melody_id, bytes })
            .map_err(|_| anyhow::anyhow!("Audio thread is gone"))
    }

    pub fn stop(&self) -> Result<()> {
        self.commands.send(PlayerCommand::Stop).map_err(|_| anyhow::anyhow!("Audio thread is gone"))
    }
}

impl Drop for AudioBackend {
    fn drop(&mut self) {
        let _ = self.commands.send(PlayerCommand::Shutdown);
    }
}

fn playback_thread(
    commands: mpsc::Receiver<PlayerCommand>,
    events: UnboundedSender<PlayerEvent>,
    ready: mpsc::Sender<Result<(), String>>,
) {
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(output) => {
            let _ = ready.send(Ok(()));
            output
        }
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };

    let mut current: Option<(String, Sink)> = None;

    loop {
        match commands.recv_timeout(EVENT_POLL_INTERVAL) {
            Ok(PlayerCommand::Play { melody_id, bytes }) => {
                // Stop the previous preview fully before starting the next.
                if let Some((_, sink)) = current.take() {
                    sink.stop();
                }

                let sink = match Sink::try_new(&handle) {
                    Ok(sink) => sink,
                    Err(e) => {
                        let _ = events.send(PlayerEvent::PlaybackFailed {
                            melody_id,
                            reason: e.to_string(),
                        });
                        continue;
                    }
                };

                match Decoder::new(Cursor::new(bytes)) {
                    Ok(source) => {
                        sink.append(source);
                        tracing::debug!(melody_id = %melody_id, "Preview started");
                        current = Some((melody_id, sink));
                    }
                    Err(e) => {
                        tracing::warn!(melody_id = %melody_id, error = %e, "Preview decode failed");
                        let _ = events.send(PlayerEvent::PlaybackFailed {
                            melody_id,
                            reason: e.to_string(),
                        });
                    }
                }
            }
            Ok(PlayerCommand::Stop) => {
                if let Some((melody_id, sink)) = current.take() {
                    sink.stop();
                    tracing::debug!(melody_id = %melody_id, "Preview stopped");
                }
            }
            Ok(PlayerCommand::Shutdown) => {
                if let Some((_, sink)) = current.take() {
                    sink.stop();
                }
                tracing::debug!("Audio thread shutting down");
                return;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // Drained sink means the preview ran to its natural end.
                if let Some((melody_id, sink)) = current.take() {
                    if sink.empty() {
                        tracing::debug!(melody_id = %melody_id, "Preview ended");
                        let _ = events.send(PlayerEvent::TrackEnded { melody_id });
                    } else {
                        current = Some((melody_id, sink));
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => return,
        }
    }
}
