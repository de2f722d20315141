//! Command queue bridging the network side to the tick loop
//!
//! Single producer (the relay accept loop), single consumer (the
//! simulation tick loop). Implemented over an unbounded channel: `push`
//! cannot block or drop, and `pop` is a non-blocking poll so a tick with
//! no pending command is not an error. Unbounded growth under sustained
//! overload is an accepted risk.

use crate::command::Command;
use crate::{ArmError, Result};
use tokio::sync::mpsc;

/// Producer half of the command queue.
#[derive(Debug, Clone)]
pub struct QueueProducer {
    tx: mpsc::UnboundedSender<Command>,
}

/// Consumer half of the command queue.
#[derive(Debug)]
pub struct QueueConsumer {
    rx: mpsc::UnboundedReceiver<Command>,
}

/// Create a connected producer/consumer pair.
pub fn command_queue() -> (QueueProducer, QueueConsumer) {
    let (tx, rx) = mpsc::unbounded_channel();
    (QueueProducer { tx }, QueueConsumer { rx })
}

impl QueueProducer {
    /// Enqueue a command. Fails only when the consumer has shut down.
    pub fn push(&self, command: Command) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| ArmError::Connection("command queue closed".to_string()))
    }
}

impl QueueConsumer {
    /// Remove and return the oldest queued command, if any. Never blocks.
    pub fn pop(&mut self) -> Option<Command> {
        self.rx.try_recv().ok()
    }
}
