//! Transport that writes effects to stdout as JSON lines.
//!
//! Used by `run` when no chat client is wired in: each delivery or edit is
//! one line on stdout, so a downstream process can replay them against the
//! real channel.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

use super::memory::TransportEffect;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::MessageRef;
use crate::domain::ports::Transport;

pub struct ConsoleTransport {
    out: Mutex<Stdout>,
    next_id: AtomicI64,
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Hand out message ids from `first`, so ids stay unique across runs
    /// when the caller knows the highest id already stored.
    pub fn starting_at(first: i64) -> Self {
        Self {
            out: Mutex::new(tokio::io::stdout()),
            next_id: AtomicI64::new(first),
        }
    }

    /// Continue numbering after `last`.
    pub fn resume_after(&self, last: i64) {
        self.next_id.fetch_max(last.saturating_add(1), Ordering::SeqCst);
    }

    async fn emit(&self, effect: &TransportEffect) -> DomainResult<()> {
        let mut line = serde_json::to_string(effect)?;
        line.push('\n');
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes())
            .await
            .map_err(|e| DomainError::TransportFailed(e.to_string()))?;
        out.flush()
            .await
            .map_err(|e| DomainError::TransportFailed(e.to_string()))
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn deliver(&self, channel_id: i64, text: &str) -> DomainResult<MessageRef> {
        let message = MessageRef {
            channel_id,
            message_id: self.next_id.fetch_add(1, Ordering::SeqCst),
        };
        self.emit(&TransportEffect::Deliver {
            message,
            text: text.to_string(),
        })
        .await?;
        Ok(message)
    }

    async fn edit(&self, message: MessageRef, text: &str) -> DomainResult<()> {
        self.emit(&TransportEffect::Edit {
            message,
            text: text.to_string(),
        })
        .await
    }
}
