//! In-memory transport for testing.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::MessageRef;
use crate::domain::ports::Transport;

/// One outbound effect as seen by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum TransportEffect {
    Deliver { message: MessageRef, text: String },
    Edit { message: MessageRef, text: String },
}

impl TransportEffect {
    pub fn text(&self) -> &str {
        match self {
            Self::Deliver { text, .. } | Self::Edit { text, .. } => text,
        }
    }

    pub fn message(&self) -> MessageRef {
        match self {
            Self::Deliver { message, .. } | Self::Edit { message, .. } => *message,
        }
    }
}

/// Records every effect and hands out sequential message ids.
pub struct MemoryTransport {
    effects: RwLock<Vec<TransportEffect>>,
    next_id: AtomicI64,
    fail_deliver: AtomicBool,
    fail_edit: AtomicBool,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            effects: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
            fail_deliver: AtomicBool::new(false),
            fail_edit: AtomicBool::new(false),
        }
    }

    pub fn fail_deliveries(&self, fail: bool) {
        self.fail_deliver.store(fail, Ordering::SeqCst);
    }

    pub fn fail_edits(&self, fail: bool) {
        self.fail_edit.store(fail, Ordering::SeqCst);
    }

    pub async fn effects(&self) -> Vec<TransportEffect> {
        self.effects.read().await.clone()
    }

    pub async fn delivered(&self) -> Vec<TransportEffect> {
        self.effects
            .read()
            .await
            .iter()
            .filter(|e| matches!(e, TransportEffect::Deliver { .. }))
            .cloned()
            .collect()
    }

    pub async fn edits(&self) -> Vec<TransportEffect> {
        self.effects
            .read()
            .await
            .iter()
            .filter(|e| matches!(e, TransportEffect::Edit { .. }))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn deliver(&self, channel_id: i64, text: &str) -> DomainResult<MessageRef> {
        if self.fail_deliver.load(Ordering::SeqCst) {
            return Err(DomainError::TransportFailed("delivery rejected".to_string()));
        }
        let message = MessageRef {
            channel_id,
            message_id: self.next_id.fetch_add(1, Ordering::SeqCst),
        };
        self.effects.write().await.push(TransportEffect::Deliver {
            message,
            text: text.to_string(),
        });
        Ok(message)
    }

    async fn edit(&self, message: MessageRef, text: &str) -> DomainResult<()> {
        if self.fail_edit.load(Ordering::SeqCst) {
            return Err(DomainError::TransportFailed("edit rejected".to_string()));
        }
        self.effects.write().await.push(TransportEffect::Edit {
            message,
            text: text.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deliver_assigns_sequential_ids() {
        let transport = MemoryTransport::new();
        let first = transport.deliver(-7, "a").await.unwrap();
        let second = transport.deliver(-7, "b").await.unwrap();
        assert_eq!(first.message_id + 1, second.message_id);
        assert_eq!(transport.delivered().await.len(), 2);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let transport = MemoryTransport::new();
        transport.fail_edits(true);
        let message = transport.deliver(-7, "a").await.unwrap();
        assert!(transport.edit(message, "b").await.is_err());
        assert!(transport.edits().await.is_empty());
    }
}
