//! Transport port for publishing and editing prediction messages.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::MessageRef;

/// Chat transport as seen by the engine.
///
/// Edits always carry the full replacement text, so an adapter may retry
/// an edit without tracking what was sent before.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Publish `text` on `channel_id` and return a handle for later edits.
    async fn deliver(&self, channel_id: i64, text: &str) -> DomainResult<MessageRef>;

    /// Replace the text of a previously delivered message.
    async fn edit(&self, message: MessageRef, text: &str) -> DomainResult<()>;
}
