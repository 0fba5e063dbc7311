//! The content accessor contract to the host editor.
//!
//! The core never inspects document structure beyond plain text/markup;
//! formatting fidelity is the accessor's concern.

use crate::error::CoreResult;
use async_trait::async_trait;
use std::sync::RwLock;

/// Live document content access, provided by the embedding editor.
#[async_trait]
pub trait ContentAccessor: Send + Sync {
    /// Read the current document content.
    async fn current_content(&self) -> CoreResult<String>;

    /// Replace the document content wholesale.
    async fn replace_content(&self, content: &str) -> CoreResult<()>;
}

/// An in-memory content buffer.
///
/// Used by tests and by embedders that stage content in memory before
/// flushing it to the real editor surface.
pub struct BufferAccessor {
    content: RwLock<String>,
}

impl BufferAccessor {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            content: RwLock::new(initial.into()),
        }
    }

    /// Overwrite the buffer directly, simulating user edits.
    pub fn set(&self, content: impl Into<String>) {
        let mut guard = self.content.write().unwrap_or_else(|e| e.into_inner());
        *guard = content.into();
    }

    /// Read the buffer directly.
    pub fn get(&self) -> String {
        self.content
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl ContentAccessor for BufferAccessor {
    async fn current_content(&self) -> CoreResult<String> {
        Ok(self.get())
    }

    async fn replace_content(&self, content: &str) -> CoreResult<()> {
        self.set(content);
        Ok(())
    }
}
