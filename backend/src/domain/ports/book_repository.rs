//! Port for the book catalogue.

use async_trait::async_trait;

use crate::domain::{Book, BookDraft, BookId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by book repository adapters.
    pub enum BookRepositoryError {
        /// Query or mutation failed during execution.
        Storage { message: String } => "book repository failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// All books ordered by title.
    async fn list(&self) -> Result<Vec<Book>, BookRepositoryError>;

    async fn find(&self, id: &BookId) -> Result<Option<Book>, BookRepositoryError>;

    async fn create(&self, draft: BookDraft) -> Result<Book, BookRepositoryError>;

    /// Replace a book's fields. Returns `None` when the id is unknown.
    async fn update(
        &self,
        id: &BookId,
        draft: BookDraft,
    ) -> Result<Option<Book>, BookRepositoryError>;

    /// Remove a book. Returns whether a row was removed.
    async fn delete(&self, id: &BookId) -> Result<bool, BookRepositoryError>;
}
