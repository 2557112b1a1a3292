//! Book catalogue kept in memory.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{BookRepository, BookRepositoryError};
use crate::domain::{Book, BookDraft, BookId};

#[derive(Debug, Default)]
pub struct InMemoryBookRepository {
    books: RwLock<HashMap<BookId, Book>>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn list(&self) -> Result<Vec<Book>, BookRepositoryError> {
        let mut books: Vec<Book> = self.books.read().await.values().cloned().collect();
        books.sort_by(|left, right| {
            left.title
                .to_lowercase()
                .cmp(&right.title.to_lowercase())
                .then_with(|| left.id.as_uuid().cmp(right.id.as_uuid()))
        });
        Ok(books)
    }

    async fn find(&self, id: &BookId) -> Result<Option<Book>, BookRepositoryError> {
        Ok(self.books.read().await.get(id).cloned())
    }

    async fn create(&self, draft: BookDraft) -> Result<Book, BookRepositoryError> {
        let book = Book::from_draft(BookId::random(), draft);
        self.books.write().await.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update(
        &self,
        id: &BookId,
        draft: BookDraft,
    ) -> Result<Option<Book>, BookRepositoryError> {
        let mut books = self.books.write().await;
        let Some(slot) = books.get_mut(id) else {
            return Ok(None);
        };
        *slot = Book::from_draft(*id, draft);
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: &BookId) -> Result<bool, BookRepositoryError> {
        Ok(self.books.write().await.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn draft(title: &str) -> BookDraft {
        BookDraft::try_from_parts(title, "Author", "10", None).expect("valid draft")
    }

    #[rstest]
    #[tokio::test]
    async fn list_is_ordered_by_title() {
        let repo = InMemoryBookRepository::new();
        repo.create(draft("zeta")).await.expect("create");
        repo.create(draft("Alpha")).await.expect("create");

        let titles: Vec<String> = repo
            .list()
            .await
            .expect("list")
            .into_iter()
            .map(|book| book.title)
            .collect();

        assert_eq!(titles, vec!["Alpha".to_owned(), "zeta".to_owned()]);
    }

    #[rstest]
    #[tokio::test]
    async fn update_and_delete_report_missing_ids() {
        let repo = InMemoryBookRepository::new();
        let missing = BookId::random();

        assert_eq!(repo.update(&missing, draft("x")).await.expect("update"), None);
        assert!(!repo.delete(&missing).await.expect("delete"));
    }

    #[rstest]
    #[tokio::test]
    async fn update_replaces_fields_and_keeps_id() {
        let repo = InMemoryBookRepository::new();
        let created = repo.create(draft("Old")).await.expect("create");

        let updated = repo
            .update(&created.id, draft("New"))
            .await
            .expect("update")
            .expect("book exists");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "New");
        assert!(repo.delete(&created.id).await.expect("delete"));
        assert_eq!(repo.find(&created.id).await.expect("find"), None);
    }
}
