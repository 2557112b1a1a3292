//! Book catalogue handlers.
//!
//! Reads pass `require_authenticated`; every mutation passes
//! `require_role(admin)`. Validation failures go back to the form with all
//! messages in a single flash.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::ports::BookRepositoryError;
use crate::domain::{
    Book, BookDraft, BookId, BookValidationError, FlashChannel, FlashMessage, ROOT_PATH,
    TRY_AGAIN_MESSAGE,
};
use crate::inbound::http::flash::SessionFlash;
use crate::inbound::http::guards::{AdminIdentity, Authenticated};
use crate::inbound::http::page::{Page, see_other};
use crate::inbound::http::state::HttpState;

use super::auth::BOOKS_PATH;

pub const BOOK_NOT_FOUND_MESSAGE: &str = "Book not found";
pub const BOOK_CREATED_MESSAGE: &str = "Book created";
pub const BOOK_UPDATED_MESSAGE: &str = "Book updated";
pub const BOOK_DELETED_MESSAGE: &str = "Book deleted";

pub(crate) const NEW_BOOK_PATH: &str = "/books/new";

/// Create and edit form body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct BookForm {
    #[schema(example = "Cien años de soledad")]
    #[serde(default)]
    pub title: String,
    #[schema(example = "Gabriel García Márquez")]
    #[serde(default)]
    pub author: String,
    #[schema(example = "19.90")]
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl BookForm {
    fn validate(&self) -> Result<BookDraft, Vec<BookValidationError>> {
        BookDraft::try_from_parts(
            &self.title,
            &self.author,
            &self.price,
            self.description.as_deref(),
        )
    }
}

fn book_path(id: &BookId) -> String {
    format!("/books/{id}")
}

fn flash(channel: &dyn FlashChannel, message: FlashMessage) {
    if let Err(err) = channel.push(message) {
        warn!(error = %err, "failed to queue flash message");
    }
}

fn rejected(channel: &dyn FlashChannel, errors: &[BookValidationError], back_to: String) -> HttpResponse {
    let text = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(". ");
    flash(channel, FlashMessage::error(text));
    see_other(back_to)
}

fn not_found(channel: &dyn FlashChannel) -> HttpResponse {
    flash(channel, FlashMessage::error(BOOK_NOT_FOUND_MESSAGE));
    see_other(BOOKS_PATH)
}

fn storage_failure(channel: &dyn FlashChannel, err: &BookRepositoryError) -> HttpResponse {
    error!(error = %err, "book repository failed");
    flash(channel, FlashMessage::error(TRY_AGAIN_MESSAGE));
    see_other(BOOKS_PATH)
}

/// Ids that do not parse can never name a book.
fn parse_id(raw: &str) -> Option<BookId> {
    Uuid::parse_str(raw).ok().map(BookId::from_uuid)
}

/// Load the book named by the path, or answer with the redirect to use.
async fn load(
    state: &HttpState,
    channel: &dyn FlashChannel,
    raw_id: &str,
) -> Result<Book, HttpResponse> {
    let Some(id) = parse_id(raw_id) else {
        return Err(not_found(channel));
    };
    match state.books.find(&id).await {
        Ok(Some(book)) => Ok(book),
        Ok(None) => Err(not_found(channel)),
        Err(err) => Err(storage_failure(channel, &err)),
    }
}

/// Catalogue listing.
#[utoipa::path(
    get,
    path = "/books",
    responses(
        (status = 200, description = "Catalogue page; `data.books` lists every book", body = Page),
        (status = 303, description = "Not logged in; to the login form"),
    ),
    tags = ["books"],
    operation_id = "listBooks"
)]
#[get("/books")]
pub async fn list_books(
    Authenticated(identity): Authenticated,
    state: web::Data<HttpState>,
    flash_channel: SessionFlash,
) -> HttpResponse {
    match state.books.list().await {
        Ok(books) => Page::new("Books", "books/index")
            .with_data(json!({ "books": books }))
            .render(&flash_channel, Some(identity)),
        Err(err) => {
            error!(error = %err, "book listing failed");
            flash(&flash_channel, FlashMessage::error(TRY_AGAIN_MESSAGE));
            see_other(ROOT_PATH)
        }
    }
}

/// Empty form for a new book.
#[utoipa::path(
    get,
    path = "/books/new",
    responses(
        (status = 200, description = "New book form", body = Page),
        (status = 303, description = "Not an administrator"),
    ),
    tags = ["books"],
    operation_id = "newBookForm"
)]
#[get("/books/new")]
pub async fn new_book_form(
    AdminIdentity(identity): AdminIdentity,
    flash_channel: SessionFlash,
) -> HttpResponse {
    Page::new("New book", "books/new").render(&flash_channel, Some(identity))
}

/// Add a book to the catalogue.
#[utoipa::path(
    post,
    path = "/books",
    request_body(content = BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "To the new book on success, back to the form otherwise"),
    ),
    tags = ["books"],
    operation_id = "createBook"
)]
#[post("/books")]
pub async fn create_book(
    AdminIdentity(identity): AdminIdentity,
    state: web::Data<HttpState>,
    flash_channel: SessionFlash,
    form: web::Form<BookForm>,
) -> HttpResponse {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => return rejected(&flash_channel, &errors, NEW_BOOK_PATH.to_owned()),
    };
    match state.books.create(draft).await {
        Ok(book) => {
            info!(book_id = %book.id, user_id = %identity.id, "book created");
            flash(&flash_channel, FlashMessage::info(BOOK_CREATED_MESSAGE));
            see_other(book_path(&book.id))
        }
        Err(err) => storage_failure(&flash_channel, &err),
    }
}

/// Book detail.
#[utoipa::path(
    get,
    path = "/books/{id}",
    params(("id" = String, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Book page; `data.book` holds the book", body = Page),
        (status = 303, description = "Not logged in, or no such book"),
    ),
    tags = ["books"],
    operation_id = "showBook"
)]
#[get("/books/{id}")]
pub async fn show_book(
    Authenticated(identity): Authenticated,
    state: web::Data<HttpState>,
    flash_channel: SessionFlash,
    path: web::Path<String>,
) -> HttpResponse {
    match load(&state, &flash_channel, &path).await {
        Ok(book) => Page::new(book.title.clone(), "books/show")
            .with_data(json!({ "book": book }))
            .render(&flash_channel, Some(identity)),
        Err(redirect) => redirect,
    }
}

/// Form pre-filled with a book.
#[utoipa::path(
    get,
    path = "/books/{id}/edit",
    params(("id" = String, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Edit form", body = Page),
        (status = 303, description = "Not an administrator, or no such book"),
    ),
    tags = ["books"],
    operation_id = "editBookForm"
)]
#[get("/books/{id}/edit")]
pub async fn edit_book_form(
    AdminIdentity(identity): AdminIdentity,
    state: web::Data<HttpState>,
    flash_channel: SessionFlash,
    path: web::Path<String>,
) -> HttpResponse {
    match load(&state, &flash_channel, &path).await {
        Ok(book) => Page::new(format!("Edit {}", book.title), "books/edit")
            .with_data(json!({ "book": book }))
            .render(&flash_channel, Some(identity)),
        Err(redirect) => redirect,
    }
}

/// Replace a book's fields.
#[utoipa::path(
    post,
    path = "/books/{id}",
    params(("id" = String, Path, description = "Book identifier")),
    request_body(content = BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "To the book on success, back to the form otherwise"),
    ),
    tags = ["books"],
    operation_id = "updateBook"
)]
#[post("/books/{id}")]
pub async fn update_book(
    AdminIdentity(identity): AdminIdentity,
    state: web::Data<HttpState>,
    flash_channel: SessionFlash,
    path: web::Path<String>,
    form: web::Form<BookForm>,
) -> HttpResponse {
    let Some(id) = parse_id(&path) else {
        return not_found(&flash_channel);
    };
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => return rejected(&flash_channel, &errors, format!("{}/edit", book_path(&id))),
    };
    match state.books.update(&id, draft).await {
        Ok(Some(book)) => {
            info!(book_id = %book.id, user_id = %identity.id, "book updated");
            flash(&flash_channel, FlashMessage::info(BOOK_UPDATED_MESSAGE));
            see_other(book_path(&book.id))
        }
        Ok(None) => not_found(&flash_channel),
        Err(err) => storage_failure(&flash_channel, &err),
    }
}

/// Remove a book.
#[utoipa::path(
    post,
    path = "/books/{id}/delete",
    params(("id" = String, Path, description = "Book identifier")),
    responses((status = 303, description = "To the catalogue")),
    tags = ["books"],
    operation_id = "deleteBook"
)]
#[post("/books/{id}/delete")]
pub async fn delete_book(
    AdminIdentity(identity): AdminIdentity,
    state: web::Data<HttpState>,
    flash_channel: SessionFlash,
    path: web::Path<String>,
) -> HttpResponse {
    let Some(id) = parse_id(&path) else {
        return not_found(&flash_channel);
    };
    match state.books.delete(&id).await {
        Ok(true) => {
            info!(book_id = %id, user_id = %identity.id, "book deleted");
            flash(&flash_channel, FlashMessage::info(BOOK_DELETED_MESSAGE));
            see_other(BOOKS_PATH)
        }
        Ok(false) => not_found(&flash_channel),
        Err(err) => storage_failure(&flash_channel, &err),
    }
}

#[cfg(test)]
#[path = "books_tests.rs"]
mod tests;
