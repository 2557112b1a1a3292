//! HTTP inbound adapter: pages, forms and the authorization gates.

pub mod auth;
pub mod books;
pub mod error;
pub mod flash;
pub mod forms;
pub mod guards;
pub mod health;
pub mod page;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;

use actix_web::web;

/// Register every page and form route.
///
/// Expects `web::Data<HttpState>` in app data and a session middleware
/// around the service. `/books/new` is registered ahead of `/books/{id}`
/// so it is not read as an id. Undecodable form bodies are answered with
/// a flash message and a redirect back to their form.
///
/// # Examples
/// ```
/// use actix_web::App;
///
/// let _app = App::new().configure(bookshelf::inbound::http::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(forms::form_config())
        .service(auth::index)
        .service(auth::register_form)
        .service(auth::register)
        .service(auth::login_form)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::current_user)
        .service(books::list_books)
        .service(books::new_book_form)
        .service(books::create_book)
        .service(books::show_book)
        .service(books::edit_book_form)
        .service(books::update_book)
        .service(books::delete_book);
}
