//! Recovery for form bodies that cannot be decoded.
//!
//! Missing fields already decode as empty strings and meet domain
//! validation. What remains (a wrong content type, broken percent-encoding,
//! an oversized body) is turned into a flash message and a redirect back to
//! the form that was submitted, without decoder detail.

use actix_session::SessionExt;
use actix_web::error::{InternalError, UrlencodedError};
use actix_web::{HttpRequest, web};
use tracing::warn;

use crate::domain::{FlashChannel, FlashMessage, LOGIN_PATH, ROOT_PATH};

use super::auth::{BOOKS_PATH, REGISTER_PATH};
use super::books::NEW_BOOK_PATH;
use super::flash::SessionFlash;
use super::page::see_other;

/// Flash text for a form body that could not be decoded.
pub const UNREADABLE_FORM_MESSAGE: &str = "The form could not be read, please try again";

/// `FormConfig` that answers undecodable bodies with flash and redirect.
pub fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(unreadable_form)
}

fn unreadable_form(err: UrlencodedError, req: &HttpRequest) -> actix_web::Error {
    let back_to = form_page(req.path());
    warn!(error = %err, path = req.path(), "form body rejected");
    if let Err(flash_err) =
        SessionFlash::new(req.get_session()).push(FlashMessage::error(UNREADABLE_FORM_MESSAGE))
    {
        warn!(error = %flash_err, "failed to queue form flash message");
    }
    InternalError::from_response(err, see_other(back_to)).into()
}

/// The page holding the form that posts to `path`.
fn form_page(path: &str) -> String {
    match path {
        REGISTER_PATH | LOGIN_PATH => path.to_owned(),
        BOOKS_PATH => NEW_BOOK_PATH.to_owned(),
        _ if path.starts_with("/books/") => format!("{path}/edit"),
        _ => ROOT_PATH.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/auth/register", "/auth/register")]
    #[case("/auth/login", "/auth/login")]
    #[case("/books", "/books/new")]
    #[case("/books/6d1f0c1e-3a7b-4a59-9c38-2f2d3f4e5a6b", "/books/6d1f0c1e-3a7b-4a59-9c38-2f2d3f4e5a6b/edit")]
    #[case("/elsewhere", "/")]
    fn rejected_forms_return_to_their_page(#[case] posted_to: &str, #[case] expected: &str) {
        assert_eq!(form_page(posted_to), expected);
    }
}
