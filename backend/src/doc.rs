//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] describes every page, form and probe route together with the
//! view model and form schemas. It backs Swagger UI in debug builds and
//! `cargo run --bin openapi-dump`.

use crate::domain::{
    Book, Error, ErrorCode, FlashKind, FlashMessage, IdentitySnapshot, Role,
};
use crate::inbound::http::auth::{LoginForm, RegisterForm};
use crate::inbound::http::books::BookForm;
use crate::inbound::http::page::Page;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie renewed by POST /auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the page and form routes.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Bookshelf",
        description = "Book catalogue with session-based accounts. Pages are JSON view models; \
                       every state change answers 303 See Other.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::index,
        crate::inbound::http::auth::register_form,
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login_form,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::current_user,
        crate::inbound::http::books::list_books,
        crate::inbound::http::books::new_book_form,
        crate::inbound::http::books::create_book,
        crate::inbound::http::books::show_book,
        crate::inbound::http::books::edit_book_form,
        crate::inbound::http::books::update_book,
        crate::inbound::http::books::delete_book,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Page,
        FlashMessage,
        FlashKind,
        IdentitySnapshot,
        Role,
        Book,
        Error,
        ErrorCode,
        RegisterForm,
        LoginForm,
        BookForm,
    )),
    tags(
        (name = "pages", description = "Anonymous landing page"),
        (name = "auth", description = "Registration, login and logout"),
        (name = "books", description = "Catalogue pages; changes need an administrator"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
