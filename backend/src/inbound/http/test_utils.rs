//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::test::TestRequest;
use actix_web::{App, web};
use serde_json::Value;

use crate::domain::{AuthenticationService, PasswordPolicy};
use crate::inbound::http::state::HttpState;
use crate::outbound::bcrypt_hasher::BcryptHasher;
use crate::outbound::memory::{
    DEFAULT_IDLE_TIMEOUT, InMemoryBookRepository, InMemorySessionStore, InMemoryUserRepository,
};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler state over in-memory stores and a minimum-cost hasher.
pub fn in_memory_state() -> web::Data<HttpState> {
    let hasher = BcryptHasher::new(BcryptHasher::MIN_COST).expect("minimum cost is valid");
    let auth = AuthenticationService::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(hasher),
        Arc::new(InMemorySessionStore::new(
            Arc::new(mockable::DefaultClock),
            DEFAULT_IDLE_TIMEOUT,
        )),
        PasswordPolicy::default(),
    );
    web::Data::new(HttpState::new(auth, Arc::new(InMemoryBookRepository::new())))
}

/// The `session` cookie set by `res`, if it set one.
pub fn session_cookie(res: &ServiceResponse) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// The `Location` header of a redirect.
pub fn location(res: &ServiceResponse) -> Option<String> {
    res.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// App with every page route, the given state and a test session layer.
pub fn routed_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .wrap(test_session_middleware())
        .configure(crate::inbound::http::configure)
}

/// Attach the cookie from an earlier response, if there was one.
pub fn with_cookie(request: TestRequest, jar: &Option<Cookie<'static>>) -> TestRequest {
    match jar {
        Some(cookie) => request.cookie(cookie.clone()),
        None => request,
    }
}

/// Text of every flash message rendered on a page.
pub fn flash_texts(page: &Value) -> Vec<String> {
    page["flash"]
        .as_array()
        .map(|messages| {
            messages
                .iter()
                .filter_map(|message| message["text"].as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}
