//! Shared harness for end-to-end page tests.
//!
//! Builds the full page application over in-memory stores and a clock the
//! test controls, and offers a small cookie-keeping [`Browser`].

use std::sync::Arc;
use std::time::Duration;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use bookshelf::Trace;
use bookshelf::domain::{AuthenticationService, PasswordPolicy};
use bookshelf::inbound::http::{configure, state::HttpState};
use bookshelf::outbound::bcrypt_hasher::BcryptHasher;
use bookshelf::outbound::memory::{
    InMemoryBookRepository, InMemorySessionStore, InMemoryUserRepository,
};
use bookshelf::test_support::MutableClock;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

pub const IDLE_TIMEOUT_SECS: u64 = 600;
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const PASSWORD: &str = "secret1";

pub struct Harness {
    pub state: web::Data<HttpState>,
    pub users: Arc<InMemoryUserRepository>,
    pub clock: Arc<MutableClock>,
    key: Key,
}

impl Harness {
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let clock = Arc::new(MutableClock::new(Utc::now()));
        let hasher = BcryptHasher::new(BcryptHasher::MIN_COST).expect("minimum cost is valid");
        let auth = AuthenticationService::new(
            users.clone(),
            Arc::new(hasher),
            Arc::new(InMemorySessionStore::new(
                clock.clone(),
                Duration::from_secs(IDLE_TIMEOUT_SECS),
            )),
            PasswordPolicy::default(),
        );
        Self {
            state: web::Data::new(HttpState::new(auth, Arc::new(InMemoryBookRepository::new()))),
            users,
            clock,
            key: Key::generate(),
        }
    }

    /// Seed the operator's administrator account.
    pub async fn with_admin(self) -> Self {
        self.state
            .auth
            .bootstrap_admin("Admin", ADMIN_EMAIL, PASSWORD)
            .await
            .expect("bootstrap admin");
        self
    }

    pub async fn app(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name("session".to_owned())
            .cookie_secure(false)
            .build();
        test::init_service(
            App::new()
                .app_data(self.state.clone())
                .wrap(session)
                .wrap(Trace)
                .configure(configure),
        )
        .await
    }
}

/// A client that replays the last session cookie it was given.
pub struct Browser<'a, S> {
    app: &'a S,
    jar: Option<Cookie<'static>>,
}

impl<'a, S> Browser<'a, S>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    pub fn new(app: &'a S) -> Self {
        Self { app, jar: None }
    }

    pub fn cookie(&self) -> Option<Cookie<'static>> {
        self.jar.clone()
    }

    pub fn set_cookie(&mut self, cookie: Option<Cookie<'static>>) {
        self.jar = cookie;
    }

    async fn send(&mut self, request: TestRequest) -> ServiceResponse {
        let request = match &self.jar {
            Some(cookie) => request.cookie(cookie.clone()),
            None => request,
        };
        let res = test::call_service(self.app, request.to_request()).await;
        if let Some(cookie) = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
        {
            self.jar = Some(cookie.into_owned());
        }
        res
    }

    pub async fn get(&mut self, path: &str) -> ServiceResponse {
        self.send(TestRequest::get().uri(path)).await
    }

    pub async fn post_form(&mut self, path: &str, form: impl Serialize) -> ServiceResponse {
        self.send(TestRequest::post().uri(path).set_form(form)).await
    }

    /// Render a page, which also drains its flash messages.
    pub async fn page(&mut self, path: &str) -> Value {
        let res = self.get(path).await;
        assert_eq!(res.status(), StatusCode::OK, "GET {path}");
        test::read_body_json(res).await
    }

    pub async fn register(&mut self, display_name: &str, email: &str, password: &str) -> ServiceResponse {
        self.post_form(
            "/auth/register",
            vec![("displayName", display_name), ("email", email), ("password", password)],
        )
        .await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> ServiceResponse {
        self.post_form("/auth/login", vec![("email", email), ("password", password)])
            .await
    }
}

pub fn location(res: &ServiceResponse) -> Option<String> {
    res.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

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
