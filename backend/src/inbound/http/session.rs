//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie only carries the opaque session token; the identity it stands
//! for is held by the server-side session store and resolved on each
//! request through the authentication service.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, error};

use crate::domain::{AuthenticationService, Error, IdentitySnapshot, SessionToken};

pub(crate) const SESSION_TOKEN_KEY: &str = "session_token";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Underlying session, for adapters that share it.
    pub fn session(&self) -> &Session {
        &self.0
    }

    /// Store a freshly issued token under a renewed cookie, so a cookie
    /// planted before login cannot carry over into the new session.
    pub fn start(&self, token: &SessionToken) -> Result<(), Error> {
        self.0.renew();
        self.0.insert(SESSION_TOKEN_KEY, token.as_str())?;
        Ok(())
    }

    /// Token held by the cookie, if any.
    pub fn token(&self) -> Result<Option<SessionToken>, Error> {
        let raw = self.0.get::<String>(SESSION_TOKEN_KEY)?;
        Ok(raw
            .filter(|raw| !raw.is_empty())
            .map(SessionToken::from_raw))
    }

    /// Drop the token from the cookie. Pending flash messages stay.
    pub fn forget_token(&self) {
        self.0.remove(SESSION_TOKEN_KEY);
        self.0.renew();
    }

    /// Resolve the identity behind the cookie's token.
    ///
    /// A token the store no longer knows (expired or logged out elsewhere)
    /// is removed from the cookie and reported as `None`. Store outages are
    /// reported as `service_unavailable` without detail.
    pub async fn identity(
        &self,
        auth: &AuthenticationService,
    ) -> Result<Option<IdentitySnapshot>, Error> {
        let Some(token) = self.token()? else {
            return Ok(None);
        };
        match auth.current_identity(&token).await {
            Ok(Some(identity)) => Ok(Some(identity)),
            Ok(None) => {
                debug!("session token no longer valid; clearing cookie");
                self.0.remove(SESSION_TOKEN_KEY);
                Ok(None)
            }
            Err(err) => {
                error!(error = %err, "session lookup failed");
                Err(Error::service_unavailable(err.user_message()))
            }
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::{MockPasswordHasher, MockSessionStore, MockUserRepository};
    use crate::domain::{DisplayName, Email, PasswordPolicy, Role, UserId};
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    fn snapshot() -> IdentitySnapshot {
        IdentitySnapshot {
            id: UserId::random(),
            display_name: DisplayName::new("Ana").expect("name"),
            email: Email::new("ana@example.com").expect("email"),
            role: Role::Member,
        }
    }

    fn auth_with_sessions(sessions: MockSessionStore) -> web::Data<AuthenticationService> {
        web::Data::new(AuthenticationService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockPasswordHasher::new()),
            Arc::new(sessions),
            PasswordPolicy::default(),
        ))
    }

    fn session_test_app(
        auth: web::Data<AuthenticationService>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(auth)
            .wrap(test_session_middleware())
            .route(
                "/start",
                web::get().to(|session: SessionContext| async move {
                    session.start(&SessionToken::from_raw("live-token"))?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/whoami",
                web::get().to(
                    |session: SessionContext, auth: web::Data<AuthenticationService>| async move {
                        let identity = session.identity(&auth).await?;
                        let token = session.token()?;
                        Ok::<_, Error>(HttpResponse::Ok().json(serde_json::json!({
                            "name": identity.map(|i| i.display_name.as_ref().to_owned()),
                            "hasToken": token.is_some(),
                        })))
                    },
                ),
            )
    }

    #[actix_web::test]
    async fn resolves_identity_for_live_token() {
        let mut sessions = MockSessionStore::new();
        sessions
            .expect_find()
            .withf(|token| token.as_str() == "live-token")
            .returning(|_| Ok(Some(snapshot())));
        let app = test::init_service(session_test_app(auth_with_sessions(sessions))).await;
        let started =
            test::call_service(&app, test::TestRequest::get().uri("/start").to_request()).await;
        let cookie = session_cookie(&started).expect("session cookie set");

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["name"], "Ana");
        assert_eq!(body["hasToken"], true);
    }

    #[actix_web::test]
    async fn expired_token_reads_as_anonymous_and_is_cleared() {
        let mut sessions = MockSessionStore::new();
        sessions.expect_find().returning(|_| Ok(None));
        let app = test::init_service(session_test_app(auth_with_sessions(sessions))).await;
        let started =
            test::call_service(&app, test::TestRequest::get().uri("/start").to_request()).await;
        let cookie = session_cookie(&started).expect("session cookie set");

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body: serde_json::Value = test::read_body_json(res).await;
        assert!(body["name"].is_null());
        assert_eq!(body["hasToken"], false);
    }

    #[actix_web::test]
    async fn missing_cookie_never_touches_the_store() {
        let mut sessions = MockSessionStore::new();
        sessions.expect_find().times(0);
        let app = test::init_service(session_test_app(auth_with_sessions(sessions))).await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/whoami").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn store_outage_is_service_unavailable() {
        let mut sessions = MockSessionStore::new();
        sessions.expect_find().returning(|_| {
            Err(crate::domain::ports::SessionStoreError::unavailable("down"))
        });
        let app = test::init_service(session_test_app(auth_with_sessions(sessions))).await;
        let started =
            test::call_service(&app, test::TestRequest::get().uri("/start").to_request()).await;
        let cookie = session_cookie(&started).expect("session cookie set");

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
