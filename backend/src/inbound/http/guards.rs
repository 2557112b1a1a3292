//! Authorization gates as actix extractors.
//!
//! Adding [`Authenticated`] or [`AdminIdentity`] to a handler's arguments
//! runs the matching gate before the handler body. A denial queues the
//! gate's flash message and answers `303 See Other`, so the handler never
//! starts.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::domain::{
    Error, FlashChannel, FlashMessage, GuardDenial, IdentitySnapshot, Role, require_authenticated,
    require_role,
};

use super::flash::SessionFlash;
use super::page::Redirect;
use super::session::SessionContext;
use super::state::HttpState;

/// Identity of a request that passed `require_authenticated`.
#[derive(Debug, Clone)]
pub struct Authenticated(pub IdentitySnapshot);

/// Identity of a request that passed `require_role(admin)`.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub IdentitySnapshot);

async fn resolve(req: &HttpRequest) -> Result<(Option<IdentitySnapshot>, Session), actix_web::Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state not configured"))?;
    let session = Session::extract(req).await?;
    let identity = SessionContext::new(session.clone())
        .identity(&state.auth)
        .await?;
    Ok((identity, session))
}

fn deny(denial: GuardDenial, session: Session, path: &str) -> actix_web::Error {
    debug!(%denial, path, "request refused by gate");
    if let Err(err) = SessionFlash::new(session).push(FlashMessage::error(denial.user_message())) {
        warn!(error = %err, "failed to queue gate flash message");
    }
    Redirect::to(denial.redirect_to()).into()
}

impl FromRequest for Authenticated {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let (identity, session) = resolve(&req).await?;
            match require_authenticated(identity.as_ref()) {
                Ok(identity) => Ok(Self(identity.clone())),
                Err(denial) => Err(deny(denial, session, req.path())),
            }
        })
    }
}

impl FromRequest for AdminIdentity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let (identity, session) = resolve(&req).await?;
            match require_role(identity.as_ref(), Role::Admin) {
                Ok(identity) => Ok(Self(identity.clone())),
                Err(denial) => Err(deny(denial, session, req.path())),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::{MockPasswordHasher, MockSessionStore, MockUserRepository};
    use crate::domain::{
        AuthenticationService, DisplayName, Email, LOGIN_PATH, PasswordPolicy, ROOT_PATH,
        SessionToken, UserId,
    };
    use crate::inbound::http::session::SESSION_TOKEN_KEY;
    use crate::inbound::http::test_utils::{location, session_cookie, test_session_middleware};
    use crate::outbound::memory::InMemoryBookRepository;
    use actix_web::dev::ServiceResponse;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use rstest::rstest;

    fn snapshot(role: Role) -> IdentitySnapshot {
        IdentitySnapshot {
            id: UserId::random(),
            display_name: DisplayName::new("Ana").expect("name"),
            email: Email::new("ana@example.com").expect("email"),
            role,
        }
    }

    /// Session store that knows exactly one token, `member` or `admin`.
    fn sessions_knowing(role: Option<Role>) -> MockSessionStore {
        let mut sessions = MockSessionStore::new();
        sessions.expect_find().returning(move |token| {
            Ok(role
                .filter(|_| token.as_str() == "known")
                .map(snapshot))
        });
        sessions
    }

    fn state(sessions: MockSessionStore) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            AuthenticationService::new(
                Arc::new(MockUserRepository::new()),
                Arc::new(MockPasswordHasher::new()),
                Arc::new(sessions),
                PasswordPolicy::default(),
            ),
            Arc::new(InMemoryBookRepository::new()),
        ))
    }

    fn guard_test_app(
        state: web::Data<HttpState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state)
            .wrap(test_session_middleware())
            .route(
                "/login-as",
                web::get().to(|session: Session| async move {
                    session
                        .insert(SESSION_TOKEN_KEY, SessionToken::from_raw("known").as_str())
                        .expect("insert token");
                    HttpResponse::Ok()
                }),
            )
            .route(
                "/member-area",
                web::get().to(|Authenticated(identity): Authenticated| async move {
                    HttpResponse::Ok().body(identity.role.as_str().to_owned())
                }),
            )
            .route(
                "/admin-area",
                web::get().to(|AdminIdentity(identity): AdminIdentity| async move {
                    HttpResponse::Ok().body(identity.role.as_str().to_owned())
                }),
            )
            .route(
                "/flash",
                web::get().to(|flash: SessionFlash| async move {
                    let messages = flash.drain_all().expect("drain");
                    HttpResponse::Ok().json(messages)
                }),
            )
    }

    #[rstest]
    #[case("/member-area")]
    #[case("/admin-area")]
    #[actix_web::test]
    async fn anonymous_requests_are_sent_to_login(#[case] path: &str) {
        let app = test::init_service(guard_test_app(state(sessions_knowing(None)))).await;

        let res = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res).as_deref(), Some(LOGIN_PATH));
        let cookie = session_cookie(&res).expect("flash cookie");
        let flashed = test::call_service(
            &app,
            test::TestRequest::get().uri("/flash").cookie(cookie).to_request(),
        )
        .await;
        let messages: Vec<FlashMessage> = test::read_body_json(flashed).await;
        assert_eq!(messages, vec![FlashMessage::error("Authentication required")]);
    }

    #[actix_web::test]
    async fn member_passes_authentication_but_not_admin_gate() {
        let app =
            test::init_service(guard_test_app(state(sessions_knowing(Some(Role::Member))))).await;
        let login =
            test::call_service(&app, test::TestRequest::get().uri("/login-as").to_request()).await;
        let cookie = session_cookie(&login).expect("session cookie");

        let member = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/member-area")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(member.status(), StatusCode::OK);

        let admin = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/admin-area")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(admin.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&admin).as_deref(), Some(ROOT_PATH));
        let cookie = session_cookie(&admin).expect("flash cookie");
        let flashed = test::call_service(
            &app,
            test::TestRequest::get().uri("/flash").cookie(cookie).to_request(),
        )
        .await;
        let messages: Vec<FlashMessage> = test::read_body_json(flashed).await;
        assert_eq!(messages, vec![FlashMessage::error("Insufficient privilege")]);
    }

    #[actix_web::test]
    async fn admin_passes_both_gates() {
        let app =
            test::init_service(guard_test_app(state(sessions_knowing(Some(Role::Admin))))).await;
        let login =
            test::call_service(&app, test::TestRequest::get().uri("/login-as").to_request()).await;
        let cookie = session_cookie(&login).expect("session cookie");

        for path in ["/member-area", "/admin-area"] {
            let res = test::call_service(
                &app,
                test::TestRequest::get()
                    .uri(path)
                    .cookie(cookie.clone())
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::OK, "{path}");
            assert_eq!(test::read_body(res).await, "admin");
        }
    }
}
