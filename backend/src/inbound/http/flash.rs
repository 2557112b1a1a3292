//! Flash channel carried in the session cookie.
//!
//! Pending messages travel with the visitor between the request that
//! queues them and the next page render, which drains them. Anonymous
//! visitors get a queue too, so a failed login can report back to the form.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{FlashChannel, FlashError, FlashMessage};

pub(crate) const FLASH_KEY: &str = "flash";

/// [`FlashChannel`] backed by the actix session.
#[derive(Clone)]
pub struct SessionFlash(Session);

impl SessionFlash {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    fn pending(&self) -> Result<Vec<FlashMessage>, FlashError> {
        self.0
            .get::<Vec<FlashMessage>>(FLASH_KEY)
            .map(Option::unwrap_or_default)
            .map_err(|err| FlashError::storage(err.to_string()))
    }
}

impl FlashChannel for SessionFlash {
    fn push(&self, message: FlashMessage) -> Result<(), FlashError> {
        let mut pending = self.pending()?;
        pending.push(message);
        self.0
            .insert(FLASH_KEY, pending)
            .map_err(|err| FlashError::storage(err.to_string()))
    }

    fn drain_all(&self) -> Result<Vec<FlashMessage>, FlashError> {
        match self.0.remove_as::<Vec<FlashMessage>>(FLASH_KEY) {
            None => Ok(Vec::new()),
            Some(Ok(messages)) => Ok(messages),
            Some(Err(raw)) => {
                // Already removed from the session; the queue cannot wedge.
                warn!(len = raw.len(), "discarding unreadable flash queue");
                Ok(Vec::new())
            }
        }
    }
}

impl FromRequest for SessionFlash {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionFlash::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FlashKind;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    fn flash_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .route(
                "/push",
                web::get().to(|flash: SessionFlash| async move {
                    flash.push(FlashMessage::info("saved"))?;
                    flash.push(FlashMessage::error("but slowly"))?;
                    Ok::<_, crate::domain::Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/drain",
                web::get().to(|flash: SessionFlash| async move {
                    let messages = flash.drain_all()?;
                    Ok::<_, crate::domain::Error>(HttpResponse::Ok().json(messages))
                }),
            )
            .route(
                "/corrupt",
                web::get().to(|session: Session| async move {
                    session
                        .insert(FLASH_KEY, "not a list")
                        .expect("insert raw value");
                    HttpResponse::Ok()
                }),
            )
    }

    #[actix_web::test]
    async fn messages_survive_one_redirect_and_are_read_once() {
        let app = test::init_service(flash_test_app()).await;

        let pushed = test::call_service(&app, test::TestRequest::get().uri("/push").to_request()).await;
        let cookie = pushed
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned();

        let first = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/drain")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(first.status(), StatusCode::OK);
        let drained_cookie = first
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie rewritten")
            .into_owned();
        let messages: Vec<FlashMessage> = test::read_body_json(first).await;
        assert_eq!(
            messages.iter().map(|m| m.kind).collect::<Vec<_>>(),
            vec![FlashKind::Info, FlashKind::Error]
        );

        let second = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/drain")
                .cookie(drained_cookie)
                .to_request(),
        )
        .await;
        let messages: Vec<FlashMessage> = test::read_body_json(second).await;
        assert!(messages.is_empty());
    }

    #[actix_web::test]
    async fn unreadable_queue_drains_empty() {
        let app = test::init_service(flash_test_app()).await;

        let corrupt =
            test::call_service(&app, test::TestRequest::get().uri("/corrupt").to_request()).await;
        let cookie = corrupt
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned();

        let drained = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/drain")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(drained.status(), StatusCode::OK);
        let messages: Vec<FlashMessage> = test::read_body_json(drained).await;
        assert!(messages.is_empty());
    }
}
