//! Registration, login and logout handlers.
//!
//! ```text
//! GET  /                   landing page
//! GET  /auth/register      registration form
//! POST /auth/register      displayName=Ana&email=ana@example.com&password=secret1
//! GET  /auth/login         login form
//! POST /auth/login         email=ana@example.com&password=secret1
//! GET  /auth/logout        (POST accepted too)
//! GET  /me                 current identity
//! ```
//!
//! The authentication service queues the flash message for every outcome;
//! these handlers only choose where to send the browser next.

use actix_web::{HttpResponse, get, post, route, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};
use zeroize::Zeroize;

use crate::domain::{LOGIN_PATH, ROOT_PATH};
use crate::inbound::http::ApiResult;
use crate::inbound::http::flash::SessionFlash;
use crate::inbound::http::guards::Authenticated;
use crate::inbound::http::page::{Page, see_other};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Registration form and its submission target.
pub const REGISTER_PATH: &str = "/auth/register";
/// Landing place after a successful login.
pub const BOOKS_PATH: &str = "/books";

/// Registration form body.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    #[schema(example = "Ana")]
    #[serde(default)]
    pub display_name: String,
    #[schema(example = "ana@example.com")]
    #[serde(default)]
    pub email: String,
    #[schema(example = "secret1")]
    #[serde(default)]
    pub password: String,
}

impl Drop for RegisterForm {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// Login form body.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    #[schema(example = "ana@example.com")]
    #[serde(default)]
    pub email: String,
    #[schema(example = "secret1")]
    #[serde(default)]
    pub password: String,
}

impl Drop for LoginForm {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// Anonymous landing page.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Landing page", body = Page)),
    tags = ["pages"],
    operation_id = "index",
    security([])
)]
#[get("/")]
pub async fn index(
    state: web::Data<HttpState>,
    session: SessionContext,
    flash: SessionFlash,
) -> ApiResult<HttpResponse> {
    let identity = session.identity(&state.auth).await?;
    Ok(Page::new("Bookshelf", "index").render(&flash, identity))
}

/// Registration form.
#[utoipa::path(
    get,
    path = "/auth/register",
    responses((status = 200, description = "Registration form", body = Page)),
    tags = ["auth"],
    operation_id = "registerForm",
    security([])
)]
#[get("/auth/register")]
pub async fn register_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    flash: SessionFlash,
) -> ApiResult<HttpResponse> {
    let identity = session.identity(&state.auth).await?;
    let data = json!({ "minPasswordLength": state.auth.policy().min_length() });
    Ok(Page::new("Register", "auth/register")
        .with_data(data)
        .render(&flash, identity))
}

/// Create a `member` account. Never logs the new account in.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "To the login form on success, back to the registration form otherwise",
            headers(("Location" = String, description = "Next page"))),
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    flash: SessionFlash,
    form: web::Form<RegisterForm>,
) -> HttpResponse {
    let form = form.into_inner();
    match state
        .auth
        .register(&form.display_name, &form.email, &form.password, &flash)
        .await
    {
        Ok(_) => see_other(LOGIN_PATH),
        Err(_) => see_other(REGISTER_PATH),
    }
}

/// Login form.
#[utoipa::path(
    get,
    path = "/auth/login",
    responses((status = 200, description = "Login form", body = Page)),
    tags = ["auth"],
    operation_id = "loginForm",
    security([])
)]
#[get("/auth/login")]
pub async fn login_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    flash: SessionFlash,
) -> ApiResult<HttpResponse> {
    let identity = session.identity(&state.auth).await?;
    Ok(Page::new("Log in", "auth/login").render(&flash, identity))
}

/// Check credentials and open a session.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "To the catalogue on success, back to the login form otherwise",
            headers(
                ("Location" = String, description = "Next page"),
                ("Set-Cookie" = String, description = "Renewed session cookie")
            )),
        (status = 500, description = "Internal server error", body = crate::domain::Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    flash: SessionFlash,
    form: web::Form<LoginForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    let Ok(outcome) = state.auth.login(&form.email, &form.password, &flash).await else {
        return Ok(see_other(LOGIN_PATH));
    };
    // A session the browser already held is replaced, not left alive.
    if let Ok(Some(previous)) = session.token() {
        if let Err(err) = state.auth.logout(Some(&previous)).await {
            warn!(error = %err, "previous session could not be destroyed");
        }
    }
    if let Err(err) = session.start(&outcome.token) {
        error!(error = %err.message(), "failed to store session token in cookie");
        if let Err(err) = state.auth.logout(Some(&outcome.token)).await {
            warn!(error = %err, "orphaned session could not be destroyed");
        }
        return Err(err);
    }
    Ok(see_other(BOOKS_PATH))
}

/// Destroy the current session. Safe to repeat.
#[utoipa::path(
    method(get, post),
    path = "/auth/logout",
    responses(
        (status = 303, description = "To the landing page",
            headers(("Location" = String, description = "Landing page"))),
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[route("/auth/logout", method = "GET", method = "POST")]
pub async fn logout(state: web::Data<HttpState>, session: SessionContext) -> ApiResult<HttpResponse> {
    let token = session.token()?;
    if let Err(err) = state.auth.logout(token.as_ref()).await {
        // The cookie is still cleared; the server-side entry ages out.
        warn!(error = %err, "logout could not reach the session store");
    }
    session.forget_token();
    Ok(see_other(ROOT_PATH))
}

/// The identity of the logged-in user.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Current identity", body = Page),
        (status = 303, description = "Not logged in; to the login form",
            headers(("Location" = String, description = "Login form"))),
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn current_user(
    Authenticated(identity): Authenticated,
    flash: SessionFlash,
) -> HttpResponse {
    let data = json!({ "identity": &identity });
    Page::new("My account", "auth/me")
        .with_data(data)
        .render(&flash, Some(identity))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
