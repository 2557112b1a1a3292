//! Page view models and redirects.
//!
//! Handlers never produce markup. A page is handed to the rendering layer as
//! a JSON document naming the template, carrying the drained flash messages
//! and the identity shown as "logged in as". Every state change answers with
//! `303 See Other`.

use std::fmt;

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::{FlashChannel, FlashMessage, IdentitySnapshot};

/// View model consumed by the rendering layer.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[schema(example = "Books")]
    pub title: String,
    #[schema(example = "books/index")]
    pub template: String,
    /// Messages drained for this render.
    pub flash: Vec<FlashMessage>,
    /// Shown as "logged in as"; `null` for visitors.
    pub current_user: Option<IdentitySnapshot>,
    #[schema(value_type = Object)]
    pub data: Value,
}

impl Page {
    /// Page rendered with `template`, no data yet.
    pub fn new(title: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            template: template.into(),
            flash: Vec::new(),
            current_user: None,
            data: Value::Null,
        }
    }

    /// Attach the template's data.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Drain pending flash messages into the page and build the response.
    ///
    /// An unreadable queue renders the page without messages.
    pub fn render(
        mut self,
        flash: &dyn FlashChannel,
        current_user: Option<IdentitySnapshot>,
    ) -> HttpResponse {
        self.flash = flash.drain_all().unwrap_or_else(|err| {
            warn!(error = %err, "flash queue could not be drained");
            Vec::new()
        });
        self.current_user = current_user;
        HttpResponse::Ok()
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .json(self)
    }
}

/// `303 See Other` to `location`.
pub fn see_other(location: impl Into<String>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.into()))
        .finish()
}

/// Redirect raised from an extractor, where a plain response cannot be
/// returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    location: &'static str,
}

impl Redirect {
    /// Redirect to `location` with `303 See Other`.
    pub fn to(location: &'static str) -> Self {
        Self { location }
    }

    pub fn location(&self) -> &'static str {
        self.location
    }
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "redirect to {}", self.location)
    }
}

impl ResponseError for Redirect {
    fn status_code(&self) -> StatusCode {
        StatusCode::SEE_OTHER
    }

    fn error_response(&self) -> HttpResponse {
        see_other(self.location)
    }
}
