use rocket::http::{Header, Status};
use rocket::request::{self, FlashMessage, FromRequest, Request};
use rocket::response::Redirect;
use rocket::serde::json::{json, Json, Value};
use rocket::{catch, catchers, Catcher, Responder, Route};
use serde::Serialize;

use crate::models::{Topic, User};
use crate::store::{AuthStore, ProjectState};

pub mod api;
pub mod pages;

pub const TOKEN_COOKIE: &str = "pulse_token";

// =====================
// Request guards
// =====================

/// Signed-in user, resolved from the token cookie or a bearer header
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthUser {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let token = req
            .cookies()
            .get(TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .or_else(|| {
                req.headers()
                    .get_one("Authorization")
                    .and_then(|h| h.strip_prefix("Bearer "))
                    .map(str::to_string)
            });

        let Some(store) = req.rocket().state::<AuthStore>() else {
            return request::Outcome::Error((Status::InternalServerError, ()));
        };

        match token.and_then(|t| store.verify(&t)) {
            Some(user) => request::Outcome::Success(AuthUser(user)),
            None => request::Outcome::Error((Status::Unauthorized, ())),
        }
    }
}

/// Pages redirect to the login form instead of failing with 401
pub fn require_user(user: Option<AuthUser>) -> Result<User, Redirect> {
    user.map(|u| u.0).ok_or_else(|| Redirect::to("/login"))
}

// =====================
// Shared page layout
// =====================

#[derive(Debug, Clone, Serialize)]
pub struct Toast {
    pub kind: String,
    pub message: String,
}

impl Toast {
    pub fn from_flash(flash: Option<FlashMessage<'_>>) -> Option<Toast> {
        flash.map(|f| Toast {
            kind: f.kind().to_string(),
            message: f.message().to_string(),
        })
    }
}

/// Sidebar/topbar data every dashboard page renders
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: String,
    pub section: &'static str,
    pub topic: Option<Topic>,
    pub user: Option<User>,
    pub project: ProjectState,
    pub toast: Option<Toast>,
}

/// CSV attachment for the mentions export
#[derive(Responder)]
#[response(content_type = "text/csv")]
pub struct CsvDownload {
    body: String,
    disposition: Header<'static>,
}

impl CsvDownload {
    pub fn new(filename: String, body: String) -> Self {
        CsvDownload {
            body,
            disposition: Header::new(
                "Content-Disposition",
                format!("attachment; filename=\"{filename}\""),
            ),
        }
    }
}

// =====================
// Catchers
// =====================

#[catch(401)]
pub fn api_unauthorized() -> Json<Value> {
    Json(json!({ "error": "Authentication required" }))
}

#[catch(400)]
pub fn api_bad_request() -> Json<Value> {
    Json(json!({ "error": "Malformed request body" }))
}

#[catch(422)]
pub fn api_unprocessable() -> Json<Value> {
    Json(json!({ "error": "Request body is missing required fields" }))
}

#[catch(404)]
pub fn api_not_found(req: &Request<'_>) -> Json<Value> {
    Json(json!({ "error": format!("No route for {}", req.uri()) }))
}

// =====================
// Route Collections
// =====================

pub fn api_catchers() -> Vec<Catcher> {
    catchers![api_unauthorized, api_bad_request, api_unprocessable, api_not_found]
}

pub fn index_routes() -> Vec<Route> {
    pages::routes()
}

pub fn api_routes() -> Vec<Route> {
    api::routes()
}
