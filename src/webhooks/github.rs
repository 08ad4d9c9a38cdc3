use rocket::{
    http::{Method, Status},
    request::{FromRequest, Outcome},
    route,
    Data, Request, Route, State,
};
use serde::Deserialize;
use tracing::{debug, error, info};

mod signing;
use signing::SignedGitHubPayload;

use crate::deploy::DeployRequest;
use crate::webhooks::DeploySender;

const X_GITHUB_EVENT: &str = "X-GitHub-Event";

/// Branch reference that gates deployment.
const MAIN_REF: &str = "refs/heads/main";

pub struct GitHubSecret(pub String);

#[rocket::post("/webhook", data = "<payload>")]
pub fn github_webhook(
    event: GitHubEventType,
    payload: SignedGitHubPayload,
    sender: &State<DeploySender>,
) -> &'static str {
    if event != GitHubEventType::Push {
        return "Ignored: not a push event";
    }

    let push: PushPayload = match serde_json::from_str(&payload.0) {
        Ok(push) => push,
        Err(e) => {
            debug!("couldn't extract ref from push payload: {}", e);
            return "Ignored: not main branch";
        }
    };

    if push.r#ref != MAIN_REF {
        return "Ignored: not main branch";
    }

    info!("received push to {}, deploying", push.r#ref);

    if let Err(e) = sender.0.send(DeployRequest { r#ref: push.r#ref }) {
        // only happens if the deploy runner task is gone
        error!("couldn't hand push over for deployment: {}", e);
    }

    "Deploying..."
}

/// Event category claimed by the `X-GitHub-Event` header. Everything that
/// isn't a push gets ignored by the handler, so anything unknown (or a missing
/// header altogether) collapses into `Other`.
#[derive(Debug, PartialEq)]
pub enum GitHubEventType {
    Push,
    Other,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for GitHubEventType {
    type Error = std::convert::Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let event_type = match request.headers().get_one(X_GITHUB_EVENT) {
            Some("push") => GitHubEventType::Push,
            _ => GitHubEventType::Other,
        };

        Outcome::Success(event_type)
    }
}

#[derive(Debug, Deserialize)]
struct PushPayload {
    r#ref: String,
}

/// Rocket answers 404 for a known path with an unmatched method; GitHub
/// deserves a proper 405 when it (or anyone else) uses something other than
/// POST on the webhook endpoint.
pub fn method_not_allowed_routes() -> Vec<Route> {
    const METHODS: [Method; 8] = [
        Method::Get,
        Method::Head,
        Method::Put,
        Method::Delete,
        Method::Options,
        Method::Patch,
        Method::Trace,
        Method::Connect,
    ];

    METHODS
        .iter()
        .map(|&method| Route::new(method, "/webhook", MethodNotAllowed))
        .collect()
}

#[derive(Clone)]
struct MethodNotAllowed;

#[rocket::async_trait]
impl route::Handler for MethodNotAllowed {
    async fn handle<'r>(&self, request: &'r Request<'_>, _data: Data<'r>) -> route::Outcome<'r> {
        route::Outcome::from(request, Status::MethodNotAllowed)
    }
}
