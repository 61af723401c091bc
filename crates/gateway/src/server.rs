use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};
use uuid::Uuid;

use std::sync::Arc;

use crate::{Orchestrator, pin, trip, user, whiteboard};

pub static USER_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-user-id");

#[derive(Clone)]
pub struct ServerState {
    pub orchestrator: Arc<Orchestrator>,
}

/// The authenticated caller, inserted by the auth middleware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

/// `TypedHeader` for the caller identity.
///
/// Requests must carry the user id in the "x-user-id" entry of the header.
#[derive(Debug)]
struct UserHeader(Uuid);

impl Header for UserHeader {
    fn name() -> &'static axum::http::HeaderName {
        &USER_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let Ok(value) = Uuid::parse_str(value.trim()) else {
            return Err(AxumError::invalid());
        };

        Ok(UserHeader(value))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        let as_string = self.0.to_string();
        match axum::http::HeaderValue::from_str(&as_string) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-user-id header"),
        }
    }
}

async fn auth(
    user_header: Option<TypedHeader<UserHeader>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(UserHeader(user_id))) = user_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(CurrentUser(user_id));
    Ok(next.run(request).await)
}

/// Build the gateway router around `orchestrator`.
pub fn router(orchestrator: Orchestrator) -> Router {
    let state = ServerState {
        orchestrator: Arc::new(orchestrator),
    };

    Router::new()
        .route("/user", axum::routing::delete(user::delete))
        .route("/trip", post(trip::create))
        .route("/trips", get(trip::list))
        .route("/trip/{id}", get(trip::get).delete(trip::delete))
        .route("/trip/{id}/whiteboard", post(trip::add_whiteboard))
        .route(
            "/trip/{id}/whiteboard/{whiteboard_id}",
            axum::routing::delete(trip::delete_whiteboard),
        )
        .route("/trip/{id}/members", post(trip::add_members))
        .route("/trip/{id}/avatars", post(trip::avatars))
        .route("/trip/{id}/display_name", put(trip::display_name))
        .route("/whiteboard/{id}", get(whiteboard::get))
        .route("/whiteboard/{id}/pin", post(pin::create))
        .route(
            "/whiteboard/{id}/pin/{pin_id}",
            axum::routing::delete(pin::delete),
        )
        .route("/pin/{id}", get(pin::get).patch(pin::update))
        .route("/pins/participant", get(pin::participant))
        .route_layer(middleware::from_fn(auth))
        .route("/user/register", post(user::register))
        .with_state(state)
}

pub async fn run_with_listener(
    orchestrator: Orchestrator,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(policy = ?orchestrator.policy(), "gateway listening on {}", addr);

    axum::serve(listener, router(orchestrator)).await
}

pub fn spawn_with_listener(
    orchestrator: Orchestrator,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(orchestrator, listener).await {
            tracing::error!("gateway failed: {err}");
        }
    });

    Ok(addr)
}
