//! Internal RPC between the trip planner processes.
//!
//! Each store runs behind an `axum` router ([`plan_router`], [`user_router`],
//! [`notification_router`]) and is reached through a `reqwest` client
//! ([`PlanClient`], [`UserClient`], [`NotificationClient`]) implementing the
//! same trait as the store itself.
use std::net::SocketAddr;

use axum::Router;

pub use client::{ClientOptions, NotificationClient, PlanClient, UserClient};
pub use error::{RpcError, RpcErrorBody, status_for_engine_error};
pub use notify::notification_router;
pub use plan::plan_router;
pub use users::user_router;

mod client;
mod error;
mod notify;
mod plan;
mod users;
pub mod wire;

/// Serve `router` on `listener` until the process stops.
pub async fn run_with_listener(
    name: &'static str,
    router: Router,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("{name} service listening on {addr}");
    axum::serve(listener, router).await
}

/// Serve `router` on a background task and return the bound address.
pub fn spawn_with_listener(
    name: &'static str,
    router: Router,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(name, router, listener).await {
            tracing::error!("{name} service failed: {err}");
        }
    });

    Ok(addr)
}
