use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use std::sync::Arc;

use crate::{auth as auth_routes, expenses, inventory, users};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolve the bearer token (if any) to a caller and stash it on the request.
///
/// This never rejects: a missing, malformed or expired token yields an
/// anonymous caller, and restricted operations fail inside the engine with
/// the proper error kind. Login itself is legitimately anonymous.
async fn auth(
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Response {
    // A missing or malformed header is treated the same as a bad token.
    let bearer = bearer.ok();
    let caller = state
        .engine
        .resolve(bearer.as_ref().map(|header| header.token()));
    request.extensions_mut().insert(caller);
    next.run(request).await
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/login", post(auth_routes::login))
        .route("/users", get(users::list).post(users::create))
        .route("/users/{id}", patch(users::update).delete(users::remove))
        .route("/users/{id}/total", get(users::total))
        .route("/users/{id}/expenses", get(expenses::user_expenses))
        .route("/users/{id}/expenses/all", get(expenses::list_for_user))
        .route("/expenses/mine", get(expenses::mine))
        .route("/expenses/mine/total", get(expenses::my_total))
        .route("/expenses", post(expenses::expense_new))
        .route(
            "/expenses/from-inventory",
            post(expenses::catalog_expense_new),
        )
        .route("/timers", post(expenses::timer_start))
        .route("/timers/active", get(expenses::active_timers))
        .route("/timers/{id}/stop", post(expenses::timer_stop))
        .route("/inventory", get(inventory::list).post(inventory::create))
        .route(
            "/inventory/{id}",
            get(inventory::get_item)
                .patch(inventory::update)
                .delete(inventory::remove),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
