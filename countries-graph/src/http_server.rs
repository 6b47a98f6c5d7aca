//! Axum http server. Axum provides routing capability on top of Hyper HTTP.
use std::future::Future;
use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::GraphQLRequest;
use async_graphql_axum::GraphQLResponse;
use axum::extract::FromRequest;
use axum::extract::Request;
use axum::extract::State;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::Json;
use axum::Router;
use http::header;
use http::HeaderValue;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::configuration::Configuration;
use crate::csrf::Csrf;
use crate::dataset::Dataset;
use crate::error::ServerError;
use crate::schema::build_schema;
use crate::schema::CountriesSchema;

/// The countries API over HTTP.
///
/// Serves GraphQL operations on `server.graphql_path` (GET and POST), the
/// GraphiQL landing page to browsers on that same path, and a health check.
#[derive(Debug)]
pub struct CountriesServer {
    configuration: Arc<Configuration>,
    dataset: Arc<Dataset>,
}

#[derive(Clone)]
struct GraphQLState {
    schema: CountriesSchema,
    csrf: Option<Csrf>,
    /// Rendered once, absent when the landing page is disabled.
    landing_page: Option<Arc<str>>,
}

#[buildstructor::buildstructor]
impl CountriesServer {
    #[builder]
    pub fn new(configuration: Arc<Configuration>, dataset: Arc<Dataset>) -> Self {
        Self {
            configuration,
            dataset,
        }
    }

    /// The routes and layers, without a listener.
    pub fn router(&self) -> Router {
        let server = &self.configuration.server;
        let state = GraphQLState {
            schema: build_schema(self.dataset.clone(), &self.configuration),
            csrf: Csrf::new(&self.configuration.csrf),
            landing_page: server.landing_page.then(|| {
                GraphiQLSource::build()
                    .endpoint(&server.graphql_path)
                    .title("Countries")
                    .finish()
                    .into()
            }),
        };

        Router::new()
            .route(&server.graphql_path, get(handle_get).post(handle_post))
            .route(&server.health_check_path, get(health_check))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(self.configuration.cors.clone().into_layer())
    }

    /// Bind `server.listen` and serve until Ctrl-C.
    pub async fn serve(self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.configuration.server.listen)
            .await
            .map_err(ServerError::ServerCreationError)?;
        self.serve_with_listener(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` completes.
    ///
    /// Requests in flight when `shutdown` completes are allowed to finish.
    pub async fn serve_with_listener<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let address = listener
            .local_addr()
            .map_err(ServerError::ServerCreationError)?;
        let router = self.router();
        tracing::info!(
            "GraphQL endpoint exposed at http://{}{} 🚀",
            address,
            self.configuration.server.graphql_path
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(ServerError::ServeError)?;
        tracing::info!("server stopped");
        Ok(())
    }
}

async fn handle_get(State(state): State<GraphQLState>, request: Request) -> Response {
    if let Some(landing_page) = &state.landing_page {
        if request
            .headers()
            .get(&header::ACCEPT)
            .map(prefers_html)
            .unwrap_or_default()
        {
            return Html(landing_page.to_string()).into_response();
        }
    }
    execute(state, request).await
}

async fn handle_post(State(state): State<GraphQLState>, request: Request) -> Response {
    execute(state, request).await
}

async fn execute(state: GraphQLState, request: Request) -> Response {
    if let Some(csrf) = &state.csrf {
        if let Err(rejection) = csrf.check(request.headers()) {
            return rejection;
        }
    }

    let request = match <GraphQLRequest as FromRequest<GraphQLState>>::from_request(
        request, &state,
    )
    .await
    {
        Ok(request) => request.into_inner(),
        Err(rejection) => {
            tracing::debug!("invalid GraphQL request");
            return rejection.into_response();
        }
    };

    let response = state.schema.execute(request).await;
    if response.is_err() {
        tracing::debug!(errors = response.errors.len(), "operation failed");
    }
    GraphQLResponse::from(response).into_response()
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "UP" }))
}

fn prefers_html(accept_header: &HeaderValue) -> bool {
    accept_header
        .to_str()
        .map(|accept_str| {
            accept_str
                .split(',')
                .map(|a| a.trim())
                .any(|a| a == "text/html")
        })
        .unwrap_or_default()
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received Ctrl-C, shutting down"),
        Err(error) => {
            tracing::error!("unable to listen for the shutdown signal: {error}");
            std::future::pending::<()>().await;
        }
    }
}
