use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::{web, HttpResponse, Responder};
use futures::Stream;
use tokio_stream::wrappers::UnboundedReceiverStream;
use validator::Validate;

use crate::core::{MatchEngine, MatchError};
use crate::models::{
    Developer, ErrorResponse, HealthResponse, Notification, OpenConnectionResponse, SearchRequest,
    SearchResponse, UpsertResponse,
};
use crate::services::ConnectionGateway;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MatchEngine>,
    pub gateway: Arc<ConnectionGateway>,
}

/// Configure all radar routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/search", web::post().to(search))
        .route("/developers", web::post().to(upsert_developer))
        .route("/developers/{id}", web::delete().to(delete_developer))
        .route("/connections", web::post().to(open_connection))
        .route("/connections/{id}/events", web::get().to(connection_events))
        .route("/connections/{id}", web::delete().to(close_connection));
}

fn match_error_response(err: MatchError) -> HttpResponse {
    let (error, status_code) = match &err {
        MatchError::InvalidRegion(_) => ("invalid_region", 400),
        MatchError::MalformedDeveloper(_) => ("malformed_developer", 400),
    };
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message: err.to_string(),
        status_code,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        developers: state.engine.developer_count().await,
        subscriptions: state.engine.subscription_count().await,
        connections: state.gateway.len().await,
    })
}

/// Search endpoint
///
/// POST /api/v1/search
///
/// Request body:
/// ```json
/// {
///   "connectionId": "string",
///   "latitude": 0.0,
///   "longitude": 0.0,
///   "radiusKm": 10.0,
///   "techs": ["go", "rust"]
/// }
/// ```
///
/// Besides answering the one-shot query, this installs (replacing) the
/// connection's live subscription with the same region and filter.
async fn search(
    state: web::Data<AppState>,
    req: web::Json<SearchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for search request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    tracing::info!(
        "Search from connection {}: center=({}, {}), radius={}km, techs={:?}",
        req.connection_id,
        req.latitude,
        req.longitude,
        req.radius_km,
        req.techs
    );

    match state
        .engine
        .search(&req.connection_id, req.region(), &req.techs)
        .await
    {
        Ok(matches) => {
            let response = SearchResponse {
                total_results: matches.len(),
                matches,
            };
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            tracing::info!("Rejected search from {}: {}", req.connection_id, e);
            match_error_response(e)
        }
    }
}

/// Developer upsert notification from the persistence collaborator
///
/// POST /api/v1/developers
///
/// Called after a successful durable write; the record is authoritative.
/// Matching subscriptions are notified as a side effect.
async fn upsert_developer(
    state: web::Data<AppState>,
    req: web::Json<Developer>,
) -> impl Responder {
    match state.engine.notify_upsert(req.into_inner()).await {
        Ok(notified) => HttpResponse::Ok().json(UpsertResponse {
            accepted: true,
            notified,
        }),
        Err(e) => {
            // A malformed record points at a data-integrity problem upstream,
            // so the collaborator gets the rejection instead of a silent drop.
            tracing::warn!("Rejected developer upsert: {}", e);
            match_error_response(e)
        }
    }
}

/// Developer delete notification from the persistence collaborator
///
/// DELETE /api/v1/developers/{id}
async fn delete_developer(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let developer_id = path.into_inner();
    state.engine.notify_delete(&developer_id).await;
    tracing::debug!("Deleted developer {}", developer_id);
    HttpResponse::NoContent().finish()
}

/// Open a live connection
///
/// POST /api/v1/connections
///
/// Returns a fresh connection id; the client passes it to /search and
/// /connections/{id}/events. The subscription itself is created implicitly by
/// the first search.
async fn open_connection() -> impl Responder {
    let connection_id = uuid::Uuid::new_v4().to_string();
    tracing::debug!("Opened connection {}", connection_id);
    HttpResponse::Ok().json(OpenConnectionResponse { connection_id })
}

/// Live notification stream for a connection (server-sent events)
///
/// GET /api/v1/connections/{id}/events
///
/// Binds (or re-binds) the connection's gateway channel and streams every
/// notification as an SSE `data:` frame. Client disconnect drops the stream,
/// which promptly tears down the subscription for this binding.
async fn connection_events(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let connection_id = path.into_inner();
    let (epoch, receiver) = state.gateway.open(&connection_id).await;

    let stream = EventStream {
        inner: UnboundedReceiverStream::new(receiver),
        engine: state.engine.clone(),
        connection_id,
        epoch,
    };

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(stream)
}

/// Explicit unsubscribe / connection close
///
/// DELETE /api/v1/connections/{id}
///
/// Always 204, even for unknown connections: disconnect races are expected.
async fn close_connection(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let connection_id = path.into_inner();
    state.engine.unsubscribe(&connection_id).await;
    tracing::debug!("Closed connection {}", connection_id);
    HttpResponse::NoContent().finish()
}

/// SSE body adapter over a connection's notification channel
///
/// Dropping the stream (client went away) removes the subscription, but only
/// if this stream's epoch is still the connection's current binding, so a
/// reconnect that already replaced the channel is left untouched.
struct EventStream {
    inner: UnboundedReceiverStream<Notification>,
    engine: Arc<MatchEngine>,
    connection_id: String,
    epoch: u64,
}

impl Stream for EventStream {
    type Item = Result<web::Bytes, std::convert::Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(notification)) => {
                match serde_json::to_string(&notification) {
                    Ok(json) => {
                        Poll::Ready(Some(Ok(web::Bytes::from(format!("data: {}\n\n", json)))))
                    }
                    Err(e) => {
                        // Notifications are plain data and always serialize;
                        // if one ever does not, end the stream rather than
                        // ship a broken frame.
                        tracing::error!(
                            "Failed to serialize notification for connection {}: {}",
                            self.connection_id,
                            e
                        );
                        Poll::Ready(None)
                    }
                }
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        let engine = self.engine.clone();
        let connection_id = self.connection_id.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            engine.disconnect(&connection_id, epoch).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_shape() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
            developers: 0,
            subscriptions: 0,
            connections: 0,
        };

        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_match_error_maps_to_bad_request() {
        let response =
            match_error_response(MatchError::InvalidRegion("radius must be positive".into()));
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
