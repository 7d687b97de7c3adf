// Request tracing: every request gets an incrementing x-request-id and a span
//

use axum::Router;
use hyper::http::{HeaderValue, Request};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tower_http::{
    request_id::{MakeRequestId, RequestId},
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
    LatencyUnit, ServiceBuilderExt,
};

#[derive(Clone, Default)]
pub struct RequestIdProducer {
    counter: Arc<AtomicU64>,
}

impl MakeRequestId for RequestIdProducer {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let request_id = self.counter.fetch_add(1, Ordering::SeqCst);
        Some(RequestId::new(HeaderValue::from(request_id)))
    }
}

pub fn with_request_tracing(router: Router) -> Router {
    let layer = tower::ServiceBuilder::new()
        .set_x_request_id(RequestIdProducer::default())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<hyper::Body>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                        request_id = %request_id,
                    )
                })
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(tracing::Level::INFO)
                        .latency_unit(LatencyUnit::Seconds),
                ),
        )
        .propagate_x_request_id();

    router.layer(layer)
}
