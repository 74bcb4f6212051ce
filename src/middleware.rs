use std::{
    future::{ready, Ready},
    sync::Arc,
    time::Instant,
};

use actix_web::{
    body::{BodySize, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures_util::future::LocalBoxFuture;

use crate::metrics::{status_group, HttpMetrics};

/// Handler label for requests that matched no route.
const UNMATCHED_HANDLER: &str = "none";

/// Records every request into the shared [`HttpMetrics`] registry.
pub struct Instrumentation {
    metrics: Arc<HttpMetrics>,
}

impl Instrumentation {
    pub fn new(metrics: Arc<HttpMetrics>) -> Self {
        Instrumentation { metrics }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Instrumentation
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = InstrumentationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(InstrumentationMiddleware {
            service,
            metrics: self.metrics.clone(),
        }))
    }
}

pub struct InstrumentationMiddleware<S> {
    service: S,
    metrics: Arc<HttpMetrics>,
}

impl<S, B> Service<ServiceRequest> for InstrumentationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let method = req.method().to_string();
        let handler = req
            .request()
            .match_pattern()
            .unwrap_or_else(|| UNMATCHED_HANDLER.to_owned());
        let metrics = self.metrics.clone();
        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;
            let elapsed = started.elapsed();

            let (status, size) = match &result {
                Ok(res) => {
                    let size = match res.response().body().size() {
                        BodySize::Sized(n) => n,
                        _ => 0,
                    };
                    (res.status().as_u16(), size)
                }
                Err(e) => (e.as_response_error().status_code().as_u16(), 0),
            };
            let status = status_group(status);

            metrics.requests.inc(&[
                ("handler", handler.as_str()),
                ("method", method.as_str()),
                ("status", status.as_str()),
            ]);
            metrics
                .request_duration
                .observe(&[("handler", handler.as_str()), ("method", method.as_str())], elapsed);
            metrics.response_size.observe(&[("handler", handler.as_str())], size);

            result
        })
    }
}
