use std::{
    fmt::Display,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use axum::http::{Method, Request, Response, StatusCode, header::USER_AGENT};
use futures_util::ready;
use pin_project_lite::pin_project;
use tokio::time::Instant;
use tower::{Layer, Service};
use yansi::{Paint, Painted};

/// One access-log line per request.
#[derive(Clone)]
pub struct TraceLayer;

impl<S> Layer<S> for TraceLayer {
    type Service = TraceMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TraceMiddleware { inner }
    }
}

#[derive(Clone)]
pub struct TraceMiddleware<S> {
    inner: S,
}

/// What gets written once the response is known.
pub struct AccessLog {
    method: Method,
    path: String,
    agent: String,
    start: Instant,
}

impl AccessLog {
    fn new<B>(req: &Request<B>) -> Self {
        let agent = req
            .headers()
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-");
        Self {
            method: req.method().clone(),
            path: req.uri().path().to_owned(),
            agent: agent.to_owned(),
            start: Instant::now(),
        }
    }

    fn responded(&self, status: StatusCode) {
        info!(
            method = %self.method.green(),
            path = %self.path.blue(),
            status = %paint_status(&status),
            agent = %self.agent,
            elapsed = ?self.start.elapsed().rgb(248, 200, 220)
        );
    }

    fn failed(&self, err: &dyn Display) {
        error!(
            method = %self.method,
            path = %self.path,
            elapsed = ?self.start.elapsed(),
            "service error: {}",
            err
        );
    }
}

fn paint_status(status: &StatusCode) -> Painted<&StatusCode> {
    match status.as_u16() {
        100..=199 => status.blue(),
        200..=299 => status.green(),
        300..=399 => status.cyan(),
        400..=499 => status.yellow(),
        _ => status.red(),
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for TraceMiddleware<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Error: Display,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = TraceFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let log = AccessLog::new(&req);
        TraceFuture {
            inner: self.inner.call(req),
            log,
        }
    }
}

pin_project! {
    pub struct TraceFuture<F> {
        #[pin]
        inner: F,
        log: AccessLog,
    }
}

impl<F, ResBody, E> Future for TraceFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
    E: Display,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let result = ready!(this.inner.poll(cx));
        match &result {
            Ok(res) => this.log.responded(res.status()),
            Err(err) => this.log.failed(err),
        }
        Poll::Ready(result)
    }
}
