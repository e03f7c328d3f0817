//! Request trace middleware.
//!
//! Tags every traced request with a trace id:
//! - taken from the `X-Request-Id` request header when the client sent one
//! - otherwise generated as `TRACE-<UUID>`
//!
//! The id is stored in the request extensions as [`TraceId`], recorded on a
//! tracing span around the rest of the pipeline, and echoed in the
//! `X-Trace-Id` response header. Path prefixes select which requests are
//! traced.

use actix_web::{
    body::{BoxBody, EitherBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use ipnetwork::IpNetwork;
use std::{
    future::{ready, Ready},
    net::IpAddr,
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

/// Header a client may use to supply its own trace id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header the trace id is echoed in
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Trace id of the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(pub String);

#[derive(Debug, Clone, Default)]
struct TraceSettings {
    allowed_prefixes: Vec<String>,
    skipped_prefixes: Vec<String>,
    trusted_proxies: Vec<IpNetwork>,
}

impl TraceSettings {
    fn should_trace(&self, path: &str) -> bool {
        let allowed = self.allowed_prefixes.is_empty()
            || self.allowed_prefixes.iter().any(|p| path.starts_with(p.as_str()));
        let skipped = self.skipped_prefixes.iter().any(|p| path.starts_with(p.as_str()));
        allowed && !skipped
    }

    fn is_trusted(&self, ip: IpAddr) -> bool {
        self.trusted_proxies.iter().any(|net| net.contains(ip))
    }
}

/// Request trace middleware factory
#[derive(Debug, Clone, Default)]
pub struct RequestTrace {
    settings: Arc<TraceSettings>,
}

impl RequestTrace {
    /// Creates a trace middleware that traces every path
    pub fn new() -> Self {
        Self::default()
    }

    /// Only trace paths starting with one of `prefixes`
    pub fn with_allowed_prefixes<I, P>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.settings_mut().allowed_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Never trace paths starting with one of `prefixes`
    pub fn with_skipped_prefixes<I, P>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.settings_mut().skipped_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Trust forwarding headers from these addresses or CIDR ranges
    ///
    /// Entries that do not parse are logged and ignored.
    pub fn with_trusted_proxies(mut self, proxies: &[String]) -> Self {
        self.settings_mut().trusted_proxies = proxies
            .iter()
            .filter_map(|proxy| match proxy.parse::<IpNetwork>() {
                Ok(net) => Some(net),
                Err(e) => {
                    warn!("Ignoring trusted proxy '{}': {}", proxy, e);
                    None
                }
            })
            .collect();
        self
    }

    fn settings_mut(&mut self) -> &mut TraceSettings {
        Arc::make_mut(&mut self.settings)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestTrace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTraceMiddleware {
            service: Rc::new(service),
            settings: Arc::clone(&self.settings),
        }))
    }
}

/// Request trace middleware service
pub struct RequestTraceMiddleware<S> {
    service: Rc<S>,
    settings: Arc<TraceSettings>,
}

impl<S, B> Service<ServiceRequest> for RequestTraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        if !self.settings.should_trace(req.path()) {
            return Box::pin(async move {
                service.call(req).await.map(ServiceResponse::map_into_left_body)
            });
        }

        let trace_id = incoming_trace_id(&req).unwrap_or_else(generate_trace_id);
        let client_ip = client_ip(&req, &self.settings);
        let span = info_span!("trace", trace_id = %trace_id, client_ip = %client_ip);

        req.extensions_mut().insert(TraceId(trace_id.clone()));
        let http_req = req.request().clone();

        Box::pin(
            async move {
                let mut res = match service.call(req).await {
                    Ok(res) => res.map_into_left_body(),
                    Err(e) => ServiceResponse::from_err(e, http_req).map_into_right_body(),
                };

                if let Ok(value) = HeaderValue::from_str(&trace_id) {
                    res.headers_mut()
                        .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                }

                Ok(res)
            }
            .instrument(span),
        )
    }
}

fn incoming_trace_id(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn generate_trace_id() -> String {
    format!("TRACE-{}", Uuid::new_v4().simple().to_string().to_uppercase())
}

/// Client address, honouring forwarding headers only from trusted proxies
fn client_ip(req: &ServiceRequest, settings: &TraceSettings) -> String {
    let peer = match req.peer_addr() {
        Some(addr) => addr.ip(),
        None => return "unknown".to_string(),
    };

    if settings.is_trusted(peer) {
        if let Some(forwarded) = req.connection_info().realip_remote_addr() {
            return forwarded.to_string();
        }
    }

    peer.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpRequest, HttpResponse};

    async fn echo_trace(req: HttpRequest) -> HttpResponse {
        let trace_id = req
            .extensions()
            .get::<TraceId>()
            .map(|t| t.0.clone())
            .unwrap_or_default();
        HttpResponse::Ok().body(trace_id)
    }

    #[actix_web::test]
    async fn test_generates_trace_id() {
        let app = test::init_service(
            App::new()
                .wrap(RequestTrace::new())
                .route("/api/ping", web::get().to(echo_trace)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/ping").to_request();
        let resp = test::call_service(&app, req).await;

        let header = resp
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap();
        assert!(header.starts_with("TRACE-"));
        assert_eq!(header, header.to_uppercase());

        let body = test::read_body(resp).await;
        assert_eq!(body, header.as_bytes());
    }

    #[actix_web::test]
    async fn test_honours_request_id() {
        let app = test::init_service(
            App::new()
                .wrap(RequestTrace::new())
                .route("/api/ping", web::get().to(echo_trace)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/ping")
            .insert_header((REQUEST_ID_HEADER, "abc-123"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.headers().get(TRACE_ID_HEADER).unwrap(), "abc-123");
    }

    #[actix_web::test]
    async fn test_path_prefixes() {
        let app = test::init_service(
            App::new()
                .wrap(
                    RequestTrace::new()
                        .with_allowed_prefixes(["/api"])
                        .with_skipped_prefixes(["/api/internal"]),
                )
                .route("/api/ping", web::get().to(echo_trace))
                .route("/api/internal/ping", web::get().to(echo_trace))
                .route("/health", web::get().to(echo_trace)),
        )
        .await;

        for (path, traced) in [
            ("/api/ping", true),
            ("/api/internal/ping", false),
            ("/health", false),
        ] {
            let req = test::TestRequest::get().uri(path).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.headers().contains_key(TRACE_ID_HEADER), traced, "{}", path);
        }
    }

    #[::std::prelude::v1::test]
    fn test_client_ip_trusts_only_listed_proxies() {
        let settings = TraceSettings {
            trusted_proxies: vec!["10.0.0.0/8".parse().unwrap()],
            ..Default::default()
        };

        let via_proxy = test::TestRequest::default()
            .peer_addr("10.1.2.3:4000".parse().unwrap())
            .insert_header(("x-forwarded-for", "203.0.113.9"))
            .to_srv_request();
        assert_eq!(client_ip(&via_proxy, &settings), "203.0.113.9");

        let direct = test::TestRequest::default()
            .peer_addr("198.51.100.7:4000".parse().unwrap())
            .insert_header(("x-forwarded-for", "203.0.113.9"))
            .to_srv_request();
        assert_eq!(client_ip(&direct, &settings), "198.51.100.7");
    }
}
