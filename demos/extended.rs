use gcp_log_format::init::try_init_tracing;
use gcp_log_format::ExtendedFormatter;
use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};
use tracing::info;

fn main() {
    if let Err(e) = try_init_tracing(ExtendedFormatter::new("my-project")) {
        eprintln!("{}", e);
        return;
    }

    // Stand-in for the context a tracing propagator would extract from an
    // incoming request.
    let span_context = SpanContext::new(
        TraceId::from_bytes([0x4b; 16]),
        SpanId::from_bytes([0x01; 8]),
        TraceFlags::SAMPLED,
        true,
        TraceState::default(),
    );
    let _guard = opentelemetry::Context::new()
        .with_remote_span_context(span_context)
        .attach();

    info!(requestMethod = "GET", requestUrl = "/users/7", latency = "0.015s", "request served");
    info!(grpcCode = "NOT_FOUND", grpcMessage = "no such user", "rpc finished");
}
