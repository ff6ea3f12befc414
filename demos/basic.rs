use gcp_log_format::init::{try_init_tracing_with_config, LayerConfig};
use gcp_log_format::BasicFormatter;
use tracing::{error, info};

fn main() {
    let config = LayerConfig { report_caller: true };
    if let Err(e) = try_init_tracing_with_config(BasicFormatter::new("traceid"), config) {
        eprintln!("{}", e);
        return;
    }

    info!("Hello");
    info!(animal = "walrus", number = 1, "My info message here");

    let span = tracing::info_span!("request", traceid = "abcdef123456");
    let _enter = span.enter();
    info!("My info here {}", 100);
    error!(user_id = 42, "authentication failed");
}
