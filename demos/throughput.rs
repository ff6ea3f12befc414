use std::io;
use std::time::Instant;

use gcp_log_format::{BasicFormatter, GoogleLogLayer};
use tracing_subscriber::layer::SubscriberExt;

const ITERATIONS: u32 = 100_000;

fn run(name: &str, report_caller: bool, body: impl Fn()) {
    let layer = GoogleLogLayer::new(BasicFormatter::new("ABC"))
        .with_caller(report_caller)
        .with_writer(io::sink);
    let subscriber = tracing_subscriber::registry().with(layer);

    tracing::subscriber::with_default(subscriber, || {
        let start = Instant::now();
        for _ in 0..ITERATIONS {
            body();
        }
        let elapsed = start.elapsed();
        println!("{:<20} {:>10.0} ns/op", name, elapsed.as_nanos() as f64 / f64::from(ITERATIONS));
    });
}

fn main() {
    run("basic", false, || tracing::info!("My info message here"));
    run("basic_with_caller", true, || tracing::info!("My info message here"));
    run("structured", false, || {
        tracing::info!(animal = "walrus", name = "jonas", age = 33, "My info message here")
    });
    run("error", false, || tracing::error!("My error message here"));
}
