use openhab_provider::{init_logging, serve, OpenhabProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting openHAB provider");
    serve(OpenhabProvider::new(env!("CARGO_PKG_VERSION"))).await
}
