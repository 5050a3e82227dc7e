#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use tracing::{info, warn};
    use work_order_portal::{
        Classifier, JsonFileSource, PortalConfig, WorkOrderStore, http_api, telemetry,
    };

    let config = PortalConfig::from_env()?;
    telemetry::init_tracing(&config.log_level);
    info!(?config, "starting work order portal API");

    let addr: SocketAddr = config.http_addr.parse()?;
    let mut store = match config.data_path.as_deref() {
        Some(path) => WorkOrderStore::new(JsonFileSource::new(path)),
        None => WorkOrderStore::bundled(),
    };
    if let Err(err) = store.refresh() {
        warn!(error = %err, "starting with no work orders");
    }

    println!("work-order-portal HTTP API listening on http://{addr}");
    http_api::serve(addr, store, Classifier::new(config.policy())).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
