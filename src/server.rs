use crate::assets::AssetStore;
use crate::config::{self, Timeouts, SERVICE_NAME};
use crate::err::Error;
use crate::http::run_server;
use crate::opt;
use crate::routes::{self, respond_to_request, State};
use crate::signal;
use hyper::body::Incoming;
use std::env;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub async fn main(options: opt::Options) -> Result<(), Error> {
    let start = Instant::now();
    let opt::Options { verbose: _, port } = options;

    let port = config::resolve_port(port, env::var(config::PORT_VAR).ok().as_deref());
    log::info!("Starting {} on port {}", SERVICE_NAME, port);

    let assets = AssetStore::embedded();
    match assets.index() {
        Ok(_) => log::info!("Loaded {} embedded assets", assets.len()),
        Err(e) => log::warn!("Loaded {} embedded assets, but {}", assets.len(), e),
    }
    let state = State {
        name: SERVICE_NAME,
        assets,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    routes::log_endpoints();

    let shutdown = CancellationToken::new();
    signal::spawn_listener(shutdown.clone())?;
    log::info!("Initialization completed in {:?}", start.elapsed());

    run_server(
        listener,
        state,
        respond_to_request::<Incoming>,
        Timeouts::default(),
        shutdown,
    )
    .await?;

    log::info!("Shut down after {:?} of uptime", start.elapsed());
    Ok(())
}
