use crate::utility::shutdown::shutdown_signal;
use axum::Router;
use eyre::{eyre, Report, WrapErr};
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// `HOST`/`PORT` as a socket address, defaulting to every interface on 8080.
pub fn bind_address() -> Result<SocketAddr, Report> {
    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = match env::var("PORT") {
        Ok(raw) => raw
            .parse::<u16>()
            .map_err(|e| eyre!("Invalid PORT {:?}: {}", raw, e))?,
        Err(_) => DEFAULT_PORT,
    };

    format!("{host}:{port}")
        .parse()
        .map_err(|e| eyre!("Invalid bind address {}:{}: {}", host, port, e))
}

/// Serves the API until Ctrl+C or SIGTERM, letting in-flight requests finish.
pub async fn serve(router: Router) -> Result<(), Report> {
    let addr = bind_address()?;
    let listener = TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("Could not bind {}", addr))?;

    info!(%addr, "server: meterpay api listening");
    info!("server: docs at http://{}/swagger-ui/, metrics at http://{}/metrics", addr, addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .wrap_err("Server terminated unexpectedly")
}
