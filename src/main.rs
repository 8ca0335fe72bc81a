use std::net::SocketAddr;

use greeter::{Server, app, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;

    let addr = SocketAddr::from(([0, 0, 0, 0], 10000));
    if let Err(e) = Server::bind(addr).serve(app::router()).await {
        tracing::error!(addr = %addr, error = %e, "server failed");
        return Err(e.into());
    }
    Ok(())
}
