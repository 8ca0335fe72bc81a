//! Shared utilities for integration tests.

use std::net::SocketAddr;

use greeter::{Server, app};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

// Tests run on a current-thread runtime, so records from the spawned server
// tasks land in the test's capturing subscriber.
pub use greeter::logging::capture::Captured;

/// A running greeter on an ephemeral port. Dropping it stops the server.
pub struct TestServer {
    pub addr: SocketAddr,
    _stop: oneshot::Sender<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let signal = async {
                let _ = stopped.await;
            };
            let _ = Server::from_listener(listener)
                .serve_with_shutdown(app::router(), signal)
                .await;
        });

        Self { addr, _stop: stop }
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}
