use murmur_rendezvous::{RoomRegistry, serve};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A rendezvous service bound to an ephemeral local port.
pub struct TestServer {
    pub base_url: String,
    pub registry: RoomRegistry,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        init_tracing();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let registry = RoomRegistry::new();
        let (shutdown, stop) = oneshot::channel::<()>();

        let task = tokio::spawn({
            let registry = registry.clone();
            async move {
                serve(listener, registry, async {
                    let _ = stop.await;
                })
                .await
                .unwrap();
            }
        });

        Self {
            base_url,
            registry,
            shutdown,
            task,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}
