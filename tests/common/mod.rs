//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use lite_httpd::config::{ServerConfig, SiteConfig};
use lite_httpd::{HttpServer, Shutdown};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked");
    }
}

/// Start a plaintext server on 127.0.0.1 with the given config.
#[allow(dead_code)]
pub async fn start_server(config: ServerConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = HttpServer::new(config);
    let task = tokio::spawn(async move {
        server.run(listener, rx).await.expect("server failed");
    });

    TestServer { addr, shutdown, task }
}

/// Start a server through `HttpServer::serve`, so the listener (plain or
/// TLS) is chosen from `config.listener`. Returns once the port accepts.
#[allow(dead_code)]
pub async fn serve_config(config: ServerConfig) -> TestServer {
    let addr: SocketAddr = config.listener.bind_address.parse().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = HttpServer::new(config);
    let task = tokio::spawn(async move {
        server.serve(rx).await.expect("server failed");
    });

    for _ in 0..100 {
        if TcpStream::connect(addr).await.is_ok() {
            return TestServer { addr, shutdown, task };
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server did not start listening on {addr}");
}

/// A loopback address with a port nobody is listening on.
#[allow(dead_code)]
pub async fn free_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

#[allow(dead_code)]
pub fn site(name: &str, hostname: &str, port: Option<u16>) -> SiteConfig {
    SiteConfig {
        name: name.into(),
        hostname: hostname.into(),
        port,
        path_prefix: None,
        priority: 0,
    }
}

/// Client that never pools connections, so shutdown is not held up.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Like [`client`], but trusts self-signed certificates.
#[allow(dead_code)]
pub fn tls_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .danger_accept_invalid_certs(true)
        .build()
        .unwrap()
}
