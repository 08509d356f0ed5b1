// ────────────────────────────────
// src/server/builder.rs
// ────────────────────────────────
use anyhow::{Context, Result};
use hyper::{server::conn::Http, Body, Request, Response};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tower::Service;

/// Builder pattern so `main.rs` can inject its request handler.
pub struct ServerBuilder<H> {
    addr: SocketAddr,
    handler: Option<H>,
}

impl<H> ServerBuilder<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr, handler: None }
    }

    pub fn with_handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Bind the TCP socket. Port 0 picks an ephemeral port, see
    /// [`BoundServer::local_addr`].
    pub async fn bind(self) -> Result<BoundServer<H>> {
        let handler = self
            .handler
            .context("handler must be set via with_handler()")?;
        let listener = TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.addr))?;

        Ok(BoundServer { listener, handler })
    }
}

pub struct BoundServer<H> {
    listener: TcpListener,
    handler: H,
}

impl<H> BoundServer<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` resolves, then drain.
    ///
    /// Open connections are told to shut down gracefully: requests already
    /// in flight get their responses, idle keep-alive connections close.
    /// Returns once every connection task has finished.
    pub async fn serve_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!("HTTP server listening on {}", self.local_addr()?);
        tokio::pin!(shutdown);

        let (drain_tx, drain_rx) = watch::channel(false);
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("HTTP server no longer accepting connections");
                    break;
                }
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(err) => {
                            tracing::warn!(%err, "accept failed");
                            continue;
                        }
                    };
                    let svc = self.handler.clone();
                    let mut drain = drain_rx.clone();

                    // One Tokio task per connection.
                    connections.spawn(async move {
                        let conn = Http::new().serve_connection(stream, svc);
                        tokio::pin!(conn);

                        let result = tokio::select! {
                            result = conn.as_mut() => result,
                            _ = drain.changed() => {
                                conn.as_mut().graceful_shutdown();
                                conn.await
                            }
                        };
                        if let Err(err) = result {
                            tracing::warn!(%peer, %err, "connection error");
                        }
                    });
                }
            }
        }

        let _ = drain_tx.send(true);
        let open = connections.len();
        if open > 0 {
            tracing::info!(open, "waiting for open connections to finish");
        }
        while let Some(joined) = connections.join_next().await {
            if let Err(err) = joined {
                tracing::warn!(%err, "connection task failed");
            }
        }
        Ok(())
    }
}
