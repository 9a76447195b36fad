//! Managed HTTP server
//!
//! Owns a bound TCP listener and a warp serve loop running on a background
//! task. The server is either not yet started, running, or closed; closed is
//! terminal and a new server must be constructed to restart. `closed()` is a
//! lock-free atomic read safe from any concurrent caller.

use crate::shared::error::{AppError, AppResult};
use futures::{stream, TryStreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_io_timeout::TimeoutStream;
use tracing::{error, info, warn};
use warp::filters::BoxedFilter;
use warp::reply::Response;

/// Connection-level timeouts applied to every accepted stream.
///
/// An immutable value carried inside [`ServerSettings`]; overrides go through
/// [`with_timeouts`] at construction, never through shared state. The read
/// deadline also bounds idle keep-alive connections, since the connection
/// sits in a read while waiting for the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub read: Duration,
    pub write: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(15),
            write: Duration::from_secs(15),
        }
    }
}

/// Mutable server construction state, finalized before the serve task spawns
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub timeouts: HttpTimeouts,
    pub nodelay: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            timeouts: HttpTimeouts::default(),
            nodelay: true,
        }
    }
}

/// A single configuration option applied during [`ManagedServer::start`].
///
/// Options are applied in order after the listener is bound; the first
/// failure releases the listener and aborts startup.
pub type ServerOption = Box<dyn FnOnce(&mut ServerSettings) -> AppResult<()> + Send>;

/// Override the default connection timeouts
pub fn with_timeouts(timeouts: HttpTimeouts) -> ServerOption {
    Box::new(move |settings| {
        if timeouts.read.is_zero() || timeouts.write.is_zero() {
            return Err(AppError::ServerOption(
                "read and write timeouts must be non-zero".to_string(),
            ));
        }
        settings.timeouts = timeouts;
        Ok(())
    })
}

/// Control TCP_NODELAY on accepted connections
pub fn with_nodelay(enabled: bool) -> ServerOption {
    Box::new(move |settings| {
        settings.nodelay = enabled;
        Ok(())
    })
}

/// Lifecycle-owning wrapper around a listening socket and a warp serve loop
pub struct ManagedServer {
    addr: SocketAddr,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    serve_handle: Mutex<Option<JoinHandle<()>>>,
    stop_requested: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
}

impl ManagedServer {
    /// Bind `addr`, apply `opts`, and launch the serve loop on a background
    /// task. Returns immediately once the task is spawned, together with a
    /// receiver that fires if the serve loop ever exits without a shutdown
    /// request. That receiver firing is unrecoverable for this server; the
    /// owner decides whether to terminate the process.
    pub async fn start(
        addr: SocketAddr,
        routes: BoxedFilter<(Response,)>,
        opts: Vec<ServerOption>,
    ) -> AppResult<(ManagedServer, oneshot::Receiver<AppError>)> {
        let listener = TcpListener::bind(addr).await.map_err(|e| AppError::Bind {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
        let local_addr = listener.local_addr().map_err(|e| AppError::Bind {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;

        let mut settings = ServerSettings::default();
        for opt in opts {
            if let Err(err) = opt(&mut settings) {
                // Release the listener before surfacing the first failure.
                drop(listener);
                return Err(err);
            }
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let (fatal_tx, fatal_rx) = oneshot::channel::<AppError>();
        let stop_requested = Arc::new(AtomicBool::new(false));
        let closed = Arc::new(AtomicBool::new(false));

        let timeouts = settings.timeouts;
        let nodelay = settings.nodelay;
        let incoming = stream::unfold(listener, |listener| async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _peer)) => {
                        return Some((Ok::<_, std::io::Error>(stream), listener));
                    }
                    Err(err) => {
                        // Transient accept failures must not kill the loop.
                        warn!(error = %err, "Failed to accept connection");
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        })
        .map_ok(move |stream| {
            if nodelay {
                let _ = stream.set_nodelay(true);
            }
            let mut io = TimeoutStream::new(stream);
            io.set_read_timeout(Some(timeouts.read));
            io.set_write_timeout(Some(timeouts.write));
            Box::pin(io)
        });

        let serve = warp::serve(routes).serve_incoming_with_graceful_shutdown(incoming, async {
            let _ = shutdown_rx.await;
        });

        let task_stop_requested = stop_requested.clone();
        let task_closed = closed.clone();
        let handle = tokio::spawn(async move {
            serve.await;
            if task_stop_requested.load(Ordering::SeqCst) {
                task_closed.store(true, Ordering::SeqCst);
                info!("Server closed after shutdown request");
            } else {
                error!("Serve loop exited without a shutdown request");
                let _ = fatal_tx.send(AppError::Internal(
                    "serve loop exited unexpectedly".to_string(),
                ));
            }
        });

        info!(addr = %local_addr, "Server started");

        Ok((
            ManagedServer {
                addr: local_addr,
                shutdown: Mutex::new(Some(shutdown_tx)),
                serve_handle: Mutex::new(Some(handle)),
                stop_requested,
                closed,
            },
            fatal_rx,
        ))
    }

    /// The bound local address; useful when binding with an ephemeral port
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Whether the serve loop has terminated. Safe to call concurrently.
    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Gracefully stop the server, bounded by `timeout`.
    ///
    /// New connections stop being accepted and in-flight requests are allowed
    /// to drain. When the bound elapses first, the serve task is aborted and
    /// the listener force-closed. Calling `stop` again after it has returned
    /// is a no-op.
    pub async fn stop(&self, timeout: Duration) -> AppResult<()> {
        let shutdown = self.shutdown.lock().await.take();
        let Some(shutdown) = shutdown else {
            return Ok(());
        };
        self.stop_requested.store(true, Ordering::SeqCst);
        let _ = shutdown.send(());

        let handle = self.serve_handle.lock().await.take();
        if let Some(mut handle) = handle {
            match tokio::time::timeout(timeout, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    if join_err.is_cancelled() {
                        self.closed.store(true, Ordering::SeqCst);
                    } else {
                        return Err(AppError::Shutdown(format!(
                            "Serve task failed: {}",
                            join_err
                        )));
                    }
                }
                Err(_elapsed) => {
                    warn!(addr = %self.addr, "Graceful shutdown deadline elapsed; forcing close");
                    handle.abort();
                    let _ = (&mut handle).await;
                    self.closed.store(true, Ordering::SeqCst);
                }
            }
        }
        Ok(())
    }
}
