//! Async Unix socket server for the transcription service.

use crate::error::{KathaError, Result};
use crate::service::protocol::{Request, Response};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::watch;

/// Handler trait for processing service requests.
#[async_trait::async_trait]
pub trait RequestHandler: Send + Sync {
    /// Handle a request and return a response.
    async fn handle(&self, request: Request) -> Response;
}

/// Socket server accepting one JSON request line per connection.
///
/// Shutdown is signalled over a watch channel: `stop` flips it and the
/// accept loop exits on the next `select` poll, without waiting out an
/// accept timeout. The socket file lives exactly as long as the bound
/// listener.
pub struct ServiceServer {
    socket_path: PathBuf,
    shutdown_tx: watch::Sender<bool>,
}

impl ServiceServer {
    /// Create a server bound to the specified socket path.
    pub fn new(socket_path: PathBuf) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            socket_path,
            shutdown_tx,
        }
    }

    /// Get the socket path this server is using.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Per-user default: the runtime dir when available, tmp otherwise.
    pub fn default_socket_path() -> PathBuf {
        match std::env::var_os("XDG_RUNTIME_DIR") {
            Some(dir) => PathBuf::from(dir).join("katha.sock"),
            None => {
                let uid = unsafe { libc::getuid() };
                std::env::temp_dir().join(format!("katha-{uid}.sock"))
            }
        }
    }

    /// Serve connections until [`ServiceServer::stop`] is called.
    ///
    /// Each connection is handled on its own task; a slow transcription
    /// never blocks the accept loop.
    pub async fn start<H>(&self, handler: H) -> Result<()>
    where
        H: RequestHandler + 'static,
    {
        let socket = BoundSocket::bind(&self.socket_path)?;
        let handler = Arc::new(handler);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        if *shutdown_rx.borrow() {
            return Ok(());
        }

        loop {
            tokio::select! {
                accepted = socket.listener.accept() => {
                    let (stream, _) = accepted.map_err(|e| KathaError::ServiceSocket {
                        message: format!("Failed to accept connection: {e}"),
                    })?;
                    let handler = Arc::clone(&handler);
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, handler).await {
                            eprintln!("katha: error handling client: {e}");
                        }
                    });
                }
                _ = shutdown_rx.changed() => break,
            }
        }

        Ok(())
    }

    /// Signal the accept loop to exit. Safe to call more than once, and
    /// before `start`; in-flight connections finish on their own tasks.
    pub fn stop(&self) {
        // send_replace updates the value even when no receiver exists yet
        self.shutdown_tx.send_replace(true);
    }
}

/// A bound listener that owns its socket file.
///
/// Binding replaces a stale socket left by a previous run; dropping the
/// guard removes the file, on clean shutdown and accept errors alike.
struct BoundSocket {
    listener: UnixListener,
    path: PathBuf,
}

impl BoundSocket {
    fn bind(path: &Path) -> Result<Self> {
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(KathaError::ServiceSocket {
                    message: format!("Failed to remove stale socket: {e}"),
                });
            }
        }
        let listener = UnixListener::bind(path).map_err(|e| KathaError::ServiceSocket {
            message: format!("Failed to bind to socket: {e}"),
        })?;
        Ok(Self {
            listener,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for BoundSocket {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            eprintln!(
                "katha: failed to remove socket file {}: {e}",
                self.path.display()
            );
        }
    }
}

/// Handle a single client connection: one request line, one response line.
async fn handle_client<H>(stream: UnixStream, handler: Arc<H>) -> Result<()>
where
    H: RequestHandler,
{
    let (reader, mut writer) = stream.into_split();
    let mut line = String::new();
    BufReader::new(reader)
        .read_line(&mut line)
        .await
        .map_err(|e| KathaError::ServiceProtocol {
            message: format!("Failed to read request: {e}"),
        })?;

    let response = match Request::from_json(line.trim()) {
        Ok(request) => handler.handle(request).await,
        Err(e) => Response::Error {
            message: format!("invalid request: {e}"),
        },
    };

    let mut payload = response.to_json().map_err(|e| KathaError::ServiceProtocol {
        message: format!("Failed to serialize response: {e}"),
    })?;
    payload.push('\n');

    writer
        .write_all(payload.as_bytes())
        .await
        .map_err(|e| KathaError::ServiceProtocol {
            message: format!("Failed to write response: {e}"),
        })
}
