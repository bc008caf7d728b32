//! WebSocket transport for the chat socket.
//!
//! A thin I/O layer: one task owns the socket and bridges it to channels.
//! Protocol logic stays in the pure state machines; the driver feeds
//! received payloads into them and writes their transmit actions back here.

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Message, client::IntoClientRequest, http::header::COOKIE},
};

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The URL or cookie could not form an upgrade request.
    #[error("invalid upgrade request: {0}")]
    Request(String),

    /// The WebSocket handshake failed.
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Handle to a connected chat socket.
///
/// Raw text payloads arrive on `from_server`; one payload may hold several
/// newline-separated frames, exactly as the server's write pump batches
/// them. Encoded frames written to `to_server` go out as text messages.
/// `from_server` closing means the socket is gone; there is no reconnect.
pub struct ConnectedTransport {
    /// Encoded frames to the server.
    pub to_server: mpsc::Sender<String>,
    /// Raw text payloads from the server.
    pub from_server: mpsc::Receiver<String>,
    /// Abort handle to stop the socket task.
    abort_handle: tokio::task::AbortHandle,
}

impl ConnectedTransport {
    /// Tear the socket down without waiting for the server.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Open the chat socket, authenticating the upgrade with the session
/// cookie obtained from login.
///
/// # Errors
///
/// [`TransportError::Request`] when the URL or cookie cannot form an
/// upgrade request, [`TransportError::Connection`] when the handshake
/// fails.
pub async fn connect(ws_url: &str, cookie: &str) -> Result<ConnectedTransport, TransportError> {
    let mut request =
        ws_url.into_client_request().map_err(|err| TransportError::Request(err.to_string()))?;
    let cookie = cookie
        .parse()
        .map_err(|_| TransportError::Request("cookie is not a valid header value".to_string()))?;
    request.headers_mut().insert(COOKIE, cookie);

    let (stream, _) = connect_async(request)
        .await
        .map_err(|err| TransportError::Connection(err.to_string()))?;

    let (to_server_tx, to_server_rx) = mpsc::channel::<String>(32);
    let (from_server_tx, from_server_rx) = mpsc::channel::<String>(32);

    let handle = tokio::spawn(run_socket(stream, to_server_rx, from_server_tx));

    Ok(ConnectedTransport {
        to_server: to_server_tx,
        from_server: from_server_rx,
        abort_handle: handle.abort_handle(),
    })
}

/// Pump the socket until either side goes away.
async fn run_socket(
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    mut to_server: mpsc::Receiver<String>,
    from_server: mpsc::Sender<String>,
) {
    let (mut sink, mut source) = stream.split();

    let send_task = tokio::spawn(async move {
        while let Some(text) = to_server.recv().await {
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = source.next().await {
        match message {
            Ok(Message::Text(text)) => {
                if from_server.send(text).await.is_err() {
                    break;
                }
            },
            Ok(Message::Close(_)) | Err(_) => break,
            // Pings are answered by the protocol layer itself.
            Ok(_) => {},
        }
    }

    send_task.abort();
    // Dropping `from_server` closes the driver's receiver, which is how it
    // learns the socket is gone.
}
