//! WebSocket client for the order-update feed
//!
//! Handles connection and frame reception.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::protocol::Message,
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info, warn};

use crate::error::{ReconcilerError, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What a single `recv` produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// A data frame
    Text(String),
    /// Ping, pong or raw frame; nothing to process
    Control,
    /// The server ended the stream
    Closed,
}

/// WebSocket client for a single connection
pub struct FeedClient {
    stream: Option<WsStream>,
    endpoint: String,
}

impl FeedClient {
    /// Create a new feed client
    pub fn new(endpoint: &str) -> Self {
        Self {
            stream: None,
            endpoint: endpoint.to_string(),
        }
    }

    /// Connect to the WebSocket endpoint
    pub async fn connect(&mut self) -> Result<()> {
        info!(url = %self.endpoint, "Connecting to order update feed");

        let (ws_stream, response) = connect_async(self.endpoint.as_str()).await.map_err(|e| {
            ReconcilerError::WebSocketConnection(format!("Failed to connect: {}", e))
        })?;

        info!(status = ?response.status(), "WebSocket connected");
        self.stream = Some(ws_stream);

        Ok(())
    }

    /// Receive the next frame
    pub async fn recv(&mut self) -> Result<Incoming> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| ReconcilerError::WebSocketConnection("Not connected".to_string()))?;

        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                debug!(len = text.len(), "Received text message");
                Ok(Incoming::Text(text))
            }
            Some(Ok(Message::Binary(data))) => {
                let text = String::from_utf8_lossy(&data).to_string();
                Ok(Incoming::Text(text))
            }
            Some(Ok(Message::Ping(data))) => {
                debug!("Received ping, sending pong");
                if let Some(stream) = self.stream.as_mut() {
                    let _ = stream.send(Message::Pong(data)).await;
                }
                Ok(Incoming::Control)
            }
            Some(Ok(Message::Pong(_))) => {
                debug!("Received pong");
                Ok(Incoming::Control)
            }
            Some(Ok(Message::Close(frame))) => {
                info!(frame = ?frame, "Received close frame");
                Ok(Incoming::Closed)
            }
            Some(Ok(Message::Frame(_))) => Ok(Incoming::Control),
            Some(Err(e)) => {
                error!(error = %e, "WebSocket error");
                self.stream = None;
                Err(ReconcilerError::WebSocketMessage(e.to_string()))
            }
            None => {
                warn!("WebSocket stream ended without close frame");
                self.stream = None;
                Ok(Incoming::Closed)
            }
        }
    }

    /// Send a ping to keep connection alive
    pub async fn ping(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.as_mut() {
            stream
                .send(Message::Ping(vec![]))
                .await
                .map_err(|e| ReconcilerError::WebSocketMessage(e.to_string()))?;
        }
        Ok(())
    }

    /// Close the connection
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.close(None).await;
        }
    }
}
