//! WebSocket adapter between one client socket and the directory

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{future, SinkExt, StreamExt};
use tetris_arena::{Directory, ServerMessage};
use tokio::net::TcpStream;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Upgrade the socket, then run it through the directory until either side closes
pub async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    directory: Arc<Directory>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    let (mut ws_tx, ws_rx) = ws_stream.split();
    tracing::debug!("WebSocket handshake done with {}", peer);

    let (outbound_tx, outbound_rx) = flume::unbounded::<ServerMessage>();

    // Runs until every sender is gone: the room drops its copy when the player leaves
    let writer = tokio::spawn(async move {
        while let Ok(message) = outbound_rx.recv_async().await {
            let json = match message.to_json() {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to encode outbound message: {}", e);
                    continue;
                }
            };
            if ws_tx.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    // Text frames only; the stream ends on Close or the first transport error
    let inbound = ws_rx
        .take_while(|frame| future::ready(matches!(frame, Ok(message) if !message.is_close())))
        .filter_map(|frame| {
            future::ready(match frame {
                Ok(Message::Text(text)) => Some(text),
                _ => None,
            })
        });

    let served = directory
        .serve_connection(Box::pin(inbound), outbound_tx)
        .await;
    writer.await?;
    served?;
    Ok(())
}
