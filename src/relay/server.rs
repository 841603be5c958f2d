use crate::config::RelayConfig;
use crate::dom::Envelope;
use crate::error::{RelayError, Result};
use crate::handlers::{HandlerContext, HandlerOutcome, HandlerRegistry};
use crate::relay::archive::MessageArchive;
use crate::relay::hub::{ClientId, Hub};
use axum::{
    Router,
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{sink::SinkExt, stream::StreamExt};
use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A reassembled chat message and the client it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub client_id: ClientId,
    pub markdown: String,
}

/// State shared by every connection
#[derive(Clone)]
pub struct RelayState {
    hub: Hub,
    registry: Arc<HandlerRegistry>,
    context: Arc<HandlerContext>,
    archive: Option<MessageArchive>,
    transcripts: mpsc::UnboundedSender<Transcript>,
}

impl RelayState {
    /// Create relay state and the receiving end of its transcript stream
    pub fn new(
        hub: Hub,
        registry: HandlerRegistry,
        context: HandlerContext,
        archive: Option<MessageArchive>,
    ) -> (Self, mpsc::UnboundedReceiver<Transcript>) {
        let (transcripts, receiver) = mpsc::unbounded_channel();
        let state = Self {
            hub,
            registry: Arc::new(registry),
            context: Arc::new(context),
            archive,
            transcripts,
        };
        (state, receiver)
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    /// Process one text frame from `client_id`
    ///
    /// Undecodable or unsupported messages are logged and dropped; they never
    /// close the connection.
    pub async fn handle_text(&self, client_id: ClientId, text: &str) -> Option<Transcript> {
        info!("Received message from {} ({} bytes)", client_id, text.len());

        if let Some(archive) = &self.archive {
            if let Err(e) = archive.store(client_id, text).await {
                warn!("Failed to archive message from {}: {}", client_id, e);
            }
        }

        let outcome = Envelope::from_json(text)
            .and_then(|envelope| self.registry.dispatch(envelope.input, &self.context));

        match outcome {
            Ok(HandlerOutcome::Transcript(markdown)) => {
                info!("Chat message from {} reassembled ({} bytes)", client_id, markdown.len());
                let transcript = Transcript { client_id, markdown };
                if self.transcripts.send(transcript.clone()).is_err() {
                    warn!("Transcript consumer has gone away");
                }
                Some(transcript)
            }
            Ok(HandlerOutcome::Noted(summary)) => {
                info!("Payload from {}: {}", client_id, summary);
                None
            }
            Err(e) => {
                error!("Could not handle message from {}: {}", client_id, e);
                None
            }
        }
    }
}

/// Build the relay router: a WebSocket upgrade on `/`
pub fn router(state: RelayState) -> Router {
    Router::new().route("/", get(ws_handler)).with_state(state)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<RelayState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, peer, state))
}

async fn handle_connection(socket: WebSocket, peer: SocketAddr, state: RelayState) {
    let Some((client_id, mut outbound)) = state.hub().register(peer.ip()) else {
        return;
    };

    let (mut sender, mut receiver) = socket.split();

    // Forward broadcasts to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    recv_state.handle_text(client_id, text.as_str()).await;
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    state.hub().unregister(client_id);
}

/// WebSocket relay between the browser scraper and the local console
pub struct RelayServer {
    listener: TcpListener,
    state: RelayState,
}

impl RelayServer {
    /// Bind the listener described by `config`
    ///
    /// Returns the server and the stream of transcripts it will produce.
    pub async fn bind(
        config: &RelayConfig,
        registry: HandlerRegistry,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Transcript>)> {
        let addr = config.socket_addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| RelayError::Bind(format!("{}: {}", addr, e)))?;

        let archive = config.archive_dir.clone().map(MessageArchive::new);
        let context = HandlerContext::new(config.to_blacklist());
        let (state, transcripts) = RelayState::new(Hub::new(), registry, context, archive);

        info!("Relay listening on ws://{}", listener.local_addr()?);
        Ok((Self { listener, state }, transcripts))
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle to the client registry, for broadcasting
    pub fn hub(&self) -> Hub {
        self.state.hub().clone()
    }

    /// Serve connections until `cancel` fires
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let app = router(self.state);

        axum::serve(
            self.listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

        info!("Relay stopped");
        Ok(())
    }
}
