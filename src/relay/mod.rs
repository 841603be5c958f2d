//! WebSocket relay
//!
//! The browser-side scraper connects over a local WebSocket and pushes DOM
//! snapshots of chat messages; the relay reassembles them into Markdown
//! transcripts. Lines typed on the console flow the other way, broadcast to
//! every connected page as the next prompt.
//!
//! - Hub: connected clients, one per remote IP
//! - MessageArchive: optional copy of each raw inbound message
//! - RelayServer / RelayState: the axum WebSocket endpoint
//! - pump_lines: console-to-browser broadcast

pub mod archive;
pub mod console;
pub mod hub;
pub mod server;

pub use archive::MessageArchive;
pub use console::pump_lines;
pub use hub::{ClientId, Hub};
pub use server::{RelayServer, RelayState, Transcript, router};
