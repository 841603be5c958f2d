use indexmap::IndexMap;
use log::{debug, info};
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// Identifier assigned to each accepted connection
pub type ClientId = u64;

struct Client {
    addr: IpAddr,
    sender: mpsc::UnboundedSender<String>,
}

#[derive(Default)]
struct HubInner {
    next_id: ClientId,
    clients: IndexMap<ClientId, Client>,
}

/// Registry of connected browser clients
///
/// One connection is allowed per remote IP.
#[derive(Clone, Default)]
pub struct Hub {
    inner: Arc<Mutex<HubInner>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client, returning its id and outbound queue
    ///
    /// Returns `None` when `addr` already has a live connection.
    pub fn register(&self, addr: IpAddr) -> Option<(ClientId, mpsc::UnboundedReceiver<String>)> {
        let mut inner = self.lock();
        if inner.clients.values().any(|c| c.addr == addr) {
            info!("Rejected connection for already-connected address: {}", addr);
            return None;
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let (sender, receiver) = mpsc::unbounded_channel();
        inner.clients.insert(id, Client { addr, sender });

        info!("New connection ({}) from {}", id, addr);
        Some((id, receiver))
    }

    /// Remove a client; returns whether it was registered
    pub fn unregister(&self, id: ClientId) -> bool {
        let mut inner = self.lock();
        let removed = inner.clients.shift_remove(&id).is_some();
        if removed {
            info!(
                "Connection {} has disconnected - {} active connections remain",
                id,
                inner.clients.len()
            );
        }
        removed
    }

    /// Queue `message` for every connected client, returning how many accepted it
    pub fn broadcast(&self, message: &str) -> usize {
        let inner = self.lock();
        let mut delivered = 0;
        for (id, client) in &inner.clients {
            if client.sender.send(message.to_string()).is_ok() {
                debug!("Queued broadcast for {} ({})", id, client.addr);
                delivered += 1;
            }
        }
        delivered
    }

    pub fn len(&self) -> usize {
        self.lock().clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().clients.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(127, 0, 0, last))
    }

    #[test]
    fn test_register_assigns_increasing_ids() {
        let hub = Hub::new();
        let (a, _rx_a) = hub.register(ip(1)).unwrap();
        let (b, _rx_b) = hub.register(ip(2)).unwrap();

        assert!(b > a);
        assert_eq!(hub.len(), 2);
    }

    #[test]
    fn test_duplicate_address_is_rejected() {
        let hub = Hub::new();
        let _first = hub.register(ip(1)).unwrap();

        assert!(hub.register(ip(1)).is_none());
        assert_eq!(hub.len(), 1);
    }

    #[test]
    fn test_address_is_free_after_unregister() {
        let hub = Hub::new();
        let (id, _rx) = hub.register(ip(1)).unwrap();

        assert!(hub.unregister(id));
        assert!(!hub.unregister(id));
        assert!(hub.is_empty());
        assert!(hub.register(ip(1)).is_some());
    }

    #[test]
    fn test_broadcast_reaches_every_client() {
        let hub = Hub::new();
        let (_, mut rx_a) = hub.register(ip(1)).unwrap();
        let (_, mut rx_b) = hub.register(ip(2)).unwrap();

        assert_eq!(hub.broadcast("Summarize this"), 2);
        assert_eq!(rx_a.try_recv().unwrap(), "Summarize this");
        assert_eq!(rx_b.try_recv().unwrap(), "Summarize this");
    }

    #[test]
    fn test_broadcast_skips_dropped_receivers() {
        let hub = Hub::new();
        let (_, rx_a) = hub.register(ip(1)).unwrap();
        let (_, mut rx_b) = hub.register(ip(2)).unwrap();
        drop(rx_a);

        assert_eq!(hub.broadcast("hi"), 1);
        assert_eq!(rx_b.try_recv().unwrap(), "hi");
    }

    #[test]
    fn test_empty_hub() {
        let hub = Hub::new();
        assert!(hub.is_empty());
        assert_eq!(hub.broadcast("nobody"), 0);
    }
}
