use crate::error::{HealthError, HealthResult};
use crate::models::snapshot::HealthSnapshot;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Opaque identity of a subscriber. Two handles with the same id are the
/// same subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

impl ListenerId {
    pub fn new(raw: u64) -> Self { Self(raw) }

    /// A process-unique id.
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 { self.0 }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The subscriber is gone and will never accept another snapshot.
    #[error("listener is dead")]
    Dead,

    #[error("delivery failed: {0}")]
    Failed(String),
}

/// Handed to a listener when it is registered. Firing it tells the registry
/// that the subscriber died, from any thread.
#[derive(Debug, Clone)]
pub struct DeathNotice {
    id: ListenerId,
    tx: Sender<ListenerId>,
}

impl DeathNotice {
    pub fn id(&self) -> ListenerId { self.id }

    /// Returns false if the registry is already gone.
    pub fn fire(&self) -> bool {
        self.tx.send(self.id).is_ok()
    }
}

/// A subscriber to health snapshots.
///
/// `deliver` runs while the registry lock is held, so implementations must
/// not call back into the registry from it. A subscriber that learns it is
/// dead outside of a delivery fires its [`DeathNotice`] instead.
pub trait Listener: Send + Sync {
    fn id(&self) -> ListenerId;

    fn deliver(&self, snapshot: &Arc<HealthSnapshot>) -> Result<(), DeliveryError>;

    /// Arrange for `notice` to fire when the subscriber dies. Returns false
    /// if death cannot be observed for this listener.
    fn link_to_death(&self, _notice: DeathNotice) -> bool { false }

    fn unlink_to_death(&self) {}
}

pub type ListenerHandle = Arc<dyn Listener>;

/// Ordered set of live listeners, unique by id.
pub struct ListenerRegistry {
    listeners: Mutex<Vec<ListenerHandle>>,
    death_tx:  Sender<ListenerId>,
    death_rx:  Mutex<Option<Receiver<ListenerId>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        let (death_tx, death_rx) = mpsc::channel();
        Self {
            listeners: Mutex::new(Vec::new()),
            death_tx,
            death_rx: Mutex::new(Some(death_rx)),
        }
    }

    /// Add a listener and watch for its death. `None` (a null handle from
    /// the transport) is ignored. Returns true if the listener was added,
    /// false if it was null or already registered.
    pub fn register(&self, listener: Option<ListenerHandle>) -> bool {
        let Some(listener) = listener else {
            debug!("ignoring null listener");
            return false;
        };
        let id = listener.id();
        {
            let mut live = self.listeners.lock();
            if live.iter().any(|l| l.id() == id) {
                debug!(%id, "listener already registered");
                return false;
            }
            live.push(listener.clone());
        }

        let notice = DeathNotice { id, tx: self.death_tx.clone() };
        if !listener.link_to_death(notice) {
            warn!(%id, "cannot link to death, dead listener will be pruned on delivery");
        }
        debug!(%id, "listener registered");
        true
    }

    /// Remove every entry with this id and stop watching it.
    pub fn unregister(&self, id: ListenerId) -> HealthResult<()> {
        let removed: Vec<ListenerHandle> = {
            let mut live = self.listeners.lock();
            let (gone, kept): (Vec<_>, Vec<_>) = live.drain(..).partition(|l| l.id() == id);
            *live = kept;
            gone
        };
        if removed.is_empty() {
            return Err(HealthError::NotFound);
        }
        for l in &removed {
            l.unlink_to_death();
        }
        debug!(%id, "listener unregistered");
        Ok(())
    }

    /// Death callback. Same as `unregister`, but a listener that is already
    /// gone is not an error.
    pub fn on_death(&self, id: ListenerId) {
        match self.unregister(id) {
            Ok(())  => debug!(%id, "listener died, removed"),
            Err(_)  => debug!(%id, "listener died after removal"),
        }
    }

    /// Deliver `snapshot` to every live listener in registration order.
    /// Listeners that are dead or fail are dropped and the pass carries on.
    /// Returns the number of successful deliveries.
    pub fn notify(&self, snapshot: &Arc<HealthSnapshot>) -> usize {
        let mut delivered = 0;
        let mut live = self.listeners.lock();
        live.retain(|l| match l.deliver(snapshot) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(e) => {
                warn!(id = %l.id(), error = %e, "dropping listener");
                l.unlink_to_death();
                false
            }
        });
        delivered
    }

    pub fn len(&self) -> usize { self.listeners.lock().len() }
    pub fn is_empty(&self) -> bool { self.listeners.lock().is_empty() }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.lock().iter().any(|l| l.id() == id)
    }

    /// Ids of live listeners in registration order.
    pub fn ids(&self) -> Vec<ListenerId> {
        self.listeners.lock().iter().map(|l| l.id()).collect()
    }

    /// Hand the death channel to a dedicated watcher. After this,
    /// `reap_deaths` does nothing.
    pub fn take_death_receiver(&self) -> Option<Receiver<ListenerId>> {
        self.death_rx.lock().take()
    }

    /// Process pending death notices without blocking. Returns how many
    /// were handled.
    pub fn reap_deaths(&self) -> usize {
        let pending: Vec<ListenerId> = {
            let rx = self.death_rx.lock();
            let Some(rx) = rx.as_ref() else { return 0 };
            let mut ids = Vec::new();
            loop {
                match rx.try_recv() {
                    Ok(id) => ids.push(id),
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                }
            }
            ids
        };
        for id in &pending {
            self.on_death(*id);
        }
        pending.len()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self { Self::new() }
}

// ── Channel-backed listener ───────────────────────────────────────────

/// Listener that forwards snapshots into a channel. Dropping the receiver
/// kills the listener; it is pruned on the next delivery, or immediately
/// if `hang_up` is called.
pub struct ChannelListener {
    id:     ListenerId,
    tx:     Sender<Arc<HealthSnapshot>>,
    notice: Mutex<Option<DeathNotice>>,
}

impl ChannelListener {
    pub fn new() -> (Arc<Self>, Receiver<Arc<HealthSnapshot>>) {
        Self::with_id(ListenerId::next())
    }

    pub fn with_id(id: ListenerId) -> (Arc<Self>, Receiver<Arc<HealthSnapshot>>) {
        let (tx, rx) = mpsc::channel();
        (Arc::new(Self { id, tx, notice: Mutex::new(None) }), rx)
    }

    /// Report this subscriber as dead through its death link, if any.
    pub fn hang_up(&self) -> bool {
        match self.notice.lock().take() {
            Some(n) => n.fire(),
            None    => false,
        }
    }
}

impl Listener for ChannelListener {
    fn id(&self) -> ListenerId { self.id }

    fn deliver(&self, snapshot: &Arc<HealthSnapshot>) -> Result<(), DeliveryError> {
        self.tx.send(Arc::clone(snapshot)).map_err(|_| DeliveryError::Dead)
    }

    fn link_to_death(&self, notice: DeathNotice) -> bool {
        *self.notice.lock() = Some(notice);
        true
    }

    fn unlink_to_death(&self) {
        self.notice.lock().take();
    }
}
