/// Explicit subscriptions for importer and UI events
use std::fmt::Debug;

/// Events carry a kind that subscribers filter on
pub trait Event {
    type Kind: Copy + PartialEq + Debug;

    fn kind(&self) -> Self::Kind;
}

/// Returned by `subscribe`, used to tear the subscription down again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

type Handler<E, C> = Box<dyn FnMut(&E, &mut C)>;

struct Subscriber<E: Event, C> {
    handle: SubscriptionHandle,
    kind: E::Kind,
    handler: Handler<E, C>,
}

/// Routes events of type `E` to handlers that receive a mutable context `C`
pub struct EventHub<E: Event, C> {
    next_id: u64,
    subscribers: Vec<Subscriber<E, C>>,
}

impl<E: Event, C> EventHub<E, C> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, kind: E::Kind, handler: F) -> SubscriptionHandle
    where
        F: FnMut(&E, &mut C) + 'static,
    {
        let handle = SubscriptionHandle::from_raw(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            handle,
            kind,
            handler: Box::new(handler),
        });
        log::trace!("subscribed {:?} as {:?}", kind, handle);
        handle
    }

    /// Returns `false` if the handle was already gone
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.handle != handle);
        before != self.subscribers.len()
    }

    /// Calls every handler subscribed to the event's kind, in subscription order
    pub fn dispatch(&mut self, event: &E, ctx: &mut C) -> usize {
        let kind = event.kind();
        let mut delivered = 0;
        for subscriber in self.subscribers.iter_mut().filter(|s| s.kind == kind) {
            (subscriber.handler)(event, ctx);
            delivered += 1;
        }
        if delivered == 0 {
            log::debug!("no subscriber for {:?}", kind);
        }
        delivered
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<E: Event, C> Default for EventHub<E, C> {
    fn default() -> Self {
        Self::new()
    }
}
