//! Notification channels.
//!
//! Channels form their own tree, separate from the subset tree: a subset's
//! channel gets whatever parent its creator hands in. An event sent on a
//! channel reaches that channel's observers first, then bubbles up through
//! each ancestor channel.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::store::ItemId;
use crate::subset::SubsetId;


/// Handle to a notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotifierId(usize);

/// Handle to a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(usize);


/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A config item's value changed.
    ConfigSet,
}


/// Payload of a config change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventConfig {
    /// Subset the write went through.
    pub subset: SubsetId,
    /// Key of the root item at the end of the inheritance chain.
    pub canonical_key: String,
    /// The item actually written.
    pub item: ItemId,
}


/// An event as seen by an observer.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// Channel the event was sent on.
    pub origin: NotifierId,
    /// Channel whose observer is being called.
    pub channel: NotifierId,
    pub kind: EventKind,
    pub config: &'a EventConfig,
}


type Callback = Box<dyn FnMut(&Event<'_>)>;

struct Channel {
    parent: Option<NotifierId>,
    observers: Vec<(ObserverId, Callback)>,
}


/// Arena of notification channels.
#[derive(Default)]
pub struct NotifyHub {
    channels: Vec<Option<Channel>>,
    next_observer: usize,
}

impl fmt::Debug for NotifyHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyHub")
            .field("channels", &self.len())
            .finish()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a channel under `parent`. A stale parent is ignored.
    pub fn channel_new(&mut self, parent: Option<NotifierId>) -> NotifierId {
        let parent = parent.filter(|p| self.contains(*p));
        let id = NotifierId(self.channels.len());
        self.channels.push(Some(Channel { parent, observers: Vec::new() }));
        id
    }

    /// Free a channel and its observers. Children keep their (now stale)
    /// parent link; propagation stops there.
    pub fn channel_free(&mut self, id: NotifierId) -> bool {
        match self.channels.get_mut(id.0) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, id: NotifierId) -> bool {
        self.channel(id).is_some()
    }

    pub fn parent(&self, id: NotifierId) -> Option<NotifierId> {
        self.channel(id).and_then(|c| c.parent)
    }

    /// Re-parent a channel. Refuses links that would form a loop.
    pub fn set_parent(&mut self, id: NotifierId, parent: Option<NotifierId>) -> bool {
        if !self.contains(id) {
            return false;
        }
        if let Some(p) = parent {
            if !self.contains(p) || self.ancestors(p).any(|a| a == id) {
                return false;
            }
        }
        match self.channels.get_mut(id.0).and_then(|s| s.as_mut()) {
            Some(ch) => {
                ch.parent = parent;
                true
            }
            None => false,
        }
    }

    pub fn observer_add<F>(&mut self, channel: NotifierId, callback: F) -> Option<ObserverId>
    where
        F: FnMut(&Event<'_>) + 'static,
    {
        let observer = ObserverId(self.next_observer);
        let ch = self.channels.get_mut(channel.0)?.as_mut()?;
        ch.observers.push((observer, Box::new(callback)));
        self.next_observer += 1;
        Some(observer)
    }

    pub fn observer_remove(&mut self, channel: NotifierId, observer: ObserverId) -> bool {
        let Some(ch) = self.channels.get_mut(channel.0).and_then(|s| s.as_mut()) else {
            return false;
        };
        let before = ch.observers.len();
        ch.observers.retain(|(id, _)| *id != observer);
        ch.observers.len() != before
    }

    /// Deliver an event to `channel` and every live ancestor.
    ///
    /// Returns how many observers were called.
    pub fn send(&mut self, channel: NotifierId, kind: EventKind, config: &EventConfig) -> usize {
        let mut delivered = 0;
        let mut current = Some(channel);
        while let Some(id) = current {
            let Some(ch) = self.channels.get_mut(id.0).and_then(|s| s.as_mut()) else {
                break;
            };
            let event = Event { origin: channel, channel: id, kind, config };
            for (_, callback) in ch.observers.iter_mut() {
                callback(&event);
                delivered += 1;
            }
            current = ch.parent;
        }
        trace!(?kind, key = %config.canonical_key, delivered, "notification sent");
        delivered
    }

    /// Number of live channels.
    pub fn len(&self) -> usize {
        self.channels.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn channel(&self, id: NotifierId) -> Option<&Channel> {
        self.channels.get(id.0).and_then(|s| s.as_ref())
    }

    fn ancestors(&self, id: NotifierId) -> impl Iterator<Item = NotifierId> + '_ {
        std::iter::successors(Some(id), move |c| self.parent(*c))
    }
}
