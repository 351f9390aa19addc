//! Map events and a subscription hub for dispatching them.
//!
//! External collaborators (map surface, drawing tool, settings form)
//! publish events; a session subscribes once, drains its queue, and handles
//! each event to completion before the next.

use crate::geometry::{LatLng, LatLngBounds};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A completed drawing from the drawing tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawEvent {
    Point { coordinate: LatLng },
    Polygon { ring: Vec<LatLng> },
}

/// Events delivered to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapEvent {
    /// The map surface settled on a new zoom level.
    ZoomChanged { zoom: f64 },
    /// The visible area moved.
    BoundsChanged { bounds: LatLngBounds },
    /// The user finished drawing a shape.
    DrawComplete { shape: DrawEvent },
    /// The settings form was submitted with a raw threshold value.
    ThresholdSubmitted { value: String },
}

impl MapEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            MapEvent::ZoomChanged { .. } => EventKind::Zoom,
            MapEvent::BoundsChanged { .. } => EventKind::Bounds,
            MapEvent::DrawComplete { .. } => EventKind::Draw,
            MapEvent::ThresholdSubmitted { .. } => EventKind::Threshold,
        }
    }
}

/// Event categories a subscriber can listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Zoom,
    Bounds,
    Draw,
    Threshold,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Zoom,
        EventKind::Bounds,
        EventKind::Draw,
        EventKind::Threshold,
    ];
}

/// Handle returned by [`EventHub::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug)]
struct Subscriber {
    id: SubscriptionId,
    kinds: Vec<EventKind>,
    queue: VecDeque<MapEvent>,
}

/// Publish point for map events.
#[derive(Debug, Default)]
pub struct EventHub {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in the given event kinds.
    pub fn subscribe(&mut self, kinds: &[EventKind]) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push(Subscriber {
            id,
            kinds: kinds.to_vec(),
            queue: VecDeque::new(),
        });
        id
    }

    /// Remove a subscription and drop its pending events.
    /// Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Queue an event for every interested subscriber.
    /// Returns the number of subscribers it was delivered to.
    pub fn publish(&mut self, event: MapEvent) -> usize {
        let kind = event.kind();
        let mut delivered = 0;
        for subscriber in self.subscribers.iter_mut().filter(|s| s.kinds.contains(&kind)) {
            subscriber.queue.push_back(event.clone());
            delivered += 1;
        }
        delivered
    }

    /// Take all pending events for a subscription, oldest first.
    pub fn drain(&mut self, id: SubscriptionId) -> Vec<MapEvent> {
        self.subscribers
            .iter_mut()
            .find(|s| s.id == id)
            .map(|s| s.queue.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn pending(&self, id: SubscriptionId) -> usize {
        self.subscribers
            .iter()
            .find(|s| s.id == id)
            .map_or(0, |s| s.queue.len())
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
