// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Acquisition event bus: typed events from every aggregation cycle.
//!
//! The EventBus is a `tokio::sync::broadcast` channel that carries
//! [`RateEvent`] values. A CLI progress printer, a log shipper or a UI can
//! subscribe independently. When no subscribers exist, events are dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Every event the pipeline emits. Serialized to JSON for log streaming.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RateEvent {
    // ── Aggregation ───────────────────────
    /// A refresh cycle started.
    AggregateStarted {
        institutions: usize,
        forced: bool,
        timestamp: String,
    },
    /// The cached snapshot was fresh; nothing was fetched.
    CacheHit { age_ms: u64 },
    /// An institution was left out of dispatch (empty selection).
    InstitutionSkipped { institution: String },
    /// An institution finished with rates (possibly zero after filtering).
    InstitutionFetched {
        institution: String,
        strategy: String,
        quotes: usize,
        elapsed_ms: u64,
    },
    /// An institution failed and contributes nothing.
    InstitutionFailed {
        institution: String,
        kind: String,
        error: String,
        elapsed_ms: u64,
    },
    /// A new snapshot replaced the previous one.
    SnapshotPublished {
        institutions: usize,
        quotes: usize,
        total_ms: u64,
    },

    // ── History ───────────────────────────
    /// Canonical-source rows were appended to the history store.
    HistoryRecorded { records: usize, timestamp: String },
}

/// The central event bus.
pub struct EventBus {
    sender: broadcast::Sender<RateEvent>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers. Silently ignores if no subscribers.
    pub fn emit(&self, event: RateEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<RateEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Check if an event concerns a specific institution.
pub fn event_matches_institution(event: &RateEvent, name: &str) -> bool {
    match event {
        RateEvent::InstitutionSkipped { institution, .. }
        | RateEvent::InstitutionFetched { institution, .. }
        | RateEvent::InstitutionFailed { institution, .. } => institution == name,
        // Cycle-wide events reach every subscriber
        RateEvent::AggregateStarted { .. }
        | RateEvent::CacheHit { .. }
        | RateEvent::SnapshotPublished { .. }
        | RateEvent::HistoryRecorded { .. } => true,
    }
}

/// RFC 3339 timestamp for the current time.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = RateEvent::InstitutionFailed {
            institution: "Chase".to_string(),
            kind: "navigation_timeout".to_string(),
            error: "Navigation timed out after 20000ms".to_string(),
            elapsed_ms: 20004,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"InstitutionFailed""#));
        assert!(json.contains("navigation_timeout"));

        let parsed: RateEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_event_bus_emit_no_subscribers() {
        let bus = EventBus::new(16);
        bus.emit(RateEvent::CacheHit { age_ms: 12 });
    }

    #[test]
    fn test_event_bus_subscribe_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(RateEvent::InstitutionSkipped {
            institution: "Citi".to_string(),
        });

        match rx.try_recv().unwrap() {
            RateEvent::InstitutionSkipped { institution } => assert_eq!(institution, "Citi"),
            other => panic!("wrong event: {other:?}"),
        }
    }

    #[test]
    fn test_event_matches_institution() {
        let event = RateEvent::InstitutionFetched {
            institution: "Citi".to_string(),
            strategy: "table".to_string(),
            quotes: 2,
            elapsed_ms: 0,
        };
        assert!(event_matches_institution(&event, "Citi"));
        assert!(!event_matches_institution(&event, "Chase"));

        let cycle = RateEvent::SnapshotPublished {
            institutions: 1,
            quotes: 2,
            total_ms: 5,
        };
        assert!(event_matches_institution(&cycle, "anything"));
    }

    #[test]
    fn test_now_timestamp_is_rfc3339() {
        let ts = now_timestamp();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
