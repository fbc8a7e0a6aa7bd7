//! "Load more" pagination on top of the polled events list.

use std::collections::HashSet;

use tracing::debug;

use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::types::EventRecord;

/// Display identity of an event.
///
/// The request id when present, otherwise a composite of timestamp, type,
/// key, lease id, result hash and error code.
pub fn event_key(event: &EventRecord) -> String {
    if let Some(req_id) = event.req_id.as_deref().filter(|id| !id.is_empty()) {
        return format!("req:{}", req_id);
    }

    format!(
        "{}|{}|{}|{}|{}|{}",
        event.ts.as_ref().map(|t| t.to_string()).unwrap_or_default(),
        event.kind,
        event.key.as_deref().unwrap_or_default(),
        event.lease_id.as_deref().unwrap_or_default(),
        event.result_hash.as_deref().unwrap_or_default(),
        event.error_code.as_deref().unwrap_or_default(),
    )
}

/// `base` followed by `extra`, keeping only the first entry for each [`event_key`].
pub fn merge_events(base: &[EventRecord], extra: &[EventRecord]) -> Vec<EventRecord> {
    let mut seen = HashSet::with_capacity(base.len() + extra.len());
    base.iter()
        .chain(extra)
        .filter(|e| seen.insert(event_key(e)))
        .cloned()
        .collect()
}

/// Older pages accumulated below the polled base list.
#[derive(Debug)]
pub struct EventFeed {
    client: ApiClient,
    limit: u32,
    loaded: Vec<EventRecord>,
    fetched: usize,
    has_more: bool,
}

impl EventFeed {
    pub fn new(client: ApiClient, limit: u32) -> Self {
        Self {
            client,
            limit,
            loaded: Vec::new(),
            fetched: 0,
            has_more: true,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// False once a page (the base page included) came back shorter than `limit`.
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn loaded(&self) -> &[EventRecord] {
        &self.loaded
    }

    /// Fetch the page after `base_len` polled items plus everything loaded so far.
    ///
    /// Returns the number of items received. Does nothing once exhausted.
    pub async fn load_more(&mut self, base_len: usize) -> ClientResult<usize> {
        if !self.has_more {
            return Ok(0);
        }
        if self.fetched == 0 && base_len < self.limit as usize {
            debug!(base_len, limit = self.limit, "short base page, nothing older");
            self.has_more = false;
            return Ok(0);
        }

        let offset = base_len + self.fetched;
        let page = self.client.events(self.limit, Some(offset)).await?;
        let received = page.len();

        if received < self.limit as usize {
            self.has_more = false;
        }
        debug!(offset, received, has_more = self.has_more, "loaded older events");

        self.fetched += received;
        self.loaded.extend(page);
        Ok(received)
    }

    /// Base list merged with the loaded pages, de-duplicated.
    pub fn merged(&self, base: &[EventRecord]) -> Vec<EventRecord> {
        merge_events(base, &self.loaded)
    }

    /// Forget loaded pages (e.g. after the page size changed).
    pub fn reset(&mut self, limit: u32) {
        self.limit = limit;
        self.loaded.clear();
        self.fetched = 0;
        self.has_more = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventTimestamp;
    use proptest::prelude::*;

    fn event(kind: &str, ts: f64, req_id: Option<&str>) -> EventRecord {
        EventRecord {
            kind: kind.to_string(),
            ts: Some(EventTimestamp::Epoch(ts)),
            first_seen_at: None,
            done_at: None,
            key: Some("order-1".to_string()),
            req_id: req_id.map(String::from),
            lease_id: None,
            error_code: None,
            result_hash: None,
            charged: None,
        }
    }

    #[test]
    fn test_key_prefers_request_id() {
        let a = event("duplicate", 1.0, Some("req-1"));
        let b = event("locked", 2.0, Some("req-1"));
        assert_eq!(event_key(&a), event_key(&b));
    }

    #[test]
    fn test_key_composite_without_request_id() {
        let a = event("duplicate", 1.0, None);
        let mut b = a.clone();
        assert_eq!(event_key(&a), event_key(&b));

        b.lease_id = Some("lease-9".into());
        assert_ne!(event_key(&a), event_key(&b));
    }

    #[test]
    fn test_empty_request_id_falls_back() {
        let a = event("duplicate", 1.0, Some(""));
        let b = event("locked", 1.0, Some(""));
        assert_ne!(event_key(&a), event_key(&b));
    }

    #[test]
    fn test_merge_drops_overlap_across_pages() {
        let base = vec![event("locked", 3.0, Some("r3")), event("locked", 2.0, Some("r2"))];
        let extra = vec![event("locked", 2.0, Some("r2")), event("locked", 1.0, Some("r1"))];

        let merged = merge_events(&base, &extra);
        let ids: Vec<_> = merged.iter().filter_map(|e| e.req_id.clone()).collect();
        assert_eq!(ids, vec!["r3", "r2", "r1"]);
    }

    fn arb_event() -> impl Strategy<Value = EventRecord> {
        (
            prop::sample::select(vec!["duplicate", "locked", "ai_acquired"]),
            0u8..4,
            prop::option::of(prop::sample::select(vec!["r1", "r2", "r3"])),
            prop::option::of(prop::sample::select(vec!["l1", "l2"])),
        )
            .prop_map(|(kind, ts, req, lease)| {
                let mut e = event(kind, f64::from(ts), req);
                e.lease_id = lease.map(String::from);
                e
            })
    }

    proptest! {
        #[test]
        fn prop_merged_keys_are_unique(
            base in prop::collection::vec(arb_event(), 0..20),
            extra in prop::collection::vec(arb_event(), 0..20),
        ) {
            let merged = merge_events(&base, &extra);
            let mut keys = HashSet::new();
            for e in &merged {
                prop_assert!(keys.insert(event_key(e)));
            }

            let all: HashSet<_> = base.iter().chain(&extra).map(event_key).collect();
            prop_assert_eq!(keys, all);
        }
    }
}
