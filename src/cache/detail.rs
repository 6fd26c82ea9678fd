// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Signature-based detail cache for inputs and layers.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::marker::PhantomData;

use serde_json::{Map, Value};

use crate::protocol::Payload;
use crate::response::coerce::as_int;
use crate::response::{Input, Layer};

/// Number of list reads between unconditional detail refreshes.
pub const DEFAULT_REFRESH_INTERVAL: u32 = 12;

/// An entity whose list entry may be enriched by a per-id detail read.
pub trait CacheEntry: Sized {
    /// Key holding the id in list and detail records.
    const ID_KEY: &'static str;
    /// Name used in log fields.
    const KIND: &'static str;
    /// List-level keys copied as-is into the signature.
    const SCALAR_KEYS: &'static [&'static str];
    /// List-level keys normalized to a mapping (`{}` when not a mapping).
    const MAP_KEYS: &'static [&'static str];

    /// Builds the typed record from a merged mapping.
    fn from_record(record: Payload) -> Option<Self>;

    /// The entity id.
    fn id(&self) -> i64;

    /// Deterministic digest of the list-level fields.
    fn signature(entry: &Payload) -> String {
        let mut digest = Map::new();
        for key in Self::SCALAR_KEYS {
            let value = entry.get(*key).cloned().unwrap_or(Value::Null);
            digest.insert((*key).to_string(), value);
        }
        for key in Self::MAP_KEYS {
            let value = entry
                .get(*key)
                .filter(|v| v.is_object())
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()));
            digest.insert((*key).to_string(), value);
        }
        // serde_json maps are ordered, so nested keys serialize sorted.
        Value::Object(digest).to_string()
    }
}

impl CacheEntry for Input {
    const ID_KEY: &'static str = "inputId";
    const KIND: &'static str = "input";
    const SCALAR_KEYS: &'static [&'static str] = &["online", "isUsed", "iSignal", "interfaceType"];
    const MAP_KEYS: &'static [&'static str] = &["resolution", "timing", "general"];

    fn from_record(record: Payload) -> Option<Self> {
        Input::from_record(record)
    }

    fn id(&self) -> i64 {
        self.input_id
    }
}

impl CacheEntry for Layer {
    const ID_KEY: &'static str = "layerId";
    const KIND: &'static str = "layer";
    const SCALAR_KEYS: &'static [&'static str] = &["layerId"];
    const MAP_KEYS: &'static [&'static str] = &["general", "window", "source", "audioStatus"];

    fn from_record(record: Payload) -> Option<Self> {
        Layer::from_record(record)
    }

    fn id(&self) -> i64 {
        self.layer_id
    }
}

/// Per-collection detail cache.
///
/// A detail read happens for an entry when its list-level signature changed,
/// on every `refresh_interval`-th list read, or once after
/// [`force_refresh`](Self::force_refresh). Cached details are merged under
/// the list entry: list fields win and detail only supplies extra keys.
#[derive(Debug)]
pub struct DetailCache<E> {
    details: HashMap<i64, Payload>,
    signatures: HashMap<i64, String>,
    refresh_counter: u64,
    force_refresh: bool,
    refresh_interval: u64,
    _entry: PhantomData<fn() -> E>,
}

impl<E: CacheEntry> Default for DetailCache<E> {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}

impl<E: CacheEntry> DetailCache<E> {
    /// Creates an empty cache. An interval of zero is treated as one.
    #[must_use]
    pub fn new(refresh_interval: u32) -> Self {
        Self {
            details: HashMap::new(),
            signatures: HashMap::new(),
            refresh_counter: 0,
            force_refresh: false,
            refresh_interval: u64::from(refresh_interval.max(1)),
            _entry: PhantomData,
        }
    }

    /// Requests a detail read for every entry on the next refresh.
    pub fn force_refresh(&mut self) {
        self.force_refresh = true;
    }

    /// Returns whether a forced refresh is pending.
    #[must_use]
    pub fn is_force_pending(&self) -> bool {
        self.force_refresh
    }

    /// Number of non-empty list reads so far.
    #[must_use]
    pub fn refresh_counter(&self) -> u64 {
        self.refresh_counter
    }

    /// Ids with a cached detail, ascending.
    #[must_use]
    pub fn cached_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.details.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// The cached detail for `id`.
    #[must_use]
    pub fn detail(&self, id: i64) -> Option<&Payload> {
        self.details.get(&id)
    }

    /// Merges a list read with cached details, fetching details as needed.
    ///
    /// An empty list returns an empty result and leaves the cache untouched.
    /// A failed detail read keeps the previous detail and signature.
    pub async fn refresh<F, Fut>(&mut self, entries: Vec<Payload>, mut fetch_detail: F) -> Vec<E>
    where
        F: FnMut(i64) -> Fut,
        Fut: Future<Output = Option<Payload>>,
    {
        if entries.is_empty() {
            return Vec::new();
        }

        let force = std::mem::take(&mut self.force_refresh);
        self.refresh_counter += 1;
        let periodic = self.refresh_counter % self.refresh_interval == 0;

        let mut seen = HashSet::with_capacity(entries.len());
        let mut merged = Vec::with_capacity(entries.len());
        let mut fetched = 0usize;

        for entry in entries {
            let Some(id) = entry.get(E::ID_KEY).and_then(as_int) else {
                tracing::debug!(kind = E::KIND, "Dropping list entry without id");
                continue;
            };
            seen.insert(id);

            let signature = E::signature(&entry);
            let changed = self.signatures.get(&id) != Some(&signature);
            if force || periodic || changed {
                match fetch_detail(id).await {
                    Some(detail) if !detail.is_empty() => {
                        fetched += 1;
                        self.details.insert(id, detail);
                        self.signatures.insert(id, signature);
                    }
                    _ => tracing::debug!(kind = E::KIND, id, "Detail read failed, keeping cache"),
                }
            }

            let mut record = self.details.get(&id).cloned().unwrap_or_default();
            record.extend(entry);
            if let Some(parsed) = E::from_record(record) {
                merged.push(parsed);
            }
        }

        self.details.retain(|id, _| seen.contains(id));
        self.signatures.retain(|id, _| seen.contains(id));
        merged.sort_by_key(E::id);

        tracing::debug!(
            kind = E::KIND,
            entries = merged.len(),
            fetched,
            periodic,
            force,
            "Detail cache refreshed"
        );
        merged
    }
}
