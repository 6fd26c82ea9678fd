// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered endpoint candidates for operations whose endpoint name or payload
//! shape differs between firmware releases.
//!
//! Each table function returns the candidates in priority order. Supporting
//! a new firmware variant means adding an entry to a table; the control flow
//! in [`first_success`] stays the same.

use serde_json::{Value, json};

use crate::protocol::{Payload, Transport, extend, payload};
use crate::response::coerce::{as_int, as_map, is_truthy, non_empty_str};

/// One `(endpoint, payload)` attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Endpoint path below `/open/api/`.
    pub endpoint: &'static str,
    /// Business payload for this attempt.
    pub payload: Payload,
}

impl Candidate {
    /// Creates a candidate.
    #[must_use]
    pub fn new(endpoint: &'static str, payload: Payload) -> Self {
        Self { endpoint, payload }
    }
}

/// Sends candidates in order and returns the first result.
///
/// Stops at the first `Some`; returns `None` when every candidate fails.
pub async fn first_success<T: Transport>(transport: &T, candidates: &[Candidate]) -> Option<Value> {
    for (index, candidate) in candidates.iter().enumerate() {
        if let Some(result) = transport.send(candidate.endpoint, &candidate.payload).await {
            tracing::trace!(endpoint = candidate.endpoint, index, "Candidate accepted");
            return Some(result);
        }
        tracing::trace!(endpoint = candidate.endpoint, index, "Candidate failed");
    }
    None
}

// ============================================================================
// Audio reads
// ============================================================================

/// Audio detail reads. `base` is `{screenId, deviceId}`.
#[must_use]
pub fn audio_detail_reads(base: &Payload) -> Vec<Candidate> {
    vec![
        Candidate::new("audio/readDetail", base.clone()),
        Candidate::new("screen/readAudio", base.clone()),
        Candidate::new("audio/read", base.clone()),
    ]
}

/// Audio option list reads. `base` is `{screenId, deviceId}`.
#[must_use]
pub fn audio_list_reads(base: &Payload, device_id: i64) -> Vec<Candidate> {
    vec![
        Candidate::new("audio/readList", base.clone()),
        Candidate::new("audio/readAllList", payload(json!({"deviceId": device_id}))),
        Candidate::new("screen/readAudioList", base.clone()),
    ]
}

// ============================================================================
// Audio writes
// ============================================================================

/// Merges `overrides` into a copy of the screen's `audio` block.
fn merged_audio(screen_audio: Option<&Payload>, overrides: Value) -> Option<Payload> {
    screen_audio.map(|block| extend(block, overrides))
}

fn screen_write_detail(base: &Payload, audio: Payload) -> Candidate {
    Candidate::new(
        "screen/writeDetail",
        extend(base, json!({"audio": Value::Object(audio)})),
    )
}

/// Audio output selection writes.
///
/// The merged `screen/writeDetail` leads when the screen's `audio` block
/// could be read.
#[must_use]
pub fn audio_output_writes(
    base: &Payload,
    screen_audio: Option<&Payload>,
    output_id: i64,
) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(8);
    if let Some(audio) = merged_audio(screen_audio, json!({"outputChannelMode": output_id})) {
        candidates.push(screen_write_detail(base, audio));
    }
    candidates.extend([
        Candidate::new("audio/writeOutput", extend(base, json!({"audioOutputId": output_id}))),
        Candidate::new("audio/writeOutput", extend(base, json!({"outputId": output_id}))),
        Candidate::new(
            "audio/writeOutput",
            extend(base, json!({"outputChannelMode": output_id})),
        ),
        Candidate::new("screen/writeAudioOutput", extend(base, json!({"outputId": output_id}))),
        Candidate::new(
            "screen/writeAudioOutput",
            extend(base, json!({"outputChannelMode": output_id})),
        ),
        screen_write_detail(base, payload(json!({"outputChannelMode": output_id}))),
        Candidate::new("audio/write", extend(base, json!({"audioOutputId": output_id}))),
    ]);
    candidates
}

/// Audio volume writes; `volume` is already clamped to 0–100.
#[must_use]
pub fn audio_volume_writes(
    base: &Payload,
    screen_audio: Option<&Payload>,
    volume: u8,
) -> Vec<Candidate> {
    let levels = json!({"volume": volume, "outputVolume": volume});
    let mut candidates = Vec::with_capacity(5);
    if let Some(audio) = merged_audio(screen_audio, levels.clone()) {
        candidates.push(screen_write_detail(base, audio));
    }
    candidates.extend([
        Candidate::new("audio/writeVolume", extend(base, json!({"volume": volume}))),
        Candidate::new("screen/writeVolume", extend(base, json!({"volume": volume}))),
        screen_write_detail(base, payload(levels)),
        Candidate::new("audio/write", extend(base, json!({"volume": volume}))),
    ]);
    candidates
}

/// Screen-level audio input writes.
///
/// `target` is the routed input id. `slot_id` and `interface_type` come from
/// the layer's source when known.
#[must_use]
pub fn audio_input_writes(
    base: &Payload,
    screen_audio: Option<&Payload>,
    target: i64,
    slot_id: Option<i64>,
    interface_type: Option<i64>,
) -> Vec<Candidate> {
    let mut routed = extend(base, json!({"inputId": target}));
    if let Some(slot_id) = slot_id {
        routed.insert("slotId".into(), json!(slot_id));
    }
    if let Some(interface_type) = interface_type {
        routed.insert("interfaceType".into(), json!(interface_type));
    }

    let mut candidates = Vec::with_capacity(6);
    let overrides = json!({
        "inputChannelMode": target,
        "inputId": target,
        "audioInputId": target,
    });
    if let Some(audio) = merged_audio(screen_audio, overrides) {
        candidates.push(screen_write_detail(base, audio));
    }
    candidates.extend([
        Candidate::new("audio/writeInput", extend(base, json!({"audioInputId": target}))),
        Candidate::new("audio/writeInput", routed),
        Candidate::new("audio/writeInput", extend(base, json!({"inputChannelMode": target}))),
        Candidate::new("screen/writeAudioInput", extend(base, json!({"inputId": target}))),
        Candidate::new(
            "screen/writeAudioInput",
            extend(base, json!({"inputChannelMode": target})),
        ),
    ]);
    candidates
}

// ============================================================================
// Layer audio open/close
// ============================================================================

/// Everything needed to build the open/close candidates for one layer.
#[derive(Debug, Clone)]
pub struct LayerOpenWrite<'a> {
    /// `{screenId, deviceId, layerId}`.
    pub base: Payload,
    /// The layer being written.
    pub layer_id: i64,
    /// The layer's `general` record.
    pub general: &'a Payload,
    /// The layer's current `audioStatus` record.
    pub audio_status: &'a Payload,
    /// A fresh `layer/readDetail` result, when available.
    pub detail: Option<&'a Payload>,
    /// The cached layer's `window`, used only without `detail`.
    pub window: Option<&'a Payload>,
    /// The cached layer's `source`, used only without `detail`.
    pub source: Option<&'a Payload>,
    /// Desired open state.
    pub open: bool,
}

/// Candidates that set one layer's `audioStatus.isOpen`.
///
/// Flat `layer/writeGeneral` variants come first, then nested ones, then
/// `layer/writeDetail` and finally `layer/writeAudioStatus`.
#[must_use]
pub fn layer_open_writes(write: &LayerOpenWrite<'_>) -> Vec<Candidate> {
    let open_flag = i64::from(write.open);
    let status_int = Value::Object(extend(write.audio_status, json!({"isOpen": open_flag})));
    let status_bool = Value::Object(extend(write.audio_status, json!({"isOpen": write.open})));
    let base = &write.base;
    let general = write.general;

    let name = general
        .get("name")
        .filter(|v| non_empty_str(v).is_some())
        .cloned()
        .unwrap_or_else(|| json!(format!("Layer {}", write.layer_id)));
    let int_or_zero = |key: &str| general.get(key).and_then(as_int).unwrap_or(0);
    let flag = |key: &str| general.get(key).is_some_and(is_truthy);

    let mut flat = extend(
        base,
        json!({
            "name": name,
            "sizeType": int_or_zero("sizeType"),
            "type": int_or_zero("type"),
            "zorder": int_or_zero("zorder"),
            "isBackground": flag("isBackground"),
            "isFreeze": flag("isFreeze"),
            "flipType": int_or_zero("flipType"),
            "audioStatus": status_int.clone(),
        }),
    );
    if let Some(lock) = general.get("lock").and_then(as_int) {
        flat.insert("lock".into(), json!(lock));
    }
    let reverse_control = write
        .detail
        .and_then(|d| d.get("reverseControl"))
        .filter(|v| v.is_object());
    if let Some(reverse) = reverse_control {
        flat.insert("reverseControl".into(), reverse.clone());
    }

    let nested_general = |status: &Value| {
        Value::Object(extend(general, json!({"audioStatus": status.clone()})))
    };

    let mut detail_flat = extend(
        base,
        json!({"general": Value::Object(general.clone()), "audioStatus": status_int.clone()}),
    );
    let mut detail_nested = extend(base, json!({"general": nested_general(&status_int)}));
    let (window, source) = match write.detail {
        Some(detail) => (
            detail.get("window").and_then(as_map),
            detail.get("source").and_then(as_map),
        ),
        None => (write.window, write.source),
    };
    for (key, value) in [("window", window), ("source", source)] {
        if let Some(value) = value {
            detail_flat.insert(key.into(), Value::Object(value.clone()));
            detail_nested.insert(key.into(), Value::Object(value.clone()));
        }
    }
    if let Some(reverse) = reverse_control {
        detail_flat.insert("reverseControl".into(), reverse.clone());
        detail_nested.insert("reverseControl".into(), reverse.clone());
    }

    vec![
        Candidate::new("layer/writeGeneral", flat.clone()),
        Candidate::new("layer/writeGeneral", extend(&flat, json!({"isOpen": open_flag}))),
        Candidate::new(
            "layer/writeGeneral",
            extend(&flat, json!({"audioStatus": status_bool.clone()})),
        ),
        Candidate::new(
            "layer/writeGeneral",
            extend(base, json!({"general": nested_general(&status_int)})),
        ),
        Candidate::new(
            "layer/writeGeneral",
            extend(base, json!({"general": nested_general(&status_bool)})),
        ),
        Candidate::new("layer/writeDetail", detail_flat.clone()),
        Candidate::new("layer/writeDetail", detail_nested),
        Candidate::new(
            "layer/writeDetail",
            extend(&detail_flat, json!({"audioStatus": status_bool.clone()})),
        ),
        Candidate::new(
            "layer/writeDetail",
            extend(&detail_flat, json!({"audio": {"isOpen": open_flag}})),
        ),
        Candidate::new("layer/writeAudioStatus", extend(base, json!({"audioStatus": status_int}))),
        Candidate::new("layer/writeAudioStatus", extend(base, json!({"audioStatus": status_bool}))),
        Candidate::new("layer/writeAudioStatus", extend(base, json!({"isOpen": open_flag}))),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::mock::MockTransport;

    fn base() -> Payload {
        payload(json!({"screenId": 0, "deviceId": 0}))
    }

    #[tokio::test]
    async fn first_success_stops_at_first_result() {
        let transport = MockTransport::new(|endpoint, _| {
            (endpoint == "screen/readAudio").then(|| json!({"volume": 40}))
        });

        let result = first_success(&transport, &audio_detail_reads(&base())).await;

        assert_eq!(result, Some(json!({"volume": 40})));
        assert_eq!(transport.endpoints(), ["audio/readDetail", "screen/readAudio"]);
    }

    #[tokio::test]
    async fn first_success_exhausts_candidates() {
        let transport = MockTransport::offline();
        let result = first_success(&transport, &audio_list_reads(&base(), 3)).await;

        assert!(result.is_none());
        assert_eq!(transport.count("audio/readAllList"), 1);
        assert_eq!(transport.calls_to("audio/readAllList")[0], payload(json!({"deviceId": 3})));
    }

    #[tokio::test]
    async fn empty_table_yields_none() {
        let transport = MockTransport::new(|_, _| Some(json!({})));
        assert!(first_success(&transport, &[]).await.is_none());
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn output_table_without_screen_block() {
        let table = audio_output_writes(&base(), None, 2);
        let endpoints: Vec<_> = table.iter().map(|c| c.endpoint).collect();
        assert_eq!(
            endpoints,
            [
                "audio/writeOutput",
                "audio/writeOutput",
                "audio/writeOutput",
                "screen/writeAudioOutput",
                "screen/writeAudioOutput",
                "screen/writeDetail",
                "audio/write",
            ]
        );
        assert_eq!(table[0].payload["audioOutputId"], json!(2));
        assert_eq!(table[5].payload["audio"], json!({"outputChannelMode": 2}));
    }

    #[test]
    fn output_table_merges_screen_block() {
        let block = payload(json!({"volume": 30, "outputChannelMode": 0}));
        let table = audio_output_writes(&base(), Some(&block), 1);

        assert_eq!(table.len(), 8);
        assert_eq!(table[0].endpoint, "screen/writeDetail");
        assert_eq!(table[0].payload["audio"], json!({"volume": 30, "outputChannelMode": 1}));
    }

    #[test]
    fn volume_table_sets_both_levels() {
        let block = payload(json!({"mute": 0}));
        let table = audio_volume_writes(&base(), Some(&block), 55);

        assert_eq!(table.len(), 5);
        assert_eq!(
            table[0].payload["audio"],
            json!({"mute": 0, "volume": 55, "outputVolume": 55})
        );
        assert_eq!(table[1].endpoint, "audio/writeVolume");
        assert_eq!(table[3].payload["audio"], json!({"volume": 55, "outputVolume": 55}));
    }

    #[test]
    fn input_table_routes_source() {
        let table = audio_input_writes(&base(), None, 4, Some(1), None);

        assert_eq!(table.len(), 5);
        assert_eq!(table[1].payload, payload(json!({
            "screenId": 0, "deviceId": 0, "inputId": 4, "slotId": 1,
        })));
        assert_eq!(table[4].endpoint, "screen/writeAudioInput");
        assert_eq!(table[4].payload["inputChannelMode"], json!(4));
    }

    #[test]
    fn layer_table_order_and_shapes() {
        let general = payload(json!({"name": "Main", "zorder": 2, "isFreeze": 0, "lock": 1}));
        let status = payload(json!({"isAvailable": 1, "isOpen": 0}));
        let detail = payload(json!({
            "general": general.clone(),
            "window": {"x": 0, "y": 0},
            "reverseControl": {"enable": 0},
        }));
        let write = LayerOpenWrite {
            base: extend(&base(), json!({"layerId": 3})),
            layer_id: 3,
            general: &general,
            audio_status: &status,
            detail: Some(&detail),
            window: None,
            source: None,
            open: true,
        };

        let table = layer_open_writes(&write);
        let endpoints: Vec<_> = table.iter().map(|c| c.endpoint).collect();
        assert_eq!(
            endpoints,
            [
                "layer/writeGeneral",
                "layer/writeGeneral",
                "layer/writeGeneral",
                "layer/writeGeneral",
                "layer/writeGeneral",
                "layer/writeDetail",
                "layer/writeDetail",
                "layer/writeDetail",
                "layer/writeDetail",
                "layer/writeAudioStatus",
                "layer/writeAudioStatus",
                "layer/writeAudioStatus",
            ]
        );

        let flat = &table[0].payload;
        assert_eq!(flat["name"], json!("Main"));
        assert_eq!(flat["zorder"], json!(2));
        assert_eq!(flat["sizeType"], json!(0));
        assert_eq!(flat["isFreeze"], json!(false));
        assert_eq!(flat["lock"], json!(1));
        assert_eq!(flat["reverseControl"], json!({"enable": 0}));
        assert_eq!(flat["audioStatus"], json!({"isAvailable": 1, "isOpen": 1}));

        assert_eq!(table[1].payload["isOpen"], json!(1));
        assert_eq!(table[2].payload["audioStatus"]["isOpen"], json!(true));
        assert_eq!(table[4].payload["general"]["audioStatus"]["isOpen"], json!(true));
        assert_eq!(table[5].payload["window"], json!({"x": 0, "y": 0}));
        assert!(table[5].payload.get("source").is_none());
        assert_eq!(table[8].payload["audio"], json!({"isOpen": 1}));
        assert_eq!(table[11].payload, payload(json!({
            "screenId": 0, "deviceId": 0, "layerId": 3, "isOpen": 1,
        })));
    }

    #[test]
    fn layer_table_falls_back_to_cached_geometry() {
        let general = payload(json!({"name": "  "}));
        let status = payload(json!({"isAvailable": 1, "isOpen": 1}));
        let source = payload(json!({"inputId": 2}));
        let write = LayerOpenWrite {
            base: extend(&base(), json!({"layerId": 9})),
            layer_id: 9,
            general: &general,
            audio_status: &status,
            detail: None,
            window: None,
            source: Some(&source),
            open: false,
        };

        let table = layer_open_writes(&write);
        assert_eq!(table[0].payload["name"], json!("Layer 9"));
        assert_eq!(table[0].payload["audioStatus"]["isOpen"], json!(0));
        assert!(table[0].payload.get("reverseControl").is_none());
        assert_eq!(table[5].payload["source"], json!({"inputId": 2}));
    }
}
