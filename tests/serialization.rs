use prong_uplink::{
    FidelityParams, FidelityParamsId, Histogram, HistogramSource, JsonSerialization, ProngCache,
    Serialization, SerializationBridge, SerializationError, TelemetryEvent,
};

#[test]
fn event_survives_json_bridge() {
    let mut builder = ProngCache::builder().buckets(4, 10);
    builder.record(0, 1, 5).record(0, 1, 15).record(2, 0, 999);
    let cache = builder.build();

    let mut event = TelemetryEvent::new(FidelityParamsId(12));
    cache.fill_histograms(&mut event);
    let encoded = JsonSerialization.encode_event(&event).unwrap();
    assert!(!encoded.is_empty());

    let decoded = JsonSerialization.decode_event(&encoded).unwrap();
    assert_eq!(decoded, event);
    assert_eq!(decoded.histograms.len(), 2);
}

#[test]
fn configuration_settings_are_preserved() {
    let params = FidelityParams::new(5u64)
        .with_setting("texture_quality", 2)
        .with_setting("shadow_cascades", 3);
    let encoded = JsonSerialization.encode_configuration(&params).unwrap();
    let decoded = JsonSerialization.decode_configuration(&encoded).unwrap();
    assert_eq!(decoded, params);
}

#[test]
fn decode_failure_names_the_payload_kind() {
    let err = JsonSerialization
        .decode_configuration(&Serialization::new(b"[1,2".to_vec()))
        .unwrap_err();
    assert!(matches!(err, SerializationError::Decode { what: "fidelity params", .. }));
    assert!(err.to_string().starts_with("failed to decode fidelity params"));
}

#[test]
fn serialization_debug_hides_payload() {
    let bytes = Serialization::from(vec![1, 2, 3]);
    assert_eq!(format!("{bytes:?}"), "Serialization(3 bytes)");
    assert_eq!(bytes.clone().into_bytes(), vec![1, 2, 3]);
    assert_eq!(Histogram::new(0, 0, vec![1, 2, 3]).total(), 6);
}
