// Browser-side checks for the JS-facing error paths.
// JsValue errors can only be built on wasm32, so these run under wasm-bindgen-test.
#![cfg(target_arch = "wasm32")]

use portfolio_core::Engine;
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn invalid_config_json_is_rejected() {
    let err = Engine::new("{not json").err().expect("config should be rejected");
    assert!(err.as_string().unwrap_or_default().contains("Invalid config"));
}

#[wasm_bindgen_test]
fn empty_carousel_is_rejected() {
    let err = Engine::new(r#"{"carousel":{"items":[]}}"#)
        .err()
        .expect("empty carousel should be rejected");
    assert!(err
        .as_string()
        .unwrap_or_default()
        .contains("at least one item"));
}

#[wasm_bindgen_test]
fn out_of_range_dot_is_skipped() {
    let mut engine = Engine::new("{}").expect("default config");
    let patches = engine
        .handle_events(
            r#"{"events":[{"timestamp_ms":0,"event_type":{"type":"DotClick","index":40}}]}"#,
        )
        .expect("bad index is skipped, not an error");
    assert_eq!(patches, "[]");
    assert_eq!(engine.current_index(), 3);
    assert!(engine.is_playing());
}

#[wasm_bindgen_test]
fn malformed_events_are_rejected() {
    let mut engine = Engine::new("{}").expect("default config");
    let err = engine
        .handle_events(r#"{"events":[{"timestamp":0}]}"#)
        .err()
        .expect("missing fields");
    assert!(err.as_string().unwrap_or_default().contains("Invalid events"));
}

#[wasm_bindgen_test]
fn tick_now_shares_the_tick_clock() {
    let mut engine = Engine::new("{}").expect("config");
    let patches = engine.tick_now().expect("tick");
    assert!(patches.starts_with('['));

    // A test page is far younger than ten minutes of performance.now(), so autoplay is due.
    engine.tick(600_000.0).expect("tick");
    assert_eq!(engine.current_index(), 4);
}
