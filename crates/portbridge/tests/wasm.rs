//! WASM browser tests - run with `wasm-pack test --headless --chrome crates/portbridge`

#![cfg(target_arch = "wasm32")]

use js_sys::{Array, Function, Reflect, JSON};
use portbridge::{
    Bridge, BridgeConfig, BrowserDocument, BrowserHost, DocumentLifecycle, ImageLoader,
    ImagePreloader, InboundMessage, LocalStorage, PortBridge, Storage, StorageExt,
    UploadError, UploadRequest, Uploader, XhrUploader,
};
use serde_json::{json, Value};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window()
        .expect("window")
        .document()
        .expect("document")
}

fn get(target: &JsValue, key: &str) -> JsValue {
    Reflect::get(target, &JsValue::from_str(key)).expect(key)
}

fn attach_form(id: &str) -> web_sys::Element {
    let doc = document();
    let form = doc.create_element("form").expect("form");
    form.set_id(id);
    form.set_inner_html(r#"<input name="note" value="hello">"#);
    doc.body().expect("body").append_child(&form).expect("append");
    form
}

/// Let queued tasks and the inbound pump run.
async fn next_tick() {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .expect("window")
            .set_timeout_with_callback(&resolve)
            .expect("timeout");
    });
    JsFuture::from(promise).await.expect("tick");
}

// ============================================================================
// LocalStorage
// ============================================================================

#[wasm_bindgen_test]
fn test_local_storage_roundtrip() {
    let storage = LocalStorage::new();
    storage.set_json("pb-test", &json!({"a": [1, 2]})).expect("set");
    let loaded: Option<Value> = storage.get_json("pb-test").expect("get");
    assert_eq!(loaded, Some(json!({"a": [1, 2]})));
    storage.remove("pb-test").expect("remove");
    assert_eq!(storage.get("pb-test").expect("get"), None);
}

#[wasm_bindgen_test]
fn test_local_storage_invalid_json_reads_as_none() {
    let storage = LocalStorage::new();
    storage.set("pb-broken", "{nope").expect("set");
    let loaded: Option<Value> = storage.get_json("pb-broken").expect("get");
    assert_eq!(loaded, None);
    storage.remove("pb-broken").expect("remove");
}

// ============================================================================
// Document
// ============================================================================

#[wasm_bindgen_test]
fn test_document_ready_fires_when_already_complete() {
    let doc = BrowserDocument::new().expect("document");
    if !doc.ready_state().is_complete() {
        return;
    }
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    doc.on_ready(Box::new(move || h.set(h.get() + 1)));
    assert_eq!(hits.get(), 1);
}

#[wasm_bindgen_test]
fn test_document_ignores_readystatechange_before_complete() {
    let fresh = document()
        .implementation()
        .expect("implementation")
        .create_html_document()
        .expect("document");
    // open() puts the document back into the loading state.
    fresh.open().expect("open");

    let doc = BrowserDocument::from_document(fresh.clone());
    if doc.ready_state().is_complete() {
        return;
    }
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    doc.on_ready(Box::new(move || h.set(h.get() + 1)));

    let event = web_sys::Event::new("readystatechange").expect("event");
    fresh.dispatch_event(&event).expect("dispatch");
    assert_eq!(hits.get(), 0);
}

// ============================================================================
// Images
// ============================================================================

#[wasm_bindgen_test]
fn test_preload_does_not_panic() {
    let loader = ImagePreloader::new();
    loader.preload("data:image/gif;base64,R0lGODlhAQABAAAAACw=");
}

// ============================================================================
// Upload setup faults
// ============================================================================

#[wasm_bindgen_test]
fn test_upload_missing_form() {
    let err = XhrUploader::new()
        .upload(&UploadRequest::new("/api/upload", "pb-no-such-form", "xyz"))
        .err()
        .expect("setup fault");
    assert_eq!(err, UploadError::FormNotFound("pb-no-such-form".to_string()));
}

#[wasm_bindgen_test]
fn test_upload_element_is_not_a_form() {
    let doc = document();
    let div = doc.create_element("div").expect("div");
    div.set_id("pb-not-a-form");
    doc.body().expect("body").append_child(&div).expect("append");

    let err = XhrUploader::new()
        .upload(&UploadRequest::new("/api/upload", "pb-not-a-form", "xyz"))
        .err()
        .expect("setup fault");
    assert_eq!(err, UploadError::NotAForm("pb-not-a-form".to_string()));
    div.remove();
}

// ============================================================================
// Upload over XMLHttpRequest
// ============================================================================

#[wasm_bindgen_test]
async fn test_upload_resolves_with_body_for_error_status() {
    let form = attach_form("pb-upload-form");
    let outcome = XhrUploader::new()
        .upload(&UploadRequest::new("/pb-no-such-endpoint", "pb-upload-form", "xyz"))
        .expect("upload started")
        .await;
    assert!(outcome.is_ok(), "a 4xx response is still a response: {outcome:?}");
    form.remove();
}

#[wasm_bindgen_test]
async fn test_bridge_upload_sends_status() {
    let form = attach_form("pb-bridge-form");
    let host = BrowserHost::new().expect("host");
    let (bridge, mut inbound) = Bridge::new(host, BridgeConfig::default());
    let task = bridge
        .dispatch_port("upload", json!(["/pb-no-such-endpoint", "pb-bridge-form", "xyz"]))
        .expect("dispatch")
        .into_task()
        .expect("pending upload");
    task.await;
    assert!(matches!(
        inbound.try_next().ok().flatten(),
        Some(InboundMessage::UploadStatus(_))
    ));
    form.remove();
}

// ============================================================================
// Bridge over the browser host
// ============================================================================

#[wasm_bindgen_test]
fn test_startup_flags_from_local_storage() {
    LocalStorage::new()
        .set("token", r#"{"token":"abc123"}"#)
        .expect("set");

    let host = BrowserHost::new().expect("host");
    let (bridge, _inbound) = Bridge::new(host, BridgeConfig::default());
    let flags = bridge.startup_flags().expect("flags");
    assert_eq!(flags.token, "abc123");
    assert!(flags.time > 0);

    LocalStorage::new().remove("token").expect("remove");
}

#[wasm_bindgen_test]
fn test_upload_missing_form_reports_failure() {
    let host = BrowserHost::new().expect("host");
    let (bridge, mut inbound) = Bridge::new(host, BridgeConfig::default());
    let effect = bridge
        .dispatch_port("upload", json!(["/api/upload", "pb-missing", "xyz"]))
        .expect("dispatch");
    assert!(effect.is_done());
    assert_eq!(
        inbound.try_next().ok().flatten(),
        Some(InboundMessage::UploadFailed(
            "form element 'pb-missing' not found".to_string()
        ))
    );
}

// ============================================================================
// JS entry point
// ============================================================================

const FAKE_APP: &str = r#"
    const outbound = () => ({ handlers: [], subscribe(f) { this.handlers.push(f); } });
    const inbound = () => ({ sent: [], send(v) { this.sent.push(v); } });
    return {
        flags,
        ports: {
            set: outbound(),
            remove: outbound(),
            clear: outbound(),
            preload: outbound(),
            upload: outbound(),
            domLoaded: inbound(),
            status: inbound(),
            uploadFailed: inbound(),
        },
    };
"#;

// Booting is once per page, so the whole entry point is covered here.
#[wasm_bindgen_test]
async fn test_boot_wires_ports_once() {
    LocalStorage::new()
        .set("token", r#"{"token":"boot-token"}"#)
        .expect("set");
    let global = JsValue::from(js_sys::global());

    // A rejected config leaves the page bootable.
    let never_called = Function::new_with_args("flags", "globalThis.pbBadBoot = true; return {};");
    let bad_config = JSON::parse(r#"{"reportUploadFailures":"yes"}"#).expect("json");
    assert!(PortBridge::boot(&never_called, bad_config).is_err());
    assert!(get(&global, "pbBadBoot").is_undefined());

    let init = Function::new_with_args("flags", FAKE_APP);
    let bridge = PortBridge::boot(&init, JsValue::UNDEFINED).expect("boot");
    let app = bridge.app();
    let flags = get(&app, "flags");
    assert_eq!(get(&flags, "token").as_string().as_deref(), Some("boot-token"));
    assert!(get(&flags, "time").as_f64().unwrap_or_default() > 0.0);
    let exported = bridge.flags().expect("flags");
    assert_eq!(get(&exported, "token").as_string().as_deref(), Some("boot-token"));

    // Outbound: the handler the app subscribed dispatches to storage.
    let ports = get(&app, "ports");
    let handlers = get(&get(&ports, "set"), "handlers")
        .dyn_into::<Array>()
        .expect("handlers");
    assert_eq!(handlers.length(), 1);
    let set = handlers.get(0).dyn_into::<Function>().expect("handler");
    let payload = JSON::parse(r#"["pb-boot-key", {"v": 1}]"#).expect("json");
    set.call1(&JsValue::NULL, &payload).expect("set");
    assert_eq!(
        LocalStorage::new().get("pb-boot-key").expect("get"),
        Some(r#"{"v":1}"#.to_string())
    );
    assert_eq!(get(&bridge.read("pb-boot-key").expect("read"), "v").as_f64(), Some(1.0));

    bridge
        .send("remove", JsValue::from_str("pb-boot-key"))
        .expect("remove");
    assert!(bridge.read("pb-boot-key").expect("read").is_undefined());
    assert!(bridge.send("nowhere", JsValue::NULL).is_err());

    // Inbound: both the app port and an extra subscriber hear the failure.
    let recorder = Function::new_with_args("reason", "globalThis.pbFailure = reason;");
    bridge.subscribe("uploadFailed", recorder);
    let upload = JSON::parse(r#"["/api/upload", "pb-boot-missing", "t"]"#).expect("json");
    bridge.send("upload", upload).expect("upload");
    next_tick().await;

    let expected = "form element 'pb-boot-missing' not found";
    let failures = get(&get(&ports, "uploadFailed"), "sent")
        .dyn_into::<Array>()
        .expect("sent");
    assert_eq!(failures.length(), 1);
    assert_eq!(failures.get(0).as_string().as_deref(), Some(expected));
    assert_eq!(get(&global, "pbFailure").as_string().as_deref(), Some(expected));

    if document().ready_state() == "complete" {
        let loaded = get(&get(&ports, "domLoaded"), "sent")
            .dyn_into::<Array>()
            .expect("sent");
        assert_eq!(loaded.length(), 1);
        assert_eq!(loaded.get(0).as_bool(), Some(true));
    }

    assert!(PortBridge::boot(&init, JsValue::UNDEFINED).is_err());
    LocalStorage::new().remove("token").expect("remove");
}
