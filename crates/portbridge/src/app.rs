//! WASM entry point.
//!
//! Replaces the hand-written embed script: reads the startup flags, boots
//! the application core once, and wires its ports to the bridge.
//!
//! ```javascript
//! import init, { PortBridge } from './portbridge.js';
//!
//! await init();
//! const bridge = PortBridge.boot(flags => Elm.Main.fullscreen(flags));
//! ```

use crate::host::BrowserHost;
use crate::js;
use futures::StreamExt;
use portbridge_core::{ports, Bridge, BridgeConfig, Effect, Inbound, StartupFlags};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

thread_local! {
    static BOOTED: Cell<bool> = const { Cell::new(false) };
}

type Subscribers = Rc<RefCell<HashMap<String, Vec<js_sys::Function>>>>;

/// A booted bridge bound to the page.
#[wasm_bindgen]
pub struct PortBridge {
    bridge: Rc<Bridge<BrowserHost>>,
    subscribers: Subscribers,
    flags: StartupFlags,
    app: JsValue,
}

#[wasm_bindgen]
impl PortBridge {
    /// Boot the application core.
    ///
    /// `init` receives the startup flags (`{token, time}`) and returns the
    /// application; if it has a `ports` object, every known port on it is
    /// wired up. `config` is an optional `BridgeConfig` object. Booting a
    /// second time in the same page throws.
    pub fn boot(init: &js_sys::Function, config: JsValue) -> Result<PortBridge, JsValue> {
        if BOOTED.with(Cell::get) {
            return Err(js::error("portbridge is already booted"));
        }

        let config = decode_config(config)?;
        let (bridge, inbound) = Bridge::new(BrowserHost::new()?, config);
        let flags = bridge.startup_flags().map_err(js::error)?;
        let flags_js = js::to_js(&flags)?;

        // From here on the application core may exist.
        BOOTED.with(|booted| booted.set(true));
        let bridge = Rc::new(bridge);
        let subscribers = Subscribers::default();
        spawn_local(pump(inbound, Rc::clone(&subscribers)));

        let app = init.call1(&JsValue::NULL, &flags_js)?;
        let port_bridge = Self {
            bridge,
            subscribers,
            flags,
            app,
        };
        // The pump runs after boot returns, so ports attached below still
        // receive domLoaded.
        port_bridge.bridge.watch_ready();
        port_bridge.attach_ports()?;
        Ok(port_bridge)
    }

    /// The value returned by `init`.
    #[wasm_bindgen(getter)]
    pub fn app(&self) -> JsValue {
        self.app.clone()
    }

    /// The startup flags handed to `init`.
    pub fn flags(&self) -> Result<JsValue, JsValue> {
        js::to_js(&self.flags)
    }

    /// Send a message on an outbound port. Storage faults are thrown.
    pub fn send(&self, port: &str, payload: JsValue) -> Result<(), JsValue> {
        dispatch(&self.bridge, port, payload)
    }

    /// Register `callback` for an inbound port.
    pub fn subscribe(&self, port: &str, callback: js_sys::Function) {
        self.subscribers
            .borrow_mut()
            .entry(port.to_string())
            .or_default()
            .push(callback);
    }

    /// Read back a stored value (`undefined` when absent or unparsable).
    pub fn read(&self, key: &str) -> Result<JsValue, JsValue> {
        match self.bridge.read_item(key).map_err(js::error)? {
            Some(value) => js::to_js(&value),
            None => Ok(JsValue::UNDEFINED),
        }
    }
}

impl PortBridge {
    /// Wire `app.ports`, skipping ports the application does not declare.
    fn attach_ports(&self) -> Result<(), JsValue> {
        if !self.app.is_object() {
            return Ok(());
        }
        let app_ports = js_sys::Reflect::get(&self.app, &JsValue::from_str("ports"))?;
        if !app_ports.is_object() {
            return Ok(());
        }

        for name in ports::OUTBOUND {
            let port = js_sys::Reflect::get(&app_ports, &JsValue::from_str(name))?;
            if port.is_undefined() {
                continue;
            }
            let subscribe: js_sys::Function =
                js_sys::Reflect::get(&port, &JsValue::from_str("subscribe"))?.dyn_into()?;

            let bridge = Rc::clone(&self.bridge);
            let handler = Closure::<dyn FnMut(JsValue) -> Result<(), JsValue>>::new(
                move |payload: JsValue| dispatch(&bridge, name, payload),
            );
            subscribe.call1(&port, handler.as_ref().unchecked_ref())?;
            handler.forget();
        }

        for name in ports::INBOUND {
            let port = js_sys::Reflect::get(&app_ports, &JsValue::from_str(name))?;
            if port.is_undefined() {
                continue;
            }
            let send: js_sys::Function =
                js_sys::Reflect::get(&port, &JsValue::from_str("send"))?.dyn_into()?;
            self.subscribe(name, send.bind(&port));
        }

        Ok(())
    }
}

fn decode_config(config: JsValue) -> Result<BridgeConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(BridgeConfig::default());
    }
    serde_wasm_bindgen::from_value(config).map_err(|e| js::error(format!("invalid config: {e}")))
}

fn dispatch(bridge: &Bridge<BrowserHost>, port: &str, payload: JsValue) -> Result<(), JsValue> {
    let payload = js::to_json(payload)?;
    match bridge.dispatch_port(port, payload).map_err(js::error)? {
        Effect::Done => {}
        Effect::Pending(task) => spawn_local(task),
    }
    Ok(())
}

/// Deliver inbound messages to subscribers in arrival order.
async fn pump(mut inbound: Inbound, subscribers: Subscribers) {
    while let Some(message) = inbound.next().await {
        let port = message.port();
        let payload = match js::to_js(&message.payload()) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(port, error = %js::describe(&err), "could not convert inbound payload");
                continue;
            }
        };

        let callbacks = subscribers.borrow().get(port).cloned().unwrap_or_default();
        if callbacks.is_empty() {
            tracing::debug!(port, "no subscriber, inbound message dropped");
        }
        for callback in callbacks {
            if let Err(err) = callback.call1(&JsValue::NULL, &payload) {
                tracing::warn!(port, error = %js::describe(&err), "inbound subscriber threw");
            }
        }
    }
}

/// Install the panic hook and console tracing.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = tracing_wasm::try_set_as_global_default();
}
