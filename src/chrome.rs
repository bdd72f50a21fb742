/// Chrome implementation of [`TabHost`] over the background.js bridge
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::engine::HostEvent;
use crate::error::{self, GrouperError};
use crate::host::TabHost;
use crate::rules::GroupColor;
use crate::storage::StoredSettings;
use crate::tab_data::{GroupInfo, TabInfo};

// Import JS bridge functions
#[wasm_bindgen(module = "/background.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getSettings() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSettings(value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getTab(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryHttpTabs() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryWindowTabs(window_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn moveTabToEnd(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn addTabToGroup(tab_id: i32, group_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn createGroup(tab_id: i32, window_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn ungroupTab(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getGroup(group_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryGroups() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateGroup(group_id: i32, title: &str, color: Option<String>) -> Result<(), JsValue>;

    #[wasm_bindgen(js_name = sleep)]
    async fn sleep_ms(millis: u32);

    fn registerListeners(callback: &js_sys::Function);
}

/// Best-effort message out of a rejected chrome.* promise
fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

fn host_err(op: &'static str) -> impl Fn(JsValue) -> GrouperError {
    move |e| GrouperError::host(op, js_message(&e))
}

fn decode<T: DeserializeOwned>(value: JsValue) -> error::Result<T> {
    Ok(serde_wasm_bindgen::from_value(value)?)
}

/// The real browser, reached through chrome.* APIs
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeHost;

impl TabHost for ChromeHost {
    async fn load_settings(&self) -> error::Result<StoredSettings> {
        let value = getSettings().await.map_err(host_err("storage.sync.get"))?;
        if value.is_null() || value.is_undefined() {
            return Ok(StoredSettings::default());
        }
        decode(value)
    }

    async fn save_settings(&self, settings: &StoredSettings) -> error::Result<()> {
        let value = serde_wasm_bindgen::to_value(settings)?;
        setSettings(value).await.map_err(host_err("storage.sync.set"))
    }

    async fn get_tab(&self, tab_id: i32) -> error::Result<TabInfo> {
        decode(getTab(tab_id).await.map_err(host_err("tabs.get"))?)
    }

    async fn query_http_tabs(&self) -> error::Result<Vec<TabInfo>> {
        decode(queryHttpTabs().await.map_err(host_err("tabs.query"))?)
    }

    async fn query_window_tabs(&self, window_id: i32) -> error::Result<Vec<TabInfo>> {
        decode(queryWindowTabs(window_id).await.map_err(host_err("tabs.query"))?)
    }

    async fn move_tab_to_end(&self, tab_id: i32) -> error::Result<()> {
        moveTabToEnd(tab_id).await.map_err(host_err("tabs.move"))
    }

    async fn add_to_group(&self, tab_id: i32, group_id: i32) -> error::Result<()> {
        addTabToGroup(tab_id, group_id).await.map_err(host_err("tabs.group"))
    }

    async fn create_group(&self, tab_id: i32, window_id: i32) -> error::Result<i32> {
        decode(createGroup(tab_id, window_id).await.map_err(host_err("tabs.group"))?)
    }

    async fn ungroup(&self, tab_id: i32) -> error::Result<()> {
        ungroupTab(tab_id).await.map_err(host_err("tabs.ungroup"))
    }

    async fn get_group(&self, group_id: i32) -> error::Result<GroupInfo> {
        decode(getGroup(group_id).await.map_err(host_err("tabGroups.get"))?)
    }

    async fn query_groups(&self) -> error::Result<Vec<GroupInfo>> {
        decode(queryGroups().await.map_err(host_err("tabGroups.query"))?)
    }

    async fn update_group(&self, group_id: i32, title: &str, color: Option<GroupColor>) -> error::Result<()> {
        let color = color.map(|c| c.as_str().to_string());
        updateGroup(group_id, title, color)
            .await
            .map_err(host_err("tabGroups.update"))
    }

    async fn sleep(&self, millis: u32) {
        sleep_ms(millis).await;
    }
}

/// Forward every browser event the bridge observes to `handler`.
///
/// The bridge queues events that fire before this is called, so nothing that
/// woke the service worker is lost while the module loads.
pub fn listen<F>(handler: F)
where
    F: Fn(HostEvent) + 'static,
{
    let callback = Closure::<dyn Fn(JsValue)>::new(move |value: JsValue| {
        match serde_wasm_bindgen::from_value::<HostEvent>(value) {
            Ok(event) => handler(event),
            Err(e) => log::warn!("[Auto Tab Grouper] Ignoring unreadable event: {}", e),
        }
    });

    registerListeners(callback.as_ref().unchecked_ref());
    // Listeners stay registered for the worker's lifetime
    callback.forget();
}
