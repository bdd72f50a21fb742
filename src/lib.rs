/// Auto Tab Grouper - Chrome Extension that groups tabs by domain
/// Built with Rust + WASM + Yew

mod chrome;
pub mod engine;
pub mod error;
pub mod host;
pub mod operations;
pub mod rules;
mod storage;
mod tab_data;
#[cfg(test)]
mod testing;
mod title;
pub mod ui;

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::chrome::ChromeHost;
use crate::engine::{EngineConfig, GroupingEngine};

pub use crate::storage::{RuleDraft, StoredSettings};
pub use crate::tab_data::{GroupInfo, TabInfo};
pub use crate::title::{ParsedTitle, build_group_title, parse_group_title};

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start reacting to browser events from the service worker
#[wasm_bindgen]
pub fn start_background() {
    let engine = Rc::new(GroupingEngine::new(ChromeHost, EngineConfig::default()));

    chrome::listen(move |event| {
        let engine = Rc::clone(&engine);
        spawn_local(async move {
            engine.dispatch(event).await;
        });
    });

    log::info!("Auto Tab Grouper background started");
}

// Start the Yew app for the options page
#[wasm_bindgen]
pub fn start_options() {
    yew::Renderer::<ui::options::OptionsPage>::new().render();
}

// Re-export hostname matching for JavaScript access
#[wasm_bindgen]
pub fn hostname_of(url: &str) -> Option<String> {
    rules::http_hostname(url)
}
