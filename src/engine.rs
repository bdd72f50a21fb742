/// Event handlers that keep tab groups in line with the user's rules
use serde::Deserialize;

use crate::error::Result;
use crate::host::{TabHost, apply_all, apply_mutation};
use crate::operations::{
    Mutation, NavigationAction, classify_navigation, is_managed_group, plan_placement, plan_renumbering,
    plan_tail_moves, rescan_targets,
};
use crate::rules::{Rule, Settings};
use crate::storage::{KEY_IS_ENABLED, KEY_RULES, SYNC_AREA, StoredSettings};
use crate::tab_data::{TAB_GROUP_ID_NONE, TabInfo};

/// Default wait before reacting to window moves and closes
pub const DEFAULT_SETTLE_DELAY_MS: u32 = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Time given to the browser to finish its own group bookkeeping
    pub settle_delay_ms: u32,
}

impl EngineConfig {
    pub fn immediate() -> Self {
        EngineConfig { settle_delay_ms: 0 }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

/// Browser events the engine reacts to, as forwarded by the JS bridge
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostEvent {
    Installed {
        reason: String,
    },
    TabUpdated {
        tab_id: i32,
        #[serde(default)]
        status: Option<String>,
        tab: TabInfo,
    },
    TabAttached {
        tab_id: i32,
        new_window_id: i32,
    },
    WindowRemoved {
        window_id: i32,
    },
    StorageChanged {
        area: String,
        changed_keys: Vec<String>,
    },
}

impl HostEvent {
    fn name(&self) -> &'static str {
        match self {
            HostEvent::Installed { .. } => "installed",
            HostEvent::TabUpdated { .. } => "tab updated",
            HostEvent::TabAttached { .. } => "tab attached",
            HostEvent::WindowRemoved { .. } => "window removed",
            HostEvent::StorageChanged { .. } => "storage changed",
        }
    }
}

pub struct GroupingEngine<H> {
    host: H,
    config: EngineConfig,
}

impl<H: TabHost> GroupingEngine<H> {
    pub fn new(host: H, config: EngineConfig) -> Self {
        GroupingEngine { host, config }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Handle one event. Failures are logged here and never escape, so a bad
    /// event cannot stop later ones from being processed.
    pub async fn dispatch(&self, event: HostEvent) {
        let name = event.name();
        let outcome = match event {
            HostEvent::Installed { reason } => self.on_installed(&reason).await,
            HostEvent::TabUpdated { tab_id, status, tab } => {
                log::debug!("Tab {} updated ({:?})", tab_id, status);
                self.on_tab_updated(status.as_deref(), &tab).await
            }
            HostEvent::TabAttached { tab_id, new_window_id } => self.on_tab_attached(tab_id, new_window_id).await,
            HostEvent::WindowRemoved { window_id } => self.on_window_removed(window_id).await,
            HostEvent::StorageChanged { area, changed_keys } => {
                self.on_storage_changed(&area, &changed_keys).await
            }
        };

        if let Err(e) = outcome {
            log::error!("[Auto Tab Grouper] Handling {} failed: {}", name, e);
        }
    }

    async fn settings(&self) -> Result<Settings> {
        Ok(self.host.load_settings().await?.settings())
    }

    async fn settle(&self) {
        if self.config.settle_delay_ms > 0 {
            self.host.sleep(self.config.settle_delay_ms).await;
        }
    }

    async fn on_installed(&self, reason: &str) -> Result<()> {
        if reason != "install" {
            return Ok(());
        }

        let stored = self.host.load_settings().await?;
        if !stored.is_initialized() {
            log::info!("First install, writing default settings");
            self.host.save_settings(&StoredSettings::from(&Settings::default())).await?;
        }
        Ok(())
    }

    async fn on_tab_updated(&self, status: Option<&str>, tab: &TabInfo) -> Result<()> {
        if status != Some("complete") {
            return Ok(());
        }

        let settings = self.settings().await?;
        match classify_navigation(tab, &settings) {
            NavigationAction::Place(rule) => self.place_tab(tab, tab.window_id, rule).await,
            NavigationAction::CheckUngroup { group_id } => self.release_tab(tab.id, group_id, &settings).await,
            NavigationAction::Ignore => Ok(()),
        }
    }

    async fn on_tab_attached(&self, tab_id: i32, new_window_id: i32) -> Result<()> {
        self.settle().await;

        let settings = self.settings().await?;
        if !settings.is_active() {
            return Ok(());
        }

        let mut tab = self.host.get_tab(tab_id).await?;
        let Some(rule) = settings.find_rule_for_url(&tab.url) else {
            return Ok(());
        };

        // The browser may have carried the old group over; start clean
        if tab.is_grouped() {
            self.host.ungroup(tab.id).await?;
            tab.group_id = TAB_GROUP_ID_NONE;
        }

        self.place_tab(&tab, new_window_id, rule).await
    }

    async fn on_window_removed(&self, window_id: i32) -> Result<()> {
        self.settle().await;

        let settings = self.settings().await?;
        if !settings.is_active() {
            return Ok(());
        }

        let groups: Vec<_> = self
            .host
            .query_groups()
            .await?
            .into_iter()
            .filter(|g| g.window_id != window_id)
            .collect();

        let renames = plan_renumbering(&groups, &settings);
        if !renames.is_empty() {
            log::info!("Renumbering {} group(s) after window {} closed", renames.len(), window_id);
        }
        apply_all(&self.host, &renames).await
    }

    async fn on_storage_changed(&self, area: &str, changed_keys: &[String]) -> Result<()> {
        if area != SYNC_AREA || !changed_keys.iter().any(|k| k == KEY_RULES || k == KEY_IS_ENABLED) {
            return Ok(());
        }

        let settings = self.settings().await?;
        if !settings.is_active() {
            return Ok(());
        }

        let tabs = self.host.query_http_tabs().await?;
        for (tab, rule) in rescan_targets(&tabs, &settings) {
            if let Err(e) = self.place_tab(tab, tab.window_id, rule).await {
                log::error!("[Auto Tab Grouper] Grouping tab {} failed: {}", tab.id, e);
            }
        }
        Ok(())
    }

    /// Put `tab` into its rule's group in `window_id`, then push loose tabs right
    async fn place_tab(&self, tab: &TabInfo, window_id: i32, rule: &Rule) -> Result<()> {
        let groups = self.host.query_groups().await?;
        let mutations = plan_placement(tab, window_id, rule, &groups);
        apply_all(&self.host, &mutations).await?;

        let window_tabs = self.host.query_window_tabs(window_id).await?;
        for tab_id in plan_tail_moves(&window_tabs) {
            apply_mutation(&self.host, &Mutation::MoveToEnd { tab_id }).await?;
        }
        Ok(())
    }

    async fn release_tab(&self, tab_id: i32, group_id: i32, settings: &Settings) -> Result<()> {
        let group = self.host.get_group(group_id).await?;
        if is_managed_group(&group, settings) {
            log::debug!("Ungrouping tab {} from \"{}\"", tab_id, group.title);
            self.host.ungroup(tab_id).await?;
        }
        Ok(())
    }
}
