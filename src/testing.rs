/// In-memory browser used by the engine tests
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::{GrouperError, Result};
use crate::host::TabHost;
use crate::rules::{GroupColor, Settings, http_hostname};
use crate::storage::StoredSettings;
use crate::tab_data::{GroupInfo, TAB_GROUP_ID_NONE, TabInfo};

#[derive(Debug, Default)]
struct FakeState {
    stored: StoredSettings,
    tabs: Vec<TabInfo>,
    groups: Vec<GroupInfo>,
    next_group_id: i32,
    calls: Vec<String>,
    sleeps: Vec<u32>,
    fail_on: Option<&'static str>,
    fail_call: Option<String>,
    interleave: bool,
}

impl FakeState {
    fn tab_mut(&mut self, tab_id: i32) -> Result<&mut TabInfo> {
        self.tabs
            .iter_mut()
            .find(|t| t.id == tab_id)
            .ok_or_else(|| GrouperError::host("tabs.get", format!("No tab with id: {}", tab_id)))
    }

    /// Chrome drops a group once its last tab leaves
    fn prune_groups(&mut self) {
        let tabs = &self.tabs;
        self.groups.retain(|g| tabs.iter().any(|t| t.group_id == g.id));
    }

    fn reindex(&mut self, window_id: i32) {
        let mut ids: Vec<(i32, i32)> = self
            .tabs
            .iter()
            .filter(|t| t.window_id == window_id)
            .map(|t| (t.index, t.id))
            .collect();
        ids.sort();
        for (position, (_, tab_id)) in ids.into_iter().enumerate() {
            if let Some(tab) = self.tabs.iter_mut().find(|t| t.id == tab_id) {
                tab.index = position as i32;
            }
        }
    }

    fn allocate_group_id(&mut self) -> i32 {
        self.next_group_id = self.next_group_id.max(1);
        while self.groups.iter().any(|g| g.id == self.next_group_id) {
            self.next_group_id += 1;
        }
        let id = self.next_group_id;
        self.next_group_id += 1;
        id
    }
}

#[derive(Debug, Default)]
pub struct FakeHost {
    state: RefCell<FakeState>,
}

/// Returns Pending exactly once, letting other joined futures run
struct YieldNow(bool);

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

impl FakeHost {
    pub fn with_settings(settings: Settings) -> Self {
        let host = FakeHost::default();
        host.set_stored((&settings).into());
        host
    }

    pub fn set_stored(&self, stored: StoredSettings) {
        self.state.borrow_mut().stored = stored;
    }

    pub fn stored(&self) -> StoredSettings {
        self.state.borrow().stored.clone()
    }

    pub fn set_interleave(&self, interleave: bool) {
        self.state.borrow_mut().interleave = interleave;
    }

    pub fn fail_on(&self, op: &'static str) {
        self.state.borrow_mut().fail_on = Some(op);
    }

    /// Fail only the call recorded exactly as `call`, e.g. "create_group 1 10"
    pub fn fail_call(&self, call: &str) {
        self.state.borrow_mut().fail_call = Some(call.to_string());
    }

    pub fn clear_failure(&self) {
        let mut state = self.state.borrow_mut();
        state.fail_on = None;
        state.fail_call = None;
    }

    /// Append a tab to the right end of `window_id`
    pub fn open_tab(&self, tab_id: i32, window_id: i32, url: &str) {
        let mut state = self.state.borrow_mut();
        let index = state.tabs.iter().filter(|t| t.window_id == window_id).count() as i32;
        state.tabs.push(TabInfo::new(tab_id, window_id, url, index));
    }

    pub fn set_url(&self, tab_id: i32, url: &str) {
        if let Ok(tab) = self.state.borrow_mut().tab_mut(tab_id) {
            tab.url = url.to_string();
        }
    }

    pub fn pin(&self, tab_id: i32) {
        if let Ok(tab) = self.state.borrow_mut().tab_mut(tab_id) {
            tab.pinned = true;
        }
    }

    pub fn add_group(&self, group_id: i32, window_id: i32, title: &str, tab_ids: &[i32]) {
        let mut state = self.state.borrow_mut();
        state.groups.push(GroupInfo {
            id: group_id,
            window_id,
            title: title.to_string(),
            color: GroupColor::Grey,
        });
        for tab in state.tabs.iter_mut().filter(|t| tab_ids.contains(&t.id)) {
            tab.group_id = group_id;
        }
    }

    /// Simulate dragging a grouped tab into a new window where the browser
    /// recreated its group under the same title
    pub fn open_window_with_copied_group(&self, tab_id: i32, window_id: i32, group_id: i32, title: &str) {
        {
            let mut state = self.state.borrow_mut();
            let Ok(tab) = state.tab_mut(tab_id) else {
                return;
            };
            let old_window = tab.window_id;
            tab.window_id = window_id;
            tab.index = 0;
            tab.group_id = TAB_GROUP_ID_NONE;
            state.reindex(old_window);
            state.prune_groups();
        }
        self.add_group(group_id, window_id, title, &[tab_id]);
    }

    pub fn close_window(&self, window_id: i32) {
        let mut state = self.state.borrow_mut();
        state.tabs.retain(|t| t.window_id != window_id);
        state.prune_groups();
    }

    pub fn tab(&self, tab_id: i32) -> TabInfo {
        self.state
            .borrow()
            .tabs
            .iter()
            .find(|t| t.id == tab_id)
            .cloned()
            .unwrap_or_else(|| panic!("no tab {}", tab_id))
    }

    pub fn window_tabs(&self, window_id: i32) -> Vec<TabInfo> {
        let mut tabs: Vec<TabInfo> = self
            .state
            .borrow()
            .tabs
            .iter()
            .filter(|t| t.window_id == window_id)
            .cloned()
            .collect();
        tabs.sort_by_key(|t| t.index);
        tabs
    }

    pub fn groups(&self) -> Vec<GroupInfo> {
        self.state.borrow().groups.clone()
    }

    pub fn group(&self, group_id: i32) -> GroupInfo {
        self.groups()
            .into_iter()
            .find(|g| g.id == group_id)
            .unwrap_or_else(|| panic!("no group {}", group_id))
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn sleeps(&self) -> Vec<u32> {
        self.state.borrow().sleeps.clone()
    }

    /// Record the call, optionally yield to other tasks, then apply the failure switch
    async fn enter(&self, op: &'static str, detail: String) -> Result<()> {
        let interleave = self.state.borrow().interleave;
        if interleave {
            YieldNow(false).await;
        }

        let mut state = self.state.borrow_mut();
        let call = format!("{} {}", op, detail).trim_end().to_string();
        let failing = state.fail_on == Some(op) || state.fail_call.as_deref() == Some(call.as_str());
        state.calls.push(call);
        if failing {
            return Err(GrouperError::host(op, "injected failure"));
        }
        Ok(())
    }
}

impl TabHost for FakeHost {
    async fn load_settings(&self) -> Result<StoredSettings> {
        self.enter("load_settings", String::new()).await?;
        Ok(self.stored())
    }

    async fn save_settings(&self, settings: &StoredSettings) -> Result<()> {
        self.enter("save_settings", String::new()).await?;
        let mut state = self.state.borrow_mut();
        if settings.is_enabled.is_some() {
            state.stored.is_enabled = settings.is_enabled;
        }
        if settings.rules.is_some() {
            state.stored.rules = settings.rules.clone();
        }
        Ok(())
    }

    async fn get_tab(&self, tab_id: i32) -> Result<TabInfo> {
        self.enter("get_tab", tab_id.to_string()).await?;
        Ok(self.state.borrow_mut().tab_mut(tab_id)?.clone())
    }

    async fn query_http_tabs(&self) -> Result<Vec<TabInfo>> {
        self.enter("query_http_tabs", String::new()).await?;
        let state = self.state.borrow();
        Ok(state
            .tabs
            .iter()
            .filter(|t| http_hostname(&t.url).is_some())
            .cloned()
            .collect())
    }

    async fn query_window_tabs(&self, window_id: i32) -> Result<Vec<TabInfo>> {
        self.enter("query_window_tabs", window_id.to_string()).await?;
        Ok(self.window_tabs(window_id))
    }

    async fn move_tab_to_end(&self, tab_id: i32) -> Result<()> {
        self.enter("move_tab_to_end", tab_id.to_string()).await?;
        let mut state = self.state.borrow_mut();
        let tab = state.tab_mut(tab_id)?;
        let window_id = tab.window_id;
        tab.index = i32::MAX;
        state.reindex(window_id);
        Ok(())
    }

    async fn add_to_group(&self, tab_id: i32, group_id: i32) -> Result<()> {
        self.enter("add_to_group", format!("{} {}", tab_id, group_id)).await?;
        let mut state = self.state.borrow_mut();
        let window_id = state
            .groups
            .iter()
            .find(|g| g.id == group_id)
            .map(|g| g.window_id)
            .ok_or_else(|| GrouperError::host("tabs.group", format!("No group with id: {}", group_id)))?;
        let tab = state.tab_mut(tab_id)?;
        tab.group_id = group_id;
        tab.window_id = window_id;
        state.prune_groups();
        Ok(())
    }

    async fn create_group(&self, tab_id: i32, window_id: i32) -> Result<i32> {
        self.enter("create_group", format!("{} {}", tab_id, window_id)).await?;
        let mut state = self.state.borrow_mut();
        let group_id = state.allocate_group_id();
        let tab = state.tab_mut(tab_id)?;
        tab.group_id = group_id;
        tab.window_id = window_id;
        state.groups.push(GroupInfo {
            id: group_id,
            window_id,
            title: String::new(),
            color: GroupColor::Grey,
        });
        state.prune_groups();
        Ok(group_id)
    }

    async fn ungroup(&self, tab_id: i32) -> Result<()> {
        self.enter("ungroup", tab_id.to_string()).await?;
        let mut state = self.state.borrow_mut();
        state.tab_mut(tab_id)?.group_id = TAB_GROUP_ID_NONE;
        state.prune_groups();
        Ok(())
    }

    async fn get_group(&self, group_id: i32) -> Result<GroupInfo> {
        self.enter("get_group", group_id.to_string()).await?;
        self.groups()
            .into_iter()
            .find(|g| g.id == group_id)
            .ok_or_else(|| GrouperError::host("tabGroups.get", format!("No group with id: {}", group_id)))
    }

    async fn query_groups(&self) -> Result<Vec<GroupInfo>> {
        self.enter("query_groups", String::new()).await?;
        Ok(self.groups())
    }

    async fn update_group(&self, group_id: i32, title: &str, color: Option<GroupColor>) -> Result<()> {
        self.enter("update_group", format!("{} {}", group_id, title)).await?;
        let mut state = self.state.borrow_mut();
        let group = state
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| GrouperError::host("tabGroups.update", format!("No group with id: {}", group_id)))?;
        group.title = title.to_string();
        if let Some(color) = color {
            group.color = color;
        }
        Ok(())
    }

    async fn sleep(&self, millis: u32) {
        self.state.borrow_mut().sleeps.push(millis);
    }
}
