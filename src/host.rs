/// The slice of the browser API the grouping engine relies on
use crate::error::Result;
use crate::operations::Mutation;
use crate::rules::GroupColor;
use crate::storage::StoredSettings;
use crate::tab_data::{GroupInfo, TabInfo};

/// Tabs, groups, windows and settings as provided by the browser.
///
/// Calls suspend; other event handlers may run between any two of them.
#[allow(async_fn_in_trait)]
pub trait TabHost {
    async fn load_settings(&self) -> Result<StoredSettings>;
    async fn save_settings(&self, settings: &StoredSettings) -> Result<()>;

    async fn get_tab(&self, tab_id: i32) -> Result<TabInfo>;
    /// Every open tab with an http or https URL
    async fn query_http_tabs(&self) -> Result<Vec<TabInfo>>;
    async fn query_window_tabs(&self, window_id: i32) -> Result<Vec<TabInfo>>;
    async fn move_tab_to_end(&self, tab_id: i32) -> Result<()>;

    async fn add_to_group(&self, tab_id: i32, group_id: i32) -> Result<()>;
    /// Group `tab_id` on its own in `window_id`, returning the new group's id
    async fn create_group(&self, tab_id: i32, window_id: i32) -> Result<i32>;
    async fn ungroup(&self, tab_id: i32) -> Result<()>;

    async fn get_group(&self, group_id: i32) -> Result<GroupInfo>;
    async fn query_groups(&self) -> Result<Vec<GroupInfo>>;
    async fn update_group(&self, group_id: i32, title: &str, color: Option<GroupColor>) -> Result<()>;

    async fn sleep(&self, millis: u32);
}

/// Execute one planned mutation
pub async fn apply_mutation<H: TabHost>(host: &H, mutation: &Mutation) -> Result<()> {
    match mutation {
        Mutation::AddToGroup { tab_id, group_id } => host.add_to_group(*tab_id, *group_id).await,
        Mutation::CreateGroup {
            tab_id,
            window_id,
            title,
            color,
        } => {
            let group_id = host.create_group(*tab_id, *window_id).await?;
            host.update_group(group_id, title, Some(*color)).await
        }
        Mutation::RenameGroup { group_id, title } => host.update_group(*group_id, title, None).await,
        Mutation::Ungroup { tab_id } => host.ungroup(*tab_id).await,
        Mutation::MoveToEnd { tab_id } => host.move_tab_to_end(*tab_id).await,
    }
}

/// Execute mutations in order, stopping at the first failure
pub async fn apply_all<H: TabHost>(host: &H, mutations: &[Mutation]) -> Result<()> {
    for mutation in mutations {
        log::debug!("Applying {:?}", mutation);
        apply_mutation(host, mutation).await?;
    }
    Ok(())
}
