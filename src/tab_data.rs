/// Data structures mirrored from the chrome.tabs / chrome.tabGroups APIs
use serde::{Deserialize, Serialize};

use crate::rules::GroupColor;

/// `chrome.tabGroups.TAB_GROUP_ID_NONE`
pub const TAB_GROUP_ID_NONE: i32 = -1;

/// Information about a browser tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: i32,
    pub window_id: i32,
    #[serde(default = "no_group")]
    pub group_id: i32,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub pinned: bool,
    pub index: i32,
}

fn no_group() -> i32 {
    TAB_GROUP_ID_NONE
}

impl TabInfo {
    pub fn new(id: i32, window_id: i32, url: &str, index: i32) -> TabInfo {
        TabInfo {
            id,
            window_id,
            group_id: TAB_GROUP_ID_NONE,
            url: url.to_string(),
            pinned: false,
            index,
        }
    }

    pub fn is_grouped(&self) -> bool {
        self.group_id != TAB_GROUP_ID_NONE
    }
}

/// A tab group as reported by chrome.tabGroups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInfo {
    pub id: i32,
    pub window_id: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub color: GroupColor,
}
