/// Grouping rules and hostname matching for Auto Tab Grouper
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{GrouperError, Result};

/// Colors Chrome accepts for a tab group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
    #[default]
    Grey,
}

impl GroupColor {
    pub const ALL: [GroupColor; 9] = [
        GroupColor::Blue,
        GroupColor::Red,
        GroupColor::Yellow,
        GroupColor::Green,
        GroupColor::Pink,
        GroupColor::Purple,
        GroupColor::Cyan,
        GroupColor::Orange,
        GroupColor::Grey,
    ];

    /// Name used by the chrome.tabGroups API
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupColor::Blue => "blue",
            GroupColor::Red => "red",
            GroupColor::Yellow => "yellow",
            GroupColor::Green => "green",
            GroupColor::Pink => "pink",
            GroupColor::Purple => "purple",
            GroupColor::Cyan => "cyan",
            GroupColor::Orange => "orange",
            GroupColor::Grey => "grey",
        }
    }

    pub fn from_name(name: &str) -> Option<GroupColor> {
        GroupColor::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// Swatch shown next to a group name in the options page
    pub fn hex(&self) -> &'static str {
        match self {
            GroupColor::Blue => "#1a73e8",
            GroupColor::Red => "#d93025",
            GroupColor::Yellow => "#f9ab00",
            GroupColor::Green => "#188038",
            GroupColor::Pink => "#d01884",
            GroupColor::Purple => "#a142f4",
            GroupColor::Cyan => "#007b83",
            GroupColor::Orange => "#e8710a",
            GroupColor::Grey => "#5f6368",
        }
    }
}

/// Maps one hostname to a named, colored tab group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub host: String,
    pub group_name: String,
    pub color: GroupColor,
}

/// Settings document kept in chrome.storage.sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub is_enabled: bool,
    pub rules: Vec<Rule>,
}

impl Settings {
    /// True when the engine has anything to do
    pub fn is_active(&self) -> bool {
        self.is_enabled && !self.rules.is_empty()
    }

    /// Distinct group names across all rules, in sorted order
    pub fn group_names(&self) -> BTreeSet<&str> {
        self.rules.iter().map(|r| r.group_name.as_str()).collect()
    }

    pub fn find_rule_for_url(&self, url: &str) -> Option<&Rule> {
        find_rule(&self.rules, url)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            is_enabled: true,
            rules: Vec::new(),
        }
    }
}

/// Hostname of an http(s) URL; anything else is unmanaged
pub fn http_hostname(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    parsed.host_str().map(str::to_string)
}

/// Find the rule whose host equals the URL's hostname
pub fn find_rule<'a>(rules: &'a [Rule], url: &str) -> Option<&'a Rule> {
    let hostname = http_hostname(url)?;
    rules.iter().find(|r| r.host == hostname)
}

static HOSTNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\[[0-9a-f:.]+\]|[a-z0-9_]([a-z0-9_-]*[a-z0-9_])?(\.[a-z0-9_]([a-z0-9_-]*[a-z0-9_])?)*)$")
        .expect("hostname pattern is valid")
});

/// Normalize user input into the hostname form tabs are matched against.
///
/// Accepts a bare hostname ("GitHub.com") or a full URL
/// ("https://github.com/rust-lang"). Hostnames go through the same URL parser
/// as tab URLs so IDN and IP forms compare equal.
pub fn normalize_host(input: &str) -> Result<String> {
    let trimmed = input.trim().to_lowercase();
    let invalid = || GrouperError::InvalidInput {
        field: "host",
        value: input.trim().to_string(),
    };

    if trimmed.is_empty() {
        return Err(invalid());
    }

    let candidate = if trimmed.contains("://") {
        trimmed
    } else {
        format!("http://{}", trimmed)
    };

    let host = Url::parse(&candidate)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .ok_or_else(invalid)?;

    if HOSTNAME_RE.is_match(&host) {
        Ok(host)
    } else {
        Err(invalid())
    }
}
