/// Storage shape for chrome.storage.sync and the rule editing operations
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GrouperError, Result};
use crate::rules::{GroupColor, Rule, Settings, normalize_host};
use crate::title::is_plain_group_name;

/// Keys of the settings document that the engine reacts to
pub const KEY_IS_ENABLED: &str = "isEnabled";
pub const KEY_RULES: &str = "rules";
pub const SYNC_AREA: &str = "sync";

/// Root storage structure as read back from chrome.storage.sync.
///
/// Fields are optional so a fresh install can be told apart from a user who
/// switched grouping off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,
}

impl StoredSettings {
    pub fn is_initialized(&self) -> bool {
        self.is_enabled.is_some()
    }

    /// Snapshot with install defaults filled in
    pub fn settings(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            is_enabled: self.is_enabled.unwrap_or(defaults.is_enabled),
            rules: self.rules.clone().unwrap_or(defaults.rules),
        }
    }
}

impl From<&Settings> for StoredSettings {
    fn from(settings: &Settings) -> Self {
        StoredSettings {
            is_enabled: Some(settings.is_enabled),
            rules: Some(settings.rules.clone()),
        }
    }
}

/// Form input for creating or editing a rule
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDraft {
    pub host: String,
    pub group_name: String,
    pub color: GroupColor,
}

impl RuleDraft {
    fn validate(&self) -> Result<(String, String)> {
        let host = normalize_host(&self.host)?;
        let group_name = self.group_name.trim();
        // Names ending in a number suffix would read back as a different group
        if group_name.is_empty() || !is_plain_group_name(group_name) {
            return Err(GrouperError::InvalidInput {
                field: "group name",
                value: self.group_name.clone(),
            });
        }
        Ok((host, group_name.to_string()))
    }
}

fn new_rule_id() -> String {
    format!("r_{}", Uuid::new_v4().simple())
}

impl Settings {
    fn ensure_host_free(&self, host: &str, editing: Option<&str>) -> Result<()> {
        let taken = self
            .rules
            .iter()
            .any(|r| r.host == host && Some(r.id.as_str()) != editing);
        if taken {
            Err(GrouperError::DuplicateHost(host.to_string()))
        } else {
            Ok(())
        }
    }

    pub fn add_rule(&mut self, draft: &RuleDraft) -> Result<&Rule> {
        let (host, group_name) = draft.validate()?;
        self.ensure_host_free(&host, None)?;

        let id = new_rule_id();
        self.rules.push(Rule {
            id: id.clone(),
            host,
            group_name,
            color: draft.color,
        });
        self.rules.last().ok_or(GrouperError::RuleNotFound(id))
    }

    pub fn update_rule(&mut self, rule_id: &str, draft: &RuleDraft) -> Result<()> {
        let (host, group_name) = draft.validate()?;
        self.ensure_host_free(&host, Some(rule_id))?;

        let rule = self
            .rules
            .iter_mut()
            .find(|r| r.id == rule_id)
            .ok_or_else(|| GrouperError::RuleNotFound(rule_id.to_string()))?;
        rule.host = host;
        rule.group_name = group_name;
        rule.color = draft.color;
        Ok(())
    }

    pub fn delete_rule(&mut self, rule_id: &str) -> bool {
        let original_len = self.rules.len();
        self.rules.retain(|r| r.id != rule_id);
        self.rules.len() < original_len
    }

    pub fn get_rule(&self, rule_id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == rule_id)
    }

    /// Rules grouped for display: by group name, then color
    pub fn rules_by_group(&self) -> Vec<((&str, GroupColor), Vec<&Rule>)> {
        let mut sorted: Vec<&Rule> = self.rules.iter().collect();
        sorted.sort_by(|a, b| {
            a.group_name
                .cmp(&b.group_name)
                .then_with(|| a.color.as_str().cmp(b.color.as_str()))
        });

        let mut sections: Vec<((&str, GroupColor), Vec<&Rule>)> = Vec::new();
        for rule in sorted {
            let key = (rule.group_name.as_str(), rule.color);
            match sections.last_mut() {
                Some((last_key, rules)) if *last_key == key => rules.push(rule),
                _ => sections.push((key, vec![rule])),
            }
        }
        sections
    }
}
