/// Reconciliation planning: placement, numbering, ungrouping, reordering.
///
/// Everything here is a pure function of a settings snapshot and a snapshot
/// of host tabs/groups. The engine applies the resulting [`Mutation`]s.
use crate::rules::{GroupColor, Rule, Settings, http_hostname};
use crate::tab_data::{GroupInfo, TabInfo};
use crate::title::{build_group_title, smallest_unused_number, title_number_for};

/// One intended change to host state
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddToGroup { tab_id: i32, group_id: i32 },
    CreateGroup { tab_id: i32, window_id: i32, title: String, color: GroupColor },
    RenameGroup { group_id: i32, title: String },
    Ungroup { tab_id: i32 },
    MoveToEnd { tab_id: i32 },
}

/// What a completed navigation asks of the engine
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationAction<'a> {
    Place(&'a Rule),
    /// Tab matches nothing but sits in a group that may be ours
    CheckUngroup { group_id: i32 },
    Ignore,
}

pub fn classify_navigation<'a>(tab: &TabInfo, settings: &'a Settings) -> NavigationAction<'a> {
    if !settings.is_active() || http_hostname(&tab.url).is_none() {
        return NavigationAction::Ignore;
    }

    match settings.find_rule_for_url(&tab.url) {
        Some(rule) => NavigationAction::Place(rule),
        None if tab.is_grouped() => NavigationAction::CheckUngroup { group_id: tab.group_id },
        None => NavigationAction::Ignore,
    }
}

fn numbers_for<'a>(
    groups: impl Iterator<Item = &'a GroupInfo>,
    group_name: &'a str,
) -> impl Iterator<Item = u32> {
    groups.filter_map(move |g| title_number_for(&g.title, group_name))
}

/// Plan putting `tab` into a `rule.group_name` group in `window_id`.
///
/// `groups` is every group the host knows about, across all windows.
pub fn plan_placement(tab: &TabInfo, window_id: i32, rule: &Rule, groups: &[GroupInfo]) -> Vec<Mutation> {
    let candidate = groups
        .iter()
        .find(|g| g.window_id == window_id && title_number_for(&g.title, &rule.group_name).is_some());

    let Some(candidate) = candidate else {
        let number = smallest_unused_number(numbers_for(groups.iter(), &rule.group_name));
        return vec![Mutation::CreateGroup {
            tab_id: tab.id,
            window_id,
            title: build_group_title(&rule.group_name, number),
            color: rule.color,
        }];
    };

    let mut mutations = Vec::new();
    let candidate_id = candidate.id;
    let others = move || groups.iter().filter(move |g| g.id != candidate_id);

    if others().any(|g| g.title == candidate.title) {
        let number = smallest_unused_number(numbers_for(others(), &rule.group_name));
        mutations.push(Mutation::RenameGroup {
            group_id: candidate.id,
            title: build_group_title(&rule.group_name, number),
        });
    }

    if tab.group_id != candidate.id {
        mutations.push(Mutation::AddToGroup {
            tab_id: tab.id,
            group_id: candidate.id,
        });
    }

    mutations
}

/// Unpinned, ungrouped tabs to send to the end of the strip, left to right.
///
/// Empty when every such tab already sits after the last grouped tab.
pub fn plan_tail_moves(window_tabs: &[TabInfo]) -> Vec<i32> {
    let mut loose: Vec<&TabInfo> = window_tabs
        .iter()
        .filter(|t| !t.pinned && !t.is_grouped())
        .collect();
    loose.sort_by_key(|t| t.index);

    let Some(last_grouped) = window_tabs.iter().filter(|t| t.is_grouped()).map(|t| t.index).max() else {
        return Vec::new();
    };

    if loose.iter().all(|t| t.index > last_grouped) {
        return Vec::new();
    }

    loose.into_iter().map(|t| t.id).collect()
}

/// A group is ours when its title was built from a group name some rule uses
pub fn is_managed_group(group: &GroupInfo, settings: &Settings) -> bool {
    settings
        .rules
        .iter()
        .any(|r| title_number_for(&group.title, &r.group_name).is_some())
}

/// Compact numbering to 1..k for every rule group name.
///
/// `groups` must only contain groups from windows that are still open.
pub fn plan_renumbering(groups: &[GroupInfo], settings: &Settings) -> Vec<Mutation> {
    let mut mutations = Vec::new();

    for group_name in settings.group_names() {
        let mut numbered: Vec<(u32, &GroupInfo)> = groups
            .iter()
            .filter_map(|g| title_number_for(&g.title, group_name).map(|number| (number, g)))
            .collect();
        numbered.sort_by_key(|(number, g)| (*number, g.id));

        for (position, (number, group)) in numbered.into_iter().enumerate() {
            let wanted = position as u32 + 1;
            if number != wanted {
                mutations.push(Mutation::RenameGroup {
                    group_id: group.id,
                    title: build_group_title(group_name, wanted),
                });
            }
        }
    }

    mutations
}

/// Tabs a bulk re-scan should place, paired with their rule
pub fn rescan_targets<'a, 'b>(tabs: &'a [TabInfo], settings: &'b Settings) -> Vec<(&'a TabInfo, &'b Rule)> {
    if !settings.is_active() {
        return Vec::new();
    }

    tabs.iter()
        .filter_map(|tab| settings.find_rule_for_url(&tab.url).map(|rule| (tab, rule)))
        .collect()
}
