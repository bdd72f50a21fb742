/// Options page: enable toggle and rule editor

use std::cell::RefCell;
use std::rc::Rc;

use patternfly_yew::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use crate::rules::{GroupColor, Rule, Settings};
use crate::storage::{RuleDraft, StoredSettings};
use crate::ui::components::{GroupHeader, RuleRow};

// Import JS bridge functions
#[wasm_bindgen(module = "/options.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getSettings() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSettings(value: JsValue) -> Result<(), JsValue>;

    async fn sleep(millis: u32);
}

const STATUS_VISIBLE_MS: u32 = 2500;

#[derive(Clone, PartialEq)]
enum ViewState {
    Loading,
    Idle,
    Saving,
    Error(String),
}

#[derive(Clone, PartialEq)]
struct Status {
    message: String,
    is_error: bool,
}

#[derive(Clone, PartialEq)]
struct FormFields {
    host: String,
    group_name: String,
    color: GroupColor,
}

impl Default for FormFields {
    fn default() -> Self {
        FormFields {
            host: String::new(),
            group_name: String::new(),
            color: GroupColor::Blue,
        }
    }
}

#[function_component(OptionsPage)]
pub fn options_page() -> Html {
    let state = use_state(|| ViewState::Loading);
    let settings = use_state(Settings::default);
    let form = use_state(FormFields::default);
    let editing_rule = use_state(|| None::<String>); // rule ID being edited
    let status = use_state(|| None::<Status>);
    let status_seq = use_mut_ref(|| 0u32);

    // Load settings on mount
    {
        let state = state.clone();
        let settings = settings.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match load_settings().await {
                    Ok(loaded) => {
                        settings.set(loaded);
                        state.set(ViewState::Idle);
                    }
                    Err(e) => {
                        state.set(ViewState::Error(format!("Failed to load: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    let show_status = {
        let status = status.clone();
        let status_seq = status_seq.clone();
        Callback::from(move |(message, is_error): (String, bool)| {
            status.set(Some(Status { message, is_error }));
            let seq = bump(&status_seq);

            let status = status.clone();
            let status_seq = status_seq.clone();
            spawn_local(async move {
                sleep(STATUS_VISIBLE_MS).await;
                // A newer message keeps its own timer
                if *status_seq.borrow() == seq {
                    status.set(None);
                }
            });
        })
    };

    let on_toggle = {
        let settings = settings.clone();
        let state = state.clone();
        let show_status = show_status.clone();

        Callback::from(move |e: Event| {
            let Some(input) = e.target_dyn_into::<HtmlInputElement>() else {
                return;
            };
            let is_enabled = input.checked();
            let mut next = (*settings).clone();
            next.is_enabled = is_enabled;
            settings.set(next);

            let state = state.clone();
            let show_status = show_status.clone();
            spawn_local(async move {
                let write = StoredSettings {
                    is_enabled: Some(is_enabled),
                    rules: None,
                };
                match save_settings(&write).await {
                    Ok(_) => {
                        let message = if is_enabled { "Auto grouping enabled" } else { "Auto grouping disabled" };
                        show_status.emit((message.to_string(), false));
                    }
                    Err(e) => state.set(ViewState::Error(format!("Failed to save: {}", e))),
                }
            });
        })
    };

    let on_host_input = {
        let form = form.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                form.set(FormFields { host: input.value(), ..(*form).clone() });
            }
        })
    };

    let on_group_name_input = {
        let form = form.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                form.set(FormFields { group_name: input.value(), ..(*form).clone() });
            }
        })
    };

    let on_color_change = {
        let form = form.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                if let Some(color) = GroupColor::from_name(&select.value()) {
                    form.set(FormFields { color, ..(*form).clone() });
                }
            }
        })
    };

    let reset_form = {
        let form = form.clone();
        let editing_rule = editing_rule.clone();
        Callback::from(move |_: ()| {
            form.set(FormFields::default());
            editing_rule.set(None);
        })
    };

    let on_submit = {
        let form = form.clone();
        let editing_rule = editing_rule.clone();
        let settings = settings.clone();
        let state = state.clone();
        let show_status = show_status.clone();
        let reset_form = reset_form.clone();

        Callback::from(move |_| {
            let fields = (*form).clone();
            if fields.host.trim().is_empty() || fields.group_name.trim().is_empty() {
                return;
            }

            let draft = RuleDraft {
                host: fields.host,
                group_name: fields.group_name,
                color: fields.color,
            };
            let editing = (*editing_rule).clone();
            let settings = settings.clone();
            let state = state.clone();
            let show_status = show_status.clone();
            let reset_form = reset_form.clone();

            state.set(ViewState::Saving);
            spawn_local(async move {
                match save_rule(draft, editing.as_deref()).await {
                    Ok((updated, message)) => {
                        settings.set(updated);
                        reset_form.emit(());
                        state.set(ViewState::Idle);
                        show_status.emit((message.to_string(), false));
                    }
                    Err(message) => {
                        state.set(ViewState::Idle);
                        show_status.emit((message, true));
                    }
                }
            });
        })
    };

    let on_edit = {
        let form = form.clone();
        let editing_rule = editing_rule.clone();
        Callback::from(move |rule: Rule| {
            form.set(FormFields {
                host: rule.host,
                group_name: rule.group_name,
                color: rule.color,
            });
            editing_rule.set(Some(rule.id));
        })
    };

    let on_delete = {
        let settings = settings.clone();
        let editing_rule = editing_rule.clone();
        let state = state.clone();
        let show_status = show_status.clone();
        let reset_form = reset_form.clone();

        Callback::from(move |rule_id: String| {
            if editing_rule.as_deref() == Some(rule_id.as_str()) {
                reset_form.emit(());
            }

            let settings = settings.clone();
            let state = state.clone();
            let show_status = show_status.clone();
            spawn_local(async move {
                match delete_rule(&rule_id).await {
                    Ok(updated) => {
                        settings.set(updated);
                        show_status.emit(("Rule deleted".to_string(), false));
                    }
                    Err(e) => state.set(ViewState::Error(format!("Failed to delete: {}", e))),
                }
            });
        })
    };

    let is_busy = !matches!(*state, ViewState::Idle);
    let sections = settings.rules_by_group();

    html! {
        <div class="padding-20">
            <h1 class="options-title">{"Auto Tab Grouper"}</h1>

            <label class="toggle-row">
                <input
                    type="checkbox"
                    checked={settings.is_enabled}
                    disabled={is_busy}
                    onchange={on_toggle}
                />
                <span>{"Group tabs automatically"}</span>
            </label>

            {match &*state {
                ViewState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                ViewState::Error(err) => html! {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                },
                ViewState::Idle | ViewState::Saving => html! {},
            }}

            <div class="rule-form">
                <input
                    type="text"
                    placeholder="Domain (e.g. github.com)"
                    value={form.host.clone()}
                    oninput={on_host_input}
                />
                <input
                    type="text"
                    placeholder="Group name"
                    value={form.group_name.clone()}
                    oninput={on_group_name_input}
                />
                <select onchange={on_color_change}>
                    {for GroupColor::ALL.iter().map(|color| html! {
                        <option value={color.as_str()} selected={*color == form.color}>
                            {color.as_str()}
                        </option>
                    })}
                </select>
                <Button onclick={on_submit} disabled={is_busy} variant={ButtonVariant::Primary}>
                    {if editing_rule.is_some() { "Update Rule" } else { "Add Rule" }}
                </Button>
            </div>

            if let Some(current) = (*status).clone() {
                <Alert
                    r#type={if current.is_error { AlertType::Danger } else { AlertType::Success }}
                    title={current.message}
                    inline={true}
                >
                </Alert>
            }

            <div class="rules-list">
                if sections.is_empty() {
                    <p class="empty-state">{"No rules yet. Add a domain above to start grouping."}</p>
                }
                {for sections.into_iter().map(|((group_name, color), rules)| html! {
                    <>
                        <GroupHeader group_name={group_name.to_string()} color={color} />
                        {for rules.into_iter().map(|rule| html! {
                            <RuleRow
                                key={rule.id.clone()}
                                rule={rule.clone()}
                                on_edit={on_edit.clone()}
                                on_delete={on_delete.clone()}
                                disabled={is_busy}
                            />
                        })}
                    </>
                })}
            </div>
        </div>
    }
}

// Helper functions

fn bump(counter: &Rc<RefCell<u32>>) -> u32 {
    let mut value = counter.borrow_mut();
    *value = value.wrapping_add(1);
    *value
}

async fn load_settings() -> Result<Settings, String> {
    let value = getSettings()
        .await
        .map_err(|e| format!("Failed to get storage: {:?}", e))?;

    if value.is_null() || value.is_undefined() {
        return Ok(Settings::default());
    }

    let stored: StoredSettings = serde_wasm_bindgen::from_value(value)
        .map_err(|e| format!("Failed to parse storage: {:?}", e))?;
    Ok(stored.settings())
}

async fn save_settings(stored: &StoredSettings) -> Result<(), String> {
    let value = serde_wasm_bindgen::to_value(stored)
        .map_err(|e| format!("Failed to serialize settings: {:?}", e))?;

    setSettings(value)
        .await
        .map_err(|e| format!("Failed to save storage: {:?}", e))
}

fn rules_only(settings: &Settings) -> StoredSettings {
    StoredSettings {
        is_enabled: None,
        rules: Some(settings.rules.clone()),
    }
}

/// Add or update a rule against the freshest stored rules.
/// Validation failures come back as the message to show.
async fn save_rule(draft: RuleDraft, editing: Option<&str>) -> Result<(Settings, &'static str), String> {
    let mut settings = load_settings().await?;

    let outcome = match editing {
        Some(rule_id) => settings.update_rule(rule_id, &draft).map(|_| "Rule updated"),
        None => settings.add_rule(&draft).map(|_| "Rule added"),
    };
    let message = outcome.map_err(|e| e.to_string())?;

    save_settings(&rules_only(&settings)).await?;
    Ok((settings, message))
}

async fn delete_rule(rule_id: &str) -> Result<Settings, String> {
    let mut settings = load_settings().await?;
    if settings.delete_rule(rule_id) {
        save_settings(&rules_only(&settings)).await?;
    }
    Ok(settings)
}
