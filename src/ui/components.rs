/// Reusable UI components

use yew::prelude::*;

use crate::rules::{GroupColor, Rule};

#[derive(Properties, PartialEq)]
pub struct ColorDotProps {
    pub color: GroupColor,
}

#[function_component(ColorDot)]
pub fn color_dot(props: &ColorDotProps) -> Html {
    html! {
        <span
            class="color-dot"
            title={props.color.as_str()}
            style={format!("background-color: {};", props.color.hex())}
        ></span>
    }
}

#[derive(Properties, PartialEq)]
pub struct GroupHeaderProps {
    pub group_name: AttrValue,
    pub color: GroupColor,
}

#[function_component(GroupHeader)]
pub fn group_header(props: &GroupHeaderProps) -> Html {
    html! {
        <div class="rule-group-header">
            <ColorDot color={props.color} />
            <span>{props.group_name.clone()}</span>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct RuleRowProps {
    pub rule: Rule,
    pub on_edit: Callback<Rule>,
    pub on_delete: Callback<String>,
    #[prop_or(false)]
    pub disabled: bool,
}

#[function_component(RuleRow)]
pub fn rule_row(props: &RuleRowProps) -> Html {
    let on_edit = {
        let rule = props.rule.clone();
        let on_edit = props.on_edit.clone();
        Callback::from(move |_: MouseEvent| on_edit.emit(rule.clone()))
    };

    let on_delete = {
        let rule_id = props.rule.id.clone();
        let on_delete = props.on_delete.clone();
        Callback::from(move |_: MouseEvent| on_delete.emit(rule_id.clone()))
    };

    html! {
        <div class="rule-item">
            <div class="rule-info">
                <span class="rule-host">{&props.rule.host}</span>
            </div>
            <div class="rule-actions">
                <button class="btn btn-edit" onclick={on_edit} disabled={props.disabled}>{"Edit"}</button>
                <button class="btn btn-delete" onclick={on_delete} disabled={props.disabled}>{"Delete"}</button>
            </div>
        </div>
    }
}
