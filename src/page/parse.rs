//! HTML parsing for page documents and response documents.
//!
//! Both go through `scraper`, which parses with html5ever the way a browser's
//! `DOMParser` does: malformed input never fails, and a `<body>` always
//! exists in the resulting tree.

use scraper::{ElementRef, Html, Selector};

use crate::page::form::{FieldKind, FormElement, FormField, SelectOption};

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Inner HTML of the document's `<body>`, or empty when there is none.
pub fn body_inner_html(document: &Html) -> String {
    document
        .select(&selector("body"))
        .next()
        .map(|body| body.inner_html())
        .unwrap_or_default()
}

/// Parse a response text as a full HTML document and return its body
/// content. Head content and scripts are dropped and nothing is executed.
pub fn response_body(text: &str) -> String {
    body_inner_html(&Html::parse_document(text))
}

/// Collect every form in tree order, with the controls each one owns.
///
/// A control belongs to the form named by its `form` attribute when present,
/// otherwise to its nearest ancestor `<form>`.
pub fn parse_forms(document: &Html) -> Vec<FormElement> {
    let form_sel = selector("form");
    let control_sel = selector("input, textarea, select, button");

    let mut nodes = Vec::new();
    let mut forms = Vec::new();
    for form in document.select(&form_sel) {
        let el = form.value();
        nodes.push(form.id());
        forms.push(FormElement::new(
            el.attr("id").map(String::from),
            el.attr("action").map(String::from),
            el.attr("method").map(String::from),
            el.attr("enctype").map(String::from),
        ));
    }

    for control in document.select(&control_sel) {
        let owner = match control.value().attr("form") {
            Some(form_id) => forms.iter().position(|f| f.id() == Some(form_id)),
            None => control
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|a| a.value().name() == "form")
                .and_then(|form| nodes.iter().position(|id| *id == form.id())),
        };

        if let Some(index) = owner {
            forms[index].push_field(parse_field(control));
        }
    }

    forms
}

fn parse_field(control: ElementRef<'_>) -> FormField {
    let el = control.value();
    let name = el.attr("name").map(String::from);

    let mut field = match el.name() {
        "textarea" => {
            let text: String = control.text().collect();
            FormField::new(name, FieldKind::TextArea, text)
        }
        "select" => {
            let multiple = el.attr("multiple").is_some();
            let mut field = FormField::new(name, FieldKind::Select { multiple }, String::new());
            field.options = parse_options(control);
            field
        }
        "button" => {
            let kind = match el.attr("type").map(|t| t.to_ascii_lowercase()).as_deref() {
                Some("reset") => FieldKind::Reset,
                Some("button") => FieldKind::Button,
                _ => FieldKind::Submit,
            };
            FormField::new(name, kind, el.attr("value").unwrap_or_default().to_string())
        }
        _ => {
            let kind = FieldKind::from_input_type(el.attr("type"));
            let value = match (&kind, el.attr("value")) {
                (FieldKind::Checkbox | FieldKind::Radio, None) => "on".to_string(),
                (_, value) => value.unwrap_or_default().to_string(),
            };
            let mut field = FormField::new(name, kind, value);
            field.default_checked = el.attr("checked").is_some();
            field.checked = field.default_checked;
            field
        }
    };

    field.disabled = el.attr("disabled").is_some()
        || control
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| a.value().name() == "fieldset" && a.value().attr("disabled").is_some());

    field
}

fn parse_options(select: ElementRef<'_>) -> Vec<SelectOption> {
    let option_sel = selector("option");

    select
        .select(&option_sel)
        .map(|option| {
            let el = option.value();
            let value = match el.attr("value") {
                Some(v) => v.to_string(),
                None => collapse_whitespace(&option.text().collect::<String>()),
            };
            let in_disabled_group = option
                .parent()
                .and_then(ElementRef::wrap)
                .is_some_and(|p| p.value().name() == "optgroup" && p.value().attr("disabled").is_some());
            let selected = el.attr("selected").is_some();

            SelectOption {
                value,
                selected,
                default_selected: selected,
                disabled: el.attr("disabled").is_some() || in_disabled_group,
            }
        })
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
