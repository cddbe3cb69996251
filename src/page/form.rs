use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use url::Url;

use crate::net::error::SubmitError;
use crate::page::error::PageError;
use crate::page::snapshot::FormSnapshot;

/// Shared handle to a form element. Handles outlive body replacement; a
/// handle to a replaced form stays usable but is detached from the page.
pub type FormHandle = Arc<Mutex<FormElement>>;

/// Lock a form handle, recovering the element if a holder panicked.
pub fn lock_form(form: &FormHandle) -> MutexGuard<'_, FormElement> {
    form.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Method reflection
// ============================================================================

/// The reflected value of a form's `method` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Get,
    Post,
    Dialog,
}

impl FormMethod {
    /// Missing and unknown values reflect as `get`; matching ignores ASCII case.
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("post") => FormMethod::Post,
            Some("dialog") => FormMethod::Dialog,
            _ => FormMethod::Get,
        }
    }

    /// Method token as it goes on the wire. Only the standard verbs are
    /// upper-cased; `dialog` is sent as written.
    pub fn request_method(&self) -> &'static str {
        match self {
            FormMethod::Get => "GET",
            FormMethod::Post => "POST",
            FormMethod::Dialog => "dialog",
        }
    }

    pub fn allows_body(&self) -> bool {
        !matches!(self, FormMethod::Get)
    }
}

impl fmt::Display for FormMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FormMethod::Get => "get",
            FormMethod::Post => "post",
            FormMethod::Dialog => "dialog",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Fields
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Any input whose value is plain text: text, hidden, email, password, ...
    Text { input_type: String },
    Checkbox,
    Radio,
    File,
    Submit,
    Button,
    Reset,
    Image,
    TextArea,
    Select { multiple: bool },
}

impl FieldKind {
    pub fn from_input_type(input_type: Option<&str>) -> Self {
        let t = input_type
            .map(|t| t.trim().to_ascii_lowercase())
            .unwrap_or_default();
        match t.as_str() {
            "checkbox" => FieldKind::Checkbox,
            "radio" => FieldKind::Radio,
            "file" => FieldKind::File,
            "submit" => FieldKind::Submit,
            "button" => FieldKind::Button,
            "reset" => FieldKind::Reset,
            "image" => FieldKind::Image,
            "" => FieldKind::Text { input_type: "text".into() },
            other => FieldKind::Text { input_type: other.into() },
        }
    }

    fn is_checkable(&self) -> bool {
        matches!(self, FieldKind::Checkbox | FieldKind::Radio)
    }

    fn is_button(&self) -> bool {
        matches!(
            self,
            FieldKind::Submit | FieldKind::Button | FieldKind::Reset | FieldKind::Image
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub selected: bool,
    pub default_selected: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: Option<String>,
    pub kind: FieldKind,
    pub value: String,
    pub default_value: String,
    pub checked: bool,
    pub default_checked: bool,
    pub disabled: bool,
    pub options: Vec<SelectOption>,
}

impl FormField {
    pub fn new(name: Option<String>, kind: FieldKind, default_value: String) -> Self {
        Self {
            name,
            kind,
            value: default_value.clone(),
            default_value,
            checked: false,
            default_checked: false,
            disabled: false,
            options: Vec::new(),
        }
    }

    fn has_name(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    /// Indices of the options that count as selected. A single select keeps
    /// only its last selected option, and falls back to its first enabled
    /// option when none is selected.
    fn selected_options(&self) -> Vec<usize> {
        let mut picked = self
            .options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.selected)
            .map(|(i, _)| i);

        match self.kind {
            FieldKind::Select { multiple: false } => picked
                .next_back()
                .or_else(|| self.options.iter().position(|o| !o.disabled))
                .into_iter()
                .collect(),
            _ => picked.collect(),
        }
    }

    fn reset(&mut self) {
        self.value = self.default_value.clone();
        self.checked = self.default_checked;
        for option in &mut self.options {
            option.selected = option.default_selected;
        }
    }
}

// ============================================================================
// Form element
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormElement {
    id: Option<String>,
    action: Option<String>,
    method: Option<String>,
    enctype: Option<String>,
    fields: Vec<FormField>,
    connected: bool,
}

impl FormElement {
    pub fn new(
        id: Option<String>,
        action: Option<String>,
        method: Option<String>,
        enctype: Option<String>,
    ) -> Self {
        Self {
            id,
            action,
            method,
            enctype,
            fields: Vec::new(),
            connected: true,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn action_attribute(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn set_action(&mut self, action: impl Into<String>) {
        self.action = Some(action.into());
    }

    pub fn method_attribute(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn set_method(&mut self, method: impl Into<String>) {
        self.method = Some(method.into());
    }

    pub fn method(&self) -> FormMethod {
        FormMethod::from_attribute(self.method.as_deref())
    }

    /// The `enctype` attribute. The body is always sent as multipart form
    /// data regardless of this value.
    pub fn enctype_attribute(&self) -> Option<&str> {
        self.enctype.as_deref()
    }

    /// The reflected `action`: the page URL when the attribute is missing or
    /// empty, otherwise the attribute resolved against the page URL.
    pub fn resolve_action(&self, page_url: &Url) -> Result<Url, SubmitError> {
        match self.action.as_deref().map(str::trim) {
            None | Some("") => Ok(page_url.clone()),
            Some(action) => page_url
                .join(action)
                .map_err(|source| SubmitError::InvalidAction {
                    action: action.to_string(),
                    source,
                }),
        }
    }

    /// False once the page body this form came from has been replaced.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub(crate) fn detach(&mut self) {
        self.connected = false;
    }

    pub fn push_field(&mut self, field: FormField) {
        self.fields.push(field);
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.has_name(name))
    }

    fn label(&self) -> String {
        self.id.clone().unwrap_or_default()
    }

    fn field_not_found(&self, name: &str) -> PageError {
        PageError::FieldNotFound {
            form: self.label(),
            field: name.to_string(),
        }
    }

    /// Set the current value of the first field called `name`, as typing into
    /// it would. Checkboxes and radios are matched by value and checked; a
    /// select picks the option with that value.
    pub fn set_value(&mut self, name: &str, value: &str) -> Result<(), PageError> {
        let index = self
            .fields
            .iter()
            .position(|f| f.has_name(name))
            .ok_or_else(|| self.field_not_found(name))?;

        match self.fields[index].kind.clone() {
            FieldKind::Select { .. } => self.select_option(name, value),
            FieldKind::Checkbox | FieldKind::Radio => self.set_checked(name, value, true),
            _ => {
                self.fields[index].value = value.to_string();
                Ok(())
            }
        }
    }

    /// Check or uncheck the checkbox/radio called `name` whose value is
    /// `value`. Controls without a value attribute carry `"on"`.
    /// Checking a radio unchecks the rest of its group.
    pub fn set_checked(&mut self, name: &str, value: &str, checked: bool) -> Result<(), PageError> {
        let index = self
            .fields
            .iter()
            .position(|f| f.has_name(name) && f.kind.is_checkable() && f.value == value)
            .ok_or_else(|| self.field_not_found(name))?;

        if checked && self.fields[index].kind == FieldKind::Radio {
            for field in self.fields.iter_mut() {
                if field.kind == FieldKind::Radio && field.has_name(name) {
                    field.checked = false;
                }
            }
        }
        self.fields[index].checked = checked;
        Ok(())
    }

    /// Select the option with `value`. Single selects drop their previous
    /// selection; multiple selects add to it.
    pub fn select_option(&mut self, name: &str, value: &str) -> Result<(), PageError> {
        let not_found = self.field_not_found(name);
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.has_name(name) && matches!(f.kind, FieldKind::Select { .. }))
            .ok_or(not_found)?;

        let position = field
            .options
            .iter()
            .position(|o| o.value == value)
            .ok_or_else(|| PageError::OptionNotFound {
                field: name.to_string(),
                value: value.to_string(),
            })?;

        if field.kind == (FieldKind::Select { multiple: false }) {
            for option in field.options.iter_mut() {
                option.selected = false;
            }
        }
        field.options[position].selected = true;
        Ok(())
    }

    /// Capture the form's current entries in tree order.
    pub fn snapshot(&self) -> FormSnapshot {
        let mut snapshot = FormSnapshot::new();

        for field in &self.fields {
            let name = match field.name.as_deref() {
                Some(n) if !n.is_empty() => n,
                _ => continue,
            };
            if field.disabled || field.kind.is_button() {
                continue;
            }

            match &field.kind {
                FieldKind::Checkbox | FieldKind::Radio => {
                    if field.checked {
                        snapshot.push_text(name, field.value.clone());
                    }
                }
                FieldKind::Select { .. } => {
                    for i in field.selected_options() {
                        let option = &field.options[i];
                        if !option.disabled {
                            snapshot.push_text(name, option.value.clone());
                        }
                    }
                }
                FieldKind::File => snapshot.push_empty_file(name),
                _ => snapshot.push_text(name, field.value.clone()),
            }
        }

        snapshot
    }

    /// Restore every field to its default value, checkedness and selection.
    pub fn reset(&mut self) {
        for field in self.fields.iter_mut() {
            field.reset();
        }
    }
}
