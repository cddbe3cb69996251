use serde::Serialize;

/// Value of a single snapshot entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EntryValue {
    Text(String),
    /// A file input with no file chosen: empty name, empty bytes.
    EmptyFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormEntry {
    pub name: String,
    pub value: EntryValue,
}

/// Ordered name/value pairs read from a form at the moment of submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormSnapshot {
    entries: Vec<FormEntry>,
}

impl FormSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push(FormEntry {
            name: name.into(),
            value: EntryValue::Text(value.into()),
        });
    }

    pub fn push_empty_file(&mut self, name: impl Into<String>) {
        self.entries.push(FormEntry {
            name: name.into(),
            value: EntryValue::EmptyFile,
        });
    }

    pub fn entries(&self) -> &[FormEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First text value recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find_map(|e| match &e.value {
            EntryValue::Text(v) if e.name == name => Some(v.as_str()),
            _ => None,
        })
    }

    /// Every text value recorded under `name`, in order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.name == name)
            .filter_map(|e| match &e.value {
                EntryValue::Text(v) => Some(v.as_str()),
                EntryValue::EmptyFile => None,
            })
            .collect()
    }

    /// Text entries as owned pairs; file entries are reported with an empty value.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|e| {
                let value = match &e.value {
                    EntryValue::Text(v) => v.clone(),
                    EntryValue::EmptyFile => String::new(),
                };
                (e.name.clone(), value)
            })
            .collect()
    }
}
