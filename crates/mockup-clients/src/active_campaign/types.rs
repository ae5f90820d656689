//! Wire shapes of the ActiveCampaign v3 API. Ids travel as strings.
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Contact {
    pub id: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Field {
    pub id: String,
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldValue {
    pub id: String,
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct List {
    pub id: String,
    pub name: String,
}

/// Custom field input type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    Text,
    Dropdown,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldType::Text => "TEXT",
            FieldType::Dropdown => "DROPDOWN",
        })
    }
}

#[derive(Deserialize)]
pub(crate) struct ContactsPage {
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

#[derive(Deserialize)]
pub(crate) struct ContactEnvelope {
    pub contact: Contact,
}

#[derive(Deserialize)]
pub(crate) struct FieldsPage {
    #[serde(default)]
    pub fields: Vec<Field>,
}

#[derive(Deserialize)]
pub(crate) struct FieldEnvelope {
    pub field: Field,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FieldValuesPage {
    #[serde(default)]
    pub field_values: Vec<FieldValue>,
}

#[derive(Deserialize)]
pub(crate) struct ListsPage {
    #[serde(default)]
    pub lists: Vec<List>,
}

#[derive(Deserialize)]
pub(crate) struct ListEnvelope {
    pub list: List,
}

/// `stringid` of a list: lowercase name with every non `[a-z0-9]` char replaced by `-`.
pub fn list_string_id(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '-' })
        .collect()
}
