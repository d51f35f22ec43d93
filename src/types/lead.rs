//! Lead types

use serde::{Deserialize, Serialize};

/// One logical slot of the lead schema that a source column can be mapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name as the lead service knows it (e.g. `firstName`)
    pub key: &'static str,
    /// Human readable label shown to the operator
    pub label: &'static str,
    pub required: bool,
}

impl FieldDef {
    pub const fn required(key: &'static str, label: &'static str) -> Self {
        Self { key, label, required: true }
    }

    pub const fn optional(key: &'static str, label: &'static str) -> Self {
        Self { key, label, required: false }
    }
}

/// CRM lead fields offered in the mapping step, in display order
pub const LEAD_FIELDS: &[FieldDef] = &[
    FieldDef::required("firstName", "First Name"),
    FieldDef::required("lastName", "Last Name"),
    FieldDef::optional("email", "Email"),
    FieldDef::optional("phone", "Phone"),
    FieldDef::optional("company", "Company"),
    FieldDef::optional("source", "Source"),
    FieldDef::optional("status", "Status"),
];

/// Look up a field definition by key (case-insensitive)
pub fn find_field<'a>(fields: &'a [FieldDef], key: &str) -> Option<&'a FieldDef> {
    fields.iter().find(|f| f.key.eq_ignore_ascii_case(key))
}

/// Request body for creating a lead
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub source: String,
    pub status: String,
    pub score: i32,
    pub assigned_to: Option<i64>,
}

impl CreateLeadRequest {
    /// Value of a schema field by key, as it will be sent
    pub fn field(&self, key: &str) -> Option<&str> {
        let value = match key {
            "firstName" => &self.first_name,
            "lastName" => &self.last_name,
            "email" => &self.email,
            "phone" => &self.phone,
            "company" => &self.company,
            "source" => &self.source,
            "status" => &self.status,
            _ => return None,
        };
        Some(value.as_str())
    }
}
