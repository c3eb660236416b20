//! Setting Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of the global tax rate setting (percentage, `8` means 8%)
pub const GLOBAL_TAX_RATE_KEY: &str = "GLOBAL_TAX_RATE";

/// Declared type of a setting value
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "TEXT", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    #[default]
    String,
    Number,
    Boolean,
    Json,
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SettingType::String => "string",
            SettingType::Number => "number",
            SettingType::Boolean => "boolean",
            SettingType::Json => "json",
        };
        f.write_str(s)
    }
}

/// Key/value setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Setting {
    pub id: i64,
    pub key: String,
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub value_type: SettingType,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create setting payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingCreate {
    pub key: String,
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub value_type: Option<SettingType>,
    pub description: Option<String>,
}

/// Update setting payload (the key itself is immutable)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingUpdate {
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub value_type: Option<SettingType>,
    pub description: Option<String>,
}

impl Setting {
    pub fn is_tax_rate(&self) -> bool {
        self.key == GLOBAL_TAX_RATE_KEY
    }
}
