//! Declarative options supplied by the host application (PascalCase keys when deserialized).

use crate::error::OptionsError;
use crate::sql_map::ResourceKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SqlMapSource {
    #[serde(rename = "Type")]
    pub kind: ResourceKind,
    pub path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct TagBuilderOptions {
    pub name: String,
    #[serde(rename = "Type")]
    pub type_name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct TypeHandlerOptions {
    pub name: String,
    #[serde(rename = "Type")]
    pub type_name: String,
    /// Only consulted when the handler type is generic.
    #[serde(default)]
    pub property_type: Option<String>,
    /// Only consulted when the handler type is generic.
    #[serde(default)]
    pub field_type: Option<String>,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct IdGeneratorOptions {
    #[serde(rename = "Type")]
    pub type_name: String,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

/// Declared provider. Either a bare name ("MySql") or an object; unset fields are
/// filled from the provider registry.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", from = "DbProviderDecl")]
pub struct DbProviderOptions {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_name_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_name_suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select_auto_increment: Option<String>,
    /// Driver factory type for providers the registry does not know.
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub factory_type: Option<String>,
}

impl DbProviderOptions {
    pub fn named(name: impl Into<String>) -> Self {
        DbProviderOptions {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl From<&str> for DbProviderOptions {
    fn from(name: &str) -> Self {
        DbProviderOptions::named(name)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DbProviderDecl {
    Name(String),
    Full(DbProviderFields),
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DbProviderFields {
    name: String,
    #[serde(default)]
    parameter_prefix: Option<String>,
    #[serde(default)]
    parameter_name_prefix: Option<String>,
    #[serde(default)]
    parameter_name_suffix: Option<String>,
    #[serde(default)]
    select_auto_increment: Option<String>,
    #[serde(default, rename = "Type")]
    factory_type: Option<String>,
}

impl From<DbProviderDecl> for DbProviderOptions {
    fn from(decl: DbProviderDecl) -> Self {
        match decl {
            DbProviderDecl::Name(name) => DbProviderOptions::named(name),
            DbProviderDecl::Full(f) => DbProviderOptions {
                name: f.name,
                parameter_prefix: f.parameter_prefix,
                parameter_name_prefix: f.parameter_name_prefix,
                parameter_name_suffix: f.parameter_name_suffix,
                select_auto_increment: f.select_auto_increment,
                factory_type: f.factory_type,
            },
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct WriteSourceOptions {
    pub name: String,
    pub connection_string: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ReadSourceOptions {
    pub name: String,
    pub connection_string: String,
    /// Relative share of read traffic. 0 keeps the replica but never selects it.
    #[serde(default)]
    pub weight: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct DatabaseOptions {
    pub db_provider: DbProviderOptions,
    pub write: WriteSourceOptions,
    #[serde(default)]
    pub reads: Vec<ReadSourceOptions>,
}

/// Engine settings. Copied verbatim into the built configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct Settings {
    pub ignore_parameter_case: bool,
    pub parameter_prefix: String,
    pub is_cache_enabled: bool,
    pub enable_property_changed_track: bool,
    pub ignore_db_null: bool,
    /// Host-specific keys not modelled above.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            ignore_parameter_case: false,
            parameter_prefix: "$".into(),
            is_cache_enabled: false,
            enable_property_changed_track: false,
            ignore_db_null: false,
            extra: serde_json::Map::new(),
        }
    }
}

/// All declarative options in one struct for in-memory building.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigOptions {
    #[serde(default)]
    pub smart_sql_maps: Vec<SqlMapSource>,
    #[serde(default)]
    pub tag_builders: Vec<TagBuilderOptions>,
    #[serde(default)]
    pub type_handlers: Vec<TypeHandlerOptions>,
    #[serde(default)]
    pub properties: HashMap<String, String>,
    #[serde(default)]
    pub id_generator: Option<IdGeneratorOptions>,
    pub database: DatabaseOptions,
    #[serde(default)]
    pub settings: Settings,
}

impl ConfigOptions {
    pub fn from_json(value: serde_json::Value) -> Result<Self, OptionsError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(s)?)
    }
}
