//! Built configuration: options resolved and frozen for runtime use.

use crate::config::Settings;
use crate::data_source::Database;
use crate::error::BuildError;
use crate::id_generator::IdGenerator;
use crate::properties::Properties;
use crate::reflection::TypeDescriptor;
use crate::sql_map::{SqlMap, Statement};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeHandler {
    pub name: String,
    pub handler_type: TypeDescriptor,
    /// Only set for generic handler types.
    pub property_type: Option<TypeDescriptor>,
    /// Only set for generic handler types.
    pub field_type: Option<TypeDescriptor>,
    pub properties: HashMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagBuilder {
    pub name: String,
    pub builder_type: TypeDescriptor,
}

/// The finished configuration. Read-only once returned from a build; rebuilding
/// produces a new value.
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    properties: Properties,
    sql_maps: HashMap<String, SqlMap>,
    tag_builders: HashMap<String, TagBuilder>,
    type_handlers: HashMap<String, TypeHandler>,
    /// None = the engine falls back to database-native key generation.
    id_generator: Option<Arc<dyn IdGenerator>>,
    database: Database,
    settings: Settings,
}

impl Configuration {
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn sql_maps(&self) -> &HashMap<String, SqlMap> {
        &self.sql_maps
    }

    pub fn sql_map(&self, scope: &str) -> Option<&SqlMap> {
        self.sql_maps.get(scope)
    }

    /// Look up a statement by its full id, "Scope.StatementId".
    pub fn statement(&self, full_id: &str) -> Option<&Statement> {
        let (scope, id) = full_id.split_once('.')?;
        self.sql_maps.get(scope)?.statements.get(id)
    }

    pub fn tag_builders(&self) -> &HashMap<String, TagBuilder> {
        &self.tag_builders
    }

    pub fn tag_builder(&self, name: &str) -> Option<&TagBuilder> {
        self.tag_builders.get(name)
    }

    pub fn type_handlers(&self) -> &HashMap<String, TypeHandler> {
        &self.type_handlers
    }

    pub fn type_handler(&self, name: &str) -> Option<&TypeHandler> {
        self.type_handlers.get(name)
    }

    pub fn id_generator(&self) -> Option<&Arc<dyn IdGenerator>> {
        self.id_generator.as_ref()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    pub(crate) fn set_id_generator(&mut self, generator: Arc<dyn IdGenerator>) {
        self.id_generator = Some(generator);
    }

    /// Returns the handler previously registered under the same name.
    pub(crate) fn register_type_handler(&mut self, handler: TypeHandler) -> Option<TypeHandler> {
        self.type_handlers.insert(handler.name.clone(), handler)
    }

    pub(crate) fn register_tag_builder(&mut self, tag_builder: TagBuilder) -> Option<TagBuilder> {
        let name = tag_builder.name.clone();
        self.tag_builders.insert(name, tag_builder)
    }

    /// Replaces any prior topology wholesale.
    pub(crate) fn set_database(&mut self, database: Database) {
        self.database = database;
    }

    pub(crate) fn add_sql_map(&mut self, sql_map: SqlMap) -> Result<(), BuildError> {
        if self.sql_maps.contains_key(&sql_map.scope) {
            return Err(BuildError::DuplicateSqlMap(sql_map.scope));
        }
        self.sql_maps.insert(sql_map.scope.clone(), sql_map);
        Ok(())
    }

    pub(crate) fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }
}

/// Generators compare by the type they were built from.
impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.properties == other.properties
            && self.sql_maps == other.sql_maps
            && self.tag_builders == other.tag_builders
            && self.type_handlers == other.type_handlers
            && generator_name(&self.id_generator) == generator_name(&other.id_generator)
            && self.database == other.database
            && self.settings == other.settings
    }
}

fn generator_name(generator: &Option<Arc<dyn IdGenerator>>) -> Option<&str> {
    generator.as_ref().map(|g| g.name())
}
