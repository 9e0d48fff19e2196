//! Build a Configuration from declarative options: fixed phases over one mutable accumulator.

use crate::config::resolved::{Configuration, TagBuilder, TypeHandler};
use crate::config::types::{ConfigOptions, TypeHandlerOptions};
use crate::data_source::{build_database, DbProviderManager, ProviderRegistry};
use crate::error::{BuildError, TypeResolutionError};
use crate::id_generator::{BuiltinIdGeneratorFactory, IdGeneratorFactory};
use crate::reflection::{TypeDescriptor, TypeRegistry, TypeResolver};
use crate::sql_map::{MemorySqlMapLoader, SqlMapLoader};
use std::fmt;
use std::sync::Arc;

/// Build phases in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildPhase {
    Properties,
    IdGenerator,
    TypeHandlers,
    TagBuilders,
    Database,
    SqlMaps,
    Settings,
}

impl BuildPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildPhase::Properties => "properties",
            BuildPhase::IdGenerator => "id_generator",
            BuildPhase::TypeHandlers => "type_handlers",
            BuildPhase::TagBuilders => "tag_builders",
            BuildPhase::Database => "database",
            BuildPhase::SqlMaps => "sql_maps",
            BuildPhase::Settings => "settings",
        }
    }
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type PhaseFn = fn(&OptionConfigBuilder, &mut Configuration) -> Result<(), BuildError>;

type BeforeHook = Box<dyn Fn() + Send + Sync>;
type AfterHook = Box<dyn Fn(&Configuration) + Send + Sync>;

/// Builds a [`Configuration`] from in-memory [`ConfigOptions`].
///
/// Collaborators default to the built-in registries and an empty SQL map loader;
/// replace them with the `with_*` methods before calling [`build`](Self::build).
pub struct OptionConfigBuilder {
    options: ConfigOptions,
    type_resolver: Arc<dyn TypeResolver>,
    sql_map_loader: Arc<dyn SqlMapLoader>,
    provider_registry: Arc<dyn ProviderRegistry>,
    id_generator_factory: Arc<dyn IdGeneratorFactory>,
    before_build: Vec<BeforeHook>,
    after_build: Vec<AfterHook>,
}

impl OptionConfigBuilder {
    const PHASES: [(BuildPhase, PhaseFn); 7] = [
        (BuildPhase::Properties, Self::build_properties),
        (BuildPhase::IdGenerator, Self::build_id_generator),
        (BuildPhase::TypeHandlers, Self::build_type_handlers),
        (BuildPhase::TagBuilders, Self::build_tag_builders),
        (BuildPhase::Database, Self::build_database),
        (BuildPhase::SqlMaps, Self::build_sql_maps),
        (BuildPhase::Settings, Self::build_settings),
    ];

    pub fn new(options: ConfigOptions) -> Self {
        OptionConfigBuilder {
            options,
            type_resolver: Arc::new(TypeRegistry::with_primitives()),
            sql_map_loader: Arc::new(MemorySqlMapLoader::new()),
            provider_registry: Arc::new(DbProviderManager::default()),
            id_generator_factory: Arc::new(BuiltinIdGeneratorFactory),
            before_build: Vec::new(),
            after_build: Vec::new(),
        }
    }

    pub fn with_type_resolver(mut self, resolver: Arc<dyn TypeResolver>) -> Self {
        self.type_resolver = resolver;
        self
    }

    pub fn with_sql_map_loader(mut self, loader: Arc<dyn SqlMapLoader>) -> Self {
        self.sql_map_loader = loader;
        self
    }

    pub fn with_provider_registry(mut self, registry: Arc<dyn ProviderRegistry>) -> Self {
        self.provider_registry = registry;
        self
    }

    pub fn with_id_generator_factory(mut self, factory: Arc<dyn IdGeneratorFactory>) -> Self {
        self.id_generator_factory = factory;
        self
    }

    pub fn on_before_build(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.before_build.push(Box::new(hook));
        self
    }

    pub fn on_after_build(
        mut self,
        hook: impl Fn(&Configuration) + Send + Sync + 'static,
    ) -> Self {
        self.after_build.push(Box::new(hook));
        self
    }

    /// Run every phase in order. The first failing phase aborts the build and
    /// nothing built so far is returned.
    pub fn build(&self) -> Result<Configuration, BuildError> {
        tracing::debug!("OptionConfigBuilder build starting");
        for hook in &self.before_build {
            hook();
        }

        let mut config = Configuration::default();
        for (phase, run) in Self::PHASES {
            tracing::debug!(phase = %phase, "build phase starting");
            if let Err(e) = run(self, &mut config) {
                tracing::warn!(phase = %phase, error = %e, "build phase failed");
                return Err(e);
            }
            tracing::debug!(phase = %phase, "build phase done");
        }

        for hook in &self.after_build {
            hook(&config);
        }
        tracing::debug!("OptionConfigBuilder build end");
        Ok(config)
    }

    fn build_properties(&self, config: &mut Configuration) -> Result<(), BuildError> {
        config.properties_mut().import(
            self.options
                .properties
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );
        Ok(())
    }

    fn build_id_generator(&self, config: &mut Configuration) -> Result<(), BuildError> {
        let Some(declared) = &self.options.id_generator else {
            return Ok(());
        };
        let generator = self
            .id_generator_factory
            .build(&declared.type_name, &declared.properties)?;
        config.set_id_generator(generator);
        Ok(())
    }

    fn build_type_handlers(&self, config: &mut Configuration) -> Result<(), BuildError> {
        for declared in &self.options.type_handlers {
            let handler = resolve_type_handler(declared, self.type_resolver.as_ref())?;
            if config.register_type_handler(handler).is_some() {
                tracing::debug!(name = %declared.name, "type handler redeclared, replacing");
            }
        }
        Ok(())
    }

    fn build_tag_builders(&self, config: &mut Configuration) -> Result<(), BuildError> {
        for declared in &self.options.tag_builders {
            let builder_type = self.type_resolver.resolve(&declared.type_name)?;
            let tag_builder = TagBuilder {
                name: declared.name.clone(),
                builder_type,
            };
            if config.register_tag_builder(tag_builder).is_some() {
                tracing::debug!(name = %declared.name, "tag builder redeclared, replacing");
            }
        }
        Ok(())
    }

    fn build_database(&self, config: &mut Configuration) -> Result<(), BuildError> {
        let database = build_database(&self.options.database, self.provider_registry.as_ref())?;
        config.set_database(database);
        Ok(())
    }

    fn build_sql_maps(&self, config: &mut Configuration) -> Result<(), BuildError> {
        for source in &self.options.smart_sql_maps {
            tracing::debug!(resource_kind = %source.kind, path = %source.path, "sql map starting");
            for sql_map in self.sql_map_loader.load(source.kind, &source.path)? {
                config.add_sql_map(sql_map)?;
            }
            tracing::debug!(resource_kind = %source.kind, path = %source.path, "sql map end");
        }
        Ok(())
    }

    fn build_settings(&self, config: &mut Configuration) -> Result<(), BuildError> {
        config.set_settings(self.options.settings.clone());
        Ok(())
    }
}

/// Resolve one declared handler. Property and field types are only resolved for
/// generic handler types; for anything else they stay unset even when declared.
pub fn resolve_type_handler(
    declared: &TypeHandlerOptions,
    resolver: &dyn TypeResolver,
) -> Result<TypeHandler, TypeResolutionError> {
    let handler_type = resolver.resolve(&declared.type_name)?;
    let mut handler = TypeHandler {
        name: declared.name.clone(),
        handler_type,
        property_type: None,
        field_type: None,
        properties: declared.properties.clone(),
    };
    if handler.handler_type.is_generic() {
        handler.property_type = resolve_optional(declared.property_type.as_deref(), resolver)?;
        handler.field_type = resolve_optional(declared.field_type.as_deref(), resolver)?;
    }
    Ok(handler)
}

fn resolve_optional(
    type_name: Option<&str>,
    resolver: &dyn TypeResolver,
) -> Result<Option<TypeDescriptor>, TypeResolutionError> {
    match type_name {
        Some(name) if !name.is_empty() => resolver.resolve(name).map(Some),
        _ => Ok(None),
    }
}
