//! Options-driven configuration builder for a SQL-mapping data-access engine.
//!
//! A host describes its SQL maps, tag builders, type handlers, id generator and
//! database topology as [`ConfigOptions`]; [`OptionConfigBuilder::build`] resolves
//! them into an immutable [`Configuration`].

pub mod config;
pub mod data_source;
pub mod error;
pub mod id_generator;
pub mod properties;
pub mod reflection;
pub mod sql_map;

pub use config::{
    resolve_type_handler, BuildPhase, ConfigOptions, Configuration, OptionConfigBuilder, Settings,
    TagBuilder, TypeHandler,
};
pub use data_source::{
    build_database, Database, DbProvider, DbProviderManager, ProviderRegistry, ReadDataSource,
    WriteDataSource,
};
pub use error::{
    BuildError, GeneratorConstructionError, LoadError, OptionsError, ProviderInitializationError,
    TypeResolutionError,
};
pub use id_generator::{BuiltinIdGeneratorFactory, IdGenerator, IdGeneratorFactory, SnowflakeId};
pub use properties::Properties;
pub use reflection::{TypeDescriptor, TypeRegistry, TypeResolver};
pub use sql_map::{MemorySqlMapLoader, ResourceKind, SqlMap, SqlMapLoader, Statement};
