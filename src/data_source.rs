//! Database topology: one write endpoint and weighted read replicas sharing a single provider.

use crate::config::{DatabaseOptions, DbProviderOptions};
use crate::error::ProviderInitializationError;
use std::collections::HashMap;

/// A database provider kind with its SQL parameter conventions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DbProvider {
    pub name: String,
    pub parameter_prefix: String,
    pub parameter_name_prefix: String,
    pub parameter_name_suffix: String,
    /// Statement appended to inserts to fetch the generated key, if the provider has one.
    pub select_auto_increment: String,
    pub factory_type: Option<String>,
}

impl DbProvider {
    fn builtin(
        name: &str,
        parameter_prefix: &str,
        parameter_name_prefix: &str,
        parameter_name_suffix: &str,
        select_auto_increment: &str,
    ) -> Self {
        DbProvider {
            name: name.to_string(),
            parameter_prefix: parameter_prefix.to_string(),
            parameter_name_prefix: parameter_name_prefix.to_string(),
            parameter_name_suffix: parameter_name_suffix.to_string(),
            select_auto_increment: select_auto_increment.to_string(),
            factory_type: None,
        }
    }
}

/// Normalizes a declared provider into a fully initialized one.
pub trait ProviderRegistry: Send + Sync {
    fn resolve_or_init(
        &self,
        declared: &DbProviderOptions,
    ) -> Result<DbProvider, ProviderInitializationError>;
}

/// Provider registry seeded with the providers the engine ships support for.
#[derive(Clone, Debug)]
pub struct DbProviderManager {
    /// Keyed by lowercased provider name.
    known: HashMap<String, DbProvider>,
}

impl Default for DbProviderManager {
    fn default() -> Self {
        let mut manager = DbProviderManager {
            known: HashMap::new(),
        };
        for provider in [
            DbProvider::builtin("SqlServer", "@", "@", "", "; SELECT SCOPE_IDENTITY();"),
            DbProvider::builtin("MySql", "?", "?", "", "; SELECT LAST_INSERT_ID();"),
            DbProvider::builtin("MySqlConnector", "?", "?", "", "; SELECT LAST_INSERT_ID();"),
            DbProvider::builtin("PostgreSql", "@", ":", "", " RETURNING *;"),
            DbProvider::builtin("Oracle", ":", ":", "", ""),
            DbProvider::builtin("SQLite", "$", "$", "", "; SELECT LAST_INSERT_ROWID();"),
        ] {
            manager.register(provider);
        }
        manager
    }
}

impl DbProviderManager {
    /// Add or replace a known provider. Lookup is case-insensitive.
    pub fn register(&mut self, provider: DbProvider) -> &mut Self {
        self.known.insert(provider.name.to_lowercase(), provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<&DbProvider> {
        self.known.get(&name.to_lowercase())
    }
}

impl ProviderRegistry for DbProviderManager {
    fn resolve_or_init(
        &self,
        declared: &DbProviderOptions,
    ) -> Result<DbProvider, ProviderInitializationError> {
        if declared.name.trim().is_empty() {
            return Err(ProviderInitializationError::Misconfigured {
                name: declared.name.clone(),
                reason: "provider name is empty".into(),
            });
        }
        let base = match self.get(&declared.name) {
            Some(known) => known.clone(),
            None => {
                if declared.factory_type.is_none() {
                    return Err(ProviderInitializationError::Unknown(declared.name.clone()));
                }
                if declared.parameter_prefix.is_none() {
                    return Err(ProviderInitializationError::Misconfigured {
                        name: declared.name.clone(),
                        reason: "custom provider requires ParameterPrefix".into(),
                    });
                }
                DbProvider::default()
            }
        };
        let parameter_prefix = declared
            .parameter_prefix
            .clone()
            .unwrap_or(base.parameter_prefix);
        Ok(DbProvider {
            // Declared spelling is kept; only the conventions are normalized.
            name: declared.name.clone(),
            parameter_name_prefix: declared
                .parameter_name_prefix
                .clone()
                .unwrap_or_else(|| {
                    if base.parameter_name_prefix.is_empty() {
                        parameter_prefix.clone()
                    } else {
                        base.parameter_name_prefix
                    }
                }),
            parameter_prefix,
            parameter_name_suffix: declared
                .parameter_name_suffix
                .clone()
                .unwrap_or(base.parameter_name_suffix),
            select_auto_increment: declared
                .select_auto_increment
                .clone()
                .unwrap_or(base.select_auto_increment),
            factory_type: declared.factory_type.clone().or(base.factory_type),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteDataSource {
    pub name: String,
    pub db_provider: DbProvider,
    pub connection_string: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadDataSource {
    pub name: String,
    pub db_provider: DbProvider,
    pub connection_string: String,
    /// Relative selection weight for the read router; 0 = never picked by weighted routing.
    pub weight: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Database {
    pub db_provider: DbProvider,
    pub write: WriteDataSource,
    pub reads: HashMap<String, ReadDataSource>,
}

impl Database {
    pub fn read(&self, name: &str) -> Option<&ReadDataSource> {
        self.reads.get(name)
    }

    /// Sum of read weights. 0 means all reads fall back to the write endpoint.
    pub fn total_read_weight(&self) -> u64 {
        self.reads.values().map(|r| u64::from(r.weight)).sum()
    }
}

/// Build the topology from declared options. The provider is resolved once and
/// copied onto every endpoint. Duplicate read names: the later declaration wins.
pub fn build_database(
    options: &DatabaseOptions,
    providers: &dyn ProviderRegistry,
) -> Result<Database, ProviderInitializationError> {
    let db_provider = providers.resolve_or_init(&options.db_provider)?;

    let write = WriteDataSource {
        name: options.write.name.clone(),
        db_provider: db_provider.clone(),
        connection_string: options.write.connection_string.clone(),
    };

    let mut reads = HashMap::with_capacity(options.reads.len());
    for r in &options.reads {
        let read = ReadDataSource {
            name: r.name.clone(),
            db_provider: db_provider.clone(),
            connection_string: r.connection_string.clone(),
            weight: r.weight,
        };
        if reads.insert(r.name.clone(), read).is_some() {
            tracing::debug!(name = %r.name, "read data source redeclared, replacing");
        }
    }

    Ok(Database {
        db_provider,
        write,
        reads,
    })
}
