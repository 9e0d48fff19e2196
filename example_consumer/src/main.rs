//! Example consumer: builds a configuration from in-memory options and prints the topology.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Connection strings come from `WRITE_DATABASE_URL` / `READ_DATABASE_URL` (a `.env` file works).

use serde_json::json;
use sqlmap_options::{
    ConfigOptions, MemorySqlMapLoader, OptionConfigBuilder, ResourceKind, SqlMap, TypeDescriptor,
    TypeRegistry,
};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sqlmap_options=debug".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let write_url = env_or("WRITE_DATABASE_URL", "Server=localhost;Database=shop");
    let read_url = env_or("READ_DATABASE_URL", "Server=${ReadHost};Database=shop");

    let options = ConfigOptions::from_json(json!({
        "SmartSqlMaps": [{ "Type": "Embedded", "Path": "Maps/User.xml" }],
        "TagBuilders": [{ "Name": "Where", "Type": "WhereBuilder" }],
        "TypeHandlers": [{
            "Name": "json",
            "Type": "JsonTypeHandler<T>",
            "PropertyType": "String"
        }],
        "Properties": { "ReadHost": "replica01" },
        "IdGenerator": { "Type": "SnowflakeId", "Properties": { "WorkerId": "1" } },
        "Database": {
            "DbProvider": "MySql",
            "Write": { "Name": "primary", "ConnectionString": write_url },
            "Reads": [
                { "Name": "replica01", "ConnectionString": read_url, "Weight": 80 },
                { "Name": "reporting", "ConnectionString": read_url, "Weight": 0 }
            ]
        }
    }))?;

    let mut types = TypeRegistry::with_primitives();
    types
        .register_generic("JsonTypeHandler<T>", ["T"])
        .register(TypeDescriptor::named("WhereBuilder"));

    let user = SqlMap::new("User", "Maps/User.xml")
        .with_statement("GetById", "SELECT * FROM users WHERE id = ?Id");
    let mut maps = MemorySqlMapLoader::new();
    maps.insert(ResourceKind::Embedded, "Maps/User.xml", vec![user]);

    let config = OptionConfigBuilder::new(options)
        .with_type_resolver(Arc::new(types))
        .with_sql_map_loader(Arc::new(maps))
        .on_after_build(|c| {
            tracing::info!(sql_maps = c.sql_maps().len(), "configuration ready");
        })
        .build()?;

    let db = config.database();
    tracing::info!(
        provider = %db.db_provider.name,
        write = %db.write.name,
        reads = db.reads.len(),
        total_weight = db.total_read_weight(),
        "database topology"
    );
    for read in db.reads.values() {
        let connection = config
            .properties()
            .get_property_value(&read.connection_string);
        tracing::info!(
            name = %read.name,
            weight = read.weight,
            connection = %connection,
            "read replica"
        );
    }
    if let Some(generator) = config.id_generator() {
        tracing::info!(id = generator.next_id(), "sample id");
    }
    Ok(())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
