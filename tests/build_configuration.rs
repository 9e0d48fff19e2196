use serde_json::json;
use sqlmap_options::{
    BuildError, ConfigOptions, LoadError, MemorySqlMapLoader, OptionConfigBuilder,
    ProviderInitializationError, ResourceKind, SqlMap, TypeDescriptor, TypeRegistry,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

struct MyDto;

fn type_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::with_primitives();
    registry
        .register_generic("GenericJsonHandler<T>", ["T"])
        .register(TypeDescriptor::named("PlainStringHandler"))
        .register_type::<MyDto>("MyDto")
        .register(TypeDescriptor::named("WhereBuilder"));
    registry
}

fn loader() -> MemorySqlMapLoader {
    let user = SqlMap::new("User", "Maps/User.xml")
        .with_statement("GetById", "SELECT * FROM users WHERE id = ?Id");
    let order = SqlMap::new("Order", "Maps/Orders/Order.xml")
        .with_statement("Insert", "INSERT INTO orders VALUES (?Id)");
    let orders = vec![order, SqlMap::new("OrderItem", "Maps/Orders/OrderItem.xml")];

    let mut loader = MemorySqlMapLoader::new();
    loader
        .insert(ResourceKind::File, "Maps/User.xml", vec![user])
        .insert(ResourceKind::Directory, "Maps/Orders", orders);
    loader
}

fn options() -> serde_json::Value {
    json!({
        "SmartSqlMaps": [
            { "Type": "File", "Path": "Maps/User.xml" },
            { "Type": "Directory", "Path": "Maps/Orders" }
        ],
        "TagBuilders": [{ "Name": "Where", "Type": "WhereBuilder" }],
        "TypeHandlers": [
            {
                "Name": "json",
                "Type": "GenericJsonHandler<T>",
                "PropertyType": "MyDto",
                "FieldType": "String"
            },
            { "Name": "plain", "Type": "PlainStringHandler", "PropertyType": "MyDto" }
        ],
        "Properties": { "ReadHost": "replica01" },
        "IdGenerator": { "Type": "SnowflakeId", "Properties": { "WorkerId": "7" } },
        "Database": {
            "DbProvider": "mysql",
            "Write": { "Name": "w", "ConnectionString": "csw" },
            "Reads": [
                { "Name": "r1", "ConnectionString": "cs1", "Weight": 70 },
                { "Name": "r2", "ConnectionString": "cs2", "Weight": 30 }
            ]
        },
        "Settings": { "IgnoreParameterCase": true }
    })
}

fn builder(options: serde_json::Value) -> OptionConfigBuilder {
    OptionConfigBuilder::new(ConfigOptions::from_json(options).unwrap())
        .with_type_resolver(Arc::new(type_registry()))
        .with_sql_map_loader(Arc::new(loader()))
}

#[test]
fn builds_every_section_from_options() {
    let config = builder(options()).build().unwrap();

    assert_eq!(config.properties().get("ReadHost"), Some("replica01"));
    let server = config.properties().get_property_value("Server=${ReadHost}");
    assert_eq!(server, "Server=replica01");

    assert_eq!(config.sql_maps().len(), 3);
    assert!(config.statement("User.GetById").is_some());
    assert!(config.statement("Order.Insert").is_some());

    let json = config.type_handler("json").unwrap();
    assert_eq!(json.property_type.as_ref().unwrap().name, "MyDto");
    assert_eq!(json.field_type.as_ref().unwrap().name, "String");
    let plain = config.type_handler("plain").unwrap();
    assert!(plain.property_type.is_none());
    assert!(plain.field_type.is_none());

    let where_builder = config.tag_builder("Where").unwrap();
    assert_eq!(where_builder.builder_type.name, "WhereBuilder");

    let generator = config.id_generator().unwrap();
    assert_eq!(generator.name(), "SnowflakeId");
    assert!(generator.next_id() < generator.next_id());

    assert!(config.settings().ignore_parameter_case);
}

#[test]
fn weighted_read_topology() {
    let config = builder(options()).build().unwrap();
    let db = config.database();

    assert_eq!(db.write.name, "w");
    assert_eq!(db.write.connection_string, "csw");
    assert_eq!(db.reads.len(), 2);
    assert_eq!(db.reads["r1"].weight, 70);
    assert_eq!(db.reads["r2"].weight, 30);
    assert_eq!(db.db_provider.name, "mysql");
    assert_eq!(db.write.db_provider, db.db_provider);
    for read in db.reads.values() {
        assert_eq!(read.db_provider, db.db_provider);
    }
}

#[test]
fn rebuilding_unchanged_options_is_idempotent() {
    let builder = builder(options());
    let first = builder.build().unwrap();
    let second = builder.build().unwrap();
    assert_eq!(first, second);
}

#[test]
fn missing_id_generator_is_a_valid_state() {
    let mut value = options();
    value.as_object_mut().unwrap().remove("IdGenerator");
    let config = builder(value).build().unwrap();
    assert!(config.id_generator().is_none());
}

#[test]
fn sql_map_load_failure_aborts_the_build() {
    let mut value = options();
    value["SmartSqlMaps"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "Type": "Embedded", "Path": "Missing.xml" }));

    let after_ran = Arc::new(AtomicBool::new(false));
    let flag = after_ran.clone();
    let err = builder(value)
        .on_after_build(move |_| flag.store(true, Ordering::SeqCst))
        .build()
        .unwrap_err();

    assert_eq!(
        err,
        BuildError::Load(LoadError::NotFound {
            kind: ResourceKind::Embedded,
            path: "Missing.xml".into()
        })
    );
    assert!(!after_ran.load(Ordering::SeqCst));
}

#[test]
fn unknown_provider_aborts_the_build() {
    let mut value = options();
    value["Database"]["DbProvider"] = json!("Informix");
    let err = builder(value).build().unwrap_err();
    assert_eq!(
        err,
        BuildError::ProviderInitialization(ProviderInitializationError::Unknown(
            "Informix".into()
        ))
    );
}

#[test]
fn bad_id_generator_aborts_the_build() {
    let mut value = options();
    value["IdGenerator"]["Type"] = json!("Guid");
    let err = builder(value).build().unwrap_err();
    assert!(matches!(err, BuildError::GeneratorConstruction(_)));
}

#[test]
fn same_scope_from_two_sources_is_rejected() {
    let mut value = options();
    value["SmartSqlMaps"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "Type": "File", "Path": "Maps/User.xml" }));
    let err = builder(value).build().unwrap_err();
    assert_eq!(err, BuildError::DuplicateSqlMap("User".into()));
}

#[test]
fn built_configuration_is_shared_read_only() {
    let config = Arc::new(builder(options()).build().unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let config = Arc::clone(&config);
            thread::spawn(move || {
                config.database().reads.len() + config.sql_maps().len()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 5);
    }
}
