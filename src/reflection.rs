//! Type-name resolution: maps declared type names to runtime type descriptors.

use crate::error::TypeResolutionError;
use std::any::TypeId;
use std::collections::HashMap;

/// A resolved runtime type. Generic types carry their parameter names.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub name: String,
    pub generic_params: Vec<String>,
    /// Set when the descriptor was registered from a concrete Rust type.
    pub type_id: Option<TypeId>,
}

impl TypeDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        TypeDescriptor {
            name: name.into(),
            generic_params: Vec::new(),
            type_id: None,
        }
    }

    pub fn of<T: 'static>(name: impl Into<String>) -> Self {
        TypeDescriptor {
            name: name.into(),
            generic_params: Vec::new(),
            type_id: Some(TypeId::of::<T>()),
        }
    }

    pub fn generic<I, S>(name: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeDescriptor {
            name: name.into(),
            generic_params: params.into_iter().map(Into::into).collect(),
            type_id: None,
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_params.is_empty()
    }
}

/// Resolves a type name to a descriptor. Exact name match; no fallbacks.
pub trait TypeResolver: Send + Sync {
    fn resolve(&self, type_name: &str) -> Result<TypeDescriptor, TypeResolutionError>;
}

/// Static in-memory type registry.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    by_name: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry {
            by_name: HashMap::new(),
        }
    }

    /// Registry pre-populated with Rust primitive and string type names.
    pub fn with_primitives() -> Self {
        let mut registry = TypeRegistry::new();
        registry
            .register_type::<bool>("bool")
            .register_type::<i8>("i8")
            .register_type::<i16>("i16")
            .register_type::<i32>("i32")
            .register_type::<i64>("i64")
            .register_type::<u8>("u8")
            .register_type::<u16>("u16")
            .register_type::<u32>("u32")
            .register_type::<u64>("u64")
            .register_type::<f32>("f32")
            .register_type::<f64>("f64")
            .register_type::<char>("char")
            .register_type::<String>("String");
        registry
    }

    pub fn register(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        self.by_name.insert(descriptor.name.clone(), descriptor);
        self
    }

    pub fn register_type<T: 'static>(&mut self, name: &str) -> &mut Self {
        self.register(TypeDescriptor::of::<T>(name))
    }

    pub fn register_generic<I, S>(&mut self, name: &str, params: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(TypeDescriptor::generic(name, params))
    }
}

impl TypeResolver for TypeRegistry {
    fn resolve(&self, type_name: &str) -> Result<TypeDescriptor, TypeResolutionError> {
        self.by_name
            .get(type_name)
            .cloned()
            .ok_or_else(|| TypeResolutionError::NotFound {
                type_name: type_name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_registered_names_exactly() {
        let mut registry = TypeRegistry::with_primitives();
        registry.register_generic("GenericJsonHandler<T>", ["T"]);

        let string = registry.resolve("String").unwrap();
        assert_eq!(string.type_id, Some(TypeId::of::<String>()));
        assert!(!string.is_generic());

        let handler = registry.resolve("GenericJsonHandler<T>").unwrap();
        assert!(handler.is_generic());
        assert_eq!(handler.generic_params, vec!["T".to_string()]);

        assert!(registry.resolve("GenericJsonHandler").is_err());
        assert!(registry.resolve("string").is_err());
    }

    #[test]
    fn missing_type_names_the_offender() {
        let err = TypeRegistry::new().resolve("MyDto").unwrap_err();
        assert_eq!(
            err,
            TypeResolutionError::NotFound {
                type_name: "MyDto".into()
            }
        );
        assert!(err.to_string().contains("MyDto"));
    }
}
