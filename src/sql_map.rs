//! SQL map definitions and the loader seam that produces them from (resource kind, path).

use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Where a SQL map source lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    File,
    Directory,
    DirectoryWithAllSub,
    Embedded,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::File => "File",
            ResourceKind::Directory => "Directory",
            ResourceKind::DirectoryWithAllSub => "DirectoryWithAllSub",
            ResourceKind::Embedded => "Embedded",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub id: String,
    pub sql: String,
}

/// One statement map: a scope plus the statements declared under it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlMap {
    pub scope: String,
    /// Source path this map was loaded from.
    pub path: String,
    pub statements: HashMap<String, Statement>,
}

impl SqlMap {
    pub fn new(scope: impl Into<String>, path: impl Into<String>) -> Self {
        SqlMap {
            scope: scope.into(),
            path: path.into(),
            statements: HashMap::new(),
        }
    }

    pub fn with_statement(mut self, id: impl Into<String>, sql: impl Into<String>) -> Self {
        let id = id.into();
        self.statements.insert(
            id.clone(),
            Statement {
                id,
                sql: sql.into(),
            },
        );
        self
    }
}

/// Loads SQL maps for a declared source. Implementations own parsing and I/O.
pub trait SqlMapLoader: Send + Sync {
    fn load(&self, kind: ResourceKind, path: &str) -> Result<Vec<SqlMap>, LoadError>;
}

/// Loader backed by maps registered up front, keyed by (kind, path).
#[derive(Clone, Debug, Default)]
pub struct MemorySqlMapLoader {
    sources: HashMap<(ResourceKind, String), Vec<SqlMap>>,
}

impl MemorySqlMapLoader {
    pub fn new() -> Self {
        MemorySqlMapLoader {
            sources: HashMap::new(),
        }
    }

    /// Add maps for a source. Repeated calls for the same source append.
    pub fn insert(
        &mut self,
        kind: ResourceKind,
        path: impl Into<String>,
        maps: Vec<SqlMap>,
    ) -> &mut Self {
        self.sources
            .entry((kind, path.into()))
            .or_default()
            .extend(maps);
        self
    }
}

impl SqlMapLoader for MemorySqlMapLoader {
    fn load(&self, kind: ResourceKind, path: &str) -> Result<Vec<SqlMap>, LoadError> {
        self.sources
            .get(&(kind, path.to_string()))
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                kind,
                path: path.to_string(),
            })
    }
}
