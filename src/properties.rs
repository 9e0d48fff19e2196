//! Substitution properties: string key/value pairs referenced as `${key}` placeholders.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Properties {
    values: HashMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Properties {
            values: HashMap::new(),
        }
    }

    /// Merge `values` into the store. Existing keys are overwritten.
    pub fn import<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in values {
            self.values.insert(k.into(), v.into());
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Replace every `${key}` in `expr` with its stored value.
    /// e.g. "Data Source=${host}" -> "Data Source=db01". Unknown keys are kept as written.
    pub fn get_property_value(&self, expr: &str) -> String {
        PLACEHOLDER
            .replace_all(expr, |caps: &regex::Captures| match self.values.get(caps[1].trim()) {
                Some(v) => v.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
