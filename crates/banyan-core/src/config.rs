use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// Site configuration, kept as loosely-typed JSON so user config files can
/// carry partial trees that deep-merge over the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct BanyanConfig(Value);

impl Default for BanyanConfig {
    fn default() -> Self {
        Self::site_defaults()
    }
}

impl BanyanConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Built-in defaults; a loaded config file deep-merges over these.
    pub fn site_defaults() -> Self {
        let mut cfg = Self::empty_object();
        cfg.set_value("store.path", Value::String("family_tree.json".into()));
        cfg.set_value("family.excludeSpurious", Value::Bool(false));
        cfg.set_value("family.maxGreatLevels", Value::from(3));
        cfg.set_value("layout.rowGap", Value::from(72.0));
        cfg.set_value("layout.nodeGap", Value::from(24.0));
        cfg.set_value("layout.nodePadding", Value::from(10.0));
        cfg
    }

    /// Loads a json5 config file and merges it over the site defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        let value: Value = json5::from_str(&text).map_err(|e| Error::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut cfg = Self::site_defaults();
        cfg.deep_merge(&value);
        Ok(cfg)
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.lookup(dotted_path)?.as_str()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.lookup(dotted_path)?.as_bool()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        let v = self.lookup(dotted_path)?;
        v.as_f64()
            .or_else(|| v.as_i64().map(|n| n as f64))
            .or_else(|| v.as_u64().map(|n| n as f64))
    }

    pub fn get_u32(&self, dotted_path: &str) -> Option<u32> {
        self.lookup(dotted_path)?.as_u64().map(|n| n as u32)
    }

    /// Returns the named top-level section, erroring like the original INI
    /// loader did when a required section is absent.
    pub fn require_section(&self, section: &str) -> Result<&Map<String, Value>> {
        self.0
            .get(section)
            .and_then(Value::as_object)
            .ok_or_else(|| Error::MissingConfigSection {
                section: section.to_string(),
            })
    }

    fn lookup(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        // Callers can construct a config from any JSON value via `from_value`.
        // Configs are objects; coerce so this API never panics on user input.
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                match base_map.get_mut(key) {
                    Some(slot) => deep_merge_value(slot, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base_slot, incoming_value) => {
            *base_slot = incoming_value.clone();
        }
    }
}
