//! Run-scoped output bus shared between plugins.
//!
//! A nested map: writer plugin id -> key -> value. Writers overwrite their
//! own keys; readers see values from any plugin that already ran. The bus
//! lives for exactly one orchestrator run.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Value kinds a plugin may publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum BusValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Json(serde_json::Value),
}

impl BusValue {
    fn kind(&self) -> &'static str {
        match self {
            BusValue::Bool(_) => "bool",
            BusValue::Int(_) => "int",
            BusValue::Float(_) => "float",
            BusValue::Text(_) => "text",
            BusValue::Json(_) => "json",
        }
    }
}

/// Typed reads fail fast instead of coercing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("no value at {plugin}/{key}")]
    Missing { plugin: String, key: String },
    #[error("value at {plugin}/{key} is {actual}, expected {expected}")]
    TypeMismatch {
        plugin: String,
        key: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// In-memory plugin output bus.
#[derive(Debug, Default)]
pub struct OutputBus {
    entries: RwLock<BTreeMap<String, BTreeMap<String, BusValue>>>,
}

impl OutputBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a value under the writer's namespace, overwriting any value
    /// the same writer put at the same key.
    pub fn write(&self, writer: &str, key: &str, value: BusValue) {
        let mut entries = self.entries.write().expect("bus lock poisoned");
        entries
            .entry(writer.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    pub fn read(&self, plugin: &str, key: &str) -> Option<BusValue> {
        let entries = self.entries.read().expect("bus lock poisoned");
        entries.get(plugin).and_then(|ns| ns.get(key)).cloned()
    }

    fn read_required(&self, plugin: &str, key: &str) -> Result<BusValue, BusError> {
        self.read(plugin, key).ok_or_else(|| BusError::Missing {
            plugin: plugin.to_string(),
            key: key.to_string(),
        })
    }

    pub fn read_bool(&self, plugin: &str, key: &str) -> Result<bool, BusError> {
        match self.read_required(plugin, key)? {
            BusValue::Bool(v) => Ok(v),
            other => Err(mismatch(plugin, key, "bool", &other)),
        }
    }

    pub fn read_int(&self, plugin: &str, key: &str) -> Result<i64, BusError> {
        match self.read_required(plugin, key)? {
            BusValue::Int(v) => Ok(v),
            other => Err(mismatch(plugin, key, "int", &other)),
        }
    }

    pub fn read_float(&self, plugin: &str, key: &str) -> Result<f64, BusError> {
        match self.read_required(plugin, key)? {
            BusValue::Float(v) => Ok(v),
            other => Err(mismatch(plugin, key, "float", &other)),
        }
    }

    pub fn read_text(&self, plugin: &str, key: &str) -> Result<String, BusError> {
        match self.read_required(plugin, key)? {
            BusValue::Text(v) => Ok(v),
            other => Err(mismatch(plugin, key, "text", &other)),
        }
    }

    pub fn read_json(&self, plugin: &str, key: &str) -> Result<serde_json::Value, BusError> {
        match self.read_required(plugin, key)? {
            BusValue::Json(v) => Ok(v),
            other => Err(mismatch(plugin, key, "json", &other)),
        }
    }

    /// Everything the given plugin has published so far.
    pub fn snapshot_of(&self, plugin: &str) -> BTreeMap<String, BusValue> {
        let entries = self.entries.read().expect("bus lock poisoned");
        entries.get(plugin).cloned().unwrap_or_default()
    }
}

fn mismatch(plugin: &str, key: &str, expected: &'static str, actual: &BusValue) -> BusError {
    BusError::TypeMismatch {
        plugin: plugin.to_string(),
        key: key.to_string(),
        expected,
        actual: actual.kind(),
    }
}
