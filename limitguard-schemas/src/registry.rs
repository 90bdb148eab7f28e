//! Alarm Type Registry
//!
//! Thread-safe store of alarm types. One registry can back several
//! namespaces: lookups take a read lock, registration a write lock.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use limitguard_core::{AlarmType, TypeNotFound, TypeRegistry};
use serde_json::Value;

use crate::{
    types::{self, TypeDefinition},
    SchemaError,
};

/// Thread-safe alarm type registry
#[derive(Debug, Default)]
pub struct AlarmTypeRegistry {
    /// Types indexed by browse name
    types: RwLock<HashMap<String, AlarmType>>,
}

impl AlarmTypeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the standard limit alarm hierarchy
    pub fn with_defaults() -> Result<Self, SchemaError> {
        let registry = Self::new();
        registry.load_defaults()?;
        Ok(registry)
    }

    /// Register a type.
    ///
    /// Fails when the browse name is already taken. The parent does not
    /// have to be registered yet.
    pub fn register(&self, alarm_type: AlarmType) -> Result<(), SchemaError> {
        TypeDefinition::from(&alarm_type).validate()?;

        let mut types = self
            .types
            .write()
            .map_err(|_| SchemaError::ValidationError("Lock poisoned".to_string()))?;

        if types.contains_key(&alarm_type.browse_name) {
            return Err(SchemaError::ValidationError(format!(
                "Type {} already registered",
                alarm_type.browse_name
            )));
        }

        log::debug!("registering alarm type {}", alarm_type.browse_name);
        types.insert(alarm_type.browse_name.clone(), alarm_type);
        Ok(())
    }

    /// Register a type from its JSON definition
    pub fn register_json(&self, definition: Value) -> Result<(), SchemaError> {
        let definition = TypeDefinition::from_value(definition)?;
        definition.validate()?;
        self.register(definition.to_alarm_type())
    }

    /// Register every type of a JSON array document
    pub fn load_json_str(&self, json: &str) -> Result<usize, SchemaError> {
        let definitions: Vec<TypeDefinition> = serde_json::from_str(json)?;
        let count = definitions.len();
        for definition in definitions {
            definition.validate()?;
            self.register(definition.to_alarm_type())?;
        }
        Ok(count)
    }

    /// Get a type by browse name
    pub fn get(&self, name: &str) -> Result<AlarmType, SchemaError> {
        self.read()
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Browse names of all registered types, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Load the standard limit alarm hierarchy
    pub fn load_defaults(&self) -> Result<(), SchemaError> {
        for definition in types::standard_hierarchy()? {
            self.register(definition.to_alarm_type())?;
        }
        log::debug!("loaded {} default alarm types", self.len());
        Ok(())
    }

    // Lookups keep serving after a writer panicked; entries are only ever
    // inserted whole.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, AlarmType>> {
        self.types.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TypeRegistry for AlarmTypeRegistry {
    fn resolve(&self, name: &str) -> Result<AlarmType, TypeNotFound> {
        self.read()
            .get(name)
            .cloned()
            .ok_or_else(|| TypeNotFound(name.to_string()))
    }
}
