//! Configuration record of one alarm instance

use std::path::Path;

use limitguard_core::{
    AlarmOptions, AlarmResult, ConditionSink, Member, MemberFlags, Namespace,
    NonExclusiveLimitAlarm, ThresholdConfig, TimeSource, NON_EXCLUSIVE_LIMIT_ALARM_TYPE,
};
use serde::{Deserialize, Serialize};

use crate::SchemaError;

/// Type used when a definition names none
pub const DEFAULT_ALARM_TYPE: &str = NON_EXCLUSIVE_LIMIT_ALARM_TYPE;

fn default_type() -> String {
    DEFAULT_ALARM_TYPE.to_string()
}

/// JSON definition of a non-exclusive limit alarm
///
/// The limit keys sit at the top level next to the name. Every limit present
/// enables its threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmDefinition {
    /// Browse name of the alarm
    pub name: String,

    #[serde(rename = "type", default = "default_type")]
    pub type_name: String,

    #[serde(flatten)]
    pub limits: ThresholdConfig,

    /// Extra optional members to create even without a limit
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optionals: Vec<Member>,

    /// Current value of the monitored input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_value: Option<f64>,
}

impl AlarmDefinition {
    pub fn new(name: impl Into<String>, limits: ThresholdConfig) -> Self {
        Self {
            name: name.into(),
            type_name: default_type(),
            limits,
            optionals: Vec::new(),
            input_value: None,
        }
    }

    /// Parse and validate a single definition
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let definition: Self = serde_json::from_str(json)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Parse and validate a JSON array of definitions
    pub fn list_from_json_str(json: &str) -> Result<Vec<Self>, SchemaError> {
        let definitions: Vec<Self> = serde_json::from_str(json)?;
        for definition in &definitions {
            definition.validate()?;
        }
        Ok(definitions)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::ValidationError("alarm name is empty".to_string()));
        }
        if self.type_name.trim().is_empty() {
            return Err(SchemaError::ValidationError(format!(
                "{}: alarm type is empty",
                self.name
            )));
        }
        if let Some(name) = self
            .limits
            .enabled()
            .find(|&name| self.limits.limit(name).is_some_and(|limit| !limit.is_finite()))
        {
            return Err(SchemaError::ValidationError(format!(
                "{}: {}Limit is not a finite number",
                self.name, name
            )));
        }
        Ok(())
    }

    /// Engine options for this definition
    pub fn options(&self) -> AlarmOptions {
        let optionals: MemberFlags = self.optionals.iter().copied().collect();
        let options = AlarmOptions::new(self.name.clone(), self.limits).with_optionals(optionals);
        match self.input_value {
            Some(value) => options.with_input_value(value),
            None => options,
        }
    }

    /// Build the alarm in `namespace`, stamping events with the system clock
    pub fn instantiate<NS, S>(
        &self,
        namespace: &mut NS,
        sink: S,
    ) -> AlarmResult<NonExclusiveLimitAlarm<NS::Node, S>>
    where
        NS: Namespace,
        S: ConditionSink,
    {
        NonExclusiveLimitAlarm::instantiate(namespace, &self.type_name, self.options(), sink)
    }

    pub fn instantiate_with_clock<NS, S>(
        &self,
        namespace: &mut NS,
        sink: S,
        clock: Box<dyn TimeSource>,
    ) -> AlarmResult<NonExclusiveLimitAlarm<NS::Node, S>>
    where
        NS: Namespace,
        S: ConditionSink,
    {
        NonExclusiveLimitAlarm::instantiate_with_clock(
            namespace,
            &self.type_name,
            self.options(),
            sink,
            clock,
        )
    }
}
