//! Standard limit alarm type definitions

use limitguard_core::{AlarmType, Member, MemberFlags, NON_EXCLUSIVE_LIMIT_ALARM_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::SchemaError;

/// JSON form of an alarm type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDefinition {
    pub browse_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type_of: Option<String>,
    #[serde(default)]
    pub optionals: Vec<Member>,
}

impl TypeDefinition {
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Check the definition before it goes into a registry
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.browse_name.trim().is_empty() {
            return Err(SchemaError::ValidationError(
                "type browse name is empty".to_string(),
            ));
        }
        if self.sub_type_of.as_deref() == Some(self.browse_name.as_str()) {
            return Err(SchemaError::ValidationError(format!(
                "{} cannot be its own parent",
                self.browse_name
            )));
        }
        Ok(())
    }

    pub fn to_alarm_type(&self) -> AlarmType {
        let optionals: MemberFlags = self.optionals.iter().copied().collect();
        let alarm_type = AlarmType::new(self.browse_name.clone()).with_optionals(optionals);
        match &self.sub_type_of {
            Some(parent) => alarm_type.sub_type_of(parent.clone()),
            None => alarm_type,
        }
    }
}

impl From<&AlarmType> for TypeDefinition {
    fn from(alarm_type: &AlarmType) -> Self {
        Self {
            browse_name: alarm_type.browse_name.clone(),
            sub_type_of: alarm_type.sub_type_of.clone(),
            optionals: alarm_type.optionals.iter().collect(),
        }
    }
}

const ALL_MEMBERS: [&str; 8] = [
    "LowLowLimit",
    "LowLowState",
    "LowLimit",
    "LowState",
    "HighLimit",
    "HighState",
    "HighHighLimit",
    "HighHighState",
];

pub fn alarm_condition_type() -> Value {
    json!({
        "browseName": "AlarmConditionType"
    })
}

pub fn limit_alarm_type() -> Value {
    json!({
        "browseName": "LimitAlarmType",
        "subTypeOf": "AlarmConditionType"
    })
}

pub fn non_exclusive_limit_alarm_type() -> Value {
    json!({
        "browseName": NON_EXCLUSIVE_LIMIT_ALARM_TYPE,
        "subTypeOf": "LimitAlarmType",
        "optionals": ALL_MEMBERS
    })
}

pub fn non_exclusive_level_alarm_type() -> Value {
    json!({
        "browseName": "NonExclusiveLevelAlarmType",
        "subTypeOf": NON_EXCLUSIVE_LIMIT_ALARM_TYPE,
        "optionals": ALL_MEMBERS
    })
}

pub fn non_exclusive_deviation_alarm_type() -> Value {
    json!({
        "browseName": "NonExclusiveDeviationAlarmType",
        "subTypeOf": NON_EXCLUSIVE_LIMIT_ALARM_TYPE,
        "optionals": ALL_MEMBERS
    })
}

pub fn non_exclusive_rate_of_change_alarm_type() -> Value {
    json!({
        "browseName": "NonExclusiveRateOfChangeAlarmType",
        "subTypeOf": NON_EXCLUSIVE_LIMIT_ALARM_TYPE,
        "optionals": ALL_MEMBERS
    })
}

/// The standard hierarchy, parents first
pub fn standard_hierarchy() -> Result<Vec<TypeDefinition>, SchemaError> {
    [
        alarm_condition_type(),
        limit_alarm_type(),
        non_exclusive_limit_alarm_type(),
        non_exclusive_level_alarm_type(),
        non_exclusive_deviation_alarm_type(),
        non_exclusive_rate_of_change_alarm_type(),
    ]
    .into_iter()
    .map(TypeDefinition::from_value)
    .collect()
}
