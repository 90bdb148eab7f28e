//! Common test utilities for limit alarm integration tests
//!
//! This module provides:
//! - A namespace preloaded with the standard limit alarm type hierarchy
//! - Alarm construction with a ticking clock and a recording sink
//! - Replay of value sequences with per-step emission tracking

#![allow(dead_code)]

use limitguard_core::{
    memory::{MemoryAlarmNode, MemoryNamespace},
    AlarmOptions, AlarmResult, AlarmType, ConditionEvent, Member, MemberFlags,
    NonExclusiveLimitAlarm, ThresholdConfig, TickingTime, NON_EXCLUSIVE_LIMIT_ALARM_TYPE,
};

pub type TestAlarm = NonExclusiveLimitAlarm<MemoryAlarmNode, Vec<ConditionEvent>>;

/// Clock start for every test alarm
pub const START_MS: u64 = 1_000;

/// Clock step between emissions
pub const STEP_MS: u64 = 100;

/// Standard limit alarm hierarchy with every optional member declared
pub fn standard_types() -> Vec<AlarmType> {
    vec![
        AlarmType::new("AlarmConditionType"),
        AlarmType::new("LimitAlarmType").sub_type_of("AlarmConditionType"),
        AlarmType::new(NON_EXCLUSIVE_LIMIT_ALARM_TYPE)
            .sub_type_of("LimitAlarmType")
            .with_optionals(MemberFlags::all()),
        AlarmType::new("NonExclusiveLevelAlarmType")
            .sub_type_of(NON_EXCLUSIVE_LIMIT_ALARM_TYPE)
            .with_optionals(MemberFlags::all()),
    ]
}

pub fn namespace() -> MemoryNamespace<Vec<AlarmType>> {
    MemoryNamespace::new(1, standard_types())
}

/// Namespace whose base type is missing one optional member
pub fn namespace_without(member: Member) -> MemoryNamespace<Vec<AlarmType>> {
    let types = standard_types()
        .into_iter()
        .map(|ty| {
            let optionals = ty.optionals.without(member);
            ty.with_optionals(optionals)
        })
        .collect();
    MemoryNamespace::new(1, types)
}

pub fn build_alarm(limits: ThresholdConfig) -> AlarmResult<TestAlarm> {
    build_alarm_in(&mut namespace(), NON_EXCLUSIVE_LIMIT_ALARM_TYPE, limits)
}

pub fn build_alarm_in(
    namespace: &mut MemoryNamespace<Vec<AlarmType>>,
    type_name: &str,
    limits: ThresholdConfig,
) -> AlarmResult<TestAlarm> {
    NonExclusiveLimitAlarm::instantiate_with_clock(
        namespace,
        type_name,
        AlarmOptions::new("Monitored", limits),
        Vec::new(),
        Box::new(TickingTime::new(START_MS, STEP_MS)),
    )
}

/// Feed every value and return, per step, the event it produced (if any)
pub fn replay(alarm: &mut TestAlarm, values: &[f64]) -> Vec<Option<ConditionEvent>> {
    values
        .iter()
        .map(|&value| {
            let before = alarm.sink().len();
            alarm
                .on_value_changed(value)
                .expect("finite values are always accepted");
            assert!(alarm.sink().len() <= before + 1, "at most one emission per value");
            alarm.sink().get(before).cloned()
        })
        .collect()
}
