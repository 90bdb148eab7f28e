//! Threshold names, tri-state sub-states and limit configuration
//!
//! A non-exclusive limit alarm watches one value against up to four limits.
//! Each limit has its own sub-state, and any number of them can be active at
//! the same time:
//!
//! ```text
//!            lowLow      low               high      highHigh
//!   ──────────┼───────────┼─────────────────┼───────────┼──────────▶ value
//!   lowLow ◀──┤           │                 │           ├──▶ highHigh
//!   low    ◀──────────────┤                 ├──────────────▶ high
//! ```
//!
//! A threshold that was never configured stays [`SubState::Unset`] for the
//! lifetime of the alarm.

use core::fmt;
use core::ops::{Index, IndexMut};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// One of the four limits of a non-exclusive limit alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum ThresholdName {
    LowLow = 0,
    Low = 1,
    High = 2,
    HighHigh = 3,
}

impl ThresholdName {
    /// All thresholds, indexed by their slot
    pub const ALL: [ThresholdName; 4] = [
        ThresholdName::LowLow,
        ThresholdName::Low,
        ThresholdName::High,
        ThresholdName::HighHigh,
    ];

    /// Order used when rendering the state summary
    pub const CANONICAL_ORDER: [ThresholdName; 4] = [
        ThresholdName::HighHigh,
        ThresholdName::High,
        ThresholdName::Low,
        ThresholdName::LowLow,
    ];

    /// Slot index in a [`SubStates`] table
    pub const fn index(self) -> usize {
        self as usize
    }

    /// camelCase name used in configuration and state summaries
    pub const fn name(self) -> &'static str {
        match self {
            ThresholdName::LowLow => "lowLow",
            ThresholdName::Low => "low",
            ThresholdName::High => "high",
            ThresholdName::HighHigh => "highHigh",
        }
    }

    /// PascalCase name used for member browse names and labels
    pub const fn display_name(self) -> &'static str {
        match self {
            ThresholdName::LowLow => "LowLow",
            ThresholdName::Low => "Low",
            ThresholdName::High => "High",
            ThresholdName::HighHigh => "HighHigh",
        }
    }

    /// Upper bounds fire above the limit, lower bounds below it
    pub const fn is_upper_bound(self) -> bool {
        matches!(self, ThresholdName::High | ThresholdName::HighHigh)
    }

    /// Check whether `value` violates `limit` for this threshold.
    ///
    /// Sitting exactly on the limit is not a violation.
    pub fn is_violated(self, value: f64, limit: f64) -> bool {
        if self.is_upper_bound() {
            value > limit
        } else {
            value < limit
        }
    }

    /// Display labels for the two-state variable of this threshold
    pub const fn labels(self) -> TwoStateLabels {
        match self {
            ThresholdName::LowLow => TwoStateLabels::new("LowLow active", "LowLow inactive"),
            ThresholdName::Low => TwoStateLabels::new("Low active", "Low inactive"),
            ThresholdName::High => TwoStateLabels::new("High active", "High inactive"),
            ThresholdName::HighHigh => TwoStateLabels::new("HighHigh active", "HighHigh inactive"),
        }
    }
}

impl fmt::Display for ThresholdName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// True/false display text of a boolean sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoStateLabels {
    pub true_state: &'static str,
    pub false_state: &'static str,
}

impl TwoStateLabels {
    pub const fn new(true_state: &'static str, false_state: &'static str) -> Self {
        Self { true_state, false_state }
    }

    /// Label matching a boolean value
    pub const fn for_value(&self, value: bool) -> &'static str {
        if value {
            self.true_state
        } else {
            self.false_state
        }
    }
}

/// Status of one threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubState {
    /// Threshold was never configured
    #[default]
    Unset,
    /// Configured and not violated
    Inactive,
    /// Configured and violated
    Active,
}

impl SubState {
    pub const fn from_bool(active: bool) -> Self {
        if active {
            SubState::Active
        } else {
            SubState::Inactive
        }
    }

    /// Boolean value, `None` for unset thresholds
    pub const fn as_bool(self) -> Option<bool> {
        match self {
            SubState::Unset => None,
            SubState::Inactive => Some(false),
            SubState::Active => Some(true),
        }
    }

    pub const fn is_set(self) -> bool {
        !matches!(self, SubState::Unset)
    }

    pub const fn is_active(self) -> bool {
        matches!(self, SubState::Active)
    }
}

impl fmt::Display for SubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubState::Unset => f.write_str("\"unset\""),
            SubState::Inactive => f.write_str("false"),
            SubState::Active => f.write_str("true"),
        }
    }
}

impl Serialize for SubState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_bool() {
            Some(value) => serializer.serialize_bool(value),
            None => serializer.serialize_str("unset"),
        }
    }
}

/// Four-slot sub-state table indexed by [`ThresholdName`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubStates([SubState; 4]);

impl SubStates {
    /// Table with every threshold unset
    pub const fn unset() -> Self {
        Self([SubState::Unset; 4])
    }

    pub fn get(&self, name: ThresholdName) -> SubState {
        self.0[name.index()]
    }

    pub fn set(&mut self, name: ThresholdName, state: SubState) {
        self.0[name.index()] = state;
    }

    /// Builder form of [`SubStates::set`]
    pub fn with(mut self, name: ThresholdName, state: SubState) -> Self {
        self.set(name, state);
        self
    }

    /// All slots in [`ThresholdName::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = (ThresholdName, SubState)> + '_ {
        ThresholdName::ALL
            .into_iter()
            .map(move |name| (name, self.get(name)))
    }

    /// Configured slots with their boolean value
    pub fn enabled(&self) -> impl Iterator<Item = (ThresholdName, bool)> + '_ {
        self.iter()
            .filter_map(|(name, state)| state.as_bool().map(|value| (name, value)))
    }

    /// True when at least one configured threshold is violated
    pub fn any_active(&self) -> bool {
        self.0.iter().any(|state| state.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.0.iter().filter(|state| state.is_active()).count()
    }
}

impl Index<ThresholdName> for SubStates {
    type Output = SubState;

    fn index(&self, name: ThresholdName) -> &SubState {
        &self.0[name.index()]
    }
}

impl IndexMut<ThresholdName> for SubStates {
    fn index_mut(&mut self, name: ThresholdName) -> &mut SubState {
        &mut self.0[name.index()]
    }
}

/// Canonical summary, e.g. `{"highHigh":false,"high":true,"low":"unset","lowLow":"unset"}`
impl fmt::Display for SubStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, name) in ThresholdName::CANONICAL_ORDER.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "\"{}\":{}", name.name(), self.get(*name))?;
        }
        f.write_str("}")
    }
}

impl Serialize for SubStates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        for name in ThresholdName::CANONICAL_ORDER {
            map.serialize_entry(name.name(), &self.get(name))?;
        }
        map.end()
    }
}

/// Optional limits of a non-exclusive limit alarm
///
/// Presence of a limit is the only switch that enables the matching
/// sub-state. Limits are not checked against each other: `low > high` is
/// accepted and simply lets both fire at once.
///
/// ```rust
/// use limitguard_core::{ThresholdConfig, ThresholdName};
///
/// let config = ThresholdConfig::new()
///     .with_limit(ThresholdName::High, 10.0)
///     .with_limit(ThresholdName::HighHigh, 20.0);
///
/// assert_eq!(config.limit(ThresholdName::High), Some(10.0));
/// assert_eq!(config.limit(ThresholdName::Low), None);
///
/// let parsed: ThresholdConfig = serde_json::from_str(r#"{"highLimit": 10.0}"#).unwrap();
/// assert!(parsed.is_enabled(ThresholdName::High));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_low_limit: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_limit: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_limit: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_high_limit: Option<f64>,
}

impl ThresholdConfig {
    /// Configuration with no thresholds. An alarm built from it never fires.
    pub const fn new() -> Self {
        Self {
            low_low_limit: None,
            low_limit: None,
            high_limit: None,
            high_high_limit: None,
        }
    }

    pub fn with_limit(mut self, name: ThresholdName, limit: f64) -> Self {
        self.set_limit(name, Some(limit));
        self
    }

    pub fn limit(&self, name: ThresholdName) -> Option<f64> {
        match name {
            ThresholdName::LowLow => self.low_low_limit,
            ThresholdName::Low => self.low_limit,
            ThresholdName::High => self.high_limit,
            ThresholdName::HighHigh => self.high_high_limit,
        }
    }

    pub fn set_limit(&mut self, name: ThresholdName, limit: Option<f64>) {
        let slot = match name {
            ThresholdName::LowLow => &mut self.low_low_limit,
            ThresholdName::Low => &mut self.low_limit,
            ThresholdName::High => &mut self.high_limit,
            ThresholdName::HighHigh => &mut self.high_high_limit,
        };
        *slot = limit;
    }

    pub fn is_enabled(&self, name: ThresholdName) -> bool {
        self.limit(name).is_some()
    }

    /// Configured thresholds in [`ThresholdName::ALL`] order
    pub fn enabled(&self) -> impl Iterator<Item = ThresholdName> + '_ {
        ThresholdName::ALL
            .into_iter()
            .filter(move |name| self.is_enabled(*name))
    }

    pub fn is_empty(&self) -> bool {
        self.enabled().next().is_none()
    }

    /// Starting sub-states: inactive for configured thresholds, unset otherwise
    pub fn initial_states(&self) -> SubStates {
        let mut states = SubStates::unset();
        for name in self.enabled() {
            states.set(name, SubState::Inactive);
        }
        states
    }
}
