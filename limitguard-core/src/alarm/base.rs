//! Base limit-alarm behavior
//!
//! Owns the alarm node, the condition sink and the clock. Alarm kinds embed
//! it and delegate the final step of signaling to it.

use crate::{
    condition::ConditionInfo,
    errors::AlarmResult,
    signal::ConditionEvent,
    threshold::SubStates,
    time::TimeSource,
    traits::{AlarmNode, ConditionSink},
};

pub struct BaseLimitAlarm<N, S> {
    node: N,
    sink: S,
    clock: Box<dyn TimeSource>,
}

impl<N: AlarmNode, S: ConditionSink> BaseLimitAlarm<N, S> {
    pub fn new(node: N, sink: S, clock: Box<dyn TimeSource>) -> Self {
        Self { node, sink, clock }
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut N {
        &mut self.node
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_parts(self) -> (N, S) {
        (self.node, self.sink)
    }

    /// Write the aggregate active state, stamp the event and deliver it
    pub fn signal_new_condition(
        &mut self,
        states: &SubStates,
        active: bool,
        value: f64,
        info: ConditionInfo,
    ) -> AlarmResult<ConditionEvent> {
        self.node.write_active_state(active)?;

        let event = ConditionEvent {
            source: self.node.browse_name().to_string(),
            timestamp: self.clock.now(),
            states: *states,
            active,
            value,
            info,
        };
        self.sink.signal(&event)?;

        log_debug!(
            "{}: severity {} at {} ({})",
            event.source,
            event.info.severity,
            event.timestamp,
            event.info.message
        );
        Ok(event)
    }
}
