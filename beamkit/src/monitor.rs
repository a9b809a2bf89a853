//! Pair-level change detection and heartbeat for two beam channels.

use embedded_hal::digital::v2::InputPin;
use fugit::{TimerDurationU64, TimerInstantU64};

use crate::sensors::beam::{BeamError, BeamReading, BeamSensor, BeamStatus, Channel};

pub const TICK_HZ: u32 = 1_000;

/// Millisecond ticks on a monotonic timeline supplied by the caller.
pub type MonitorInstant = TimerInstantU64<TICK_HZ>;
pub type MonitorDuration = TimerDurationU64<TICK_HZ>;

/// Both channels sampled (or latched) at one instant.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Observation {
    pub s1: BeamReading,
    pub s2: BeamReading,
    pub at: MonitorInstant,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MonitorEvent {
    /// The channel pair differs from the last reported pair.
    Transition(Observation),
    /// Heartbeat: nothing changed for a full status interval.
    Status(Observation),
}

impl MonitorEvent {
    pub fn observation(&self) -> &Observation {
        match self {
            MonitorEvent::Transition(observation) => observation,
            MonitorEvent::Status(observation) => observation,
        }
    }
}

#[derive(Debug)]
pub enum MonitorError<E1, E2> {
    Sensor1(BeamError<E1>),
    Sensor2(BeamError<E2>),
}

pub trait EventSink {
    fn receive(&mut self, event: &MonitorEvent);
}

pub struct Monitor<P1, P2>
where
    P1: InputPin,
    P2: InputPin,
{
    s1: BeamSensor<P1>,
    s2: BeamSensor<P2>,
    status_interval: MonitorDuration,
    s1_last: Option<BeamReading>,
    s2_last: Option<BeamReading>,
    last_emit_at: Option<MonitorInstant>,
}

impl<P1, P2> Monitor<P1, P2>
where
    P1: InputPin,
    P2: InputPin,
{
    pub fn new(
        s1: BeamSensor<P1>,
        s2: BeamSensor<P2>,
        status_interval: MonitorDuration,
    ) -> Self {
        Monitor {
            s1,
            s2,
            status_interval,
            s1_last: None,
            s2_last: None,
            last_emit_at: None,
        }
    }

    /// Samples both channels without touching the reported state.
    pub fn observe(
        &self,
        at: MonitorInstant,
    ) -> Result<Observation, MonitorError<P1::Error, P2::Error>> {
        let s1 = self.s1.read().map_err(MonitorError::Sensor1)?;
        let s2 = self.s2.read().map_err(MonitorError::Sensor2)?;

        Ok(Observation { s1, s2, at })
    }

    /// Samples both channels and decides what, if anything, to report.
    ///
    /// The first poll always yields a `Transition` so the starting state is
    /// visible. After that a `Transition` is emitted only when the pair of
    /// statuses changes, and a `Status` heartbeat when a full status interval
    /// passes without any emission.
    pub fn poll(
        &mut self,
        at: MonitorInstant,
    ) -> Result<Option<MonitorEvent>, MonitorError<P1::Error, P2::Error>> {
        let observation = self.observe(at)?;
        let previous = self.reported_pair();

        self.s1_last = Some(observation.s1);
        self.s2_last = Some(observation.s2);

        let pair = (observation.s1.status, observation.s2.status);

        if previous != Some(pair) {
            self.last_emit_at = Some(at);
            return Ok(Some(MonitorEvent::Transition(observation)));
        }

        if self.status_due(at) {
            self.last_emit_at = Some(at);
            return Ok(Some(MonitorEvent::Status(observation)));
        }

        Ok(None)
    }

    /// Folds a debounced edge into the reported state.
    ///
    /// The untouched channel keeps its latched reading. Until both channels
    /// have been seen at least once (an initial `poll` or one edge per
    /// channel) there is no pair to compare, so nothing is reported. Edges
    /// never produce `Status` heartbeats.
    pub fn apply_edge(
        &mut self,
        channel: Channel,
        is_high: bool,
        at: MonitorInstant,
    ) -> Option<MonitorEvent> {
        let previous = self.reported_pair();

        match channel {
            Channel::S1 => self.s1_last = Some(self.s1.interpret(is_high)),
            Channel::S2 => self.s2_last = Some(self.s2.interpret(is_high)),
        }

        let (s1, s2) = match (self.s1_last, self.s2_last) {
            (Some(s1), Some(s2)) => (s1, s2),
            _ => return None,
        };

        let pair = (s1.status, s2.status);

        if previous == Some(pair) {
            return None;
        }

        self.last_emit_at = Some(at);

        Some(MonitorEvent::Transition(Observation { s1, s2, at }))
    }

    pub fn status_interval(&self) -> MonitorDuration {
        self.status_interval
    }

    fn reported_pair(&self) -> Option<(BeamStatus, BeamStatus)> {
        match (self.s1_last, self.s2_last) {
            (Some(s1), Some(s2)) => Some((s1.status, s2.status)),
            _ => None,
        }
    }

    fn status_due(&self, at: MonitorInstant) -> bool {
        let last = match self.last_emit_at {
            Some(last) => last,
            None => return false,
        };

        match at.checked_duration_since(last) {
            Some(elapsed) => elapsed >= self.status_interval,
            None => false,
        }
    }
}
