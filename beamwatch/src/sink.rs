//! Console reporting for monitor events.

use std::io::{self, Write};

use beamkit::{EventSink, MonitorEvent, Observation};
use chrono::Local;

/// Writes one line per event, stamped with local wall-clock time.
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        ConsoleSink { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        ConsoleSink { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for ConsoleSink<W> {
    fn receive(&mut self, event: &MonitorEvent) {
        let stamp = timestamp();
        let line = match event {
            MonitorEvent::Transition(observation) => transition_line(&stamp, observation),
            MonitorEvent::Status(observation) => status_line(&stamp, observation),
        };

        // stdout may be a closed pipe during shutdown
        let _ = writeln!(self.out, "{}", line);
        let _ = self.out.flush();
    }
}

/// Local time down to milliseconds, e.g. `2026-08-26 14:03:07.512`.
pub fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

pub fn transition_line(stamp: &str, observation: &Observation) -> String {
    format!(
        "{}  S1: {} (raw={})  |  S2: {} (raw={})",
        stamp,
        observation.s1.status.label(),
        observation.s1.raw,
        observation.s2.status.label(),
        observation.s2.raw,
    )
}

pub fn status_line(stamp: &str, observation: &Observation) -> String {
    format!(
        "{}  [STATUS] S1={} (raw={})  S2={} (raw={})",
        stamp,
        observation.s1.status.label(),
        observation.s1.raw,
        observation.s2.status.label(),
        observation.s2.raw,
    )
}
