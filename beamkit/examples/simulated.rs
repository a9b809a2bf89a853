//! Drives the monitor from scripted pins, no hardware required.
//!
//! ```text
//! cargo run -p beamkit --example simulated
//! ```

use std::cell::Cell;
use std::convert::Infallible;

use beamkit::{
    BeamSensor, EventSink, Monitor, MonitorDuration, MonitorEvent, MonitorInstant, Observation,
};
use embedded_hal::digital::v2::InputPin;

struct ScriptPin {
    levels: Vec<bool>,
    next: Cell<usize>,
}

impl ScriptPin {
    fn new(levels: &[bool]) -> Self {
        ScriptPin {
            levels: levels.to_vec(),
            next: Cell::new(0),
        }
    }
}

impl InputPin for ScriptPin {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        let index = self.next.get();
        let level = *self
            .levels
            .get(index)
            .unwrap_or_else(|| self.levels.last().unwrap());
        self.next.set(index + 1);
        Ok(level)
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        self.is_high().map(|is_high| !is_high)
    }
}

struct PrintSink;

impl PrintSink {
    fn describe(observation: &Observation) -> String {
        format!(
            "S1: {} (raw={})  |  S2: {} (raw={})",
            observation.s1.status.label(),
            observation.s1.raw,
            observation.s2.status.label(),
            observation.s2.raw,
        )
    }
}

impl EventSink for PrintSink {
    fn receive(&mut self, event: &MonitorEvent) {
        match event {
            MonitorEvent::Transition(observation) => {
                println!("[{:>5} ms] {}", observation.at.ticks(), Self::describe(observation));
            }
            MonitorEvent::Status(observation) => {
                println!(
                    "[{:>5} ms] [STATUS] {}",
                    observation.at.ticks(),
                    Self::describe(observation)
                );
            }
        }
    }
}

fn main() {
    // Something passes through beam 1, then beam 2, with quiet stretches
    // long enough for a heartbeat in between.
    let s1 = ScriptPin::new(&[
        true, true, true, false, false, true, true, true, true, true, true, true,
    ]);
    let s2 = ScriptPin::new(&[
        true, true, true, true, true, true, false, false, true, true, true, true,
    ]);

    let mut monitor = Monitor::new(
        BeamSensor::active_low(s1),
        BeamSensor::active_low(s2),
        MonitorDuration::from_ticks(200),
    );
    let mut sink = PrintSink;

    for step in 0..16u64 {
        let at = MonitorInstant::from_ticks(step * 50);
        if let Some(event) = monitor.poll(at).unwrap() {
            sink.receive(&event);
        }
    }
}
