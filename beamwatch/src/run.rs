//! The two drive modes: timed polling and edge interrupts.
//!
//! Both modes fold into the same `beamkit::Monitor`, so a transition looks
//! identical on the console no matter how it was detected. The polling loop
//! checks the stop flag at the top of every iteration; the edge loop wakes
//! up at least every `SHUTDOWN_POLL` to do the same.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use beamkit::{Channel, EventSink, Monitor, MonitorInstant};
use embedded_hal::digital::v2::InputPin;
use log::debug;

const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Millisecond ticks since process start, the monitor's monotonic timeline.
pub struct Uptime {
    started: Instant,
}

impl Uptime {
    pub fn start() -> Self {
        Uptime {
            started: Instant::now(),
        }
    }

    pub fn now(&self) -> MonitorInstant {
        MonitorInstant::from_ticks(self.started.elapsed().as_millis() as u64)
    }
}

/// One message from an interrupt handler or the signal handler.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EdgeSignal {
    Edge { channel: Channel, is_high: bool },
    Shutdown,
}

/// Sample at a fixed cadence until the stop flag is raised.
pub fn poll_loop<P1, P2, S>(
    monitor: &mut Monitor<P1, P2>,
    sink: &mut S,
    uptime: &Uptime,
    poll_interval: Duration,
    stop: &AtomicBool,
) -> Result<()>
where
    P1: InputPin,
    P1::Error: Debug,
    P2: InputPin,
    P2::Error: Debug,
    S: EventSink,
{
    while !stop.load(Ordering::SeqCst) {
        let event = monitor
            .poll(uptime.now())
            .map_err(|err| anyhow!("sensor read failed: {:?}", err))?;

        if let Some(event) = event {
            sink.receive(&event);
        }

        thread::sleep(poll_interval);
    }

    Ok(())
}

/// Wait on debounced edges until the stop flag is raised.
///
/// One initial poll reports the starting state; after that the hardware
/// pushes changes through the channel and nothing is sampled. No heartbeat
/// is printed in this mode.
pub fn edge_loop<P1, P2, S>(
    monitor: &mut Monitor<P1, P2>,
    sink: &mut S,
    uptime: &Uptime,
    signals: &Receiver<EdgeSignal>,
    stop: &AtomicBool,
) -> Result<()>
where
    P1: InputPin,
    P1::Error: Debug,
    P2: InputPin,
    P2::Error: Debug,
    S: EventSink,
{
    let initial = monitor
        .poll(uptime.now())
        .map_err(|err| anyhow!("sensor read failed: {:?}", err))?;

    if let Some(event) = initial {
        sink.receive(&event);
    }

    while !stop.load(Ordering::SeqCst) {
        match signals.recv_timeout(SHUTDOWN_POLL) {
            Ok(EdgeSignal::Edge { channel, is_high }) => {
                debug!("edge on {}: level={}", channel.label(), is_high as u8);
                if let Some(event) = monitor.apply_edge(channel, is_high, uptime.now()) {
                    sink.receive(&event);
                }
            }
            Ok(EdgeSignal::Shutdown) => break,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}
