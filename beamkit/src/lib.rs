#![cfg_attr(not(test), no_std)]

pub mod monitor;
pub mod sensors;

pub use monitor::{
    EventSink, Monitor, MonitorDuration, MonitorError, MonitorEvent, MonitorInstant, Observation,
    TICK_HZ,
};
pub use sensors::beam::{ActiveLevel, BeamError, BeamReading, BeamSensor, BeamStatus, Channel};
