//! Startup configuration, parsed from the command line.

use beamkit::ActiveLevel;

pub const DEFAULT_PIN_S1: u8 = 22;
pub const DEFAULT_PIN_S2: u8 = 26;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;
pub const DEFAULT_STATUS_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_DEBOUNCE_MS: u64 = 20;

pub const USAGE: &str = "\
beamwatch - watch two photoelectric beam sensors on GPIO

Usage: beamwatch [options]

Options:
  --pin-s1 <bcm>        BCM pin for sensor 1 (default 22)
  --pin-s2 <bcm>        BCM pin for sensor 2 (default 26)
  --s1-active-high      sensor 1 line goes high when the beam is broken
  --s2-active-high      sensor 2 line goes high when the beam is broken
  --poll-ms <ms>        polling interval (default 50)
  --status-ms <ms>      heartbeat interval (default 2000)
  --edge                use edge interrupts instead of polling
  --debounce-ms <ms>    edge debounce window, 0 disables (default 20)
  -h, --help            print this help";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub pin_s1: u8,
    pub pin_s2: u8,
    pub s1_active_level: ActiveLevel,
    pub s2_active_level: ActiveLevel,
    pub poll_interval_ms: u64,
    pub status_interval_ms: u64,
    pub edge_triggered: bool,
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pin_s1: DEFAULT_PIN_S1,
            pin_s2: DEFAULT_PIN_S2,
            s1_active_level: ActiveLevel::Low,
            s2_active_level: ActiveLevel::Low,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            status_interval_ms: DEFAULT_STATUS_INTERVAL_MS,
            edge_triggered: false,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Cli {
    Run(Config),
    Help,
}

/// Parse CLI arguments, without the program name.
pub fn parse_args(args: &[&str]) -> Result<Cli, String> {
    let mut config = Config::default();

    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "--help" | "-h" => return Ok(Cli::Help),
            "--edge" => config.edge_triggered = true,
            "--s1-active-high" => config.s1_active_level = ActiveLevel::High,
            "--s2-active-high" => config.s2_active_level = ActiveLevel::High,
            "--pin-s1" => {
                i += 1;
                config.pin_s1 = take_number(args, i, "--pin-s1")?;
            }
            "--pin-s2" => {
                i += 1;
                config.pin_s2 = take_number(args, i, "--pin-s2")?;
            }
            "--poll-ms" => {
                i += 1;
                config.poll_interval_ms = take_number(args, i, "--poll-ms")?;
            }
            "--status-ms" => {
                i += 1;
                config.status_interval_ms = take_number(args, i, "--status-ms")?;
            }
            "--debounce-ms" => {
                i += 1;
                config.debounce_ms = take_number(args, i, "--debounce-ms")?;
            }
            other => return Err(format!("Unknown option: '{}'", other)),
        }
        i += 1;
    }

    if config.pin_s1 == config.pin_s2 {
        return Err(format!(
            "--pin-s1 and --pin-s2 must differ (both are {})",
            config.pin_s1
        ));
    }
    if config.poll_interval_ms == 0 {
        return Err("--poll-ms must be at least 1".into());
    }
    if config.status_interval_ms == 0 {
        return Err("--status-ms must be at least 1".into());
    }

    Ok(Cli::Run(config))
}

/// Safely take a numeric value after a flag.
fn take_number<T>(args: &[&str], index: usize, flag: &str) -> Result<T, String>
where
    T: std::str::FromStr,
{
    if index >= args.len() {
        return Err(format!("{} requires a value", flag));
    }
    args[index]
        .parse()
        .map_err(|_| format!("Invalid value for {}: '{}'", flag, args[index]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> Config {
        match parse_args(args).unwrap() {
            Cli::Run(config) => config,
            Cli::Help => panic!("expected a run configuration"),
        }
    }

    #[test]
    fn no_args_yields_defaults() {
        let config = run(&[]);
        assert_eq!(config, Config::default());
        assert_eq!(config.pin_s1, 22);
        assert_eq!(config.pin_s2, 26);
        assert_eq!(config.s1_active_level, ActiveLevel::Low);
        assert_eq!(config.poll_interval_ms, 50);
        assert_eq!(config.status_interval_ms, 2_000);
        assert!(!config.edge_triggered);
    }

    #[test]
    fn pins_and_intervals() {
        let config = run(&["--pin-s1", "17", "--pin-s2", "27", "--poll-ms", "20", "--status-ms", "5000"]);
        assert_eq!(config.pin_s1, 17);
        assert_eq!(config.pin_s2, 27);
        assert_eq!(config.poll_interval_ms, 20);
        assert_eq!(config.status_interval_ms, 5_000);
    }

    #[test]
    fn polarity_flags() {
        let config = run(&["--s1-active-high"]);
        assert_eq!(config.s1_active_level, ActiveLevel::High);
        assert_eq!(config.s2_active_level, ActiveLevel::Low);
    }

    #[test]
    fn edge_mode_with_debounce() {
        let config = run(&["--edge", "--debounce-ms", "25"]);
        assert!(config.edge_triggered);
        assert_eq!(config.debounce_ms, 25);
    }

    #[test]
    fn help_flag_wins() {
        assert_eq!(parse_args(&["--help"]).unwrap(), Cli::Help);
        assert_eq!(parse_args(&["--pin-s1", "17", "-h"]).unwrap(), Cli::Help);
    }

    #[test]
    fn unknown_option() {
        assert!(parse_args(&["--bogus"]).is_err());
    }

    #[test]
    fn missing_value() {
        assert!(parse_args(&["--pin-s1"]).is_err());
    }

    #[test]
    fn non_numeric_value() {
        let err = parse_args(&["--poll-ms", "fast"]).unwrap_err();
        assert!(err.contains("--poll-ms"));
    }

    #[test]
    fn pin_out_of_range() {
        assert!(parse_args(&["--pin-s1", "300"]).is_err());
    }

    #[test]
    fn shared_pin_rejected() {
        assert!(parse_args(&["--pin-s1", "26"]).is_err());
    }

    #[test]
    fn zero_intervals_rejected() {
        assert!(parse_args(&["--poll-ms", "0"]).is_err());
        assert!(parse_args(&["--status-ms", "0"]).is_err());
    }
}
