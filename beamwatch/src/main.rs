use std::env;
use std::io;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use anyhow::{Context, Result};
use beamkit::{ActiveLevel, BeamSensor, Channel, Monitor, MonitorDuration};
use log::info;
use rppal::gpio::{Gpio, InputPin, Trigger};

use beamwatch::config::{self, Cli, Config};
use beamwatch::run::{self, EdgeSignal, Uptime};
use beamwatch::sink::ConsoleSink;

type PiMonitor = Monitor<InputPin, InputPin>;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

    let config = match config::parse_args(&arg_refs) {
        Ok(Cli::Run(config)) => config,
        Ok(Cli::Help) => {
            println!("{}", config::USAGE);
            return Ok(());
        }
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("{}", config::USAGE);
            process::exit(2);
        }
    };

    println!("Starting beam monitor. Ctrl-C to exit.");
    println!(
        "Sensor pins: S1=GPIO{}, S2=GPIO{}",
        config.pin_s1, config.pin_s2
    );
    println!("Using internal pull-ups. Pass --s1-active-high / --s2-active-high if the logic reads inverted.\n");

    let gpio = Gpio::new().context(
        "failed to open the GPIO peripheral (is this a Raspberry Pi, and are you in the gpio group?)",
    )?;
    let pin_s1 = claim_input(&gpio, config.pin_s1)?;
    let pin_s2 = claim_input(&gpio, config.pin_s2)?;

    info!(
        "S1 on GPIO{} ({}), S2 on GPIO{} ({})",
        config.pin_s1,
        level_label(config.s1_active_level),
        config.pin_s2,
        level_label(config.s2_active_level)
    );

    let stop = Arc::new(AtomicBool::new(false));
    let uptime = Uptime::start();
    let mut sink = ConsoleSink::stdout();

    if config.edge_triggered {
        run_edge(&config, pin_s1, pin_s2, &uptime, &mut sink, &stop)?;
    } else {
        run_polling(&config, pin_s1, pin_s2, &uptime, &mut sink, &stop)?;
    }

    println!("\nExiting.");
    Ok(())
}

fn claim_input(gpio: &Gpio, pin: u8) -> Result<InputPin> {
    let pin = gpio
        .get(pin)
        .with_context(|| format!("failed to claim GPIO{}", pin))?;

    Ok(pin.into_input_pullup())
}

fn build_monitor(config: &Config, pin_s1: InputPin, pin_s2: InputPin) -> PiMonitor {
    Monitor::new(
        BeamSensor::new(pin_s1, config.s1_active_level),
        BeamSensor::new(pin_s2, config.s2_active_level),
        MonitorDuration::from_ticks(config.status_interval_ms),
    )
}

fn run_polling(
    config: &Config,
    pin_s1: InputPin,
    pin_s2: InputPin,
    uptime: &Uptime,
    sink: &mut ConsoleSink<io::Stdout>,
    stop: &Arc<AtomicBool>,
) -> Result<()> {
    let handler_stop = Arc::clone(stop);
    ctrlc::set_handler(move || handler_stop.store(true, Ordering::SeqCst))
        .context("failed to install the Ctrl-C handler")?;

    info!(
        "polling every {} ms, heartbeat every {} ms",
        config.poll_interval_ms, config.status_interval_ms
    );

    let mut monitor = build_monitor(config, pin_s1, pin_s2);

    run::poll_loop(
        &mut monitor,
        sink,
        uptime,
        Duration::from_millis(config.poll_interval_ms),
        stop,
    )
}

fn run_edge(
    config: &Config,
    mut pin_s1: InputPin,
    mut pin_s2: InputPin,
    uptime: &Uptime,
    sink: &mut ConsoleSink<io::Stdout>,
    stop: &Arc<AtomicBool>,
) -> Result<()> {
    let (tx, rx) = mpsc::channel();

    let handler_stop = Arc::clone(stop);
    let handler_tx = tx.clone();
    ctrlc::set_handler(move || {
        handler_stop.store(true, Ordering::SeqCst);
        // wake the loop so it notices the flag right away
        let _ = handler_tx.send(EdgeSignal::Shutdown);
    })
    .context("failed to install the Ctrl-C handler")?;

    let debounce = match config.debounce_ms {
        0 => None,
        ms => Some(Duration::from_millis(ms)),
    };
    register_edges(&mut pin_s1, Channel::S1, debounce, tx.clone())?;
    register_edges(&mut pin_s2, Channel::S2, debounce, tx)?;

    info!(
        "edge interrupts registered on both channels, debounce {} ms",
        config.debounce_ms
    );

    let mut monitor = build_monitor(config, pin_s1, pin_s2);

    run::edge_loop(&mut monitor, sink, uptime, &rx, stop)
}

fn register_edges(
    pin: &mut InputPin,
    channel: Channel,
    debounce: Option<Duration>,
    tx: mpsc::Sender<EdgeSignal>,
) -> Result<()> {
    pin.set_async_interrupt(Trigger::Both, debounce, move |event| {
        let is_high = matches!(event.trigger, Trigger::RisingEdge);
        let _ = tx.send(EdgeSignal::Edge { channel, is_high });
    })
    .with_context(|| format!("failed to register edge interrupts for {}", channel.label()))
}

fn level_label(level: ActiveLevel) -> &'static str {
    match level {
        ActiveLevel::Low => "active-low",
        ActiveLevel::High => "active-high",
    }
}
