use std::thread;
use std::time::{Duration, Instant};

use cannabus::config::MonitorConfig;
use cannabus::monitor::{LoopbackBus, Monitor, MonitorEvent};
use cannabus::FunctionCode;

// emulated bus traffic for a few seconds, only slaves 1-10 and no write series shown
// RUST_LOG=debug for the monitor log

fn print_event(event: MonitorEvent) {
    match event {
        MonitorEvent::Frame(f) => println!(
            "{:>6} {:>12.6} {:>2} {:<28} {:<34} {} [{}]",
            f.sequence,
            f.timestamp.as_secs_f64(),
            f.slave_address,
            f.message_class.to_string(),
            f.function_code.to_string(),
            f.payload_length,
            f.payload_hex
        ),
        MonitorEvent::Error(e) => println!("{:>6} ERROR {}", e.sequence, e.info),
    }
}

fn main() {
    env_logger::init();
    let config = MonitorConfig {
        emulation: true,
        emulation_period_ms: 50,
        ..MonitorConfig::default()
    };
    let mut monitor = Monitor::new(config, LoopbackBus::new()).unwrap();
    println!(
        "slave filter: {}",
        monitor.set_allowed_slave_addresses("1-10")
    );
    monitor.set_function_code_enabled(FunctionCode::WriteRegsSeries, false);
    let started = Instant::now();
    monitor.connect(started);
    let mut sink = print_event;
    while started.elapsed() < Duration::from_secs(5) {
        monitor.tick(Instant::now(), &mut sink).unwrap();
        thread::sleep(Duration::from_millis(10));
    }
    let flushed = monitor.disconnect(&mut sink);
    println!("done, {} frame(s) flushed", flushed);
}
