//! 在模拟执行流上计时
//!
//! Run with `RUST_LOG=debug` to see the timer's own trace.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use accel_timers::{DeviceTimer, EmulatedEvents, HostStream, HostTimer, check_error};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let stream = Arc::new(check_error!(HostStream::new()));
    let mut device = check_error!(DeviceTimer::new(EmulatedEvents::new(Arc::clone(&stream))));
    let mut host = HostTimer::new();

    host.start();
    check_error!(device.start());
    for _ in 0..4 {
        stream.enqueue(|| thread::sleep(Duration::from_millis(5)));
    }
    host.stop(Some("enqueue: "));

    check_error!(device.stop(None));
    host.stop(None);
}
