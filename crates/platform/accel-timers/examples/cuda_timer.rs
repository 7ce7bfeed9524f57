//! CUDA 事件计时示例
//!
//! 需要 `--features cuda` 以及可用的 NVIDIA GPU。

use accel_timers::{CudaEvents, DeviceTimer, check_error};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let backend = check_error!(CudaEvents::new(0));
    let device = backend.device().clone();
    let mut timer = check_error!(DeviceTimer::new(backend));

    let host_data = vec![1.0f32; 1 << 24];
    check_error!(timer.start());
    let device_data = check_error!(device.htod_sync_copy(&host_data));
    check_error!(timer.stop(Some("htod 64MiB: ")));

    drop(device_data);
    check_error!(timer.release());
}
