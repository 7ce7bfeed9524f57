//! Accelerator and host timers
//!
//! 提供两种计时器：
//! - [`DeviceTimer`]: 在执行流上记录事件，测量设备工作的耗时
//! - [`HostTimer`]: 基于单调时钟测量主机代码的耗时
//!
//! 两者都以 `start()` / `stop()` 包围被测区域，`stop()` 在标准输出打印一行
//! `<前缀><毫秒数>ms` 并返回毫秒数。
//!
//! ```rust,ignore
//! use accel_timers::{DeviceTimer, EmulatedEvents, HostTimer};
//!
//! let mut host = HostTimer::new();
//! host.start();
//! // ...
//! host.stop(Some("parse: "));
//!
//! let mut device = DeviceTimer::new(EmulatedEvents::with_new_stream()?)?;
//! device.start()?;
//! // enqueue work on device.backend().stream()
//! device.stop(None)?;
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod host;
pub mod report;

pub use config::{DEVICE_DEFAULT_PREFIX, HOST_DEFAULT_PREFIX, TimerConfig};
pub use device::emulated::{EmulatedEvent, EmulatedEvents};
pub use device::stream::HostStream;
pub use device::{DeviceTimer, EventBackend};
pub use error::{ConfigError, DeviceError, check_result};
pub use host::HostTimer;

// 条件导出
#[cfg(feature = "cuda")]
pub use device::cuda::{CudaEvent, CudaEvents};
