//! 基于事件的设备计时器
//!
//! [`DeviceTimer`] records a start and a stop event on an execution stream and reads
//! the elapsed time between them once the stream has reached the stop event. The
//! timestamp primitive is abstracted by [`EventBackend`]: CUDA events behind the
//! `cuda` feature, or an emulated stream that always works on the host.

use std::io::Write;

use crate::config::TimerConfig;
use crate::error::DeviceError;
use crate::report;

#[cfg(feature = "cuda")]
pub mod cuda;
pub mod emulated;
pub mod stream;

/// 设备时间戳事件接口
///
/// All calls report failure through `DeviceError`; the timer never retries.
pub trait EventBackend {
    /// 事件句柄
    type Event;

    fn create_event(&self) -> Result<Self::Event, DeviceError>;

    /// 在流的当前位置记录事件（不阻塞）
    fn record_event(&self, event: &Self::Event) -> Result<(), DeviceError>;

    /// 阻塞直到流执行到该事件
    fn synchronize_event(&self, event: &Self::Event) -> Result<(), DeviceError>;

    /// 两个已完成事件之间的毫秒数
    fn elapsed_ms(&self, start: &Self::Event, stop: &Self::Event) -> Result<f32, DeviceError>;

    fn destroy_event(&self, event: &Self::Event) -> Result<(), DeviceError>;
}

/// 设备计时器
///
/// Both events are created in [`new`](Self::new) and released when the timer is
/// dropped (or explicitly through [`release`](Self::release)).
pub struct DeviceTimer<B: EventBackend> {
    backend: B,
    start: B::Event,
    stop: B::Event,
    config: TimerConfig,
    released: bool,
}

impl<B: EventBackend> DeviceTimer<B> {
    /// 创建计时器并分配两个事件
    pub fn new(backend: B) -> Result<Self, DeviceError> {
        Self::with_config(backend, TimerConfig::device())
    }

    /// 使用自定义配置创建计时器
    pub fn with_config(backend: B, config: TimerConfig) -> Result<Self, DeviceError> {
        config.validate()?;

        let start = backend.create_event()?;
        let stop = match backend.create_event() {
            Ok(event) => event,
            Err(err) => {
                if let Err(cleanup) = backend.destroy_event(&start) {
                    log::error!("failed to release start event: {}", cleanup);
                }
                return Err(err);
            }
        };

        Ok(Self {
            backend,
            start,
            stop,
            config,
            released: false,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// 开始计时（不等待之前提交的工作）
    pub fn start(&mut self) -> Result<(), DeviceError> {
        self.backend.record_event(&self.start)?;
        log::trace!("device timer start recorded");
        Ok(())
    }

    /// 停止计时，输出到标准输出并返回经过的毫秒数
    ///
    /// Blocks until the stream has executed everything enqueued before this call.
    pub fn stop(&mut self, label: Option<&str>) -> Result<f32, DeviceError> {
        let elapsed = self.capture()?;
        report::print_report(self.prefix(label), f64::from(elapsed));
        Ok(elapsed)
    }

    /// 停止计时，输出到指定的 writer
    pub fn stop_to<W: Write + ?Sized>(
        &mut self,
        label: Option<&str>,
        out: &mut W,
    ) -> Result<f32, DeviceError> {
        let elapsed = self.capture()?;
        report::write_report(out, self.prefix(label), f64::from(elapsed))
            .map_err(DeviceError::Report)?;
        Ok(elapsed)
    }

    /// 显式释放事件，返回第一个错误
    pub fn release(mut self) -> Result<(), DeviceError> {
        self.released = true;
        let start = self.backend.destroy_event(&self.start);
        let stop = self.backend.destroy_event(&self.stop);
        start.and(stop)
    }

    fn capture(&mut self) -> Result<f32, DeviceError> {
        self.backend.record_event(&self.stop)?;
        self.backend.synchronize_event(&self.stop)?;
        let elapsed = self.backend.elapsed_ms(&self.start, &self.stop)?;
        log::debug!("device timer stopped: {:.6} ms", elapsed);
        Ok(elapsed)
    }

    fn prefix<'a>(&'a self, label: Option<&'a str>) -> &'a str {
        label.unwrap_or(&self.config.prefix)
    }
}

impl<B: EventBackend> Drop for DeviceTimer<B> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        for event in [&self.start, &self.stop] {
            if let Err(err) = self.backend.destroy_event(event) {
                log::error!("failed to release device timer event: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// 记录调用顺序的模拟后端
    #[derive(Default)]
    struct MockBackend {
        calls: RefCell<Vec<String>>,
        next_id: Cell<u32>,
        fail_create_after: Option<u32>,
        fail_destroy: bool,
        elapsed: f32,
    }

    impl EventBackend for &MockBackend {
        type Event = u32;

        fn create_event(&self) -> Result<u32, DeviceError> {
            let id = self.next_id.get();
            if self.fail_create_after == Some(id) {
                return Err(DeviceError::Api {
                    call: "cuEventCreate",
                    code: 2,
                });
            }
            self.next_id.set(id + 1);
            self.calls.borrow_mut().push(format!("create {id}"));
            Ok(id)
        }

        fn record_event(&self, event: &u32) -> Result<(), DeviceError> {
            self.calls.borrow_mut().push(format!("record {event}"));
            Ok(())
        }

        fn synchronize_event(&self, event: &u32) -> Result<(), DeviceError> {
            self.calls.borrow_mut().push(format!("sync {event}"));
            Ok(())
        }

        fn elapsed_ms(&self, start: &u32, stop: &u32) -> Result<f32, DeviceError> {
            self.calls.borrow_mut().push(format!("elapsed {start} {stop}"));
            Ok(self.elapsed)
        }

        fn destroy_event(&self, event: &u32) -> Result<(), DeviceError> {
            self.calls.borrow_mut().push(format!("destroy {event}"));
            if self.fail_destroy {
                return Err(DeviceError::Api {
                    call: "cuEventDestroy",
                    code: 400,
                });
            }
            Ok(())
        }
    }

    #[test]
    fn test_call_sequence() {
        let backend = MockBackend {
            elapsed: 1.25,
            ..Default::default()
        };
        {
            let mut timer = DeviceTimer::new(&backend).unwrap();
            timer.start().unwrap();
            let mut out = Vec::new();
            let elapsed = timer.stop_to(None, &mut out).unwrap();
            assert_eq!(elapsed, 1.25);
            assert_eq!(
                String::from_utf8(out).unwrap(),
                "cudaEventElapsedTime: 1.25ms\n"
            );
        }

        assert_eq!(
            *backend.calls.borrow(),
            vec![
                "create 0",
                "create 1",
                "record 0",
                "record 1",
                "sync 1",
                "elapsed 0 1",
                "destroy 0",
                "destroy 1",
            ]
        );
    }

    #[test]
    fn test_create_failure_releases_first_event() {
        let backend = MockBackend {
            fail_create_after: Some(1),
            ..Default::default()
        };
        let result = DeviceTimer::new(&backend);
        assert!(matches!(result, Err(DeviceError::Api { code: 2, .. })));
        assert_eq!(*backend.calls.borrow(), vec!["create 0", "destroy 0"]);
    }

    #[test]
    fn test_release_reports_failure_once() {
        let backend = MockBackend {
            fail_destroy: true,
            ..Default::default()
        };
        let timer = DeviceTimer::new(&backend).unwrap();
        assert!(timer.release().is_err());

        let destroys = backend
            .calls
            .borrow()
            .iter()
            .filter(|call| call.starts_with("destroy"))
            .count();
        assert_eq!(destroys, 2);
    }

    #[test]
    fn test_label_overrides_prefix() {
        let backend = MockBackend {
            elapsed: 0.5,
            ..Default::default()
        };
        let mut timer = DeviceTimer::new(&backend).unwrap();
        timer.start().unwrap();

        let mut out = Vec::new();
        timer.stop_to(Some("kernel: "), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "kernel: 0.5ms\n");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let backend = MockBackend::default();
        let config = TimerConfig::device().with_prefix("bad\r");
        let result = DeviceTimer::with_config(&backend, config);
        assert!(matches!(result, Err(DeviceError::Config(_))));
        assert!(backend.calls.borrow().is_empty());
    }
}
