//! # CUDA 事件后端
//!
//! 通过 `cudarc` 驱动绑定使用 CUDA 事件计时：
//! - 事件创建/销毁
//! - 在设备流上记录事件
//! - 同步并查询两个事件之间的时间
//!
//! ## 依赖项
//!
//! - `cudarc`: CUDA驱动绑定
//! - NVIDIA GPU驱动

use std::sync::Arc;

use cudarc::driver::{CudaDevice, DriverError, result, sys};

use super::EventBackend;
use crate::error::DeviceError;

/// CUDA 事件句柄
#[derive(Debug)]
pub struct CudaEvent(sys::CUevent);

/// CUDA 事件后端
///
/// Records on the default stream of the bound device.
pub struct CudaEvents {
    device: Arc<CudaDevice>,
}

impl CudaEvents {
    /// 绑定 CUDA 设备
    ///
    /// # Arguments
    ///
    /// * `ordinal` - CUDA 设备 ID（默认为 0）
    pub fn new(ordinal: usize) -> Result<Self, DeviceError> {
        log::info!("Initializing CUDA event backend for device {}", ordinal);
        let device = check("CudaDevice::new", CudaDevice::new(ordinal))?;
        Ok(Self { device })
    }

    /// 使用已有设备
    pub fn from_device(device: Arc<CudaDevice>) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &Arc<CudaDevice> {
        &self.device
    }

    fn stream(&self) -> sys::CUstream {
        *self.device.cu_stream()
    }

    fn bind(&self) -> Result<(), DeviceError> {
        check("cuCtxSetCurrent", self.device.bind_to_thread())
    }
}

impl EventBackend for CudaEvents {
    type Event = CudaEvent;

    fn create_event(&self) -> Result<Self::Event, DeviceError> {
        self.bind()?;
        let event = check(
            "cuEventCreate",
            result::event::create(sys::CUevent_flags::CU_EVENT_DEFAULT),
        )?;
        Ok(CudaEvent(event))
    }

    fn record_event(&self, event: &Self::Event) -> Result<(), DeviceError> {
        self.bind()?;
        // SAFETY: the event was created by `create_event` and is destroyed only by
        // `destroy_event`; the stream belongs to the device we hold.
        check("cuEventRecord", unsafe {
            result::event::record(event.0, self.stream())
        })
    }

    fn synchronize_event(&self, event: &Self::Event) -> Result<(), DeviceError> {
        self.bind()?;
        // SAFETY: the event is a live handle created by `create_event`.
        check("cuEventSynchronize", unsafe {
            sys::lib().cuEventSynchronize(event.0).result()
        })
    }

    fn elapsed_ms(&self, start: &Self::Event, stop: &Self::Event) -> Result<f32, DeviceError> {
        self.bind()?;
        // SAFETY: both events are live handles owned by the caller.
        check("cuEventElapsedTime", unsafe {
            result::event::elapsed(start.0, stop.0)
        })
    }

    fn destroy_event(&self, event: &Self::Event) -> Result<(), DeviceError> {
        self.bind()?;
        // SAFETY: called once per event, from the owning timer's release path.
        check("cuEventDestroy", unsafe { result::event::destroy(event.0) })
    }
}

/// 将驱动错误转换为 `DeviceError`
fn check<T>(call: &'static str, outcome: Result<T, DriverError>) -> Result<T, DeviceError> {
    outcome.map_err(|err| {
        log::error!("{} failed: {:?}", call, err);
        DeviceError::Api {
            call,
            code: err.0 as i32,
        }
    })
}
