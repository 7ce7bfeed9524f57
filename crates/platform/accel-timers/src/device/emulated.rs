//! 模拟事件后端
//!
//! 事件记录即向 [`HostStream`] 提交一个打点操作，工作线程执行到该操作时写入时间戳。

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use super::EventBackend;
use super::stream::HostStream;
use crate::error::DeviceError;

#[derive(Debug, Default)]
struct EventState {
    /// 最近一次记录对应的流序号
    recorded_seq: Option<u64>,
    /// 工作线程到达该记录时的时间戳
    reached_at: Option<Instant>,
}

/// 模拟事件
#[derive(Debug, Clone, Default)]
pub struct EmulatedEvent {
    state: Arc<Mutex<EventState>>,
}

impl EmulatedEvent {
    fn reached(&self) -> Result<Instant, DeviceError> {
        let state = self.state.lock();
        match (state.recorded_seq, state.reached_at) {
            (None, _) => Err(DeviceError::NotRecorded),
            (Some(_), None) => Err(DeviceError::NotReady),
            (Some(_), Some(at)) => Ok(at),
        }
    }
}

/// 基于模拟执行流的事件后端
#[derive(Clone)]
pub struct EmulatedEvents {
    stream: Arc<HostStream>,
}

impl EmulatedEvents {
    pub fn new(stream: Arc<HostStream>) -> Self {
        Self { stream }
    }

    /// 创建独占新执行流的后端
    pub fn with_new_stream() -> Result<Self, DeviceError> {
        Ok(Self::new(Arc::new(HostStream::new()?)))
    }

    pub fn stream(&self) -> &Arc<HostStream> {
        &self.stream
    }
}

impl EventBackend for EmulatedEvents {
    type Event = EmulatedEvent;

    fn create_event(&self) -> Result<Self::Event, DeviceError> {
        Ok(EmulatedEvent::default())
    }

    fn record_event(&self, event: &Self::Event) -> Result<(), DeviceError> {
        // Held across enqueue so the marker cannot run before its sequence number is
        // stored; a later record supersedes an earlier one still in flight.
        let mut state = event.state.lock();
        let marker = Arc::clone(&event.state);
        let seq = self.stream.enqueue_with_seq(move |seq| {
            let now = Instant::now();
            let mut state = marker.lock();
            if state.recorded_seq == Some(seq) {
                state.reached_at = Some(now);
            }
        });
        state.recorded_seq = Some(seq);
        state.reached_at = None;
        Ok(())
    }

    fn synchronize_event(&self, event: &Self::Event) -> Result<(), DeviceError> {
        let seq = event
            .state
            .lock()
            .recorded_seq
            .ok_or(DeviceError::NotRecorded)?;
        self.stream.wait_for(seq)
    }

    fn elapsed_ms(&self, start: &Self::Event, stop: &Self::Event) -> Result<f32, DeviceError> {
        let start = start.reached()?;
        let stop = stop.reached()?;
        let millis = if stop >= start {
            stop.duration_since(start).as_secs_f64() * 1000.0
        } else {
            -(start.duration_since(stop).as_secs_f64() * 1000.0)
        };
        Ok(millis as f32)
    }

    fn destroy_event(&self, event: &Self::Event) -> Result<(), DeviceError> {
        let mut state = event.state.lock();
        state.recorded_seq = None;
        state.reached_at = None;
        Ok(())
    }
}
