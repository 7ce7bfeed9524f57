//! 模拟执行流
//!
//! 在专用工作线程上按提交顺序执行的工作队列，语义与设备执行流一致：
//! 提交不阻塞，等待某个序号即等待其之前的所有工作完成。

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};

use crate::error::DeviceError;

/// 流上的一个操作，参数为该操作的序号
type StreamOp = Box<dyn FnOnce(u64) + Send + 'static>;

/// 队列状态
#[derive(Default)]
struct QueueState {
    ops: VecDeque<StreamOp>,
    /// 已提交的操作数
    submitted: u64,
    /// 已执行完成的操作数
    completed: u64,
    /// 第一个失败操作的描述
    fault: Option<String>,
    shutdown: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    /// 有新工作或需要退出
    work_ready: Condvar,
    /// 有操作执行完成
    progress: Condvar,
}

/// 模拟执行流
pub struct HostStream {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl HostStream {
    /// 创建执行流并启动工作线程
    pub fn new() -> Result<Self, DeviceError> {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState::default()),
            work_ready: Condvar::new(),
            progress: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("host-stream".to_string())
            .spawn(move || run_worker(&worker_shared))
            .map_err(DeviceError::Spawn)?;

        log::debug!("host stream worker started");
        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// 提交操作，返回其序号（从 1 开始）
    pub fn enqueue<F>(&self, op: F) -> u64
    where
        F: FnOnce() + Send + 'static,
    {
        self.enqueue_with_seq(move |_| op())
    }

    pub(crate) fn enqueue_with_seq<F>(&self, op: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        let mut state = self.shared.state.lock();
        state.submitted += 1;
        state.ops.push_back(Box::new(op));
        let seq = state.submitted;
        drop(state);

        self.shared.work_ready.notify_one();
        log::trace!("enqueued stream op #{}", seq);
        seq
    }

    /// 阻塞直到序号为 `seq` 的操作执行完成
    ///
    /// 尚未提交的序号返回 `DeviceError::InvalidSequence`。
    pub fn wait_for(&self, seq: u64) -> Result<(), DeviceError> {
        let mut state = self.shared.state.lock();
        if seq > state.submitted {
            return Err(DeviceError::InvalidSequence(seq));
        }
        while state.completed < seq && state.fault.is_none() {
            self.shared.progress.wait(&mut state);
        }

        match &state.fault {
            Some(reason) => Err(DeviceError::StreamFault(reason.clone())),
            None => Ok(()),
        }
    }

    /// 等待所有已提交的工作完成
    pub fn synchronize(&self) -> Result<(), DeviceError> {
        let target = self.shared.state.lock().submitted;
        self.wait_for(target)
    }

    /// 已执行完成的操作数
    pub fn completed(&self) -> u64 {
        self.shared.state.lock().completed
    }

    /// 序号为 `seq` 的操作是否已执行完成
    pub fn is_complete(&self, seq: u64) -> bool {
        self.completed() >= seq
    }
}

impl Drop for HostStream {
    fn drop(&mut self) {
        self.shared.state.lock().shutdown = true;
        self.shared.work_ready.notify_all();

        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            log::error!("host stream worker terminated abnormally");
        }
    }
}

fn run_worker(shared: &Shared) {
    loop {
        let mut state = shared.state.lock();
        while state.ops.is_empty() && !state.shutdown {
            shared.work_ready.wait(&mut state);
        }
        let Some(op) = state.ops.pop_front() else {
            // 队列已清空且收到退出信号
            break;
        };
        let seq = state.completed + 1;
        drop(state);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| op(seq)));

        let mut state = shared.state.lock();
        state.completed = seq;
        if let Err(payload) = outcome {
            let reason = panic_message(&*payload);
            log::warn!("stream op #{} panicked: {}", seq, reason);
            if state.fault.is_none() {
                state.fault = Some(format!("op #{seq} panicked: {reason}"));
            }
        }
        drop(state);
        shared.progress.notify_all();
    }
    log::debug!("host stream worker stopped");
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
