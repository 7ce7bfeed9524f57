//! 错误类型与设备 API 结果检查
//!
//! Every device-API status flows through [`check_result`]. Callers that want the
//! terminate-on-failure behaviour wrap a call in [`check_error!`](crate::check_error).

use std::io;

/// 设备计时错误类型
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("{call} failed with status {code}")]
    Api { call: &'static str, code: i32 },
    #[error("Event has not been recorded")]
    NotRecorded,
    #[error("Event has not completed yet")]
    NotReady,
    #[error("Stream operation #{0} has not been submitted")]
    InvalidSequence(u64),
    #[error("Execution stream faulted: {0}")]
    StreamFault(String),
    #[error("Failed to spawn stream worker: {0}")]
    Spawn(#[source] io::Error),
    #[error("Failed to write timing report: {0}")]
    Report(#[source] io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// 配置错误类型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// 设备 API 的成功状态码
pub const API_SUCCESS: i32 = 0;

/// 检查设备 API 返回的状态码
///
/// `call` names the API entry point so the diagnostic says which call failed.
pub fn check_result(call: &'static str, code: i32) -> Result<(), DeviceError> {
    if code == API_SUCCESS {
        Ok(())
    } else {
        Err(DeviceError::Api { call, code })
    }
}

/// 报告致命错误并终止进程
///
/// Default top-level behaviour for an unhandled device error: a diagnostic on stderr
/// and exit status 1.
pub fn fatal(err: &dyn std::error::Error, file: &str, line: u32) -> ! {
    log::error!("{}:{}: {}", file, line, err);
    eprintln!("{}:{}: {}", file, line, err);
    std::process::exit(1)
}

/// Unwrap a `Result`, or report the error and terminate the process.
///
/// # Example
///
/// ```rust,ignore
/// use accel_timers::check_error;
///
/// let mut timer = check_error!(DeviceTimer::new(backend));
/// check_error!(timer.start());
/// ```
#[macro_export]
macro_rules! check_error {
    ($call:expr) => {
        match $call {
            Ok(value) => value,
            Err(err) => $crate::error::fatal(&err, file!(), line!()),
        }
    };
}
