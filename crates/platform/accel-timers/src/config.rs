//! 计时器输出配置

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 设备计时器的默认输出前缀
pub const DEVICE_DEFAULT_PREFIX: &str = "cudaEventElapsedTime: ";

/// 主机计时器的默认输出前缀（保留原有拼写）
pub const HOST_DEFAULT_PREFIX: &str = "Time elpased: ";

/// 计时器配置
///
/// `prefix` is printed in front of the elapsed value whenever `stop` is called without
/// a label. A missing `prefix` key deserialises to the host default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub prefix: String,
}

impl TimerConfig {
    /// 主机计时器默认配置
    pub fn host() -> Self {
        Self {
            prefix: HOST_DEFAULT_PREFIX.to_string(),
        }
    }

    /// 设备计时器默认配置
    pub fn device() -> Self {
        Self {
            prefix: DEVICE_DEFAULT_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// 验证配置
    ///
    /// # 错误
    ///
    /// 前缀包含换行符时返回 `ConfigError::Invalid`，每次报告必须只占一行。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix.contains(['\n', '\r']) {
            return Err(ConfigError::Invalid(format!(
                "prefix must not contain a line break: {:?}",
                self.prefix
            )));
        }
        Ok(())
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::host()
    }
}
