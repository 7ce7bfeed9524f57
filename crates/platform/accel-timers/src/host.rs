//! 基于单调时钟的主机计时器

use std::io::{self, Write};
use std::time::Instant;

use crate::config::TimerConfig;
use crate::error::ConfigError;
use crate::report;

/// 纳秒到毫秒的换算系数
const NANOS_TO_MILLIS: f64 = 1e-6;

/// 主机计时器
///
/// Brackets a region of host code with [`start`](Self::start) and
/// [`stop`](Self::stop). Both markers start out at the construction instant and are
/// overwritten on every cycle, so one instance can measure any number of intervals.
#[derive(Debug, Clone)]
pub struct HostTimer {
    start: Instant,
    stop: Instant,
    config: TimerConfig,
}

impl HostTimer {
    /// 创建使用默认前缀的计时器
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            stop: now,
            config: TimerConfig::host(),
        }
    }

    /// 使用自定义配置创建计时器
    pub fn with_config(config: TimerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// 开始计时
    pub fn start(&mut self) {
        self.start = Instant::now();
        log::trace!("host timer started");
    }

    /// 停止计时，输出到标准输出并返回经过的毫秒数
    pub fn stop(&mut self, label: Option<&str>) -> f64 {
        let elapsed = self.capture();
        report::print_report(self.prefix(label), elapsed);
        elapsed
    }

    /// 停止计时，输出到指定的 writer
    pub fn stop_to<W: Write + ?Sized>(
        &mut self,
        label: Option<&str>,
        out: &mut W,
    ) -> io::Result<f64> {
        let elapsed = self.capture();
        report::write_report(out, self.prefix(label), elapsed)?;
        Ok(elapsed)
    }

    /// 最近一次测量的毫秒数（不输出）
    pub fn elapsed_ms(&self) -> f64 {
        self.stop.saturating_duration_since(self.start).as_nanos() as f64 * NANOS_TO_MILLIS
    }

    fn capture(&mut self) -> f64 {
        self.stop = Instant::now();
        let elapsed = self.elapsed_ms();
        log::debug!("host timer stopped: {:.6} ms", elapsed);
        elapsed
    }

    fn prefix<'a>(&'a self, label: Option<&'a str>) -> &'a str {
        label.unwrap_or(&self.config.prefix)
    }
}

impl Default for HostTimer {
    fn default() -> Self {
        Self::new()
    }
}
