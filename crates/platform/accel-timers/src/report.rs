//! 计时结果输出
//!
//! Values are rendered like printf's `%g`: six significant digits, trailing zeros
//! trimmed, scientific notation for very small or very large values.

use std::io::{self, Write};

/// 有效数字位数
const SIGNIFICANT_DIGITS: i32 = 6;

/// 格式化毫秒值
pub fn format_elapsed(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string().to_lowercase();
    }

    // Rounding to the target precision first fixes the exponent (999999.5 -> 1e+06).
    let sci = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exponent < -4 || exponent >= SIGNIFICANT_DIGITS {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

/// 生成一行报告（不含换行符）
pub fn report_line(prefix: &str, elapsed_ms: f64) -> String {
    format!("{}{}ms", prefix, format_elapsed(elapsed_ms))
}

/// 写出一行报告
pub fn write_report<W: Write + ?Sized>(
    out: &mut W,
    prefix: &str,
    elapsed_ms: f64,
) -> io::Result<()> {
    writeln!(out, "{}", report_line(prefix, elapsed_ms))?;
    out.flush()
}

/// 写出一行报告，写入失败只记录警告
pub fn emit_report<W: Write + ?Sized>(out: &mut W, prefix: &str, elapsed_ms: f64) {
    if let Err(err) = write_report(out, prefix, elapsed_ms) {
        log::warn!("failed to write timing report: {}", err);
    }
}

/// 输出到标准输出（stdout 关闭时不会 panic）
pub fn print_report(prefix: &str, elapsed_ms: f64) {
    emit_report(&mut io::stdout().lock(), prefix, elapsed_ms);
}
