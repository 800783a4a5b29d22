//! 工具模块
//!
//! 包含通用工具函数

pub mod error;

pub use error::*;

/// 获取当前 RFC 3339 时间字符串
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
