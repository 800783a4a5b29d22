//! 错误处理模块
//!
//! 定义目录服务的错误类型

use serde::Serialize;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 数据库错误
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 错误
    #[error("JSON 错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 参数无效（空标识符、空批量或格式错误）
    #[error("参数无效: {0}")]
    InvalidArgument(String),

    /// 排序字段没有对应的属性映射
    #[error("未知排序字段: {0}")]
    UnknownSortField(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 通用错误
    #[error("{0}")]
    General(String),
}

impl AppError {
    /// 构造参数无效错误
    pub fn invalid_argument(what: impl Into<String>) -> Self {
        AppError::InvalidArgument(what.into())
    }

    /// 返回给调用方的错误码
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "E_DB_ERROR",
            AppError::Io(_) => "E_IO_ERROR",
            AppError::Json(_) => "E_JSON_ERROR",
            AppError::InvalidArgument(_) => "E_INVALID_ARGUMENT",
            AppError::UnknownSortField(_) => "E_UNKNOWN_SORT_FIELD",
            AppError::Config(_) => "E_CONFIG",
            AppError::General(_) => "E_GENERAL",
        }
    }

    /// 是否由客户端输入引起
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidArgument(_) | AppError::UnknownSortField(_)
        )
    }
}

/// 调用方可见的错误包装
#[derive(Debug, Clone, Serialize)]
pub struct CommandError {
    pub code: String,
    pub message: String,
}

impl From<AppError> for CommandError {
    fn from(err: AppError) -> Self {
        CommandError {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        CommandError {
            code: self.code().to_string(),
            message: self.to_string(),
        }
        .serialize(serializer)
    }
}

/// 应用程序结果类型别名
pub type AppResult<T> = Result<T, AppError>;
