//! 应用数据路径
//!
//! 解析数据库、设置和日志所在目录

use std::path::PathBuf;
use std::sync::Arc;

/// 应用数据路径提供者
pub trait PathProvider: Send + Sync {
    /// 应用数据根目录
    fn app_data_dir(&self) -> PathBuf;

    /// 数据库目录
    fn database_dir(&self) -> PathBuf {
        self.app_data_dir().join("Database")
    }

    /// 设置文件路径
    fn settings_path(&self) -> PathBuf {
        self.app_data_dir().join("Config").join("settings.json")
    }

    /// 日志目录
    fn logs_dir(&self) -> PathBuf {
        self.app_data_dir().join("Logs")
    }

    /// 数据库文件路径
    fn database_path(&self, file_name: &str) -> PathBuf {
        self.database_dir().join(file_name)
    }
}

/// 共享的 PathProvider
pub type SharedPathProvider = Arc<dyn PathProvider>;

/// 默认路径提供者，使用 `<数据目录>/FakeXiecheng/`
#[derive(Debug, Clone)]
pub struct DefaultPathProvider {
    app_data_dir: PathBuf,
}

impl DefaultPathProvider {
    pub fn new() -> Self {
        let app_data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("FakeXiecheng");
        Self { app_data_dir }
    }

    /// 使用指定根目录（用于测试）
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            app_data_dir: base_dir,
        }
    }
}

impl Default for DefaultPathProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PathProvider for DefaultPathProvider {
    fn app_data_dir(&self) -> PathBuf {
        self.app_data_dir.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_are_under_base_dir() {
        let tmp = TempDir::new().unwrap();
        let provider = DefaultPathProvider::with_base_dir(tmp.path().to_path_buf());

        assert_eq!(provider.app_data_dir(), tmp.path());
        assert!(provider.database_dir().starts_with(tmp.path()));
        assert_eq!(
            provider.database_path("catalog.db"),
            tmp.path().join("Database").join("catalog.db")
        );
        assert_eq!(
            provider.settings_path(),
            tmp.path().join("Config").join("settings.json")
        );
        assert_eq!(provider.logs_dir(), tmp.path().join("Logs"));
    }

    #[test]
    fn test_default_provider_uses_app_folder() {
        let provider = DefaultPathProvider::new();
        assert!(provider.app_data_dir().ends_with("FakeXiecheng"));
    }
}
