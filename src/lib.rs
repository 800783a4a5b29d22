//! 旅游路线目录
//!
//! 基于 SQLite 的旅游路线及图片数据访问层，支持关键词/评分过滤、排序和分页

pub mod db;
pub mod models;
pub mod paths;
pub mod query;
pub mod services;
pub mod utils;

use std::path::Path;
use std::sync::Arc;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use db::Database;
use models::AppSettings;
use paths::PathProvider;
use services::{
    PropertyMappingService, ReqwestFetcher, SettingsManager, SqliteTouristRouteRepository,
};
use utils::error::AppResult;

pub use models::{TouristRoute, TouristRoutePicture};
pub use query::{PaginationList, PaginationMetadata, TouristRouteFilterParameters};
pub use services::TouristRouteRepository;
pub use utils::error::{AppError, CommandError};

/// 初始化日志系统
///
/// 输出到标准输出；传入 `logs_dir` 时同时按天滚动写入文件。
/// 返回的 guard 需在文件日志期间保持存活。重复调用时保留第一次的设置。
pub fn init_logging(logs_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let (file_layer, guard) = match logs_dir {
        Some(dir) => {
            if let Err(e) = std::fs::create_dir_all(dir) {
                eprintln!("无法创建日志目录 {:?}: {}", dir, e);
                (None, None)
            } else {
                let appender = tracing_appender::rolling::daily(dir, "catalog.log");
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer().with_writer(writer).with_ansi(false);
                (Some(layer), Some(guard))
            }
        }
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init();

    if installed.is_err() {
        tracing::debug!("日志系统已初始化");
    }

    guard
}

/// 应用程序核心
///
/// 加载设置、打开数据库并组装仓储
pub struct CatalogCore {
    settings: AppSettings,
    settings_manager: SettingsManager,
    db: Arc<Database>,
    repository: Arc<SqliteTouristRouteRepository>,
}

impl CatalogCore {
    pub fn new(provider: &dyn PathProvider) -> AppResult<Self> {
        let settings_manager = SettingsManager::new(provider)?;
        let settings = settings_manager.load()?;

        tracing::info!(
            "数据库路径: {:?}",
            provider.database_path(&settings.database.file_name)
        );
        let db = Arc::new(Database::open_with_provider(
            provider,
            &settings.database.file_name,
        )?);
        db.init()?;

        let mappings = Arc::new(PropertyMappingService::with_defaults()?);
        let fetcher = Arc::new(ReqwestFetcher::new(&settings.http)?);
        let repository = Arc::new(SqliteTouristRouteRepository::new(
            db.clone(),
            mappings,
            settings.pagination,
            fetcher,
        ));

        tracing::info!("数据库初始化完成");
        Ok(Self {
            settings,
            settings_manager,
            db,
            repository,
        })
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn settings_manager(&self) -> &SettingsManager {
        &self.settings_manager
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn repository(&self) -> Arc<SqliteTouristRouteRepository> {
        self.repository.clone()
    }
}
