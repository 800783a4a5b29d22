//! 数据模型模块
//!
//! 包含所有数据结构定义

pub mod picture;
pub mod settings;
pub mod tourist_route;

// 重新导出常用类型
pub use picture::TouristRoutePicture;
pub use settings::{AppSettings, DatabaseSettings, HttpSettings, PaginationSettings};
pub use tourist_route::TouristRoute;

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}
