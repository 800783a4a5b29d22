//! 路线图片数据模型

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 旅游路线图片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouristRoutePicture {
    /// 图片ID（插入后由数据库分配）
    pub id: i64,
    /// 图片地址
    pub url: String,
    /// 所属路线ID
    pub tourist_route_id: Uuid,
}

impl TouristRoutePicture {
    /// 创建新图片记录，路线ID 在添加到路线时设置
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: 0,
            url: url.into(),
            tourist_route_id: Uuid::nil(),
        }
    }
}
