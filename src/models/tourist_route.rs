//! 旅游路线数据模型

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::picture::TouristRoutePicture;
use crate::query::{SortFields, SortValue, SortableEntity};

/// 旅游路线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouristRoute {
    /// 路线ID
    pub id: Uuid,
    /// 标题
    pub title: String,
    /// 描述
    pub description: String,
    /// 原价
    pub original_price: f64,
    /// 折扣 (0-1)
    pub discount_present: Option<f64>,
    /// 创建时间
    pub create_time: String,
    /// 更新时间
    pub update_time: Option<String>,
    /// 出发时间
    pub departure_time: Option<String>,
    pub features: Option<String>,
    pub fees: Option<String>,
    pub notes: Option<String>,
    /// 评分 (0-5)
    pub rating: Option<f64>,
    /// 行程天数
    pub travel_days: Option<String>,
    /// 旅行类型
    pub trip_type: Option<String>,
    /// 出发城市
    pub departure_city: Option<String>,
    /// 路线图片（随路线一起加载）
    #[serde(default)]
    pub pictures: Vec<TouristRoutePicture>,
}

impl TouristRoute {
    /// 创建新路线记录（用于插入前）
    pub fn new(title: impl Into<String>, description: impl Into<String>, original_price: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            original_price,
            discount_present: None,
            create_time: crate::utils::now_rfc3339(),
            update_time: None,
            departure_time: None,
            features: None,
            fees: None,
            notes: None,
            rating: None,
            travel_days: None,
            trip_type: None,
            departure_city: None,
            pictures: Vec::new(),
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// 折后价格
    pub fn price(&self) -> f64 {
        self.original_price * self.discount_present.unwrap_or(1.0)
    }
}

impl SortableEntity for TouristRoute {
    const ENTITY: &'static str = "TouristRoute";

    const SORTABLE_FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "description",
        "originalPrice",
        "rating",
        "travelDays",
        "tripType",
        "departureCity",
        "departureTime",
        "departure",
        "createTime",
        "updateTime",
        "latest",
    ];

    const BACKING_FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "description",
        "original_price",
        "discount_present",
        "create_time",
        "update_time",
        "departure_time",
        "rating",
        "travel_days",
        "trip_type",
        "departure_city",
    ];
}

impl SortFields for TouristRoute {
    fn sort_value(&self, field: &str) -> SortValue {
        match field {
            "id" => SortValue::Text(self.id.to_string()),
            "title" => SortValue::Text(self.title.clone()),
            "description" => SortValue::Text(self.description.clone()),
            "original_price" => SortValue::Real(self.original_price),
            "discount_present" => self.discount_present.into(),
            "create_time" => SortValue::Text(self.create_time.clone()),
            "update_time" => self.update_time.clone().into(),
            "departure_time" => self.departure_time.clone().into(),
            "rating" => self.rating.into(),
            "travel_days" => self.travel_days.clone().into(),
            "trip_type" => self.trip_type.clone().into(),
            "departure_city" => self.departure_city.clone().into(),
            _ => SortValue::Null,
        }
    }
}
