//! 属性映射服务
//!
//! 为每个可排序实体注册经过校验的排序字段映射

use std::collections::HashMap;

use crate::models::TouristRoute;
use crate::query::{PropertyMapping, SortableEntity};
use crate::utils::error::{AppError, AppResult};

/// 排序字段映射服务
#[derive(Debug, Default)]
pub struct PropertyMappingService {
    mappings: HashMap<&'static str, PropertyMapping>,
}

impl PropertyMappingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建并注册所有内置实体映射
    pub fn with_defaults() -> AppResult<Self> {
        let mut service = Self::new();
        service.register::<TouristRoute>(tourist_route_mapping())?;
        Ok(service)
    }

    /// 校验并注册实体 `E` 的映射，覆盖已有映射
    pub fn register<E: SortableEntity>(&mut self, mapping: PropertyMapping) -> AppResult<()> {
        mapping.validate::<E>()?;
        tracing::debug!("已注册 {} 的 {} 个排序字段", E::ENTITY, mapping.len());
        self.mappings.insert(E::ENTITY, mapping);
        Ok(())
    }

    /// 获取实体 `E` 的映射
    pub fn get_property_mapping<E: SortableEntity>(&self) -> AppResult<&PropertyMapping> {
        self.mappings.get(E::ENTITY).ok_or_else(|| {
            AppError::Config(format!("{} 未注册属性映射", E::ENTITY))
        })
    }
}

/// 旅游路线的公开排序字段
pub fn tourist_route_mapping() -> PropertyMapping {
    PropertyMapping::new()
        .map("id", &["id"])
        .map("title", &["title"])
        .map("description", &["description"])
        .map("originalPrice", &["original_price"])
        .map("rating", &["rating"])
        .map("travelDays", &["travel_days"])
        .map("tripType", &["trip_type"])
        .map("departureCity", &["departure_city"])
        .map("departureTime", &["departure_time"])
        .map("createTime", &["create_time"])
        .map("updateTime", &["update_time"])
        .map("departure", &["departure_city", "departure_time"])
        .map_descending("latest", &["create_time"])
}
