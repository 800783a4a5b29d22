//! 排序字段映射
//!
//! 将客户端使用的公开字段名映射到数据库列

use std::collections::HashMap;

use crate::utils::error::{AppError, AppResult};

/// 可通过 [`PropertyMapping`] 排序的实体
///
/// `SORTABLE_FIELDS` 是客户端可用的公开字段名，`BACKING_FIELDS` 是可映射到的数据库列。
pub trait SortableEntity {
    const ENTITY: &'static str;
    const SORTABLE_FIELDS: &'static [&'static str];
    const BACKING_FIELDS: &'static [&'static str];
}

/// 公开字段展开后的一个数据库列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackingField {
    pub name: String,
    /// 排序项未指定方向时使用
    pub descending_by_default: bool,
}

/// 公开字段名（不区分大小写）到一个或多个数据库列的映射
#[derive(Debug, Clone, Default)]
pub struct PropertyMapping {
    entries: HashMap<String, Vec<BackingField>>,
}

impl PropertyMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// 映射 `public` 到 `backing`，默认升序
    pub fn map(self, public: &str, backing: &[&str]) -> Self {
        self.insert(public, backing, false)
    }

    /// 映射 `public` 到 `backing`，默认降序
    pub fn map_descending(self, public: &str, backing: &[&str]) -> Self {
        self.insert(public, backing, true)
    }

    fn insert(mut self, public: &str, backing: &[&str], descending_by_default: bool) -> Self {
        let fields = backing
            .iter()
            .map(|name| BackingField {
                name: (*name).to_string(),
                descending_by_default,
            })
            .collect();
        self.entries.insert(public.to_lowercase(), fields);
        self
    }

    pub fn lookup(&self, public: &str) -> Option<&[BackingField]> {
        self.entries
            .get(&public.to_lowercase())
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按实体声明的字段校验映射表
    ///
    /// 每个可排序字段都必须有映射，不允许多余的映射，且每个列都必须是已知列。
    /// 列名会直接拼入 `ORDER BY`，只允许已知列。
    pub fn validate<E: SortableEntity>(&self) -> AppResult<()> {
        for public in E::SORTABLE_FIELDS {
            if self.lookup(public).is_none() {
                return Err(AppError::Config(format!(
                    "{}: 可排序字段 '{}' 没有属性映射",
                    E::ENTITY,
                    public
                )));
            }
        }

        for (public, backing) in &self.entries {
            if !E::SORTABLE_FIELDS
                .iter()
                .any(|f| f.eq_ignore_ascii_case(public))
            {
                return Err(AppError::Config(format!(
                    "{}: '{}' 不是可排序字段",
                    E::ENTITY,
                    public
                )));
            }
            if backing.is_empty() {
                return Err(AppError::Config(format!(
                    "{}: '{}' 的映射没有数据库列",
                    E::ENTITY,
                    public
                )));
            }
            if let Some(unknown) = backing
                .iter()
                .find(|b| !E::BACKING_FIELDS.contains(&b.name.as_str()))
            {
                return Err(AppError::Config(format!(
                    "{}: '{}' 的映射包含未知列 '{}'",
                    E::ENTITY,
                    public,
                    unknown.name
                )));
            }
        }

        Ok(())
    }
}
