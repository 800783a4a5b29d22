//! 排序表达式解析
//!
//! 将客户端排序字符串（如 `"rating desc, title"`）解析为有序的数据库列和方向。
//! 同一个 [`SortSpec`] 既能生成 SQL `ORDER BY`，也能对内存切片排序，
//! 两者都是稳定排序：完全相同的记录保持插入顺序。

use std::cmp::Ordering;

use super::mapping::PropertyMapping;
use crate::models::SortOrder;
use crate::utils::error::{AppError, AppResult};

/// 用于比较的单个列值
///
/// 无论升序降序，空值总排在最后，与 SQL 中的 `NULLS LAST` 一致。
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Null,
    Int(i64),
    Real(f64),
    Text(String),
}

impl SortValue {
    fn cmp_with(&self, other: &Self, order: SortOrder) -> Ordering {
        let ordering = match (self, other) {
            (SortValue::Null, SortValue::Null) => return Ordering::Equal,
            (SortValue::Null, _) => return Ordering::Greater,
            (_, SortValue::Null) => return Ordering::Less,
            (SortValue::Int(a), SortValue::Int(b)) => a.cmp(b),
            (SortValue::Real(a), SortValue::Real(b)) => a.total_cmp(b),
            (SortValue::Int(a), SortValue::Real(b)) => (*a as f64).total_cmp(b),
            (SortValue::Real(a), SortValue::Int(b)) => a.total_cmp(&(*b as f64)),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            // SQLite 中数字排在文本之前
            (SortValue::Text(_), _) => Ordering::Greater,
            (_, SortValue::Text(_)) => Ordering::Less,
        };

        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl From<Option<f64>> for SortValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(SortValue::Null, SortValue::Real)
    }
}

impl From<Option<i64>> for SortValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(SortValue::Null, SortValue::Int)
    }
}

impl From<Option<String>> for SortValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(SortValue::Null, SortValue::Text)
    }
}

/// 可按数据库列在内存中排序的记录
pub trait SortFields {
    fn sort_value(&self, field: &str) -> SortValue;
}

/// 排序键
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub order: SortOrder,
}

/// 有序排序键列表，第一个为主排序键
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec(Vec<SortKey>);

impl SortSpec {
    /// 按 `mapping` 解析排序字符串
    ///
    /// 空字符串得到空排序。逗号分隔的每一项是公开字段名，可跟 `asc` 或 `desc`。
    /// 未知字段返回 [`AppError::UnknownSortField`]，不会被静默忽略。
    pub fn resolve(raw: &str, mapping: &PropertyMapping) -> AppResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::default());
        }

        let mut keys = Vec::new();
        for token in raw.split(',') {
            let token = token.trim();
            let mut parts = token.split_whitespace();

            let Some(name) = parts.next() else {
                return Err(AppError::InvalidArgument(format!(
                    "排序表达式 '{}' 中有空项",
                    raw
                )));
            };

            // 先查字段，再校验排序方向
            let backing = mapping
                .lookup(name)
                .ok_or_else(|| AppError::UnknownSortField(token.to_string()))?;

            let explicit = match parts.next() {
                None => None,
                Some(d) if d.eq_ignore_ascii_case("desc") => Some(SortOrder::Desc),
                Some(d) if d.eq_ignore_ascii_case("asc") => Some(SortOrder::Asc),
                Some(d) => {
                    return Err(AppError::InvalidArgument(format!(
                        "无效的排序方向 '{}'（{}）",
                        d, token
                    )))
                }
            };

            if parts.next().is_some() {
                return Err(AppError::InvalidArgument(format!(
                    "排序项格式错误: '{}'",
                    token
                )));
            }

            for field in backing {
                let order = explicit.unwrap_or(if field.descending_by_default {
                    SortOrder::Desc
                } else {
                    SortOrder::Asc
                });
                keys.push(SortKey {
                    field: field.name.clone(),
                    order,
                });
            }
        }

        tracing::debug!("排序 '{}' 解析为 {} 个排序键", raw, keys.len());
        Ok(Self(keys))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    /// 生成以 `tie_breaker ASC` 结尾的 `ORDER BY` 子句
    ///
    /// `tie_breaker` 应与插入顺序一致（如 `rowid`）。
    pub fn to_order_by_sql(&self, tie_breaker: &str) -> String {
        let mut out = String::from("ORDER BY ");
        for key in &self.0 {
            out.push_str(&format!("{} {} NULLS LAST, ", key.field, key.order.as_sql()));
        }
        out.push_str(tie_breaker);
        out.push_str(" ASC");
        out
    }

    /// 逐个排序键比较两条记录
    pub fn compare<T: SortFields>(&self, a: &T, b: &T) -> Ordering {
        for key in &self.0 {
            let ordering = a
                .sort_value(&key.field)
                .cmp_with(&b.sort_value(&key.field), key.order);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// 稳定的原地排序，空排序不改变顺序
    pub fn sort_slice<T: SortFields>(&self, items: &mut [T]) {
        if self.is_empty() {
            return;
        }
        items.sort_by(|a, b| self.compare(a, b));
    }
}

impl From<Vec<SortKey>> for SortSpec {
    fn from(keys: Vec<SortKey>) -> Self {
        Self(keys)
    }
}

impl IntoIterator for SortSpec {
    type Item = SortKey;
    type IntoIter = std::vec::IntoIter<SortKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
