//! 查询模块
//!
//! 包含过滤、排序解析和分页。读请求按 过滤 → 排序 → 分页 的顺序执行，
//! 分页中的总数只统计匹配的记录。

pub mod filter;
pub mod mapping;
pub mod pagination;
pub mod sort;

pub use filter::{RatingOperator, RouteFilter, TouristRouteFilterParameters, WhereClause};
pub use mapping::{BackingField, PropertyMapping, SortableEntity};
pub use pagination::{
    PaginationList, PaginationMetadata, PaginationParams, QuerySource, PAGINATION_HEADER,
};
pub use sort::{SortFields, SortKey, SortSpec, SortValue};
