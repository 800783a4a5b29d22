//! 分页模块
//!
//! 对可计数、尚未物化的数据源做偏移分页

use serde::{Deserialize, Serialize};

use crate::utils::error::AppResult;

/// 携带 [`PaginationMetadata`] 的响应头名称
pub const PAGINATION_HEADER: &str = "x-pagination";

/// 可在物化前计数和切片的查询
pub trait QuerySource<T> {
    /// 数据源的记录总数
    fn count(&self) -> AppResult<i64>;

    /// 从 `offset` 开始按顺序取出最多 `limit` 条记录
    fn fetch(&self, offset: i64, limit: i64) -> AppResult<Vec<T>>;
}

impl<T: Clone> QuerySource<T> for [T] {
    fn count(&self) -> AppResult<i64> {
        Ok(self.len() as i64)
    }

    fn fetch(&self, offset: i64, limit: i64) -> AppResult<Vec<T>> {
        Ok(self
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

impl<T: Clone> QuerySource<T> for Vec<T> {
    fn count(&self) -> AppResult<i64> {
        self.as_slice().count()
    }

    fn fetch(&self, offset: i64, limit: i64) -> AppResult<Vec<T>> {
        self.as_slice().fetch(offset, limit)
    }
}

/// 分页参数（已校正）
///
/// 只能通过 [`PaginationParams::normalized`] 构造，页码和每页数量总在合法范围内。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    page: u32,
    page_size: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

impl PaginationParams {
    /// 校正客户端输入：页码至少为 1，每页数量限制在 `1..=max_page_size`
    pub fn normalized(page_number: i64, page_size: i64, max_page_size: u32) -> Self {
        let max_page_size = max_page_size.max(1);
        Self {
            page: page_number.clamp(1, u32::MAX as i64) as u32,
            page_size: page_size.clamp(1, max_page_size as i64) as u32,
        }
    }

    /// 当前页码（从 1 开始）
    pub fn page(&self) -> u32 {
        self.page
    }

    /// 每页数量
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// 本页之前需要跳过的行数
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1).saturating_mul(self.page_size as i64)
    }
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationList<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page_size: u32,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> PaginationList<T> {
    /// 先计数，再只取出请求的那一页
    ///
    /// 超出末尾的页返回空列表，不报错。
    pub fn create<S>(source: &S, pagination: PaginationParams) -> AppResult<Self>
    where
        S: QuerySource<T> + ?Sized,
    {
        let total_count = source.count()?;
        let skip = pagination.offset();

        let items = if skip >= total_count {
            Vec::new()
        } else {
            let take = (pagination.page_size() as i64).min(total_count - skip);
            source.fetch(skip, take)?
        };

        Ok(Self::new(items, total_count, pagination))
    }

    /// 组装分页结果
    pub fn new(items: Vec<T>, total_count: i64, pagination: PaginationParams) -> Self {
        let page_size = pagination.page_size as i64;
        let total_pages = ((total_count.max(0) + page_size - 1) / page_size) as u32;
        Self {
            items,
            total_count,
            page_size: pagination.page_size,
            current_page: pagination.page,
            total_pages,
            has_previous: pagination.page > 1,
            has_next: pagination.page < total_pages,
        }
    }

    /// 获取分页元数据
    pub fn metadata(&self) -> PaginationMetadata {
        PaginationMetadata {
            total_count: self.total_count,
            page_size: self.page_size,
            current_page: self.current_page,
            total_pages: self.total_pages,
            has_previous: self.has_previous,
            has_next: self.has_next,
        }
    }

    /// 转换每一项，保留分页信息
    pub fn map<U, F>(self, f: F) -> PaginationList<U>
    where
        F: FnMut(T) -> U,
    {
        PaginationList {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_size: self.page_size,
            current_page: self.current_page,
            total_pages: self.total_pages,
            has_previous: self.has_previous,
            has_next: self.has_next,
        }
    }
}

impl<T> From<PaginationList<T>> for Vec<T> {
    fn from(val: PaginationList<T>) -> Self {
        val.items
    }
}

/// 分页元数据，随结果一起返回（如 [`PAGINATION_HEADER`]）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMetadata {
    pub total_count: i64,
    pub page_size: u32,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PaginationMetadata {
    /// 序列化为响应头的 JSON 值
    pub fn to_header_value(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn numbers(n: i64) -> Vec<i64> {
        (1..=n).collect()
    }

    fn page(total: i64, page_number: i64, page_size: i64) -> PaginationList<i64> {
        let params = PaginationParams::normalized(page_number, page_size, 50);
        PaginationList::create(&numbers(total), params).unwrap()
    }

    #[test]
    fn test_last_partial_page() {
        let result = page(25, 3, 10);
        assert_eq!(result.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(result.total_count, 25);
        assert_eq!(result.total_pages, 3);
        assert!(!result.has_next);
        assert!(result.has_previous);
    }

    #[test]
    fn test_empty_source() {
        let result = page(0, 1, 10);
        assert!(result.items.is_empty());
        assert_eq!(result.total_pages, 0);
        assert!(!result.has_next);
        assert!(!result.has_previous);
    }

    #[test]
    fn test_page_zero_is_clamped() {
        let result = page(25, 0, 10);
        assert_eq!(result.current_page, 1);
        assert_eq!(result.items.first(), Some(&1));
        assert!(!result.has_previous);

        let result = page(25, -4, 10);
        assert_eq!(result.current_page, 1);
    }

    #[test]
    fn test_create_never_reports_unclamped_values() {
        let rows = numbers(25);

        let result = PaginationList::create(&rows, PaginationParams::normalized(0, 10, 50)).unwrap();
        assert_eq!(result.current_page, 1);
        assert_eq!(result.items, (1..=10).collect::<Vec<i64>>());
        assert!(!result.has_previous);

        let result = PaginationList::create(&rows, PaginationParams::normalized(1, 0, 50)).unwrap();
        assert_eq!(result.page_size, 1);
        assert_eq!(result.total_pages, 25);
        assert_eq!(result.items, vec![1]);

        let result =
            PaginationList::create(&rows, PaginationParams::normalized(1, 1000, 50)).unwrap();
        assert_eq!(result.page_size, 50);
        assert_eq!(result.total_pages, 1);
    }

    #[test]
    fn test_params_serialize_clamped_values() {
        let params = PaginationParams::normalized(0, 0, 50);
        let json = serde_json::to_value(params).unwrap();
        assert_eq!(json["page"], 1);
        assert_eq!(json["pageSize"], 1);
    }

    #[test]
    fn test_offset_saturates_for_huge_pages() {
        let params = PaginationParams::normalized(i64::MAX, i64::MAX, u32::MAX);
        assert_eq!(params.page(), u32::MAX);
        assert_eq!(params.page_size(), u32::MAX);
        assert_eq!(params.offset(), i64::MAX);

        let result = PaginationList::create(&numbers(5), params).unwrap();
        assert!(result.items.is_empty());
        assert!(result.has_previous);
    }

    #[test]
    fn test_page_size_is_clamped() {
        let params = PaginationParams::normalized(1, 1000, 50);
        assert_eq!(params.page_size(), 50);

        let params = PaginationParams::normalized(1, 0, 50);
        assert_eq!(params.page_size(), 1);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let result = page(25, 7, 10);
        assert!(result.items.is_empty());
        assert_eq!(result.total_pages, 3);
        assert!(!result.has_next);
        assert!(result.has_previous);
    }

    #[test]
    fn test_page_size_larger_than_total() {
        let result = page(4, 1, 10);
        assert_eq!(result.items.len(), 4);
        assert_eq!(result.total_pages, 1);
        assert!(!result.has_next);
    }

    #[test]
    fn test_item_count_formula_holds() {
        for total in [0_i64, 1, 9, 10, 11, 25, 50] {
            for size in [1_i64, 3, 10, 50] {
                for number in 1..=6_i64 {
                    let result = page(total, number, size);
                    let expected = size.min((total - (number - 1) * size).max(0));
                    assert_eq!(result.items.len() as i64, expected);
                    assert_eq!(result.total_pages as i64, (total + size - 1) / size);
                    assert_eq!(result.has_previous, number > 1);
                    assert_eq!(result.has_next, (number as u32) < result.total_pages);
                }
            }
        }
    }

    struct CountingSource {
        rows: Vec<i64>,
        fetches: Cell<u32>,
    }

    impl QuerySource<i64> for CountingSource {
        fn count(&self) -> AppResult<i64> {
            Ok(self.rows.len() as i64)
        }

        fn fetch(&self, offset: i64, limit: i64) -> AppResult<Vec<i64>> {
            self.fetches.set(self.fetches.get() + 1);
            self.rows.fetch(offset, limit)
        }
    }

    #[test]
    fn test_out_of_range_page_does_not_materialise() {
        let source = CountingSource {
            rows: numbers(5),
            fetches: Cell::new(0),
        };
        let result: PaginationList<i64> =
            PaginationList::create(&source, PaginationParams::normalized(3, 5, 50)).unwrap();
        assert!(result.items.is_empty());
        assert_eq!(source.fetches.get(), 0);
    }

    #[test]
    fn test_metadata_header_value() {
        let result = page(25, 2, 10);
        let header = result.metadata().to_header_value().unwrap();
        let json: serde_json::Value = serde_json::from_str(&header).unwrap();
        assert_eq!(json["totalCount"], 25);
        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["hasNext"], true);
        assert_eq!(json["hasPrevious"], true);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let result = page(25, 3, 10).map(|n| n.to_string());
        assert_eq!(result.items[0], "21");
        assert_eq!(result.total_pages, 3);
    }
}
