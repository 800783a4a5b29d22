//! 路线关键词和评分过滤

use std::str::FromStr;

use regex::Regex;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::models::TouristRoute;
use crate::utils::error::{AppError, AppResult};

/// 评分比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RatingOperator {
    Equal,
    #[serde(alias = "lessThan")]
    LessThanOrEqual,
    #[default]
    #[serde(alias = "largerThan")]
    GreaterThanOrEqual,
}

impl RatingOperator {
    /// 对应的 SQL 运算符
    pub fn as_sql(&self) -> &'static str {
        match self {
            RatingOperator::Equal => "=",
            RatingOperator::LessThanOrEqual => "<=",
            RatingOperator::GreaterThanOrEqual => ">=",
        }
    }

    /// 在内存中比较评分
    pub fn test(&self, rating: f64, value: f64) -> bool {
        match self {
            RatingOperator::Equal => rating == value,
            RatingOperator::LessThanOrEqual => rating <= value,
            RatingOperator::GreaterThanOrEqual => rating >= value,
        }
    }
}

impl FromStr for RatingOperator {
    type Err = AppError;

    /// 同时接受完整名称和旧的 `lessThan`/`largerThan`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equal" | "eq" | "=" => Ok(RatingOperator::Equal),
            "lessthan" | "lessthanorequal" | "le" | "<=" => Ok(RatingOperator::LessThanOrEqual),
            "largerthan" | "greaterthan" | "greaterthanorequal" | "ge" | ">=" => {
                Ok(RatingOperator::GreaterThanOrEqual)
            }
            other => Err(AppError::InvalidArgument(format!(
                "未知的评分运算符 '{}'",
                other
            ))),
        }
    }
}

/// 路线查询参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TouristRouteFilterParameters {
    pub keyword: Option<String>,
    /// 为 0 时不按评分过滤
    pub rating_value: f64,
    pub rating_operator: RatingOperator,
    pub order_by: String,
    pub page_number: i64,
    pub page_size: i64,
}

impl Default for TouristRouteFilterParameters {
    fn default() -> Self {
        Self {
            keyword: None,
            rating_value: 0.0,
            rating_operator: RatingOperator::default(),
            order_by: String::new(),
            page_number: 1,
            page_size: 10,
        }
    }
}

impl TouristRouteFilterParameters {
    /// 解析紧凑评分表达式，如 `largerThan3`、`equal5`
    pub fn set_rating(&mut self, expression: &str) -> AppResult<()> {
        let re = Regex::new(r"^([A-Za-z]+)\s*(\d+(?:\.\d+)?)$")
            .map_err(|e| AppError::General(e.to_string()))?;
        let caps = re
            .captures(expression.trim())
            .ok_or_else(|| {
                AppError::InvalidArgument(format!("评分过滤表达式格式错误: '{}'", expression))
            })?;

        self.rating_operator = caps[1].parse()?;
        self.rating_value = caps[2]
            .parse()
            .map_err(|_| AppError::InvalidArgument(format!("评分值无效: '{}'", &caps[2])))?;
        Ok(())
    }
}

/// 以 AND 连接的 SQL 条件及其位置参数
#[derive(Debug, Clone, Default)]
pub struct WhereClause {
    clauses: Vec<String>,
    params: Vec<Value>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加条件
    pub fn push(&mut self, clause: impl Into<String>, params: impl IntoIterator<Item = Value>) {
        self.clauses.push(clause.into());
        self.params.extend(params);
    }

    /// 合并另一组条件
    pub fn and(mut self, other: WhereClause) -> Self {
        self.clauses.extend(other.clauses);
        self.params.extend(other.params);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// 生成 ` WHERE a AND b`，无条件时返回空字符串
    pub fn to_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// [`TouristRouteFilterParameters`] 中实际生效的过滤条件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteFilter {
    keyword: Option<String>,
    rating: Option<(RatingOperator, f64)>,
}

impl RouteFilter {
    /// 从查询参数构建过滤条件（关键词去除首尾空白）
    pub fn from_parameters(params: &TouristRouteFilterParameters) -> Self {
        let keyword = params
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        // FIXME: 0 同时表示"不过滤"，评分恰为 0 的路线无法用 `equal 0` 选出。
        // 为兼容客户端暂时保留。
        let rating = (params.rating_value != 0.0)
            .then_some((params.rating_operator, params.rating_value));

        Self { keyword, rating }
    }

    /// 是否有生效的过滤条件
    pub fn is_active(&self) -> bool {
        self.keyword.is_some() || self.rating.is_some()
    }

    /// [`RouteFilter::to_where_clause`] 的内存版本
    pub fn matches(&self, route: &TouristRoute) -> bool {
        if let Some(ref keyword) = self.keyword {
            if !route.title.contains(keyword.as_str()) {
                return false;
            }
        }
        if let Some((op, value)) = self.rating {
            match route.rating {
                Some(rating) if op.test(rating, value) => {}
                _ => return false,
            }
        }
        true
    }

    /// 生成 SQL 过滤条件
    pub fn to_where_clause(&self) -> WhereClause {
        let mut clause = WhereClause::new();

        // instr() 区分大小写，LIKE 不区分
        if let Some(ref keyword) = self.keyword {
            clause.push("instr(title, ?) > 0", [Value::Text(keyword.clone())]);
        }

        if let Some((op, value)) = self.rating {
            clause.push(format!("rating {} ?", op.as_sql()), [Value::Real(value)]);
        }

        clause
    }
}
