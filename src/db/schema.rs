//! 数据库 Schema 定义
//!
//! 包含所有表的 CREATE 语句

/// 数据库版本
pub const SCHEMA_VERSION: i32 = 1;

/// 初始化 Schema SQL
pub const INIT_SCHEMA: &str = r#"
-- 旅游路线表（rowid 保留插入顺序，用作排序 tie-breaker）
CREATE TABLE IF NOT EXISTS tourist_routes (
    id                  TEXT PRIMARY KEY NOT NULL,
    title               TEXT NOT NULL,
    description         TEXT NOT NULL,
    original_price      REAL NOT NULL,
    discount_present    REAL,
    create_time         TEXT NOT NULL,
    update_time         TEXT,
    departure_time      TEXT,
    features            TEXT,
    fees                TEXT,
    notes               TEXT,
    rating              REAL,
    travel_days         TEXT,
    trip_type           TEXT,
    departure_city      TEXT
);

-- 路线图片表
CREATE TABLE IF NOT EXISTS tourist_route_pictures (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    url                 TEXT NOT NULL,
    tourist_route_id    TEXT NOT NULL REFERENCES tourist_routes(id) ON DELETE CASCADE
);

-- 数据库版本表
CREATE TABLE IF NOT EXISTS schema_version (
    version         INTEGER PRIMARY KEY,
    applied_at      TEXT NOT NULL
);

-- 索引
CREATE INDEX IF NOT EXISTS idx_tourist_routes_title ON tourist_routes(title);
CREATE INDEX IF NOT EXISTS idx_tourist_routes_rating ON tourist_routes(rating);
CREATE INDEX IF NOT EXISTS idx_tourist_routes_create_time ON tourist_routes(create_time);
CREATE INDEX IF NOT EXISTS idx_pictures_route_id ON tourist_route_pictures(tourist_route_id);
"#;
