//! 旅游路线数据访问层

use std::collections::HashMap;

use rusqlite::{params, params_from_iter, types::Value, Connection, Row};
use uuid::Uuid;

use crate::models::{TouristRoute, TouristRoutePicture};
use crate::query::{QuerySource, SortSpec, WhereClause};
use crate::utils::error::{AppError, AppResult};

use super::connection::Database;

/// 与插入顺序一致的列，追加到每个 ORDER BY 末尾
const INSERTION_ORDER: &str = "rowid";

fn uuid_column(row: &Row<'_>, column: &str) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(column)?;
    Uuid::parse_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// 从数据库行映射到 TouristRoute 结构（不含图片）
fn row_to_route(row: &Row<'_>) -> rusqlite::Result<TouristRoute> {
    Ok(TouristRoute {
        id: uuid_column(row, "id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        original_price: row.get("original_price")?,
        discount_present: row.get("discount_present")?,
        create_time: row.get("create_time")?,
        update_time: row.get("update_time")?,
        departure_time: row.get("departure_time")?,
        features: row.get("features")?,
        fees: row.get("fees")?,
        notes: row.get("notes")?,
        rating: row.get("rating")?,
        travel_days: row.get("travel_days")?,
        trip_type: row.get("trip_type")?,
        departure_city: row.get("departure_city")?,
        pictures: Vec::new(),
    })
}

fn row_to_picture(row: &Row<'_>) -> rusqlite::Result<TouristRoutePicture> {
    Ok(TouristRoutePicture {
        id: row.get("id")?,
        url: row.get("url")?,
        tourist_route_id: uuid_column(row, "tourist_route_id")?,
    })
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// 尚未执行的路线查询（已过滤、已排序）
pub struct RouteQuery<'a> {
    db: &'a Database,
    filter: WhereClause,
    order_by: String,
}

impl<'a> RouteQuery<'a> {
    pub fn new(db: &'a Database, filter: WhereClause, sort: &SortSpec) -> Self {
        Self {
            db,
            filter,
            order_by: sort.to_order_by_sql(INSERTION_ORDER),
        }
    }
}

impl QuerySource<TouristRoute> for RouteQuery<'_> {
    fn count(&self) -> AppResult<i64> {
        let conn = self.db.connection()?;
        let sql = format!("SELECT COUNT(*) FROM tourist_routes{}", self.filter.to_sql());
        let total = conn.query_row(&sql, params_from_iter(self.filter.params()), |row| {
            row.get(0)
        })?;
        Ok(total)
    }

    fn fetch(&self, offset: i64, limit: i64) -> AppResult<Vec<TouristRoute>> {
        let conn = self.db.connection()?;
        let sql = format!(
            "SELECT * FROM tourist_routes{} {} LIMIT ? OFFSET ?",
            self.filter.to_sql(),
            self.order_by
        );
        tracing::debug!("路线分页查询: {}", sql);

        let mut params_vec: Vec<Value> = self.filter.params().to_vec();
        params_vec.push(Value::Integer(limit));
        params_vec.push(Value::Integer(offset));

        let mut stmt = conn.prepare(&sql)?;
        let routes = stmt
            .query_map(params_from_iter(params_vec.iter()), row_to_route)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(routes)
    }
}

impl Database {
    // ==================== Tourist route queries ====================

    /// 路线是否存在
    pub fn tourist_route_exists(&self, route_id: Uuid) -> AppResult<bool> {
        let conn = self.connection()?;
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM tourist_routes WHERE id = ?1)",
            params![route_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// 构建未执行的路线查询
    pub fn query_tourist_routes(&self, filter: WhereClause, sort: &SortSpec) -> RouteQuery<'_> {
        RouteQuery::new(self, filter, sort)
    }

    /// 根据 ID 获取路线（含图片）
    pub fn get_tourist_route(&self, route_id: Uuid) -> AppResult<Option<TouristRoute>> {
        let route = {
            let conn = self.connection()?;
            let result = conn.query_row(
                "SELECT * FROM tourist_routes WHERE id = ?1",
                params![route_id.to_string()],
                row_to_route,
            );

            match result {
                Ok(route) => route,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(e) => return Err(AppError::Database(e)),
            }
        };

        let mut routes = [route];
        self.attach_pictures(&mut routes)?;
        let [route] = routes;
        Ok(Some(route))
    }

    /// 根据 ID 列表获取路线，按插入顺序返回
    pub fn get_tourist_routes_by_ids(&self, route_ids: &[Uuid]) -> AppResult<Vec<TouristRoute>> {
        if route_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.connection()?;
        let sql = format!(
            "SELECT * FROM tourist_routes WHERE id IN ({}) ORDER BY {}",
            placeholders(route_ids.len()),
            INSERTION_ORDER
        );
        let ids: Vec<String> = route_ids.iter().map(Uuid::to_string).collect();

        let mut stmt = conn.prepare(&sql)?;
        let routes = stmt
            .query_map(params_from_iter(ids.iter()), row_to_route)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(routes)
    }

    /// 一次查询加载并附加路线图片
    pub fn attach_pictures(&self, routes: &mut [TouristRoute]) -> AppResult<()> {
        if routes.is_empty() {
            return Ok(());
        }

        let conn = self.connection()?;
        let sql = format!(
            "SELECT * FROM tourist_route_pictures WHERE tourist_route_id IN ({}) ORDER BY id",
            placeholders(routes.len())
        );
        let ids: Vec<String> = routes.iter().map(|r| r.id.to_string()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let mut by_route: HashMap<Uuid, Vec<TouristRoutePicture>> = HashMap::new();
        for picture in stmt.query_map(params_from_iter(ids.iter()), row_to_picture)? {
            let picture = picture?;
            by_route
                .entry(picture.tourist_route_id)
                .or_default()
                .push(picture);
        }

        for route in routes.iter_mut() {
            route.pictures = by_route.remove(&route.id).unwrap_or_default();
        }
        Ok(())
    }

    // ==================== Picture queries ====================

    /// 获取路线的所有图片
    pub fn get_pictures_by_route_id(&self, route_id: Uuid) -> AppResult<Vec<TouristRoutePicture>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM tourist_route_pictures WHERE tourist_route_id = ?1 ORDER BY id",
        )?;
        let pictures = stmt
            .query_map(params![route_id.to_string()], row_to_picture)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(pictures)
    }

    /// 获取路线下的单张图片
    pub fn get_picture(
        &self,
        route_id: Uuid,
        picture_id: i64,
    ) -> AppResult<Option<TouristRoutePicture>> {
        let conn = self.connection()?;

        let result = conn.query_row(
            "SELECT * FROM tourist_route_pictures WHERE tourist_route_id = ?1 AND id = ?2",
            params![route_id.to_string(), picture_id],
            row_to_picture,
        );

        match result {
            Ok(picture) => Ok(Some(picture)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }
}

// ==================== Writes (run inside a transaction) ====================

/// 插入路线及其图片
pub fn insert_route(conn: &Connection, route: &TouristRoute) -> AppResult<()> {
    conn.execute(
        r#"
        INSERT INTO tourist_routes (
            id, title, description, original_price, discount_present,
            create_time, update_time, departure_time, features, fees, notes,
            rating, travel_days, trip_type, departure_city
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15
        )
        "#,
        params![
            route.id.to_string(),
            route.title,
            route.description,
            route.original_price,
            route.discount_present,
            route.create_time,
            route.update_time,
            route.departure_time,
            route.features,
            route.fees,
            route.notes,
            route.rating,
            route.travel_days,
            route.trip_type,
            route.departure_city,
        ],
    )?;

    for picture in &route.pictures {
        insert_picture(conn, route.id, &picture.url)?;
    }

    Ok(())
}

/// 更新路线字段（不含图片）
pub fn update_route(conn: &Connection, route: &TouristRoute) -> AppResult<bool> {
    let rows = conn.execute(
        r#"
        UPDATE tourist_routes SET
            title = ?2, description = ?3, original_price = ?4, discount_present = ?5,
            update_time = ?6, departure_time = ?7, features = ?8, fees = ?9, notes = ?10,
            rating = ?11, travel_days = ?12, trip_type = ?13, departure_city = ?14
        WHERE id = ?1
        "#,
        params![
            route.id.to_string(),
            route.title,
            route.description,
            route.original_price,
            route.discount_present,
            crate::utils::now_rfc3339(),
            route.departure_time,
            route.features,
            route.fees,
            route.notes,
            route.rating,
            route.travel_days,
            route.trip_type,
            route.departure_city,
        ],
    )?;
    Ok(rows > 0)
}

/// 删除路线（图片级联删除）
pub fn delete_route(conn: &Connection, route_id: Uuid) -> AppResult<bool> {
    let rows = conn.execute(
        "DELETE FROM tourist_routes WHERE id = ?1",
        params![route_id.to_string()],
    )?;
    Ok(rows > 0)
}

/// 插入图片，返回新图片ID
pub fn insert_picture(conn: &Connection, route_id: Uuid, url: &str) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO tourist_route_pictures (url, tourist_route_id) VALUES (?1, ?2)",
        params![url, route_id.to_string()],
    )?;
    Ok(conn.last_insert_rowid())
}
