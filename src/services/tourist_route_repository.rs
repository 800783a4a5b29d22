//! 旅游路线仓储
//!
//! 读操作直接访问数据库；写操作先暂存，调用
//! [`TouristRouteRepository::save`] 时在一个事务中提交。

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{tourist_route_dao, Database};
use crate::models::{PaginationSettings, TouristRoute, TouristRoutePicture};
use crate::query::{
    PaginationList, PaginationParams, RouteFilter, SortSpec, TouristRouteFilterParameters,
};
use crate::utils::error::{AppError, AppResult};

use super::http::HttpFetcher;
use super::property_mapping::PropertyMappingService;

/// 旅游路线仓储接口
#[async_trait]
pub trait TouristRouteRepository: Send + Sync {
    /// 路线是否存在
    fn tourist_route_exists(&self, route_id: Uuid) -> AppResult<bool>;

    /// 过滤、排序并分页查询路线（含图片）
    fn get_tourist_routes(
        &self,
        params: &TouristRouteFilterParameters,
    ) -> AppResult<PaginationList<TouristRoute>>;

    fn get_tourist_routes_by_ids(&self, route_ids: &[Uuid]) -> AppResult<Vec<TouristRoute>>;

    fn get_tourist_route_by_id(&self, route_id: Uuid) -> AppResult<Option<TouristRoute>>;

    fn add_tourist_route(&self, route: TouristRoute) -> AppResult<()>;

    fn update_tourist_route(&self, route: TouristRoute) -> AppResult<()>;

    fn delete_tourist_route(&self, route: &TouristRoute) -> AppResult<()>;

    fn get_pictures_by_tourist_route_id(
        &self,
        route_id: Uuid,
    ) -> AppResult<Vec<TouristRoutePicture>>;

    fn get_picture(
        &self,
        route_id: Uuid,
        picture_id: i64,
    ) -> AppResult<Option<TouristRoutePicture>>;

    fn add_tourist_route_picture(
        &self,
        route_id: Uuid,
        picture: TouristRoutePicture,
    ) -> AppResult<()>;

    fn add_tourist_route_pictures(
        &self,
        route_id: Uuid,
        pictures: Vec<TouristRoutePicture>,
    ) -> AppResult<()>;

    /// 提交所有暂存的写操作，失败时记录日志并返回 `false`
    fn save(&self) -> bool;

    /// 请求 `url` 并解析为 JSON，任何失败都返回 `None`
    async fn download_fake_image_content(&self, url: &str) -> Option<serde_json::Value>;
}

/// 等待 [`TouristRouteRepository::save`] 提交的写操作
#[derive(Debug, Clone)]
enum PendingChange {
    AddRoute(TouristRoute),
    UpdateRoute(TouristRoute),
    DeleteRoute(Uuid),
    AddPicture(TouristRoutePicture),
}

impl PendingChange {
    fn apply(&self, conn: &Connection) -> AppResult<()> {
        match self {
            PendingChange::AddRoute(route) => tourist_route_dao::insert_route(conn, route),
            PendingChange::UpdateRoute(route) => {
                if !tourist_route_dao::update_route(conn, route)? {
                    tracing::warn!("路线 {} 不存在，忽略更新", route.id);
                }
                Ok(())
            }
            PendingChange::DeleteRoute(route_id) => {
                tourist_route_dao::delete_route(conn, *route_id).map(|_| ())
            }
            PendingChange::AddPicture(picture) => {
                tourist_route_dao::insert_picture(conn, picture.tourist_route_id, &picture.url)
                    .map(|_| ())
            }
        }
    }
}

fn require_id(route_id: Uuid) -> AppResult<()> {
    if route_id.is_nil() {
        return Err(AppError::invalid_argument("路线ID不能为空"));
    }
    Ok(())
}

/// 基于 SQLite 的 [`TouristRouteRepository`]
pub struct SqliteTouristRouteRepository {
    db: Arc<Database>,
    mappings: Arc<PropertyMappingService>,
    pagination: PaginationSettings,
    fetcher: Arc<dyn HttpFetcher>,
    pending: Mutex<Vec<PendingChange>>,
}

impl SqliteTouristRouteRepository {
    pub fn new(
        db: Arc<Database>,
        mappings: Arc<PropertyMappingService>,
        pagination: PaginationSettings,
        fetcher: Arc<dyn HttpFetcher>,
    ) -> Self {
        Self {
            db,
            mappings,
            pagination,
            fetcher,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// 使用配置的默认每页数量的查询参数
    pub fn filter_parameters(&self) -> TouristRouteFilterParameters {
        TouristRouteFilterParameters {
            page_size: self.pagination.default_page_size as i64,
            ..Default::default()
        }
    }

    /// 上次提交后暂存的写操作数量
    pub fn pending_changes(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    fn stage(&self, changes: impl IntoIterator<Item = PendingChange>) -> AppResult<()> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|e| AppError::General(e.to_string()))?;
        for change in changes {
            tracing::debug!("暂存变更: {:?}", change);
            pending.push(change);
        }
        Ok(())
    }
}

#[async_trait]
impl TouristRouteRepository for SqliteTouristRouteRepository {
    fn tourist_route_exists(&self, route_id: Uuid) -> AppResult<bool> {
        require_id(route_id)?;
        self.db.tourist_route_exists(route_id)
    }

    fn get_tourist_routes(
        &self,
        params: &TouristRouteFilterParameters,
    ) -> AppResult<PaginationList<TouristRoute>> {
        let filter = RouteFilter::from_parameters(params);
        let mapping = self.mappings.get_property_mapping::<TouristRoute>()?;
        let sort = SortSpec::resolve(&params.order_by, mapping)?;
        let pagination = PaginationParams::normalized(
            params.page_number,
            params.page_size,
            self.pagination.max_page_size,
        );

        let query = self.db.query_tourist_routes(filter.to_where_clause(), &sort);
        let mut page = PaginationList::create(&query, pagination)?;
        self.db.attach_pictures(&mut page.items)?;

        tracing::debug!(
            "路线分页 {}/{}（{} 条，共匹配 {} 条）",
            page.current_page,
            page.total_pages,
            page.items.len(),
            page.total_count
        );
        Ok(page)
    }

    fn get_tourist_routes_by_ids(&self, route_ids: &[Uuid]) -> AppResult<Vec<TouristRoute>> {
        let mut routes = self.db.get_tourist_routes_by_ids(route_ids)?;
        self.db.attach_pictures(&mut routes)?;
        Ok(routes)
    }

    fn get_tourist_route_by_id(&self, route_id: Uuid) -> AppResult<Option<TouristRoute>> {
        require_id(route_id)?;
        self.db.get_tourist_route(route_id)
    }

    fn add_tourist_route(&self, mut route: TouristRoute) -> AppResult<()> {
        require_id(route.id)?;
        for picture in &mut route.pictures {
            picture.tourist_route_id = route.id;
        }
        self.stage([PendingChange::AddRoute(route)])
    }

    fn update_tourist_route(&self, route: TouristRoute) -> AppResult<()> {
        require_id(route.id)?;
        self.stage([PendingChange::UpdateRoute(route)])
    }

    fn delete_tourist_route(&self, route: &TouristRoute) -> AppResult<()> {
        require_id(route.id)?;
        self.stage([PendingChange::DeleteRoute(route.id)])
    }

    fn get_pictures_by_tourist_route_id(
        &self,
        route_id: Uuid,
    ) -> AppResult<Vec<TouristRoutePicture>> {
        require_id(route_id)?;
        self.db.get_pictures_by_route_id(route_id)
    }

    fn get_picture(
        &self,
        route_id: Uuid,
        picture_id: i64,
    ) -> AppResult<Option<TouristRoutePicture>> {
        require_id(route_id)?;
        self.db.get_picture(route_id, picture_id)
    }

    fn add_tourist_route_picture(
        &self,
        route_id: Uuid,
        picture: TouristRoutePicture,
    ) -> AppResult<()> {
        self.add_tourist_route_pictures(route_id, vec![picture])
    }

    fn add_tourist_route_pictures(
        &self,
        route_id: Uuid,
        pictures: Vec<TouristRoutePicture>,
    ) -> AppResult<()> {
        require_id(route_id)?;
        if pictures.is_empty() {
            return Err(AppError::invalid_argument("图片列表不能为空"));
        }

        self.stage(pictures.into_iter().map(|mut picture| {
            picture.tourist_route_id = route_id;
            PendingChange::AddPicture(picture)
        }))
    }

    fn save(&self) -> bool {
        let changes = match self.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(e) => {
                tracing::error!("无法获取待提交变更: {}", e);
                return false;
            }
        };

        if changes.is_empty() {
            return true;
        }

        let result = self.db.transaction(|conn| {
            for change in &changes {
                change.apply(conn)?;
            }
            Ok(())
        });

        match result {
            Ok(()) => {
                tracing::debug!("已提交 {} 个变更", changes.len());
                true
            }
            Err(e) => {
                tracing::error!("提交 {} 个变更失败: {}", changes.len(), e);
                false
            }
        }
    }

    async fn download_fake_image_content(&self, url: &str) -> Option<serde_json::Value> {
        let body = self.fetcher.fetch(url).await?;
        match serde_json::from_str(&body) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("响应不是有效的 JSON {}: {}", url, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HttpSettings;
    use crate::query::RatingOperator;
    use crate::services::http::ReqwestFetcher;

    struct StubFetcher(Option<&'static str>);

    #[async_trait]
    impl HttpFetcher for StubFetcher {
        async fn fetch(&self, _url: &str) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    fn repository_with(fetcher: Arc<dyn HttpFetcher>) -> SqliteTouristRouteRepository {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();
        SqliteTouristRouteRepository::new(
            Arc::new(db),
            Arc::new(PropertyMappingService::with_defaults().unwrap()),
            PaginationSettings::default(),
            fetcher,
        )
    }

    fn repository() -> SqliteTouristRouteRepository {
        repository_with(Arc::new(StubFetcher(None)))
    }

    fn seed(repo: &SqliteTouristRouteRepository, routes: Vec<TouristRoute>) {
        for route in routes {
            repo.add_tourist_route(route).unwrap();
        }
        assert!(repo.save());
    }

    fn params(order_by: &str, page_number: i64, page_size: i64) -> TouristRouteFilterParameters {
        TouristRouteFilterParameters {
            order_by: order_by.to_string(),
            page_number,
            page_size,
            ..Default::default()
        }
    }

    fn titles(routes: &[TouristRoute]) -> Vec<String> {
        routes.iter().map(|r| r.title.clone()).collect()
    }

    #[test]
    fn test_last_page_of_sorted_routes() {
        let repo = repository();
        seed(
            &repo,
            (1..=25)
                .map(|i| TouristRoute::new(format!("route {:02}", i), "", i as f64 * 100.0))
                .collect(),
        );

        let page = repo.get_tourist_routes(&params("title", 3, 10)).unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_count, 25);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next);
        assert!(page.has_previous);
        assert_eq!(page.items[0].title, "route 21");

        let page = repo
            .get_tourist_routes(&params("originalPrice desc", 1, 3))
            .unwrap();
        assert_eq!(titles(&page.items), vec!["route 25", "route 24", "route 23"]);
    }

    #[test]
    fn test_keyword_without_matches_is_empty_page() {
        let repo = repository();
        seed(&repo, vec![TouristRoute::new("Great Wall", "", 100.0)]);

        let page = repo
            .get_tourist_routes(&TouristRouteFilterParameters {
                keyword: Some("Lake".into()),
                ..Default::default()
            })
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn test_rating_equal_keeps_insertion_order() {
        let repo = repository();
        seed(
            &repo,
            vec![
                TouristRoute::new("a", "", 1.0).with_rating(5.0),
                TouristRoute::new("b", "", 1.0).with_rating(4.0),
                TouristRoute::new("c", "", 1.0).with_rating(5.0),
                TouristRoute::new("d", "", 1.0),
                TouristRoute::new("e", "", 1.0).with_rating(5.0),
            ],
        );

        let mut filter = params("", 1, 10);
        filter.set_rating("equal5").unwrap();
        assert_eq!(filter.rating_operator, RatingOperator::Equal);

        let page = repo.get_tourist_routes(&filter).unwrap();
        assert_eq!(titles(&page.items), vec!["a", "c", "e"]);

        filter.order_by = "rating desc".into();
        let page = repo.get_tourist_routes(&filter).unwrap();
        assert_eq!(titles(&page.items), vec!["a", "c", "e"]);
    }

    #[test]
    fn test_page_zero_and_oversized_page_are_clamped() {
        let repo = repository();
        seed(
            &repo,
            (0..60).map(|i| TouristRoute::new(format!("r{}", i), "", 1.0)).collect(),
        );

        let page = repo.get_tourist_routes(&params("", 0, 1000)).unwrap();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.page_size, 50);
        assert_eq!(page.items.len(), 50);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_unknown_sort_field_is_rejected() {
        let repo = repository();
        seed(&repo, vec![TouristRoute::new("a", "", 1.0)]);

        let result = repo.get_tourist_routes(&params("title, popularity desc", 1, 10));
        match result {
            Err(AppError::UnknownSortField(token)) => assert_eq!(token, "popularity desc"),
            other => panic!("expected UnknownSortField, got {:?}", other),
        }
    }

    #[test]
    fn test_staged_writes_are_invisible_until_save() {
        let repo = repository();
        let route = TouristRoute::new("Staged", "", 1.0);
        let id = route.id;

        repo.add_tourist_route(route).unwrap();
        assert_eq!(repo.pending_changes(), 1);
        assert!(!repo.tourist_route_exists(id).unwrap());
        assert!(repo.get_tourist_route_by_id(id).unwrap().is_none());

        assert!(repo.save());
        assert_eq!(repo.pending_changes(), 0);
        assert!(repo.tourist_route_exists(id).unwrap());
    }

    #[test]
    fn test_route_lifecycle_with_pictures() {
        let repo = repository();
        let mut route = TouristRoute::new("Lijiang", "", 1.0);
        route.pictures = vec![TouristRoutePicture::new("https://img.example/0.jpg")];
        let id = route.id;
        seed(&repo, vec![route]);

        repo.add_tourist_route_pictures(
            id,
            vec![
                TouristRoutePicture::new("https://img.example/1.jpg"),
                TouristRoutePicture::new("https://img.example/2.jpg"),
            ],
        )
        .unwrap();
        repo.add_tourist_route_picture(id, TouristRoutePicture::new("https://img.example/3.jpg"))
            .unwrap();
        assert!(repo.save());

        let pictures = repo.get_pictures_by_tourist_route_id(id).unwrap();
        assert_eq!(pictures.len(), 4);
        assert!(pictures.iter().all(|p| p.tourist_route_id == id));
        let picture = repo.get_picture(id, pictures[2].id).unwrap().unwrap();
        assert_eq!(picture.url, "https://img.example/2.jpg");

        let mut route = repo.get_tourist_route_by_id(id).unwrap().unwrap();
        assert_eq!(route.pictures.len(), 4);
        route.title = "Lijiang old town".into();
        repo.update_tourist_route(route.clone()).unwrap();
        assert!(repo.save());
        assert_eq!(
            repo.get_tourist_routes_by_ids(&[id]).unwrap()[0].title,
            "Lijiang old town"
        );

        repo.delete_tourist_route(&route).unwrap();
        assert!(repo.save());
        assert!(!repo.tourist_route_exists(id).unwrap());
        assert!(repo.get_pictures_by_tourist_route_id(id).unwrap().is_empty());
    }

    #[test]
    fn test_nil_ids_and_empty_batches_are_invalid() {
        let repo = repository();
        let nil = Uuid::nil();

        assert!(matches!(repo.tourist_route_exists(nil), Err(AppError::InvalidArgument(_))));
        assert!(matches!(repo.get_tourist_route_by_id(nil), Err(AppError::InvalidArgument(_))));
        assert!(matches!(
            repo.get_pictures_by_tourist_route_id(nil),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(repo.get_picture(nil, 1), Err(AppError::InvalidArgument(_))));
        assert!(matches!(
            repo.add_tourist_route_picture(nil, TouristRoutePicture::new("u")),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            repo.add_tourist_route_pictures(Uuid::new_v4(), Vec::new()),
            Err(AppError::InvalidArgument(_))
        ));
        assert_eq!(repo.pending_changes(), 0);
    }

    #[test]
    fn test_failed_save_returns_false_and_rolls_back() {
        let repo = repository();
        let good = TouristRoute::new("good", "", 1.0);
        let good_id = good.id;
        repo.add_tourist_route(good).unwrap();
        // picture for a route that does not exist violates the foreign key
        repo.add_tourist_route_picture(Uuid::new_v4(), TouristRoutePicture::new("u"))
            .unwrap();

        assert!(!repo.save());
        assert!(!repo.tourist_route_exists(good_id).unwrap());
        assert!(repo.save());
    }

    #[test]
    fn test_filter_parameters_use_configured_page_size() {
        let repo = repository();
        assert_eq!(repo.filter_parameters().page_size, 10);
        assert_eq!(repo.filter_parameters().page_number, 1);
    }

    #[tokio::test]
    async fn test_download_parses_json() {
        let repo = repository_with(Arc::new(StubFetcher(Some(r#"{"url":"x.jpg","size":3}"#))));
        let value = repo
            .download_fake_image_content("https://img.example/meta")
            .await
            .unwrap();
        assert_eq!(value["size"], 3);
    }

    #[tokio::test]
    async fn test_download_failures_are_none() {
        let repo = repository_with(Arc::new(StubFetcher(Some("<html>"))));
        assert!(repo.download_fake_image_content("u").await.is_none());

        let fetcher = ReqwestFetcher::new(&HttpSettings {
            timeout_secs: 2,
            ..Default::default()
        })
        .unwrap();
        let repo = repository_with(Arc::new(fetcher));
        assert!(repo
            .download_fake_image_content("http://127.0.0.1:9/image")
            .await
            .is_none());
    }
}
