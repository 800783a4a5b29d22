//! 服务模块
//!
//! 包含业务逻辑服务

pub mod http;
pub mod property_mapping;
pub mod settings;
pub mod tourist_route_repository;

pub use http::{HttpFetcher, ReqwestFetcher};
pub use property_mapping::{tourist_route_mapping, PropertyMappingService};
pub use settings::SettingsManager;
pub use tourist_route_repository::{SqliteTouristRouteRepository, TouristRouteRepository};
