pub mod audit;
pub mod booking;
pub mod lifecycle;
pub mod route_search;
pub mod user;

pub use audit::AuditService;
pub use booking::BookingService;
pub use lifecycle::LifecycleService;
pub use route_search::RouteSearchService;
pub use user::UserService;
