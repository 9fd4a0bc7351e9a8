pub mod audit;
pub mod key;
pub mod schedule;
pub mod search;
pub mod station;
pub mod ticket;
pub mod train;
pub mod user;

pub use audit::AuditReport;
pub use key::EntityKey;
pub use schedule::{Schedule, ScheduleRun, Stop};
pub use search::{RouteSummary, SearchQuery, SortingCriteria};
pub use station::{Connection, Station};
pub use ticket::{ItineraryLeg, PurchaseRecord, Ticket};
pub use train::{Train, TrainStatus};
pub use user::User;
