//! Access to both stores
//!
//! Graph repositories are structs over the shared `GraphStorage`; ledger
//! modules are row functions over a SQLite connection.

pub mod schedule;
pub mod station;
pub mod tickets;
pub mod trains;
pub mod users;

pub use schedule::ScheduleRepository;
pub use station::StationRepository;
