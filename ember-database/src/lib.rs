pub mod backup;
pub mod database;
pub mod impls;
pub mod model;
pub mod schema;

pub use backup::BackupService;
pub use database::Database;
