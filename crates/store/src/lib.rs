pub mod db;
pub mod reports;
pub mod schema;

pub use db::Store;
