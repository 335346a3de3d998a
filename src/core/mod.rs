pub mod db;
pub mod property;
pub mod session;
