pub mod cli;
pub mod config;
pub mod db;
pub mod form;
pub mod list;
pub mod logging;
pub mod models;
pub mod remote;
pub mod source;

pub use db::Database;
