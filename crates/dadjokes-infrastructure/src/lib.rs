pub mod config;
pub mod logging;
pub mod notification;
pub mod persistence;
pub mod remote;
