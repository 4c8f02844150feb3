pub mod auth;
pub mod checkin;
pub mod config;
pub mod consts;
pub mod db;
pub mod error;
pub mod github_pull;
pub mod metrics;
pub mod reconcile;
pub mod store;
pub mod sweep;
pub mod validation;

#[cfg(test)]
mod mock;
