// Library for tests to access modules

pub mod config;
pub mod db;
pub mod docker_repo;
pub mod error;
pub mod history_service;
pub mod maintenance;
pub mod metrics_repo;
pub mod models;
pub mod routes;
pub mod sampler;
pub mod settings_repo;
pub mod sysinfo_repo;
