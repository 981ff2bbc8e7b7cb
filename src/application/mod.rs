// Application layer - use cases and ports
pub mod dashboard_service;
pub mod feed_repository;
pub mod normalizer;
pub mod snapshot_cache;
