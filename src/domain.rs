pub mod analytics;
pub mod campaign;
pub mod subscription;
