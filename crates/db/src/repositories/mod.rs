//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument, or `&mut PgConnection` for
//! the steps that must run inside a caller-owned transaction.

pub mod audit_log_repo;
pub mod catalog_repo;
pub mod generation_repo;
pub mod permission_toggle_repo;
pub mod rate_limit_repo;
pub mod session_repo;
pub mod staff_user_repo;

pub use audit_log_repo::AuditLogRepo;
pub use catalog_repo::CatalogRepo;
pub use generation_repo::GenerationRepo;
pub use permission_toggle_repo::PermissionToggleRepo;
pub use rate_limit_repo::RateLimitRepo;
pub use session_repo::SessionRepo;
pub use staff_user_repo::StaffUserRepo;
