//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. All lock mutations are single
//! conditional statements so the one-lock-per-resource invariant can never
//! be violated by a partial write.

pub mod article_repo;
pub mod layout_repo;
pub mod lock_repo;
pub mod template_repo;

pub use article_repo::ArticleRepo;
pub use layout_repo::LayoutRepo;
pub use lock_repo::EditLockRepo;
pub use template_repo::TemplateRepo;
