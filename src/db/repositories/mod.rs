//! Repository layer
//!
//! Data access is expressed as `#[async_trait]` repository traits with
//! SQLx-backed implementations that dispatch per database driver.

pub mod article;
pub mod deny_list;
pub mod file_item;
pub mod language;
pub mod reset_token;
pub mod user;

pub use article::{ArticleRepository, SqlxArticleRepository};
pub use deny_list::{DenyListRepository, SqlxDenyListRepository};
pub use file_item::{FileItemRepository, SqlxFileItemRepository};
pub use language::{LanguageRepository, SqlxLanguageRepository};
pub use reset_token::{ResetTokenRepository, SqlxResetTokenRepository};
pub use user::{SqlxUserRepository, UserRepository};
