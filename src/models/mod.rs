//! Domain models for the SportsHub backend

pub mod article;
pub mod audit;
pub mod deny_record;
pub mod file_item;
pub mod language;
pub mod reset_token;
pub mod user;

pub use article::{Article, ArticleComment, CreateArticleInput, UpdateArticleInput};
pub use audit::Audit;
pub use deny_record::JwtDenyRecord;
pub use file_item::FileItem;
pub use language::{CreateLanguageInput, Language, UpdateLanguageInput};
pub use reset_token::PasswordResetToken;
pub use user::User;
