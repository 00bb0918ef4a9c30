//! Service layer
//!
//! Business logic between the HTTP handlers and the repositories.

pub mod article;
pub mod auth;
pub mod email;
pub mod files;
pub mod language;
pub mod password;
pub mod token;

pub use article::{ArticleService, ArticleServiceError};
pub use auth::{AuthService, AuthServiceError, SignedIn};
pub use email::{EmailSender, SmtpEmailSender};
pub use files::{FileStorageService, FileStorageError};
pub use language::{LanguageService, LanguageServiceError};
pub use token::TokenCodec;
