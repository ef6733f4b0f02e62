pub mod extractor;
pub mod handlers;
pub mod jwt;
pub mod ownership;
pub mod password;
pub mod service;

pub use extractor::AuthUser;
pub use jwt::TokenSigner;
