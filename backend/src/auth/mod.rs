//! Credentials: password hashes, signed tokens and the request guards built
//! on them.

pub mod extractor;
pub mod license;
pub mod password;
pub mod token;

pub use extractor::AuthUser;
pub use license::License;
pub use password::PasswordHasher;
pub use token::TokenService;
