pub mod role;
pub mod token;
pub mod user;

pub use role::{authorities_for, Permission, RoleName, ROLE_PERMISSIONS};
pub use token::{Token, TokenKind};
pub use user::{UserAccount, UserResponse};
