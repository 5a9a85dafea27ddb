pub mod auth;
pub mod codec;
pub mod context;
pub mod issuer;
pub mod ledger;
pub mod policy;
pub mod revocation;

pub use auth::AuthService;
pub use codec::{Claims, CodecError, TokenCodec};
pub use context::SecurityContext;
pub use issuer::{TokenIssuer, TokenPair};
pub use ledger::{TokenLedger, UserStore};
pub use policy::{validate_access, Owned};
pub use revocation::RevocationManager;
