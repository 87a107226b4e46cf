pub mod claims;
pub mod codec;
pub mod errors;

pub use claims::AccessClaims;
pub use claims::RefreshClaims;
pub use claims::SessionClaims;
pub use codec::IssuedToken;
pub use codec::TokenCodec;
pub use codec::TokenConfig;
pub use codec::TokenPolicy;
pub use errors::TokenError;
