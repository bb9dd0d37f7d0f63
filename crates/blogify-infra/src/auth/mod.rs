//! Session validation.

mod jwt;

pub use jwt::{JwtConfig, JwtTokenService};
