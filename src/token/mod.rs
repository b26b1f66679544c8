//! Signed bearer tokens.
//!
//! A [`TokenCodec`] signs claim structs into compact HS256 JWTs and verifies
//! them back. Two claim shapes ride on it: [`IdentityClaims`] for
//! authenticated requests and [`ActionClaims`] for the links sent by email.

mod claims;
mod codec;

pub use claims::{ActionClaims, EmailAction, IdentityClaims, Role};
pub use codec::{bearer, strip_bearer, TokenCodec, BEARER_PREFIX};
