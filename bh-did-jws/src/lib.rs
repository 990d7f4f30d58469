// Copyright (C) 2020-2026  The Blockhouse Technology Limited (TBTL).
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! This crate provides functions and types for working with [JSON Web
//! Signatures (JWS)][1] produced by keys that can be embedded in a `did:key`
//! identifier.
//!
//! [1]: https://datatracker.ietf.org/doc/html/rfc7515
//!
//! # Details
//!
//! The primary way to use this library is via the [`JwtSigner`] and
//! [`JwtVerifier`] traits, which provide functionality for signing JWTs in the
//! JWS Compact Serialization and verifying them. Two backends are provided:
//!
//! * [`Ed25519Signer`] / [`Ed25519Verifier`] for `EdDSA` over Curve25519,
//! * [`Es256kSigner`] / [`Es256kVerifier`] for `ES256K` (ECDSA over secp256k1
//!   with SHA-256, deterministic nonces and low-`s` signatures).
//!
//! A custom backend (e.g. a remote HSM) must implement the [`Signer`] trait for
//! signing and the [`SignatureVerifier`] trait for verifying signatures. The
//! [`JwtSigner`] and [`JwtVerifier`] traits are implemented automatically for
//! every [`Signer`] and [`SignatureVerifier`] respectively. Signing is
//! asynchronous, so the secret key does not need to live in local memory.
//!
//! # Examples
//!
//! ## Sign and verify a JWT
//!
//! ```
//! use std::str::FromStr;
//!
//! use bh_did_jws::{
//!     json_object, DecodedJws, Ed25519Signer, Ed25519Verifier, JwtSigner, JwtVerifier,
//! };
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! // Construct a new signer
//! let signer = Ed25519Signer::generate();
//!
//! let header = json_object!({ "alg": "EdDSA", "typ": "JWT" });
//! let claims = json_object!({
//!    "sub": "1234567890",
//!    "name": "John Doe",
//!    "iat": 1516239022
//! });
//!
//! // Sign the JWT
//! let signed_jwt = signer.sign_jwt(&header, &claims).await.unwrap();
//!
//! // Parse and verify the JWT
//! let decoded = DecodedJws::from_str(&signed_jwt).unwrap();
//! let valid = Ed25519Verifier
//!     .verify_jwt_signature(&decoded, &signer.public_key())
//!     .unwrap();
//! assert!(valid);
//! # });
//! ```

mod compact;
mod ed25519_impl;
mod error;
mod keys;
mod secp256k1_impl;
mod traits;
mod utils;

pub use compact::*;
pub use ed25519_impl::*;
pub use error::*;
pub use keys::*;
pub use secp256k1_impl::*;
pub use traits::*;
pub use utils::*;

/// Helper macro with the same syntax as [`serde_json::json`] specialized for
/// constructing JSON objects.
///
/// It will construct a more specific type ([`serde_json::Map<String,Value>`])
/// than just [`serde_json::Value`] when constructing an object, and panic if
/// the syntax is valid JSON but not an object.
#[macro_export]
macro_rules! json_object {
    ($stuff:tt) => {
        match ::serde_json::json!($stuff) {
            ::serde_json::Value::Object(o) => o,
            _ => unreachable!("JSON literal wasn't an object"),
        }
    };
}
