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

//! This crate provides [JSON Web Tokens][1] issued under `did:key`
//! identifiers, and the [W3C Verifiable Credentials][2] and Presentations
//! carried inside them.
//!
//! [1]: https://datatracker.ietf.org/doc/html/rfc7519
//! [2]: https://www.w3.org/TR/vc-data-model/
//!
//! # Details
//!
//! A [`DidKeyDriver`] bundles everything needed for one signing algorithm
//! (`EdDSA` or `ES256K`): key generation, the `did:key` encoding of public
//! keys, signers and a [`ResolverRegistry`] able to resolve `did:key` DIDs.
//!
//! JWTs are signed by an [`Issuer`], i.e. a DID together with a
//! [`Signer`](bh_did_jws::Signer) for one of its keys, and verified against
//! the DID document of the `iss` claim as returned by a [`Resolver`]:
//!
//! * [`create_jwt`] / [`verify_jwt`] for arbitrary claims,
//! * [`create_credential_jwt`] / [`verify_credential_jwt`] for credentials,
//! * [`create_presentation_jwt`] / [`verify_presentation_jwt`] for
//!   presentations of credential JWTs.
//!
//! Verification checks the signature first, then the `aud`, `exp` and `nbf`
//! claims, and finally the shape of the payload.
//!
//! # Examples
//!
//! ```
//! use bh_did_jwt::{
//!     create_jwt, get_did_key_driver, verify_jwt, Resolver, VerifiedJwt, VerifyOptions,
//! };
//! use serde_json::json;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let driver = get_did_key_driver("EdDSA").unwrap();
//! let issuer = driver
//!     .issuer_from_key_pair(&driver.generate_key_pair())
//!     .unwrap();
//! let resolver = Resolver::new(driver.get_resolver_registry());
//!
//! let jwt = create_jwt(&json!({ "name": "aaa" }), &issuer).await.unwrap();
//!
//! let verified: VerifiedJwt = verify_jwt(&jwt, &resolver, &VerifyOptions::default())
//!     .await
//!     .unwrap();
//! assert_eq!(verified.issuer, issuer.did);
//! assert_eq!(verified.payload.claims["name"], "aaa");
//! # });
//! ```

// Re-export the `bh-did-jws` crate
pub use bh_did_jws;
pub use error::{Error, Result};

mod credential;
mod driver;
mod error;
mod issuer;
mod jwt;
mod presentation;
#[cfg(test)]
mod test_utils;
mod typed;

pub mod did;
pub mod resolver;

pub use credential::*;
pub use driver::*;
pub use issuer::Issuer;
pub use jwt::*;
pub use presentation::*;
pub use resolver::{
    DidMethodResolver, KeyDidResolver, ResolutionError, Resolver, ResolverRegistry,
};
pub use typed::typed_credential;
