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

//! Decentralized Identifiers and DID Documents.

use std::str::FromStr;

use bh_did_jws::SigningAlgorithm;
use bherror::Error;
use serde::{Deserialize, Serialize};

use crate::Result;

pub mod multibase;

/// The W3C DID v1 JSON-LD context.
pub const DID_CONTEXT_V1: &str = "https://www.w3.org/ns/did/v1";

/// Verification method type of an Ed25519 key.
pub const ED25519_VERIFICATION_KEY_2018: &str = "Ed25519VerificationKey2018";
/// Newer verification method type of an Ed25519 key, accepted when verifying.
pub const ED25519_VERIFICATION_KEY_2020: &str = "Ed25519VerificationKey2020";
/// Verification method type of a secp256k1 key.
pub const ECDSA_SECP256K1_VERIFICATION_KEY_2019: &str = "EcdsaSecp256k1VerificationKey2019";

/// A parsed Decentralized Identifier, `did:<method>:<method-specific-id>`.
///
/// Any DID URL path, query or fragment is dropped while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Did {
    method: String,
    id: String,
}

impl Did {
    /// The DID method name, e.g. `key`.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The method-specific identifier.
    pub fn method_specific_id(&self) -> &str {
        &self.id
    }
}

impl FromStr for Did {
    type Err = Error<crate::Error>;

    fn from_str(did: &str) -> std::result::Result<Self, Self::Err> {
        let malformed = || Error::root(crate::Error::MalformedInput(format!("invalid DID {did}")));

        let did_without_url = did.split(['#', '?', '/']).next().unwrap_or_default();
        let rest = did_without_url.strip_prefix("did:").ok_or_else(malformed)?;
        let (method, id) = rest.split_once(':').ok_or_else(malformed)?;

        let valid_method = !method.is_empty()
            && method
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
        if !valid_method || id.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            method: method.to_owned(),
            id: id.to_owned(),
        })
    }
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "did:{}:{}", self.method, self.id)
    }
}

/// A DID Document, restricted to the properties needed for verifying JWTs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    /// The JSON-LD `@context`.
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    /// The DID this document describes.
    pub id: String,
    /// Public keys of the DID subject.
    #[serde(default)]
    pub verification_method: Vec<VerificationMethod>,
    /// Ids of the verification methods usable for authentication.
    #[serde(default)]
    pub authentication: Vec<String>,
    /// Ids of the verification methods usable for issuing assertions, such as
    /// credentials.
    #[serde(default)]
    pub assertion_method: Vec<String>,
}

impl DidDocument {
    /// Verification methods whose key type can verify signatures of the given
    /// algorithm.
    pub fn verification_methods_for(
        &self,
        algorithm: SigningAlgorithm,
    ) -> impl Iterator<Item = &VerificationMethod> {
        self.verification_method
            .iter()
            .filter(move |method| method.algorithm() == Some(algorithm))
    }
}

/// A single public key of a DID subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// The DID URL of this method, e.g. `did:key:z6Mk...#z6Mk...`.
    pub id: String,
    /// The key type, e.g. [`ED25519_VERIFICATION_KEY_2018`].
    #[serde(rename = "type")]
    pub type_: String,
    /// The DID controlling this key.
    pub controller: String,
    /// The public key, multibase-encoded.
    pub public_key_multibase: String,
}

impl VerificationMethod {
    /// The verification method type used for keys of `algorithm`.
    pub fn key_type(algorithm: SigningAlgorithm) -> &'static str {
        match algorithm {
            SigningAlgorithm::EdDsa => ED25519_VERIFICATION_KEY_2018,
            SigningAlgorithm::Es256k => ECDSA_SECP256K1_VERIFICATION_KEY_2019,
        }
    }

    /// The signing algorithm this method's key type verifies, if supported.
    pub fn algorithm(&self) -> Option<SigningAlgorithm> {
        match self.type_.as_str() {
            ED25519_VERIFICATION_KEY_2018 | ED25519_VERIFICATION_KEY_2020 => {
                Some(SigningAlgorithm::EdDsa)
            }
            ECDSA_SECP256K1_VERIFICATION_KEY_2019 => Some(SigningAlgorithm::Es256k),
            _ => None,
        }
    }

    /// Decode the raw public key.
    ///
    /// The multicodec type of the key must agree with the method `type`.
    pub fn public_key(&self) -> Result<Vec<u8>> {
        let (algorithm, public_key) = multibase::decode(&self.public_key_multibase)?;

        if self.algorithm() != Some(algorithm) {
            return Err(Error::root(crate::Error::MalformedInput(format!(
                "{} key in a {} verification method",
                algorithm, self.type_
            ))));
        }

        Ok(public_key)
    }
}
