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

use std::{future::Future, str::FromStr};

use bherror::Error;
use serde::{Deserialize, Serialize};

use crate::{
    error::SignatureError,
    utils::{base64_url_encode, construct_jws_payload, BoxError, JsonObject},
    DecodedJws,
};

/// Signing algorithms supported by keys which can be embedded in a `did:key`
/// identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// Ed25519 signature (EdDSA over Curve25519, [RFC8037])
    ///
    /// [RFC8037]: https://www.rfc-editor.org/rfc/rfc8037
    #[serde(rename = "EdDSA")]
    EdDsa,
    /// ECDSA over secp256k1 with SHA-256 ([RFC8812])
    ///
    /// [RFC8812]: https://www.rfc-editor.org/rfc/rfc8812
    #[serde(rename = "ES256K")]
    Es256k,
}

/// JOSE name of [`SigningAlgorithm::EdDsa`].
pub const SIGNING_ALG_EDDSA: &str = "EdDSA";
/// JOSE name of [`SigningAlgorithm::Es256k`].
pub const SIGNING_ALG_ES256K: &str = "ES256K";

impl SigningAlgorithm {
    /// Length in bytes of a public key of this algorithm, in the form used
    /// inside a `did:key` identifier.
    ///
    /// Ed25519 keys are raw 32-byte points, secp256k1 keys are 33-byte
    /// SEC1-compressed points.
    pub const fn public_key_len(&self) -> usize {
        match self {
            Self::EdDsa => 32,
            Self::Es256k => 33,
        }
    }

    /// Length in bytes of a secret key of this algorithm.
    pub const fn secret_key_len(&self) -> usize {
        32
    }

    /// Length in bytes of a raw JWS signature of this algorithm.
    pub const fn signature_len(&self) -> usize {
        64
    }
}

impl FromStr for SigningAlgorithm {
    type Err = Error<SignatureError>;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            SIGNING_ALG_EDDSA => Ok(SigningAlgorithm::EdDsa),
            SIGNING_ALG_ES256K => Ok(SigningAlgorithm::Es256k),
            _ => Err(Error::root(SignatureError::InvalidSigningAlgorithm(
                value.to_string(),
            ))),
        }
    }
}

impl std::fmt::Display for SigningAlgorithm {
    // This trait requires `fmt` with this exact signature.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let message = match self {
            Self::EdDsa => SIGNING_ALG_EDDSA,
            Self::Es256k => SIGNING_ALG_ES256K,
        };
        write!(f, "{}", message)
    }
}

/// A capability that produces JWS signatures.
///
/// Signing is asynchronous so that implementations may keep the secret key
/// out of process (e.g. in an HSM or a remote signing service).
pub trait Signer: Sync {
    /// The algorithm this signer uses. Must be a constant function.
    fn algorithm(&self) -> SigningAlgorithm;

    /// Produce a JWS signature of the `message`, already `base64url`-encoded
    /// without padding.
    ///
    /// The `message` is guaranteed to be a valid JWS signing input.
    fn sign(&self, message: &[u8]) -> impl Future<Output = Result<String, BoxError>> + Send;
}

/// A JWS signature verifier for a single [`SigningAlgorithm`].
pub trait SignatureVerifier: Sync {
    /// The algorithm used for the signature verification.
    fn algorithm(&self) -> SigningAlgorithm;

    /// Verifies the signature of the message, against the provided public key.
    ///
    /// The `public_key` is in the same byte form as embedded in a `did:key`
    /// identifier, see [`SigningAlgorithm::public_key_len`].
    ///
    /// # Return
    /// Method returns `Ok(true)` if the signature if valid for the given
    /// message, `Ok(false)` if it isn't (but there was no issue with the
    /// verifier itself), and `Err(_)` when the verifier itself encounters an
    /// error for any other reason.
    fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8])
        -> Result<bool, BoxError>;
}

/// Extension of [`Signer`] producing complete JWTs in the JWS Compact
/// Serialization.
pub trait JwtSigner: Signer {
    /// Sign the `claims` under the given `header`, returning
    /// `<header>.<claims>.<signature>`.
    ///
    /// The `alg` header parameter must be present and equal to the
    /// [`Signer::algorithm`] of `self`.
    fn sign_jwt(
        &self,
        header: &JsonObject,
        claims: &JsonObject,
    ) -> impl Future<Output = Result<String, BoxError>> + Send;
}

impl<S: Signer + ?Sized> JwtSigner for S {
    async fn sign_jwt(&self, header: &JsonObject, claims: &JsonObject) -> Result<String, BoxError> {
        check_header_alg(header, self.algorithm())?;

        let header = base64_url_encode(serde_json::to_vec(header)?);
        let claims = base64_url_encode(serde_json::to_vec(claims)?);
        let signing_input = construct_jws_payload(&header, &claims);

        let signature = self.sign(signing_input.as_bytes()).await?;

        Ok(format!("{signing_input}.{signature}"))
    }
}

/// Extension of [`SignatureVerifier`] verifying already decoded JWTs.
pub trait JwtVerifier: SignatureVerifier {
    /// Verify the signature of the `jws` against the `public_key`.
    ///
    /// Returns an error if the `alg` header parameter does not match
    /// [`SignatureVerifier::algorithm`], otherwise the same as
    /// [`SignatureVerifier::verify`].
    fn verify_jwt_signature(&self, jws: &DecodedJws, public_key: &[u8]) -> Result<bool, BoxError>;
}

impl<V: SignatureVerifier + ?Sized> JwtVerifier for V {
    fn verify_jwt_signature(&self, jws: &DecodedJws, public_key: &[u8]) -> Result<bool, BoxError> {
        check_header_alg(&jws.header, self.algorithm())?;

        self.verify(jws.signing_input.as_bytes(), &jws.signature, public_key)
    }
}

fn check_header_alg(header: &JsonObject, expected: SigningAlgorithm) -> Result<(), BoxError> {
    let alg = header
        .get("alg")
        .and_then(|alg| alg.as_str())
        .unwrap_or_default();

    if alg != expected.to_string() {
        return Err(Box::new(Error::root(SignatureError::AlgorithmMismatch(
            alg.to_owned(),
            expected.to_string(),
        ))));
    }

    Ok(())
}
