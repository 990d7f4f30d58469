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

use bherror::{traits::ForeignError as _, Error};
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};
use rand_core::OsRng;
use zeroize::Zeroizing;

use crate::{
    error::CryptoError, utils::base64_url_encode, BoxError, SignatureVerifier, Signer,
    SigningAlgorithm,
};

/// [`Signer`] implementation supporting the `EdDSA` algorithm with Ed25519
/// keys.
///
/// The secret key is held in memory and zeroized on drop.
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    /// Generate a new random key pair using the operating system's secure
    /// random source.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Construct the signer from a raw 32-byte Ed25519 secret key (seed).
    pub fn from_secret_key(secret_key: &[u8]) -> Result<Self, Error<CryptoError>> {
        let seed = Zeroizing::new(
            <[u8; 32]>::try_from(secret_key).foreign_err(|| CryptoError::InvalidSecretKey)?,
        );

        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
        })
    }

    /// The raw 32-byte public key.
    pub fn public_key(&self) -> Vec<u8> {
        self.signing_key.verifying_key().to_bytes().to_vec()
    }

    /// The raw 32-byte secret key (seed).
    pub fn secret_key(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.signing_key.to_bytes().to_vec())
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("public_key", &base64_url_encode(self.public_key()))
            .finish_non_exhaustive()
    }
}

impl Signer for Ed25519Signer {
    fn algorithm(&self) -> SigningAlgorithm {
        SigningAlgorithm::EdDsa
    }

    async fn sign(&self, message: &[u8]) -> Result<String, BoxError> {
        let signature = self.signing_key.sign(message);
        Ok(base64_url_encode(signature.to_bytes()))
    }
}

/// [`SignatureVerifier`] implementation supporting the `EdDSA` algorithm with
/// Ed25519 keys.
///
/// Verification is strict: small-order public keys and non-canonical
/// signatures are rejected.
#[derive(Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn algorithm(&self) -> SigningAlgorithm {
        SigningAlgorithm::EdDsa
    }

    fn verify(
        &self,
        message: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<bool, BoxError> {
        let public_key = <&[u8; 32]>::try_from(public_key)
            .foreign_err(|| CryptoError::InvalidPublicKey)?;
        let public_key =
            VerifyingKey::from_bytes(public_key).foreign_err(|| CryptoError::InvalidPublicKey)?;

        if signature.len() != SigningAlgorithm::EdDsa.signature_len() {
            return Ok(false);
        }
        let Ok(signature) = ed25519_dalek::Signature::from_slice(signature) else {
            return Ok(false);
        };

        Ok(public_key.verify_strict(message, &signature).is_ok())
    }
}
