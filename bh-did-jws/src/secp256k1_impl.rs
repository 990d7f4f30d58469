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
use k256::ecdsa::{
    signature::{Signer as _, Verifier as _},
    Signature, SigningKey, VerifyingKey,
};
use rand_core::OsRng;
use zeroize::Zeroizing;

use crate::{
    error::CryptoError, utils::base64_url_encode, BoxError, SignatureVerifier, Signer,
    SigningAlgorithm,
};

/// [`Signer`] implementation supporting the `ES256K` algorithm (ECDSA using
/// the secp256k1 curve and the SHA-256 hash function).
///
/// Nonces are derived deterministically ([RFC6979]) and the produced
/// signatures are always normalized to low-`s` form.
///
/// [RFC6979]: https://www.rfc-editor.org/rfc/rfc6979
pub struct Es256kSigner {
    signing_key: SigningKey,
}

impl Es256kSigner {
    /// Generate a new random key pair using the operating system's secure
    /// random source.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Construct the signer from a raw 32-byte secp256k1 secret scalar.
    pub fn from_secret_key(secret_key: &[u8]) -> Result<Self, Error<CryptoError>> {
        if secret_key.len() != SigningAlgorithm::Es256k.secret_key_len() {
            return Err(Error::root(CryptoError::InvalidSecretKey));
        }

        let signing_key =
            SigningKey::from_slice(secret_key).foreign_err(|| CryptoError::InvalidSecretKey)?;

        Ok(Self { signing_key })
    }

    /// The 33-byte SEC1-compressed public key.
    pub fn public_key(&self) -> Vec<u8> {
        self.signing_key
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }

    /// The raw 32-byte secret scalar.
    pub fn secret_key(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.signing_key.to_bytes().to_vec())
    }
}

impl std::fmt::Debug for Es256kSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Es256kSigner")
            .field("public_key", &base64_url_encode(self.public_key()))
            .finish_non_exhaustive()
    }
}

impl Signer for Es256kSigner {
    fn algorithm(&self) -> SigningAlgorithm {
        SigningAlgorithm::Es256k
    }

    async fn sign(&self, message: &[u8]) -> Result<String, BoxError> {
        let signature: Signature = self.signing_key.sign(message);
        let signature = signature.normalize_s().unwrap_or(signature);

        Ok(base64_url_encode(signature.to_bytes()))
    }
}

/// [`SignatureVerifier`] implementation supporting the `ES256K` algorithm
/// (ECDSA using the secp256k1 curve and the SHA-256 hash function).
///
/// Only low-`s` signatures are accepted.
#[derive(Default)]
pub struct Es256kVerifier;

impl SignatureVerifier for Es256kVerifier {
    fn algorithm(&self) -> SigningAlgorithm {
        SigningAlgorithm::Es256k
    }

    fn verify(
        &self,
        message: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<bool, BoxError> {
        if public_key.len() != SigningAlgorithm::Es256k.public_key_len() {
            return Err(Box::new(Error::root(CryptoError::InvalidPublicKey)));
        }
        let public_key = VerifyingKey::from_sec1_bytes(public_key)
            .foreign_err(|| CryptoError::InvalidPublicKey)?;

        if signature.len() != SigningAlgorithm::Es256k.signature_len() {
            return Ok(false);
        }
        let Ok(signature) = Signature::from_slice(signature) else {
            return Ok(false);
        };

        // A high-`s` signature is a malleated copy of a valid one
        if signature.normalize_s().is_some() {
            return Ok(false);
        }

        Ok(public_key.verify(message, &signature).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base64_url_decode;

    async fn simple_verify_setup() -> (Vec<u8>, [u8; 25], Vec<u8>) {
        let signer = Es256kSigner::generate();

        let message = b"Test message to be signed";
        let signature = signer.sign(message).await.unwrap();

        (
            signer.public_key(),
            *message,
            base64_url_decode(signature).unwrap(),
        )
    }

    #[tokio::test]
    async fn sign_verify_bytes() {
        let (public_key, message, signature) = simple_verify_setup().await;

        assert_eq!(public_key.len(), 33);
        assert_eq!(signature.len(), 64);
        assert!(Es256kVerifier
            .verify(&message, &signature, &public_key)
            .unwrap());
    }

    #[tokio::test]
    async fn tampered_message_is_rejected() {
        let (public_key, mut message, signature) = simple_verify_setup().await;
        message[3] ^= 1;

        assert!(!Es256kVerifier
            .verify(&message, &signature, &public_key)
            .unwrap());
    }

    #[tokio::test]
    async fn high_s_signature_is_rejected() {
        let (public_key, message, signature) = simple_verify_setup().await;

        let signature = Signature::from_slice(&signature).unwrap();
        let (r, s) = signature.split_scalars();
        let malleated = Signature::from_scalars(r, -*s).unwrap();
        assert!(malleated.normalize_s().is_some());

        assert!(!Es256kVerifier
            .verify(&message, &malleated.to_bytes(), &public_key)
            .unwrap());
    }

    #[tokio::test]
    async fn signature_of_wrong_length_is_rejected() {
        let (public_key, message, signature) = simple_verify_setup().await;
        let mut extended = signature.clone();
        extended.push(0);

        for signature in [&signature[..63], extended.as_slice(), &[][..]] {
            assert!(!Es256kVerifier
                .verify(&message, signature, &public_key)
                .unwrap());
        }
    }

    #[tokio::test]
    async fn signatures_are_deterministic() {
        let signer = Es256kSigner::from_secret_key(&[7; 32]).unwrap();

        assert_eq!(
            signer.sign(b"message").await.unwrap(),
            signer.sign(b"message").await.unwrap()
        );
    }

    #[tokio::test]
    async fn uncompressed_public_key_is_an_error() {
        let (_, message, signature) = simple_verify_setup().await;
        let signer = Es256kSigner::generate();
        let uncompressed = signer
            .signing_key
            .verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec();

        let error = Es256kVerifier
            .verify(&message, &signature, &uncompressed)
            .unwrap_err();

        assert_eq!(
            error.downcast::<Error<CryptoError>>().unwrap().error,
            CryptoError::InvalidPublicKey
        );
    }

    #[test]
    fn secret_key_round_trips() {
        let signer = Es256kSigner::generate();
        let restored = Es256kSigner::from_secret_key(&signer.secret_key()).unwrap();

        assert_eq!(signer.public_key(), restored.public_key());

        // zero is not a valid secp256k1 scalar
        assert_eq!(
            Es256kSigner::from_secret_key(&[0; 32]).unwrap_err().error,
            CryptoError::InvalidSecretKey
        );
        assert_eq!(
            Es256kSigner::from_secret_key(&[1; 33]).unwrap_err().error,
            CryptoError::InvalidSecretKey
        );
    }
}
