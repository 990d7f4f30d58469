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

use bherror::Error;

use crate::{
    error::CryptoError, Ed25519Verifier, Es256kVerifier, SignatureVerifier, SigningAlgorithm,
};

/// Check that `public_key` is a well-formed public key of the given
/// algorithm, in the byte form embedded in a `did:key` identifier.
pub fn validate_public_key(
    algorithm: SigningAlgorithm,
    public_key: &[u8],
) -> Result<(), Error<CryptoError>> {
    let valid = match algorithm {
        SigningAlgorithm::EdDsa => <[u8; 32]>::try_from(public_key)
            .ok()
            .and_then(|bytes| ed25519_dalek::VerifyingKey::from_bytes(&bytes).ok())
            .is_some(),
        SigningAlgorithm::Es256k => {
            public_key.len() == algorithm.public_key_len()
                && k256::ecdsa::VerifyingKey::from_sec1_bytes(public_key).is_ok()
        }
    };

    if !valid {
        return Err(Error::root(CryptoError::InvalidPublicKey));
    }

    Ok(())
}

/// Returns the built-in [`SignatureVerifier`] for the given algorithm.
pub fn signature_verifier(algorithm: SigningAlgorithm) -> &'static dyn SignatureVerifier {
    match algorithm {
        SigningAlgorithm::EdDsa => &Ed25519Verifier,
        SigningAlgorithm::Es256k => &Es256kVerifier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Ed25519Signer, Es256kSigner};

    #[test]
    fn generated_keys_are_valid() {
        validate_public_key(SigningAlgorithm::EdDsa, &Ed25519Signer::generate().public_key())
            .unwrap();
        validate_public_key(SigningAlgorithm::Es256k, &Es256kSigner::generate().public_key())
            .unwrap();
    }

    #[test]
    fn key_of_other_algorithm_is_invalid() {
        let error = validate_public_key(
            SigningAlgorithm::EdDsa,
            &Es256kSigner::generate().public_key(),
        )
        .unwrap_err();
        assert_eq!(error.error, CryptoError::InvalidPublicKey);

        let mut not_on_curve = vec![0x02];
        not_on_curve.extend_from_slice(&[0xff; 32]);
        let error = validate_public_key(SigningAlgorithm::Es256k, &not_on_curve).unwrap_err();
        assert_eq!(error.error, CryptoError::InvalidPublicKey);
    }

    #[test]
    fn verifier_matches_algorithm() {
        for alg in [SigningAlgorithm::EdDsa, SigningAlgorithm::Es256k] {
            assert_eq!(signature_verifier(alg).algorithm(), alg);
        }
    }
}
