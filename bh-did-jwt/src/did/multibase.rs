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

//! `did:key` public key encoding: `z` + base58btc(multicodec ‖ key).

use bh_did_jws::{validate_public_key, SigningAlgorithm};
use bherror::{
    traits::{ForeignError as _, PropagateError as _},
    Error,
};

use crate::Result;

/// Multibase prefix of the `base58btc` encoding.
pub const MULTIBASE_BASE58BTC: char = 'z';

/// Multicodec varint prefix of an Ed25519 public key (`ed25519-pub`, `0xed`).
pub const MULTICODEC_ED25519_PUB: [u8; 2] = [0xed, 0x01];
/// Multicodec varint prefix of a compressed secp256k1 public key
/// (`secp256k1-pub`, `0xe7`).
pub const MULTICODEC_SECP256K1_PUB: [u8; 2] = [0xe7, 0x01];

/// Every base58btc-multibase Ed25519 key starts with this string.
pub const MULTIBASE_BASE58BTC_ED25519_PREFIX: &str = "z6Mk";
/// Every base58btc-multibase secp256k1 key starts with this string.
pub const MULTIBASE_BASE58BTC_SECP256K1_PREFIX: &str = "zQ3s";

fn multicodec_prefix(algorithm: SigningAlgorithm) -> [u8; 2] {
    match algorithm {
        SigningAlgorithm::EdDsa => MULTICODEC_ED25519_PUB,
        SigningAlgorithm::Es256k => MULTICODEC_SECP256K1_PUB,
    }
}

/// Encode a public key of the given algorithm as a multibase string.
///
/// Fails with [`crate::Error::MalformedInput`] if the key is not a valid
/// public key of the algorithm.
pub fn encode(algorithm: SigningAlgorithm, public_key: &[u8]) -> Result<String> {
    validate_public_key(algorithm, public_key).with_err(|| {
        crate::Error::MalformedInput(format!("invalid {algorithm} public key"))
    })?;

    let mut bytes = multicodec_prefix(algorithm).to_vec();
    bytes.extend_from_slice(public_key);

    Ok(format!(
        "{MULTIBASE_BASE58BTC}{}",
        bs58::encode(bytes).into_string()
    ))
}

/// Decode a multibase string into the key algorithm and the raw public key.
pub fn decode(multibase: &str) -> Result<(SigningAlgorithm, Vec<u8>)> {
    let Some(encoded) = multibase.strip_prefix(MULTIBASE_BASE58BTC) else {
        return Err(Error::root(crate::Error::MalformedInput(
            "multibase value is not base58btc".to_owned(),
        )));
    };

    let bytes = bs58::decode(encoded).into_vec().foreign_err(|| {
        crate::Error::MalformedInput("multibase value is not valid base58btc".to_owned())
    })?;

    let algorithm = if bytes.starts_with(&MULTICODEC_ED25519_PUB) {
        SigningAlgorithm::EdDsa
    } else if bytes.starts_with(&MULTICODEC_SECP256K1_PUB) {
        SigningAlgorithm::Es256k
    } else {
        return Err(Error::root(crate::Error::MalformedInput(
            "unsupported multicodec key type".to_owned(),
        )));
    };

    let public_key = bytes[2..].to_vec();
    validate_public_key(algorithm, &public_key).with_err(|| {
        crate::Error::MalformedInput(format!("invalid {algorithm} public key"))
    })?;

    Ok((algorithm, public_key))
}

#[cfg(test)]
mod tests {
    use bh_did_jws::{Ed25519Signer, Es256kSigner};

    use super::*;

    #[test]
    fn encode_uses_well_known_prefixes() {
        let ed25519 = encode(SigningAlgorithm::EdDsa, &Ed25519Signer::generate().public_key())
            .unwrap();
        assert!(ed25519.starts_with(MULTIBASE_BASE58BTC_ED25519_PREFIX));

        let secp256k1 = encode(
            SigningAlgorithm::Es256k,
            &Es256kSigner::generate().public_key(),
        )
        .unwrap();
        assert!(secp256k1.starts_with(MULTIBASE_BASE58BTC_SECP256K1_PREFIX));
    }

    #[test]
    fn decode_inverts_encode() {
        for (algorithm, public_key) in [
            (SigningAlgorithm::EdDsa, Ed25519Signer::generate().public_key()),
            (SigningAlgorithm::Es256k, Es256kSigner::generate().public_key()),
        ] {
            let multibase = encode(algorithm, &public_key).unwrap();
            assert_eq!(decode(&multibase).unwrap(), (algorithm, public_key));
        }
    }

    #[test]
    fn decode_known_ed25519_key() {
        // https://w3c-ccg.github.io/did-method-key/#example-5
        let (algorithm, public_key) =
            decode("z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK").unwrap();

        assert_eq!(algorithm, SigningAlgorithm::EdDsa);
        assert_eq!(public_key.len(), 32);
    }

    #[test]
    fn decode_rejects_malformed_values() {
        for multibase in [
            // not base58btc
            "f6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK",
            // `0` is not in the base58 alphabet
            "z0MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK",
            // truncated key
            "z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2do",
            // unknown multicodec
            "z1111",
        ] {
            let error = decode(multibase).unwrap_err();
            assert!(
                matches!(error.error, crate::Error::MalformedInput(_)),
                "{multibase}"
            );
        }
    }

    #[test]
    fn encode_rejects_wrong_key_length() {
        let error = encode(SigningAlgorithm::Es256k, &[2; 32]).unwrap_err();
        assert!(matches!(error.error, crate::Error::MalformedInput(_)));
    }
}
