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

//! Key drivers: `did:key` key pairs, identifiers and signers for a single
//! signing algorithm.

use std::str::FromStr;

use bh_did_jws::{BoxError, Ed25519Signer, Es256kSigner, Signer, SigningAlgorithm};
use bherror::{traits::PropagateError as _, Error};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::{
    did::multibase,
    issuer::Issuer,
    resolver::{KeyDidResolver, ResolverRegistry},
    Result,
};

/// A raw public/secret key pair.
///
/// The secret key is zeroized on drop and never printed by [`Debug`].
#[derive(Clone)]
pub struct KeyPair {
    /// The public key: 32 bytes for Ed25519, 33 bytes (SEC1 compressed) for
    /// secp256k1.
    pub public_key: Vec<u8>,
    /// The 32-byte secret key.
    pub secret_key: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// The [`Signer`] built by a [`DidKeyDriver`] from a local secret key.
#[derive(Debug)]
pub enum KeySigner {
    /// An `EdDSA` signer.
    EdDsa(Ed25519Signer),
    /// An `ES256K` signer.
    Es256k(Es256kSigner),
}

impl KeySigner {
    /// The public key matching the signer's secret key.
    pub fn public_key(&self) -> Vec<u8> {
        match self {
            Self::EdDsa(signer) => signer.public_key(),
            Self::Es256k(signer) => signer.public_key(),
        }
    }
}

impl Signer for KeySigner {
    fn algorithm(&self) -> SigningAlgorithm {
        match self {
            Self::EdDsa(signer) => signer.algorithm(),
            Self::Es256k(signer) => signer.algorithm(),
        }
    }

    async fn sign(&self, message: &[u8]) -> std::result::Result<String, BoxError> {
        match self {
            Self::EdDsa(signer) => signer.sign(message).await,
            Self::Es256k(signer) => signer.sign(message).await,
        }
    }
}

/// Key driver for `did:key` identifiers of one signing algorithm.
///
/// The driver is selected once and then supplies everything needed to issue
/// and verify JWTs with keys of its algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "SigningAlgorithm", into = "SigningAlgorithm")]
pub enum DidKeyDriver {
    /// Ed25519 keys, `EdDSA` signatures.
    EdDsa,
    /// secp256k1 keys, `ES256K` signatures.
    Es256k,
}

impl From<SigningAlgorithm> for DidKeyDriver {
    fn from(algorithm: SigningAlgorithm) -> Self {
        match algorithm {
            SigningAlgorithm::EdDsa => Self::EdDsa,
            SigningAlgorithm::Es256k => Self::Es256k,
        }
    }
}

impl From<DidKeyDriver> for SigningAlgorithm {
    fn from(driver: DidKeyDriver) -> Self {
        driver.algorithm()
    }
}

impl FromStr for DidKeyDriver {
    type Err = Error<crate::Error>;

    fn from_str(algorithm: &str) -> std::result::Result<Self, Self::Err> {
        let algorithm = SigningAlgorithm::from_str(algorithm)
            .with_err(|| crate::Error::UnsupportedAlgorithm(algorithm.to_owned()))?;

        Ok(algorithm.into())
    }
}

/// Select the key driver for the JOSE algorithm name `alg` (`EdDSA` or
/// `ES256K`).
pub fn get_did_key_driver(alg: &str) -> Result<DidKeyDriver> {
    DidKeyDriver::from_str(alg)
}

impl DidKeyDriver {
    /// The signing algorithm of this driver.
    pub fn algorithm(&self) -> SigningAlgorithm {
        match self {
            Self::EdDsa => SigningAlgorithm::EdDsa,
            Self::Es256k => SigningAlgorithm::Es256k,
        }
    }

    /// Generate a fresh key pair from the operating system's secure random
    /// source.
    ///
    /// # Panics
    ///
    /// Panics if the operating system's random source is unavailable.
    pub fn generate_key_pair(&self) -> KeyPair {
        let signer = match self {
            Self::EdDsa => KeySigner::EdDsa(Ed25519Signer::generate()),
            Self::Es256k => KeySigner::Es256k(Es256kSigner::generate()),
        };

        let secret_key = match &signer {
            KeySigner::EdDsa(signer) => signer.secret_key(),
            KeySigner::Es256k(signer) => signer.secret_key(),
        };

        KeyPair {
            public_key: signer.public_key(),
            secret_key,
        }
    }

    /// Encode `public_key` as a base58btc multibase string with the
    /// multicodec prefix of this driver's key type.
    pub fn multibase_from_public_key(&self, public_key: &[u8]) -> Result<String> {
        multibase::encode(self.algorithm(), public_key)
    }

    /// Decode a multibase string produced by
    /// [`DidKeyDriver::multibase_from_public_key`].
    pub fn public_key_from_multibase(&self, multibase: &str) -> Result<Vec<u8>> {
        let (algorithm, public_key) = multibase::decode(multibase)?;

        if algorithm != self.algorithm() {
            return Err(Error::root(crate::Error::MalformedInput(format!(
                "expected a {} key, found a {} key",
                self.algorithm(),
                algorithm
            ))));
        }

        Ok(public_key)
    }

    /// The `did:key` identifier of `public_key`.
    pub fn did_from_public_key(&self, public_key: &[u8]) -> Result<String> {
        Ok(format!(
            "did:key:{}",
            self.multibase_from_public_key(public_key)?
        ))
    }

    /// Build a signer from a raw 32-byte secret key.
    pub fn signer_from_secret_key(&self, secret_key: &[u8]) -> Result<KeySigner> {
        let signer = match self {
            Self::EdDsa => Ed25519Signer::from_secret_key(secret_key).map(KeySigner::EdDsa),
            Self::Es256k => Es256kSigner::from_secret_key(secret_key).map(KeySigner::Es256k),
        };

        signer.with_err(|| {
            crate::Error::MalformedInput(format!("invalid {} secret key", self.algorithm()))
        })
    }

    /// Build an [`Issuer`] signing with the key pair's secret key on behalf
    /// of the `did:key` of its public key.
    ///
    /// Fails with [`crate::Error::MalformedInput`] if the public key does not
    /// belong to the secret key.
    pub fn issuer_from_key_pair(&self, key_pair: &KeyPair) -> Result<Issuer<KeySigner>> {
        let signer = self.signer_from_secret_key(&key_pair.secret_key)?;

        if signer.public_key() != key_pair.public_key {
            return Err(Error::root(crate::Error::MalformedInput(
                "public key does not match the secret key".to_owned(),
            )));
        }

        let did = self.did_from_public_key(&key_pair.public_key)?;

        Ok(Issuer::new(did, signer))
    }

    /// A resolver registry able to resolve `did:key` identifiers.
    pub fn get_resolver_registry(&self) -> ResolverRegistry {
        let mut registry = ResolverRegistry::new();
        registry.register(KeyDidResolver::METHOD, KeyDidResolver);
        registry
    }
}
