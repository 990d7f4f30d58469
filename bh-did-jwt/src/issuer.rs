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

use bh_did_jws::{Signer, SigningAlgorithm};

/// A DID together with a signer able to sign on its behalf.
///
/// The signer is usually a [`KeySigner`](crate::KeySigner) obtained from
/// [`DidKeyDriver::issuer_from_key_pair`](crate::DidKeyDriver::issuer_from_key_pair),
/// but any [`Signer`] (e.g. one backed by an HSM) can be used.
#[derive(Debug)]
pub struct Issuer<S: Signer> {
    /// The DID placed in the `iss` claim.
    pub did: String,
    /// The signer producing the JWS signature.
    pub signer: S,
}

impl<S: Signer> Issuer<S> {
    /// Create a new issuer.
    pub fn new(did: String, signer: S) -> Self {
        Self { did, signer }
    }

    /// The algorithm of the issuer's signer.
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.signer.algorithm()
    }
}
