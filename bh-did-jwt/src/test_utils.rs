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

use std::str::FromStr;

use bh_did_jws::{
    base64_url_decode, base64_url_encode, construct_jws_payload, DecodedJws, JsonObject,
};
use bherror::Error;
use futures::future::BoxFuture;

use crate::{
    did::{Did, DidDocument},
    resolver::{DidMethodResolver, ResolutionError},
    DidKeyDriver, Issuer, KeySigner, Resolver,
};

pub(crate) const DRIVERS: [DidKeyDriver; 2] = [DidKeyDriver::EdDsa, DidKeyDriver::Es256k];

/// A fresh issuer and a resolver able to resolve its DID.
pub(crate) fn issuer_and_resolver(driver: DidKeyDriver) -> (Issuer<KeySigner>, Resolver) {
    let key_pair = driver.generate_key_pair();
    let issuer = driver.issuer_from_key_pair(&key_pair).unwrap();

    (issuer, Resolver::new(driver.get_resolver_registry()))
}

/// A fresh `did:key` DID, e.g. of a holder or an audience.
pub(crate) fn random_did(driver: DidKeyDriver) -> String {
    let key_pair = driver.generate_key_pair();
    driver.did_from_public_key(&key_pair.public_key).unwrap()
}

pub(crate) fn tamper_signature(jwt: &str) -> String {
    let (signing_input, signature) = jwt.rsplit_once('.').unwrap();

    let mut signature = base64_url_decode(signature).unwrap();
    signature[10] ^= 0x01;

    format!("{signing_input}.{}", base64_url_encode(signature))
}

pub(crate) fn tamper_payload(jwt: &str, tamper: impl FnOnce(&mut JsonObject)) -> String {
    let mut decoded = DecodedJws::from_str(jwt).unwrap();
    tamper(&mut decoded.payload);

    let (header, _) = decoded.signing_input.split_once('.').unwrap();
    let payload = base64_url_encode(serde_json::to_vec(&decoded.payload).unwrap());
    let signature = jwt.rsplit('.').next().unwrap();

    format!("{}.{signature}", construct_jws_payload(header, &payload))
}

/// A well-formed JWT with a signature of zero bytes.
pub(crate) fn unsigned_jwt(header: &JsonObject, payload: &JsonObject) -> String {
    let header = base64_url_encode(serde_json::to_vec(header).unwrap());
    let payload = base64_url_encode(serde_json::to_vec(payload).unwrap());

    format!(
        "{}.{}",
        construct_jws_payload(&header, &payload),
        base64_url_encode([0; 64])
    )
}

/// Resolver returning the same document for every DID, or failing if there
/// is none.
pub(crate) struct StaticResolver {
    document: Option<DidDocument>,
}

impl StaticResolver {
    pub(crate) fn new(document: Option<DidDocument>) -> Self {
        Self { document }
    }
}

impl DidMethodResolver for StaticResolver {
    fn resolve<'a>(
        &'a self,
        _did: &'a Did,
    ) -> BoxFuture<'a, bherror::Result<DidDocument, ResolutionError>> {
        Box::pin(async move {
            self.document
                .clone()
                .ok_or_else(|| Error::root(ResolutionError("no document".to_owned())))
        })
    }
}
