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

use bh_did_jwt::{
    create_credential_jwt, create_presentation_jwt, get_did_key_driver, typed_credential,
    verify_credential_jwt, verify_presentation_credentials, verify_presentation_jwt,
    CredentialJwtPayload, PresentationJwtPayload, Resolver, VerifiableCredential,
    VerifiablePresentation, VerifiedCredential, VerifyOptions, DEFAULT_CONTEXT, DEFAULT_VC_TYPE,
    DEFAULT_VP_TYPE,
};
use serde::Deserialize;
use serde_json::json;

/// The subject of the issued credential, as the verifier expects it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppCredential {
    name: String,
    app_index: u32,
}

#[tokio::main]
async fn main() {
    // the issuer signs with Ed25519, the holder with secp256k1
    let issuer_driver = get_did_key_driver("EdDSA").unwrap();
    let holder_driver = get_did_key_driver("ES256K").unwrap();

    let issuer = issuer_driver
        .issuer_from_key_pair(&issuer_driver.generate_key_pair())
        .unwrap();
    let holder = holder_driver
        .issuer_from_key_pair(&holder_driver.generate_key_pair())
        .unwrap();
    let verifier_did = issuer_driver
        .did_from_public_key(&issuer_driver.generate_key_pair().public_key)
        .unwrap();

    // resolves `did:key` DIDs of both algorithms
    let resolver = Resolver::new(issuer_driver.get_resolver_registry());

    // issue the credential to the holder
    let vc = VerifiableCredential {
        context: vec![DEFAULT_CONTEXT.to_owned()],
        type_: vec![DEFAULT_VC_TYPE.to_owned()],
        credential_subject: json!({ "name": "aaa", "appIndex": 1 }),
        id: None,
        issuer: None,
        issuance_date: None,
        expiration_date: None,
        proof: None,
    };
    let credential = create_credential_jwt(&CredentialJwtPayload::new(&holder.did, vc), &issuer)
        .await
        .unwrap();

    // the holder checks what it received
    let received: VerifiedCredential =
        verify_credential_jwt(&credential, &resolver, &VerifyOptions::default())
            .await
            .unwrap();
    println!("Received credential: {:#?}", received.verifiable_credential);

    // present the credential to the verifier
    let vp = VerifiablePresentation::new(
        vec![DEFAULT_CONTEXT.to_owned()],
        vec![DEFAULT_VP_TYPE.to_owned()],
        vec![credential],
    );
    let presentation =
        create_presentation_jwt(&PresentationJwtPayload::new(&verifier_did, vp), &holder)
            .await
            .unwrap();

    // the verifier checks the presentation and then every presented credential
    let verified = verify_presentation_jwt(
        &presentation,
        &resolver,
        &VerifyOptions::with_audience(&verifier_did),
    )
    .await
    .unwrap();
    assert_eq!(verified.holder, holder.did);

    let credentials: Vec<VerifiedCredential> = verify_presentation_credentials(
        &verified.verifiable_presentation,
        &resolver,
        &VerifyOptions::default(),
    )
    .await
    .unwrap();

    let typed =
        typed_credential::<AppCredential>(credentials[0].verifiable_credential.clone()).unwrap();
    println!(
        "Verified {} (app #{}) issued by {}",
        typed.credential_subject.name,
        typed.credential_subject.app_index,
        credentials[0].issuer
    );
}
