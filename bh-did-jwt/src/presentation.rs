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

//! JWT-encoded Verifiable Presentations.

use bh_did_jws::Signer;
use bherror::{traits::PropagateError as _, Error};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    credential::{
        check_non_empty, validate_container, Proof, VerifiedCredential, DEFAULT_VP_TYPE,
    },
    did::VerificationMethod,
    jwt::{
        decode_jwt, from_json_object, sign_claims, to_json_object, verify_compact, JwtHeader,
        SecondsSinceEpoch, VerifyOptions,
    },
    verify_credential_jwt, Issuer, Resolver, Result,
};

/// A W3C Verifiable Presentation carrying credentials as JWTs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiablePresentation {
    /// JSON-LD contexts, [`DEFAULT_CONTEXT`](crate::DEFAULT_CONTEXT) first.
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    /// Presentation types, including [`DEFAULT_VP_TYPE`].
    #[serde(rename = "type")]
    pub type_: Vec<String>,
    /// The presented credential JWTs.
    pub verifiable_credential: Vec<String>,
    /// Presentation id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The DID of the holder presenting the credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    /// The DID of the verifier the presentation is meant for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifier: Option<String>,
    /// The proof.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

impl VerifiablePresentation {
    /// A presentation of `credentials` with the given contexts and types.
    pub fn new(context: Vec<String>, type_: Vec<String>, credentials: Vec<String>) -> Self {
        Self {
            context,
            type_,
            verifiable_credential: credentials,
            id: None,
            holder: None,
            verifier: None,
            proof: None,
        }
    }
}

/// Claims of a presentation JWT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationJwtPayload {
    /// The DID of the verifier.
    pub aud: String,
    /// The presentation.
    pub vp: VerifiablePresentation,
    /// Holder DID; always set to the holder's DID on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// JWT id, exposed as the presentation `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Challenge supplied by the verifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Issued at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<SecondsSinceEpoch>,
    /// Expiration time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<SecondsSinceEpoch>,
    /// Not before.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<SecondsSinceEpoch>,
}

impl PresentationJwtPayload {
    /// A payload with no optional claims.
    pub fn new(aud: impl Into<String>, vp: VerifiablePresentation) -> Self {
        Self {
            aud: aud.into(),
            vp,
            iss: None,
            jti: None,
            nonce: None,
            iat: None,
            exp: None,
            nbf: None,
        }
    }
}

/// A presentation JWT whose signature, claims and structure have been
/// verified.
///
/// The embedded credentials are *not* verified, see
/// [`verify_presentation_credentials`].
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedPresentation {
    /// The JOSE header.
    pub header: JwtHeader,
    /// The claims as found in the JWT.
    pub payload: PresentationJwtPayload,
    /// The `vp` claim completed with `holder`, `verifier`, `id` and `proof`
    /// taken from the JWT.
    pub verifiable_presentation: VerifiablePresentation,
    /// The holder DID.
    pub holder: String,
    /// The verification method whose key verified the signature.
    pub signer: VerificationMethod,
    /// The JWT as received.
    pub jwt: String,
}

/// Create a presentation JWT signed by `holder`.
///
/// Every presented credential must be a well-formed JWT, but none of them is
/// verified here.
pub async fn create_presentation_jwt<S: Signer>(
    payload: &PresentationJwtPayload,
    holder: &Issuer<S>,
) -> Result<String> {
    check_non_empty("vp", &payload.vp.context, &payload.vp.type_)?;
    check_credentials(&payload.vp.verifiable_credential)?;

    let claims = to_json_object(payload)?;
    sign_claims(claims, holder, JwtHeader::new(holder.algorithm())).await
}

/// Verify a presentation JWT.
///
/// After the signature and the claims, the `vp` claim must have an
/// `@context` starting with [`DEFAULT_CONTEXT`](crate::DEFAULT_CONTEXT), a
/// `type` containing [`DEFAULT_VP_TYPE`] and a non-empty
/// `verifiableCredential` list of JWTs.
pub async fn verify_presentation_jwt(
    jwt: &str,
    resolver: &Resolver,
    options: &VerifyOptions,
) -> Result<VerifiedPresentation> {
    let (header, payload, signer) = verify_compact(jwt, resolver, options).await?;

    validate_container(&payload, "vp", DEFAULT_VP_TYPE, "verifiableCredential")?;
    let payload: PresentationJwtPayload = from_json_object(payload, "presentation JWT payload")?;
    check_presented(&payload.vp.verifiable_credential)?;

    let holder = payload.iss.clone().unwrap_or_default();

    let mut verifiable_presentation = payload.vp.clone();
    verifiable_presentation.holder = Some(holder.clone());
    verifiable_presentation.verifier = Some(payload.aud.clone());
    if let Some(jti) = &payload.jti {
        verifiable_presentation.id = Some(jti.clone());
    }
    verifiable_presentation.proof = Some(Proof::from_jwt(header.alg, jwt));

    Ok(VerifiedPresentation {
        header,
        payload,
        verifiable_presentation,
        holder,
        signer,
        jwt: jwt.to_owned(),
    })
}

/// Verify every credential JWT of a presentation, in order.
///
/// The `audience` of `options` is ignored, since it is meant for the
/// presentation; the time the claims are checked against still applies.
pub async fn verify_presentation_credentials<T: DeserializeOwned + Clone>(
    presentation: &VerifiablePresentation,
    resolver: &Resolver,
    options: &VerifyOptions,
) -> Result<Vec<VerifiedCredential<T>>> {
    let options = VerifyOptions {
        audience: None,
        ..options.clone()
    };

    let mut credentials = Vec::with_capacity(presentation.verifiable_credential.len());
    for jwt in &presentation.verifiable_credential {
        credentials.push(verify_credential_jwt(jwt, resolver, &options).await?);
    }

    Ok(credentials)
}

fn check_credentials(credentials: &[String]) -> Result<()> {
    check_not_empty(credentials)?;

    for credential in credentials {
        decode_jwt(credential)?;
    }

    Ok(())
}

/// Same as [`check_credentials`], but for a presentation whose own JWT is
/// already decoded and verified, so a broken entry is a structural failure.
fn check_presented(credentials: &[String]) -> Result<()> {
    check_not_empty(credentials)?;

    for (index, credential) in credentials.iter().enumerate() {
        decode_jwt(credential).with_err(|| {
            crate::Error::StructuralValidation(format!(
                "`verifiableCredential[{index}]` is not a compact JWT"
            ))
        })?;
    }

    Ok(())
}

fn check_not_empty(credentials: &[String]) -> Result<()> {
    if credentials.is_empty() {
        return Err(Error::root(crate::Error::StructuralValidation(
            "`vp` must present at least one credential".to_owned(),
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::{
        create_credential_jwt, create_jwt,
        test_utils::{issuer_and_resolver, random_did, DRIVERS},
        typed_credential, CredentialJwtPayload, DidKeyDriver, KeySigner, VerifiableCredential,
        DEFAULT_CONTEXT, DEFAULT_VC_TYPE,
    };

    async fn credential_jwt(issuer: &Issuer<KeySigner>, holder: &str, subject: Value) -> String {
        let vc = VerifiableCredential {
            context: vec![DEFAULT_CONTEXT.to_owned()],
            type_: vec![DEFAULT_VC_TYPE.to_owned()],
            credential_subject: subject,
            id: None,
            issuer: None,
            issuance_date: None,
            expiration_date: None,
            proof: None,
        };

        create_credential_jwt(&CredentialJwtPayload::new(holder, vc), issuer)
            .await
            .unwrap()
    }

    fn presentation(credentials: Vec<String>) -> VerifiablePresentation {
        VerifiablePresentation::new(
            vec![DEFAULT_CONTEXT.to_owned()],
            vec![DEFAULT_VP_TYPE.to_owned()],
            credentials,
        )
    }

    #[tokio::test]
    async fn presentation_round_trip() {
        for driver in DRIVERS {
            let (issuer, resolver) = issuer_and_resolver(driver);
            let (holder, _) = issuer_and_resolver(driver);
            let verifier = random_did(driver);

            let credentials = vec![
                credential_jwt(&issuer, &holder.did, json!({ "name": "aaa", "appIndex": 1 })).await,
                credential_jwt(&issuer, &holder.did, json!({ "name": "bbb", "appIndex": 2 })).await,
            ];
            let payload =
                PresentationJwtPayload::new(verifier.clone(), presentation(credentials.clone()));

            let jwt = create_presentation_jwt(&payload, &holder).await.unwrap();
            let verified =
                verify_presentation_jwt(&jwt, &resolver, &VerifyOptions::with_audience(&verifier))
                    .await
                    .unwrap();

            let vp = &verified.verifiable_presentation;
            assert_eq!(vp.verifiable_credential, credentials);
            assert_eq!(vp.holder.as_deref(), Some(holder.did.as_str()));
            assert_eq!(vp.verifier.as_deref(), Some(verifier.as_str()));
            assert_eq!(vp.proof.as_ref().unwrap().jwt.as_deref(), Some(jwt.as_str()));
            assert_eq!(verified.holder, holder.did);

            let verified_credentials: Vec<VerifiedCredential> = verify_presentation_credentials(
                vp,
                &resolver,
                &VerifyOptions::with_audience(&verifier),
            )
            .await
            .unwrap();
            assert_eq!(verified_credentials.len(), 2);
            assert_eq!(
                verified_credentials[1].verifiable_credential.credential_subject["name"],
                "bbb"
            );
            for credential in &verified_credentials {
                assert_eq!(credential.payload.sub, holder.did);
                assert_eq!(credential.issuer, issuer.did);
            }
        }
    }

    #[tokio::test]
    async fn typed_credential_from_presentation() {
        #[derive(Debug, Clone, PartialEq, Deserialize)]
        struct MyCredential {
            name: String,
            #[serde(rename = "appIndex")]
            app_index: u32,
        }

        let (issuer, resolver) = issuer_and_resolver(DidKeyDriver::EdDsa);
        let (holder, _) = issuer_and_resolver(DidKeyDriver::EdDsa);
        let verifier = random_did(DidKeyDriver::EdDsa);

        let credential =
            credential_jwt(&issuer, &holder.did, json!({ "name": "aaa", "appIndex": 1 })).await;
        let payload = PresentationJwtPayload::new(verifier.clone(), presentation(vec![credential]));
        let jwt = create_presentation_jwt(&payload, &holder).await.unwrap();

        let verified =
            verify_presentation_jwt(&jwt, &resolver, &VerifyOptions::with_audience(&verifier))
                .await
                .unwrap();
        let credentials: Vec<VerifiedCredential> = verify_presentation_credentials(
            &verified.verifiable_presentation,
            &resolver,
            &VerifyOptions::default(),
        )
        .await
        .unwrap();

        let typed =
            typed_credential::<MyCredential>(credentials[0].verifiable_credential.clone()).unwrap();
        assert_eq!(
            typed.credential_subject,
            MyCredential {
                name: "aaa".to_owned(),
                app_index: 1
            }
        );
    }

    #[tokio::test]
    async fn presentation_audience_mismatch() {
        let (issuer, resolver) = issuer_and_resolver(DidKeyDriver::Es256k);
        let (holder, _) = issuer_and_resolver(DidKeyDriver::Es256k);
        let verifier = random_did(DidKeyDriver::Es256k);

        let credential = credential_jwt(&issuer, &holder.did, json!({})).await;
        let payload = PresentationJwtPayload::new(verifier.clone(), presentation(vec![credential]));
        let jwt = create_presentation_jwt(&payload, &holder).await.unwrap();

        let error = verify_presentation_jwt(
            &jwt,
            &resolver,
            &VerifyOptions::with_audience(random_did(DidKeyDriver::Es256k)),
        )
        .await
        .unwrap_err();
        assert!(matches!(error.error, crate::Error::AudienceMismatch(_, _)));
    }

    #[tokio::test]
    async fn malformed_or_missing_credentials_are_rejected_on_creation() {
        let (holder, _) = issuer_and_resolver(DidKeyDriver::EdDsa);

        let payload =
            PresentationJwtPayload::new("did:key:verifier", presentation(vec!["a.b".to_owned()]));
        let error = create_presentation_jwt(&payload, &holder).await.unwrap_err();
        assert_eq!(error.error, crate::Error::MalformedJwt);

        let payload = PresentationJwtPayload::new("did:key:verifier", presentation(vec![]));
        let error = create_presentation_jwt(&payload, &holder).await.unwrap_err();
        assert!(matches!(error.error, crate::Error::StructuralValidation(_)));
    }

    #[tokio::test]
    async fn presented_credentials_are_not_verified_with_the_presentation() {
        let (issuer, resolver) = issuer_and_resolver(DidKeyDriver::EdDsa);
        let (holder, _) = issuer_and_resolver(DidKeyDriver::EdDsa);
        let verifier = random_did(DidKeyDriver::EdDsa);

        // expired long ago, but structurally a JWT
        let mut vc_payload = CredentialJwtPayload::new(
            holder.did.clone(),
            VerifiableCredential {
                context: vec![DEFAULT_CONTEXT.to_owned()],
                type_: vec![DEFAULT_VC_TYPE.to_owned()],
                credential_subject: json!({}),
                id: None,
                issuer: None,
                issuance_date: None,
                expiration_date: None,
                proof: None,
            },
        );
        vc_payload.exp = Some(1);
        let credential = create_credential_jwt(&vc_payload, &issuer).await.unwrap();

        let payload = PresentationJwtPayload::new(verifier.clone(), presentation(vec![credential]));
        let jwt = create_presentation_jwt(&payload, &holder).await.unwrap();

        let verified = verify_presentation_jwt(&jwt, &resolver, &VerifyOptions::default())
            .await
            .unwrap();

        let error = verify_presentation_credentials::<Value>(
            &verified.verifiable_presentation,
            &resolver,
            &VerifyOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(error.error, crate::Error::ExpiredJwt(_, 1)));
    }

    #[tokio::test]
    async fn malformed_presented_credential_is_a_structural_failure() {
        let (holder, resolver) = issuer_and_resolver(DidKeyDriver::EdDsa);

        let jwt = create_jwt(
            &json!({
                "aud": "did:key:verifier",
                "vp": {
                    "@context": [DEFAULT_CONTEXT],
                    "type": [DEFAULT_VP_TYPE],
                    "verifiableCredential": ["a.b"]
                }
            }),
            &holder,
        )
        .await
        .unwrap();
        decode_jwt(&jwt).unwrap();

        let error = verify_presentation_jwt(&jwt, &resolver, &VerifyOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(error.error, crate::Error::StructuralValidation(_)));
    }

    #[tokio::test]
    async fn presentation_type_is_required() {
        let (issuer, resolver) = issuer_and_resolver(DidKeyDriver::EdDsa);
        let (holder, _) = issuer_and_resolver(DidKeyDriver::EdDsa);
        let credential = credential_jwt(&issuer, &holder.did, json!({})).await;

        let jwt = create_jwt(
            &json!({
                "aud": "did:key:verifier",
                "vp": {
                    "@context": [DEFAULT_CONTEXT],
                    "type": [DEFAULT_VC_TYPE],
                    "verifiableCredential": [credential]
                }
            }),
            &holder,
        )
        .await
        .unwrap();

        let error = verify_presentation_jwt(&jwt, &resolver, &VerifyOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(error.error, crate::Error::StructuralValidation(_)));
    }
}
