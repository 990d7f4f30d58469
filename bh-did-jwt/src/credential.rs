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

//! JWT-encoded Verifiable Credentials.

use bh_did_jws::{JsonObject, Signer, SigningAlgorithm};
use bherror::Error;
use chrono::{DateTime, SecondsFormat};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    did::VerificationMethod,
    jwt::{
        from_json_object, sign_claims, to_json_object, verify_compact, JwtHeader,
        SecondsSinceEpoch, VerifyOptions,
    },
    Issuer, Resolver, Result,
};

/// The base context every credential and presentation must list first.
pub const DEFAULT_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";
/// The type every credential must have.
pub const DEFAULT_VC_TYPE: &str = "VerifiableCredential";
/// The type every presentation must have.
pub const DEFAULT_VP_TYPE: &str = "VerifiablePresentation";

/// Proof type of credentials and presentations signed with `EdDSA`.
pub const ED25519_SIGNATURE_2018: &str = "Ed25519Signature2018";
/// Proof type of credentials and presentations signed with `ES256K`.
pub const ECDSA_SECP256K1_SIGNATURE_2019: &str = "EcdsaSecp256k1Signature2019";

/// The issuer of a credential, either just its id or an object with an `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CredentialIssuer {
    /// `{"id": "did:..."}`
    Object {
        /// The issuer DID.
        id: String,
    },
    /// `"did:..."`
    Id(String),
}

impl CredentialIssuer {
    /// The issuer DID.
    pub fn id(&self) -> &str {
        match self {
            Self::Object { id } | Self::Id(id) => id,
        }
    }
}

/// Proof attached to a credential or presentation verified from a JWT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    /// The proof type, e.g. [`ED25519_SIGNATURE_2018`].
    #[serde(rename = "type")]
    pub type_: String,
    /// The JWT the proof was taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,
    /// Other proof properties.
    #[serde(flatten)]
    pub params: JsonObject,
}

impl Proof {
    /// The proof of an object carried in `jwt`, signed with `algorithm`.
    pub fn from_jwt(algorithm: SigningAlgorithm, jwt: &str) -> Self {
        let type_ = match algorithm {
            SigningAlgorithm::EdDsa => ED25519_SIGNATURE_2018,
            SigningAlgorithm::Es256k => ECDSA_SECP256K1_SIGNATURE_2019,
        };

        Self {
            type_: type_.to_owned(),
            jwt: Some(jwt.to_owned()),
            params: JsonObject::new(),
        }
    }
}

/// A W3C Verifiable Credential with a `credentialSubject` of type `T`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential<T = Value> {
    /// JSON-LD contexts, [`DEFAULT_CONTEXT`] first.
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    /// Credential types, including [`DEFAULT_VC_TYPE`].
    #[serde(rename = "type")]
    pub type_: Vec<String>,
    /// The claims about the subject.
    pub credential_subject: T,
    /// Credential id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<CredentialIssuer>,
    /// RFC 3339 date-time of issuance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuance_date: Option<String>,
    /// RFC 3339 date-time of expiration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    /// The proof.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

/// Claims of a credential JWT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialJwtPayload<T = Value> {
    /// The DID of the credential subject.
    pub sub: String,
    /// The credential.
    pub vc: VerifiableCredential<T>,
    /// Issuer DID; always set to the issuer's DID on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// JWT id, exposed as the credential `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
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

impl<T> CredentialJwtPayload<T> {
    /// A payload with no optional claims.
    pub fn new(sub: impl Into<String>, vc: VerifiableCredential<T>) -> Self {
        Self {
            sub: sub.into(),
            vc,
            iss: None,
            aud: None,
            jti: None,
            iat: None,
            exp: None,
            nbf: None,
        }
    }
}

/// A credential JWT whose signature, claims and structure have been verified.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedCredential<T = Value> {
    /// The JOSE header.
    pub header: JwtHeader,
    /// The claims as found in the JWT.
    pub payload: CredentialJwtPayload<T>,
    /// The `vc` claim completed with `issuer`, `issuanceDate`,
    /// `expirationDate`, `id` and `proof` taken from the JWT.
    pub verifiable_credential: VerifiableCredential<T>,
    /// The issuer DID.
    pub issuer: String,
    /// The verification method whose key verified the signature.
    pub signer: VerificationMethod,
    /// The JWT as received.
    pub jwt: String,
}

/// Create a credential JWT signed by `issuer`.
///
/// The `@context` and `type` of the credential are used verbatim, no default
/// values are added; both must be non-empty.
pub async fn create_credential_jwt<T: Serialize, S: Signer>(
    payload: &CredentialJwtPayload<T>,
    issuer: &Issuer<S>,
) -> Result<String> {
    check_non_empty("vc", &payload.vc.context, &payload.vc.type_)?;

    let claims = to_json_object(payload)?;
    sign_claims(claims, issuer, JwtHeader::new(issuer.algorithm())).await
}

/// Verify a credential JWT.
///
/// After the signature and the claims, the `vc` claim must have an
/// `@context` starting with [`DEFAULT_CONTEXT`], a `type` containing
/// [`DEFAULT_VC_TYPE`] and a `credentialSubject` deserializable into `T`.
pub async fn verify_credential_jwt<T: DeserializeOwned + Clone>(
    jwt: &str,
    resolver: &Resolver,
    options: &VerifyOptions,
) -> Result<VerifiedCredential<T>> {
    let (header, payload, signer) = verify_compact(jwt, resolver, options).await?;

    validate_container(&payload, "vc", DEFAULT_VC_TYPE, "credentialSubject")?;
    let payload: CredentialJwtPayload<T> = from_json_object(payload, "credential JWT payload")?;

    let issuer = payload.iss.clone().unwrap_or_default();

    let mut verifiable_credential = payload.vc.clone();
    verifiable_credential.issuer = Some(CredentialIssuer::Object { id: issuer.clone() });
    if let Some(iat) = payload.iat {
        verifiable_credential.issuance_date = Some(rfc3339(iat)?);
    }
    if let Some(exp) = payload.exp {
        verifiable_credential.expiration_date = Some(rfc3339(exp)?);
    }
    if let Some(jti) = &payload.jti {
        verifiable_credential.id = Some(jti.clone());
    }
    verifiable_credential.proof = Some(Proof::from_jwt(header.alg, jwt));

    Ok(VerifiedCredential {
        header,
        payload,
        verifiable_credential,
        issuer,
        signer,
        jwt: jwt.to_owned(),
    })
}

pub(crate) fn rfc3339(seconds: SecondsSinceEpoch) -> Result<String> {
    i64::try_from(seconds)
        .ok()
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
        .map(|date| date.to_rfc3339_opts(SecondsFormat::Secs, true))
        .ok_or_else(|| {
            Error::root(crate::Error::StructuralValidation(format!(
                "timestamp {seconds} is out of range"
            )))
        })
}

pub(crate) fn check_non_empty(claim: &str, context: &[String], type_: &[String]) -> Result<()> {
    if context.is_empty() || type_.is_empty() {
        return Err(Error::root(crate::Error::StructuralValidation(format!(
            "`{claim}` must have a non-empty `@context` and `type`"
        ))));
    }

    Ok(())
}

/// Check the shape of the `vc`/`vp` claim before it is deserialized.
pub(crate) fn validate_container(
    payload: &JsonObject,
    claim: &str,
    default_type: &str,
    content: &str,
) -> Result<()> {
    let invalid = |reason: &str| {
        Error::root(crate::Error::StructuralValidation(format!(
            "`{claim}` {reason}"
        )))
    };

    let container = payload
        .get(claim)
        .and_then(Value::as_object)
        .ok_or_else(|| invalid("is missing or not an object"))?;

    let context = string_array(container, "@context")
        .ok_or_else(|| invalid("has no `@context` array of strings"))?;
    if context.first() != Some(&DEFAULT_CONTEXT) {
        return Err(invalid("does not start with the default `@context`"));
    }

    let types =
        string_array(container, "type").ok_or_else(|| invalid("has no `type` array of strings"))?;
    if !types.iter().any(|type_| *type_ == default_type) {
        return Err(invalid(&format!("is not of type {default_type}")));
    }

    if !container.contains_key(content) {
        return Err(invalid(&format!("has no `{content}`")));
    }

    Ok(())
}

fn string_array<'a>(object: &'a JsonObject, key: &str) -> Option<Vec<&'a str>> {
    object
        .get(key)?
        .as_array()?
        .iter()
        .map(Value::as_str)
        .collect()
}
