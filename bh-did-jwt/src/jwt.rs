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

//! Creation and verification of DID-signed JWTs.

use std::str::FromStr;

use bh_did_jws::{
    signature_verifier, DecodedJws, JsonObject, JwtSigner, JwtVerifier, Signer, SigningAlgorithm,
};
use bherror::{
    traits::{ForeignBoxed as _, ForeignError as _, PropagateError as _},
    Error,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{did::VerificationMethod, Issuer, Resolver, Result};

/// Seconds since the UNIX epoch, the unit of the `iat`, `exp` and `nbf` claims.
pub type SecondsSinceEpoch = u64;

/// The `typ` header parameter of every JWT created by this crate.
pub const JWT_TYP: &str = "JWT";

/// The current time in seconds since the UNIX epoch.
pub fn current_time() -> SecondsSinceEpoch {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

/// JOSE header of a JWT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtHeader {
    /// The signing algorithm.
    pub alg: SigningAlgorithm,
    /// The media type, [`JWT_TYP`] for JWTs created by this crate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Optional key id, e.g. the id of a verification method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Any other header parameters.
    #[serde(flatten)]
    pub params: JsonObject,
}

impl JwtHeader {
    /// The default header `{"alg": <alg>, "typ": "JWT"}`.
    pub fn new(alg: SigningAlgorithm) -> Self {
        Self {
            alg,
            typ: Some(JWT_TYP.to_owned()),
            kid: None,
            params: JsonObject::new(),
        }
    }
}

/// Registered JWT claims together with an application-specific claim set `T`
/// flattened next to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtPayload<T = JsonObject> {
    /// Issuer DID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// JWT id.
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
    /// Application-specific claims.
    #[serde(flatten)]
    pub claims: T,
}

/// Options for verifying a JWT.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyOptions {
    /// The expected `aud` claim. The audience is only checked when this is
    /// set.
    pub audience: Option<String>,
    /// The time the `exp` and `nbf` claims are checked against. Defaults to
    /// [`current_time`].
    pub current_time: Option<SecondsSinceEpoch>,
}

impl VerifyOptions {
    /// Options checking that the `aud` claim equals `audience`.
    pub fn with_audience(audience: impl Into<String>) -> Self {
        Self {
            audience: Some(audience.into()),
            current_time: None,
        }
    }

    /// Check the time-based claims against `current_time` instead of the
    /// system clock.
    pub fn at(mut self, current_time: SecondsSinceEpoch) -> Self {
        self.current_time = Some(current_time);
        self
    }
}

/// A JWT whose signature and claims have been verified.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedJwt<T = JsonObject> {
    /// The JOSE header.
    pub header: JwtHeader,
    /// The claims.
    pub payload: JwtPayload<T>,
    /// The DID of the issuer, i.e. the `iss` claim.
    pub issuer: String,
    /// The verification method whose key verified the signature.
    pub signer: VerificationMethod,
    /// The JWT as received.
    pub jwt: String,
}

/// Create a JWT signed by `issuer` with the default header.
///
/// `payload` must serialize into a JSON object. The `iss` claim is set to the
/// issuer's DID and `iat` to the current time unless the payload already has
/// it.
pub async fn create_jwt<T: Serialize, S: Signer>(
    payload: &T,
    issuer: &Issuer<S>,
) -> Result<String> {
    create_jwt_with_header(payload, issuer, JwtHeader::new(issuer.algorithm())).await
}

/// Same as [`create_jwt`], but with a caller-supplied header.
///
/// The `alg` of the header must be the algorithm of the issuer's signer.
pub async fn create_jwt_with_header<T: Serialize, S: Signer>(
    payload: &T,
    issuer: &Issuer<S>,
    header: JwtHeader,
) -> Result<String> {
    let claims = to_json_object(payload)?;
    sign_claims(claims, issuer, header).await
}

pub(crate) fn to_json_object<T: Serialize>(value: &T) -> Result<JsonObject> {
    let value = serde_json::to_value(value)
        .foreign_err(|| crate::Error::MalformedInput("payload is not serializable".to_owned()))?;

    match value {
        Value::Object(object) => Ok(object),
        _ => Err(Error::root(crate::Error::MalformedInput(
            "payload is not a JSON object".to_owned(),
        ))),
    }
}

pub(crate) async fn sign_claims<S: Signer>(
    mut claims: JsonObject,
    issuer: &Issuer<S>,
    header: JwtHeader,
) -> Result<String> {
    if header.alg != issuer.algorithm() {
        return Err(Error::root(crate::Error::MalformedInput(format!(
            "header algorithm {} does not match the issuer's {}",
            header.alg,
            issuer.algorithm()
        ))));
    }

    claims.insert("iss".to_owned(), Value::String(issuer.did.clone()));
    if !claims.contains_key("iat") {
        claims.insert("iat".to_owned(), Value::from(current_time()));
    }

    let header = to_json_object(&header)?;

    tracing::debug!(issuer = %issuer.did, alg = %issuer.algorithm(), "signing JWT");

    issuer
        .signer
        .sign_jwt(&header, &claims)
        .await
        .foreign_boxed_err(|| crate::Error::SigningFailed)
}

/// Split a JWT into its parts without verifying it.
pub fn decode_jwt(jwt: &str) -> Result<DecodedJws> {
    DecodedJws::from_str(jwt).with_err(|| crate::Error::MalformedJwt)
}

/// Verify the signature of a decoded JWT with a key of its `iss` DID.
///
/// Returns the verification method whose key verified the signature.
pub async fn verify_signature(
    jws: &DecodedJws,
    resolver: &Resolver,
) -> Result<VerificationMethod> {
    let alg = jws
        .header
        .get("alg")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::root(crate::Error::MalformedJwt).ctx("missing `alg` header"))?;
    let algorithm = SigningAlgorithm::from_str(alg)
        .with_err(|| crate::Error::UnsupportedAlgorithm(alg.to_owned()))?;

    let iss = jws
        .payload
        .get("iss")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            Error::root(crate::Error::UnknownIssuer(
                "missing `iss` claim".to_owned(),
            ))
        })?;

    let document = resolver.resolve(iss).await?;

    let verifier = signature_verifier(algorithm);
    let mut candidates = 0;
    for method in document.verification_methods_for(algorithm) {
        candidates += 1;

        let Ok(public_key) = method.public_key() else {
            continue;
        };

        if let Ok(true) = verifier.verify_jwt_signature(jws, &public_key) {
            return Ok(method.clone());
        }
    }

    if candidates == 0 {
        tracing::warn!(
            %iss,
            %algorithm,
            "no verification method of the issuer matches the JWT algorithm"
        );
    }

    Err(Error::root(crate::Error::InvalidSignature))
}

/// Check the audience, expiration and not-before claims.
pub fn verify_claims(payload: &JsonObject, options: &VerifyOptions) -> Result<()> {
    let now = options.current_time.unwrap_or_else(current_time);

    if let Some(expected) = &options.audience {
        match payload.get("aud") {
            Some(Value::String(aud)) if aud == expected => {}
            Some(Value::String(aud)) => {
                return Err(Error::root(crate::Error::AudienceMismatch(
                    expected.clone(),
                    aud.clone(),
                )));
            }
            Some(_) => {
                return Err(Error::root(crate::Error::StructuralValidation(
                    "`aud` must be a string".to_owned(),
                )));
            }
            None => {
                return Err(Error::root(crate::Error::AudienceMismatch(
                    expected.clone(),
                    String::new(),
                )));
            }
        }
    }

    // https://www.rfc-editor.org/rfc/rfc7519.html#section-4.1.4
    if let Some(exp) = time_claim(payload, "exp")? {
        // still valid at the second of `exp` itself
        if now > exp {
            return Err(Error::root(crate::Error::ExpiredJwt(now, exp)));
        }
    }

    if let Some(nbf) = time_claim(payload, "nbf")? {
        if now < nbf {
            return Err(Error::root(crate::Error::NotYetValid(now, nbf)));
        }
    }

    time_claim(payload, "iat")?;

    Ok(())
}

fn time_claim(payload: &JsonObject, name: &str) -> Result<Option<SecondsSinceEpoch>> {
    let Some(value) = payload.get(name) else {
        return Ok(None);
    };

    match value.as_u64() {
        Some(seconds) => Ok(Some(seconds)),
        None => Err(Error::root(crate::Error::StructuralValidation(format!(
            "`{name}` must be a non-negative integer"
        )))),
    }
}

/// Decode, verify the signature and then the claims of `jwt`, short-circuiting
/// on the first failure.
pub(crate) async fn verify_compact(
    jwt: &str,
    resolver: &Resolver,
    options: &VerifyOptions,
) -> Result<(JwtHeader, JsonObject, VerificationMethod)> {
    let jws = decode_jwt(jwt)?;
    let signer = verify_signature(&jws, resolver).await?;
    verify_claims(&jws.payload, options)?;

    let header = serde_json::from_value(Value::Object(jws.header))
        .foreign_err(|| crate::Error::MalformedJwt)?;

    Ok((header, jws.payload, signer))
}

pub(crate) fn from_json_object<T: DeserializeOwned>(object: JsonObject, what: &str) -> Result<T> {
    serde_json::from_value(Value::Object(object))
        .match_foreign_err(|error| crate::Error::StructuralValidation(format!("{what}: {error}")))
}

/// Verify `jwt` and deserialize its claims.
///
/// Verification runs in a fixed order: decoding, signature, claims and
/// finally the shape of the payload. A JWT with an invalid signature is
/// therefore always reported as [`crate::Error::InvalidSignature`], even if it
/// is also expired.
pub async fn verify_jwt<T: DeserializeOwned>(
    jwt: &str,
    resolver: &Resolver,
    options: &VerifyOptions,
) -> Result<VerifiedJwt<T>> {
    let (header, payload, signer) = verify_compact(jwt, resolver, options).await?;
    let payload: JwtPayload<T> = from_json_object(payload, "JWT payload")?;

    // `verify_signature` resolved this exact claim
    let issuer = payload.iss.clone().unwrap_or_default();

    Ok(VerifiedJwt {
        header,
        payload,
        issuer,
        signer,
        jwt: jwt.to_owned(),
    })
}
