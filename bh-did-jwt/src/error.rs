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

/// Errors produced while issuing, resolving or verifying DID-anchored JWTs.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum Error {
    /// Key material, DID or payload supplied by the caller is malformed.
    #[strum(to_string = "Malformed input: {0}")]
    MalformedInput(String),

    /// The JWT is not a valid JWS Compact Serialization.
    #[strum(to_string = "Malformed JWT")]
    MalformedJwt,

    /// The `iss` claim is missing or the DID it names cannot be resolved.
    #[strum(to_string = "Unknown issuer: {0}")]
    UnknownIssuer(String),

    /// No verification method of the issuer verifies the signature.
    #[strum(to_string = "Invalid JWT signature")]
    InvalidSignature,

    /// The `exp` claim is in the past.
    #[strum(to_string = "Jwt expired, current time is {0}, expiration is {1}")]
    ExpiredJwt(u64, u64),

    /// The `nbf` claim is in the future.
    #[strum(to_string = "Jwt not yet valid: current time is {0}, nbf is {1}")]
    NotYetValid(u64, u64),

    /// The `aud` claim does not match the expected audience.
    #[strum(to_string = "Audience mismatch: expected {0}, found {1}")]
    AudienceMismatch(String, String),

    /// The `alg` header parameter names an algorithm that is not supported.
    #[strum(to_string = "Unsupported algorithm {0}")]
    UnsupportedAlgorithm(String),

    /// A claim, credential or presentation does not have the required shape.
    #[strum(to_string = "Structural validation failed: {0}")]
    StructuralValidation(String),

    /// The signer failed to produce a signature.
    #[strum(to_string = "Signing failed")]
    SigningFailed,
}

impl bherror::BhError for Error {}

/// Result type used throughout this crate.
pub type Result<T> = bherror::Result<T, Error>;
