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

/// Error in the JWS Compact Serialization format
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum FormatError {
    /// Error that occurs when the serialization does not consist of exactly
    /// three `.`-separated segments
    #[strum(to_string = "Expected 3 JWS segments, found {0}")]
    InvalidSegmentCount(usize),
    /// Error that occurs when a segment is not valid `base64url`
    #[strum(to_string = "JWS {0} segment is not valid base64url")]
    InvalidBase64(&'static str),
    /// Error that occurs when the header or payload is not a JSON object
    #[strum(to_string = "JWS {0} segment is not a JSON object")]
    InvalidJson(&'static str),
}

impl bherror::BhError for FormatError {}

/// Error in JWS signature
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum SignatureError {
    /// Error that occurs when the signing algorithm is invalid
    #[strum(to_string = "Invalid signing algorithm {0}")]
    InvalidSigningAlgorithm(String),
    /// Error that occurs when the `alg` header parameter does not match the
    /// algorithm of the signer or verifier in use
    #[strum(to_string = "Algorithm mismatch: header has {0}, key uses {1}")]
    AlgorithmMismatch(String, String),
}

impl bherror::BhError for SignatureError {}

/// Error in key material
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum CryptoError {
    /// Error that occurs when a public key is incorrectly formatted or
    /// otherwise not valid.
    #[strum(to_string = "Invalid public key")]
    InvalidPublicKey,
    /// Error that occurs when a secret key has the wrong length or is not a
    /// valid scalar for the curve.
    #[strum(to_string = "Invalid secret key")]
    InvalidSecretKey,
}

impl bherror::BhError for CryptoError {}
