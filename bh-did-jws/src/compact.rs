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

use bherror::{traits::ForeignError as _, Error};

use crate::{
    error::FormatError,
    utils::{base64_url_decode, construct_jws_payload, JsonObject},
};

/// A JWS in the Compact Serialization, split into its parts.
///
/// Parsing a [`DecodedJws`] only checks the structure; the signature is *not*
/// verified. Use a [`JwtVerifier`](crate::JwtVerifier) for that.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedJws {
    /// The decoded JOSE header.
    pub header: JsonObject,
    /// The decoded claim set.
    pub payload: JsonObject,
    /// The raw signature bytes.
    pub signature: Vec<u8>,
    /// The signing input, i.e. `<header>.<payload>` exactly as received.
    pub signing_input: String,
}

impl FromStr for DecodedJws {
    type Err = Error<FormatError>;

    fn from_str(jws: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = jws.split('.').collect();
        let [header, payload, signature] = segments[..] else {
            return Err(Error::root(FormatError::InvalidSegmentCount(
                segments.len(),
            )));
        };

        let signing_input = construct_jws_payload(header, payload);

        let header = decode_json_segment(header, "header")?;
        let payload = decode_json_segment(payload, "payload")?;
        let signature = base64_url_decode(signature)
            .foreign_err(|| FormatError::InvalidBase64("signature"))?;

        Ok(Self {
            header,
            payload,
            signature,
            signing_input,
        })
    }
}

fn decode_json_segment(
    segment: &str,
    name: &'static str,
) -> Result<JsonObject, Error<FormatError>> {
    let bytes = base64_url_decode(segment).foreign_err(|| FormatError::InvalidBase64(name))?;

    serde_json::from_slice(&bytes).foreign_err(|| FormatError::InvalidJson(name))
}
