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

use bherror::traits::ForeignError as _;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Result, VerifiableCredential};

/// Convert the `credentialSubject` of a verified credential into `T`.
///
/// All the other credential fields are carried over unchanged.
pub fn typed_credential<T: DeserializeOwned>(
    credential: VerifiableCredential<Value>,
) -> Result<VerifiableCredential<T>> {
    let VerifiableCredential {
        context,
        type_,
        credential_subject,
        id,
        issuer,
        issuance_date,
        expiration_date,
        proof,
    } = credential;

    let credential_subject = serde_json::from_value(credential_subject).match_foreign_err(|e| {
        crate::Error::StructuralValidation(format!("unexpected `credentialSubject`: {e}"))
    })?;

    Ok(VerifiableCredential {
        context,
        type_,
        credential_subject,
        id,
        issuer,
        issuance_date,
        expiration_date,
        proof,
    })
}
