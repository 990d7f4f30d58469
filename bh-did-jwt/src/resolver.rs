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

//! DID resolution, dispatched on the DID method.

use std::{collections::HashMap, str::FromStr, sync::Arc};

use bh_did_jws::SigningAlgorithm;
use bherror::{traits::PropagateError as _, BhError, Error};
use futures::future::BoxFuture;

use crate::{
    did::{multibase, Did, DidDocument, VerificationMethod, DID_CONTEXT_V1},
    Result,
};

/// Error type for reporting failures of a single DID method resolver.
#[derive(PartialEq, Debug, Clone)]
pub struct ResolutionError(pub String);

impl std::fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DID resolution error: {}", self.0)
    }
}

impl BhError for ResolutionError {}

/// Resolve DIDs of a single DID method into DID Documents.
///
/// Resolution may be network-bound, hence asynchronous. The future is boxed
/// so that resolvers of different methods can be stored side by side in a
/// [`ResolverRegistry`].
///
/// # Security
///
/// The implementation MUST only return documents from trusted sources, since
/// the keys they contain are used to decide whether a JWT was issued by the
/// alleged issuer.
pub trait DidMethodResolver: Send + Sync {
    /// Resolve `did`, whose method is the one this resolver is registered
    /// for.
    fn resolve<'a>(
        &'a self,
        did: &'a Did,
    ) -> BoxFuture<'a, bherror::Result<DidDocument, ResolutionError>>;
}

/// Mapping from a DID method name to the resolver of that method.
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<String, Arc<dyn DidMethodResolver>>,
}

impl ResolverRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `resolver` for the DID method `method`, replacing any resolver
    /// previously registered for it.
    pub fn register(
        &mut self,
        method: impl Into<String>,
        resolver: impl DidMethodResolver + 'static,
    ) -> &mut Self {
        self.resolvers.insert(method.into(), Arc::new(resolver));
        self
    }

    /// Whether a resolver is registered for `method`.
    pub fn contains(&self, method: &str) -> bool {
        self.resolvers.contains_key(method)
    }
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.resolvers.keys()).finish()
    }
}

/// Resolves DIDs of every method in its [`ResolverRegistry`].
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: ResolverRegistry,
}

impl Resolver {
    /// Create a resolver from a registry of per-method resolvers.
    pub fn new(registry: ResolverRegistry) -> Self {
        Self { registry }
    }

    /// Resolve `did` into its DID Document.
    ///
    /// Fails with [`crate::Error::UnknownIssuer`] if the DID is malformed,
    /// no resolver is registered for its method, the method resolver fails,
    /// or the document has no verification method with a supported key type
    /// and a decodable key.
    pub async fn resolve(&self, did: &str) -> Result<DidDocument> {
        let unknown = || crate::Error::UnknownIssuer(did.to_owned());

        let parsed = Did::from_str(did).with_err(unknown)?;
        let resolver = self
            .registry
            .resolvers
            .get(parsed.method())
            .ok_or_else(|| Error::root(unknown()))?;

        tracing::debug!(method = parsed.method(), "resolving DID");

        let document = resolver.resolve(&parsed).await.with_err(unknown)?;

        let usable = document
            .verification_method
            .iter()
            .any(|method| method.algorithm().is_some() && method.public_key().is_ok());
        if !usable {
            return Err(
                Error::root(unknown()).ctx("DID Document has no usable verification method")
            );
        }

        Ok(document)
    }
}

/// Resolver of the `did:key` method.
///
/// The document is derived from the identifier alone, without any I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDidResolver;

impl KeyDidResolver {
    /// The DID method name resolved by this resolver.
    pub const METHOD: &'static str = "key";

    /// Derive the DID Document of a `did:key` identifier.
    pub fn document(did: &Did) -> bherror::Result<DidDocument, ResolutionError> {
        if did.method() != Self::METHOD {
            return Err(Error::root(ResolutionError(format!(
                "not a did:key identifier: {did}"
            ))));
        }

        let multibase = did.method_specific_id();
        let (algorithm, _) = multibase::decode(multibase)
            .with_err(|| ResolutionError(format!("invalid did:key identifier: {did}")))?;

        let method_id = format!("{did}#{multibase}");
        let verification_method = VerificationMethod {
            id: method_id.clone(),
            type_: VerificationMethod::key_type(algorithm).to_owned(),
            controller: did.to_string(),
            public_key_multibase: multibase.to_owned(),
        };

        Ok(DidDocument {
            context: vec![DID_CONTEXT_V1.to_owned(), suite_context(algorithm).to_owned()],
            id: did.to_string(),
            verification_method: vec![verification_method],
            authentication: vec![method_id.clone()],
            assertion_method: vec![method_id],
        })
    }
}

fn suite_context(algorithm: SigningAlgorithm) -> &'static str {
    match algorithm {
        SigningAlgorithm::EdDsa => "https://w3id.org/security/suites/ed25519-2018/v1",
        SigningAlgorithm::Es256k => "https://w3id.org/security/suites/secp256k1-2019/v1",
    }
}

impl DidMethodResolver for KeyDidResolver {
    fn resolve<'a>(
        &'a self,
        did: &'a Did,
    ) -> BoxFuture<'a, bherror::Result<DidDocument, ResolutionError>> {
        Box::pin(futures::future::ready(Self::document(did)))
    }
}
