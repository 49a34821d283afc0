//! Identity registry: one public key and one username per address.
//!
//! Identities bootstrap on first use. The first time an address acts (as the
//! source of a request, or as the target accepting one) it must present its
//! public key and a desired username. The key must derive the address and
//! must verify the action's signature. From then on the stored key is
//! authoritative and any presented credentials are ignored.
//!
//! [`IdentityRegistry::authorize`] only inspects state. Registration happens
//! in [`IdentityRegistry::commit`], which the ledger calls once every other
//! check for the operation has passed.

use pledge_types::{PublicKey, Signature, WalletAddress};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::capabilities::{IdentityVerifier, RandomSource};
use crate::error::LedgerError;

/// Number of distinct 4-digit username suffixes.
pub const USERNAME_SUFFIX_SPACE: u16 = 10_000;

/// A registered identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub public_key: PublicKey,
    pub username: String,
}

/// Key and desired username presented on an address's first action.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub public_key: PublicKey,
    pub username: String,
}

impl Credentials {
    pub fn new(public_key: PublicKey, username: impl Into<String>) -> Self {
        Self {
            public_key,
            username: username.into(),
        }
    }
}

/// Outcome of a successful authorization check.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum Authorization {
    /// Signature verified against the stored key.
    Verified { address: WalletAddress },
    /// First action of this address; `identity` is registered on commit.
    Bootstrap {
        address: WalletAddress,
        identity: Identity,
    },
}

impl Authorization {
    pub fn address(&self) -> &WalletAddress {
        match self {
            Self::Verified { address } | Self::Bootstrap { address, .. } => address,
        }
    }

    pub fn is_bootstrap(&self) -> bool {
        matches!(self, Self::Bootstrap { .. })
    }
}

#[derive(Debug, Default)]
pub struct IdentityRegistry {
    identities: HashMap<WalletAddress, Identity>,
    usernames: HashSet<String>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_identity(&self, address: &WalletAddress) -> bool {
        self.identities.contains_key(address)
    }

    pub fn get(&self, address: &WalletAddress) -> Option<&Identity> {
        self.identities.get(address)
    }

    pub fn username(&self, address: &WalletAddress) -> Option<&str> {
        self.identities.get(address).map(|i| i.username.as_str())
    }

    pub fn is_username_taken(&self, username: &str) -> bool {
        self.usernames.contains(username)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Store an identity for `address`.
    ///
    /// Not idempotent: a second registration for the same address fails even
    /// with identical key and username.
    pub fn register(
        &mut self,
        address: WalletAddress,
        public_key: PublicKey,
        username: String,
    ) -> Result<(), LedgerError> {
        if self.identities.contains_key(&address) {
            return Err(LedgerError::AlreadyRegistered(address));
        }
        if self.usernames.contains(&username) {
            return Err(LedgerError::UsernameTaken(username));
        }
        self.usernames.insert(username.clone());
        self.identities.insert(
            address,
            Identity {
                public_key,
                username,
            },
        );
        Ok(())
    }

    /// Whether `address` is the canonical derivation of `public_key`.
    pub fn verify_ownership(
        verifier: &dyn IdentityVerifier,
        public_key: &PublicKey,
        address: &WalletAddress,
    ) -> bool {
        verifier.derive_address(public_key) == *address
    }

    pub fn verify_signature(
        verifier: &dyn IdentityVerifier,
        public_key: &PublicKey,
        signature: &Signature,
        message: &[u8],
    ) -> bool {
        verifier.verify_signature(message, signature, public_key)
    }

    /// `base_name` followed by a random 4-digit suffix that no registered
    /// identity uses.
    ///
    /// If a full round of draws keeps colliding, the name is extended with
    /// another suffix and the search continues in the wider space.
    pub fn generate_unique_username(
        &self,
        base_name: &str,
        random: &mut dyn RandomSource,
    ) -> String {
        let mut base = base_name.to_string();
        loop {
            for _ in 0..USERNAME_SUFFIX_SPACE {
                let candidate = format!("{base}{:04}", random.below(USERNAME_SUFFIX_SPACE));
                if !self.usernames.contains(&candidate) {
                    return candidate;
                }
            }
            base = format!("{base}{:04}", random.below(USERNAME_SUFFIX_SPACE));
        }
    }

    /// Run the bootstrap-or-verify check for an action by `address`.
    ///
    /// Does not modify the registry; pass the result to [`Self::commit`].
    pub fn authorize(
        &self,
        verifier: &dyn IdentityVerifier,
        random: &mut dyn RandomSource,
        address: &WalletAddress,
        credentials: Option<&Credentials>,
        message: &[u8],
        signature: &Signature,
    ) -> Result<Authorization, LedgerError> {
        if let Some(stored) = self.identities.get(address) {
            if !Self::verify_signature(verifier, &stored.public_key, signature, message) {
                return Err(LedgerError::SignatureInvalid(address.clone()));
            }
            return Ok(Authorization::Verified {
                address: address.clone(),
            });
        }

        let Some(credentials) = credentials.filter(|c| !c.username.trim().is_empty()) else {
            return Err(LedgerError::IdentityBootstrapRequired(address.clone()));
        };
        if !Self::verify_ownership(verifier, &credentials.public_key, address) {
            return Err(LedgerError::InvalidIdentity(address.clone()));
        }
        if !Self::verify_signature(verifier, &credentials.public_key, signature, message) {
            return Err(LedgerError::SignatureInvalid(address.clone()));
        }

        let requested = credentials.username.trim();
        let username = if self.usernames.contains(requested) {
            self.generate_unique_username(requested, random)
        } else {
            requested.to_string()
        };
        Ok(Authorization::Bootstrap {
            address: address.clone(),
            identity: Identity {
                public_key: credentials.public_key.clone(),
                username,
            },
        })
    }

    /// Apply an authorization, registering the identity if it bootstraps one.
    ///
    /// Returns the identity now stored for the authorized address.
    pub fn commit(&mut self, authorization: Authorization) -> Result<&Identity, LedgerError> {
        let address = match authorization {
            Authorization::Verified { address } => address,
            Authorization::Bootstrap { address, identity } => {
                debug!(%address, username = %identity.username, "bootstrapping identity");
                self.register(address.clone(), identity.public_key, identity.username)?;
                address
            }
        };
        self.identities
            .get(&address)
            .ok_or(LedgerError::IdentityBootstrapRequired(address))
    }
}
