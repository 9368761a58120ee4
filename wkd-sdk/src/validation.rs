//! Accept/reject pipeline run over every discovered key.
//!
//! Validators run in registration order and the first rejection decides the
//! key's outcome; later validators are not consulted. Register cheap or strict
//! checks first when a key may fail several of them.

use std::{fmt, sync::Arc};

use thiserror::Error;
use wkd_common::MailAddress;

use crate::keys::{KeyRecord, PublicKeyAlgorithm};

/// What a discovery call was looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryContext {
    /// The address being looked up.
    pub lookup_address: MailAddress,
}

impl DiscoveryContext {
    /// Context for a lookup of `lookup_address`.
    pub fn new(lookup_address: MailAddress) -> Self {
        Self { lookup_address }
    }
}

/// Why a validator refused a key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    /// No bound user id carries the looked-up address.
    #[error("Key does not contain a valid user-id with email {address}")]
    MissingUserId {
        /// The looked-up address.
        address: MailAddress,
    },

    /// The key is shorter than allowed for its algorithm.
    #[error("{algorithm} keys weaker than {minimum_strength} bits are rejected.")]
    Weak {
        /// Algorithm of the rejected key.
        algorithm: PublicKeyAlgorithm,
        /// Smallest accepted size in bits.
        minimum_strength: u32,
    },

    /// Reason given by a caller-supplied validator.
    #[error("{0}")]
    Custom(String),
}

impl RejectionReason {
    /// Human-readable message.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// One step of the pipeline.
pub trait KeyValidator<K>: Send + Sync {
    /// Accept `key`, or say why not.
    fn validate(&self, context: &DiscoveryContext, key: &K) -> Result<(), RejectionReason>;
}

impl<K, F> KeyValidator<K> for F
where
    F: Fn(&DiscoveryContext, &K) -> Result<(), RejectionReason> + Send + Sync,
{
    fn validate(&self, context: &DiscoveryContext, key: &K) -> Result<(), RejectionReason> {
        self(context, key)
    }
}

/// Rejects keys without a bound user id for the looked-up address.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingUserIdValidator;

impl<K: KeyRecord> KeyValidator<K> for MissingUserIdValidator {
    fn validate(&self, context: &DiscoveryContext, key: &K) -> Result<(), RejectionReason> {
        if key.has_mail_address(&context.lookup_address) {
            Ok(())
        } else {
            Err(RejectionReason::MissingUserId {
                address: context.lookup_address.clone(),
            })
        }
    }
}

/// Rejects keys of `algorithm` shorter than `minimum_strength` bits.
///
/// Keys of any other algorithm pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimumBitStrengthValidator {
    /// Algorithm this check applies to.
    pub algorithm: PublicKeyAlgorithm,
    /// Smallest accepted size in bits.
    pub minimum_strength: u32,
}

impl<K: KeyRecord> KeyValidator<K> for MinimumBitStrengthValidator {
    fn validate(&self, _context: &DiscoveryContext, key: &K) -> Result<(), RejectionReason> {
        if key.algorithm() != self.algorithm || key.bit_strength() >= self.minimum_strength {
            return Ok(());
        }
        Err(RejectionReason::Weak {
            algorithm: key.algorithm(),
            minimum_strength: self.minimum_strength,
        })
    }
}

type SharedValidator<K> = Arc<dyn KeyValidator<K>>;

/// Configures a [`KeyringValidator`].
///
/// [`KeyringValidatorBuilder::new`] starts with the default validators (a
/// [`MissingUserIdValidator`]); [`KeyringValidatorBuilder::empty`] starts with
/// none.
///
/// ```
/// use wkd::{
///     PublicKeyAlgorithm,
///     validation::{KeyringValidatorBuilder, RejectionReason},
/// };
/// # #[derive(Clone)]
/// # struct Key;
/// # impl wkd::KeyRecord for Key {
/// #     fn key_id(&self) -> String { String::new() }
/// #     fn version(&self) -> u8 { 4 }
/// #     fn fingerprint(&self) -> String { String::new() }
/// #     fn algorithm(&self) -> PublicKeyAlgorithm { PublicKeyAlgorithm::EdDsa }
/// #     fn bit_strength(&self) -> u32 { 256 }
/// #     fn creation_time(&self) -> std::time::SystemTime { std::time::SystemTime::UNIX_EPOCH }
/// #     fn expiration_time(&self) -> Option<std::time::SystemTime> { None }
/// #     fn is_revoked(&self) -> bool { false }
/// #     fn encoded(&self) -> Vec<u8> { Vec::new() }
/// #     fn user_ids(&self) -> Vec<String> { Vec::new() }
/// # }
///
/// let validator = KeyringValidatorBuilder::<Key>::new()
///     .reject_weak_keys(2048, &[PublicKeyAlgorithm::RsaEncryptOrSign, PublicKeyAlgorithm::Dsa])
///     .add_validator(|_ctx, key: &Key| {
///         if wkd::KeyRecord::is_revoked(key) {
///             Err(RejectionReason::Custom("revoked".into()))
///         } else {
///             Ok(())
///         }
///     })
///     .build();
/// assert_eq!(validator.len(), 4);
/// ```
#[must_use]
pub struct KeyringValidatorBuilder<K> {
    validators: Vec<SharedValidator<K>>,
}

impl<K: KeyRecord + 'static> KeyringValidatorBuilder<K> {
    /// A builder holding the default validators.
    pub fn new() -> Self {
        let mut builder = Self::empty();
        builder.with_default_validators();
        builder
    }

    /// A builder holding no validators.
    pub fn empty() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// Append the default validators.
    pub fn with_default_validators(&mut self) -> &mut Self {
        self.reject_missing_user_id()
    }

    /// Drop every validator registered so far. With none left, every key is accepted.
    pub fn without_validation(&mut self) -> &mut Self {
        self.validators.clear();
        self
    }

    /// Append a closure validator.
    pub fn add_validator<F>(&mut self, validator: F) -> &mut Self
    where
        F: Fn(&DiscoveryContext, &K) -> Result<(), RejectionReason> + Send + Sync + 'static,
    {
        self.add_key_validator(validator)
    }

    /// Append any [`KeyValidator`].
    pub fn add_key_validator<V>(&mut self, validator: V) -> &mut Self
    where
        V: KeyValidator<K> + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Append a [`MissingUserIdValidator`].
    pub fn reject_missing_user_id(&mut self) -> &mut Self {
        self.add_key_validator(MissingUserIdValidator)
    }

    /// Append one [`MinimumBitStrengthValidator`] per entry of `algorithms`.
    pub fn reject_weak_keys(
        &mut self,
        minimum_strength: u32,
        algorithms: &[PublicKeyAlgorithm],
    ) -> &mut Self {
        for &algorithm in algorithms {
            self.add_key_validator(MinimumBitStrengthValidator {
                algorithm,
                minimum_strength,
            });
        }
        self
    }

    /// Freeze the current chain.
    pub fn build(&self) -> KeyringValidator<K> {
        KeyringValidator {
            validators: self.validators.iter().map(Arc::clone).collect(),
        }
    }
}

impl<K: KeyRecord + 'static> Default for KeyringValidatorBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for KeyringValidatorBuilder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyringValidatorBuilder")
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// An immutable validator chain, cheap to clone and share.
pub struct KeyringValidator<K> {
    validators: Arc<[SharedValidator<K>]>,
}

impl<K: KeyRecord + 'static> KeyringValidator<K> {
    /// Chain holding the default validators.
    pub fn default_chain() -> Self {
        KeyringValidatorBuilder::new().build()
    }

    /// Chain accepting every key.
    pub fn accept_all() -> Self {
        KeyringValidatorBuilder::empty().build()
    }
}

impl<K> KeyringValidator<K> {
    /// Number of validators in the chain.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Whether the chain accepts every key.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Run the chain over one key.
    pub fn validate_key(&self, context: &DiscoveryContext, key: &K) -> Result<(), RejectionReason> {
        self.validators
            .iter()
            .try_for_each(|validator| validator.validate(context, key))
    }

    /// Run the chain over every key of a keyring, keeping their order.
    pub fn validate_keys<I>(&self, context: &DiscoveryContext, keys: I) -> ValidationOutcome<K>
    where
        I: IntoIterator<Item = K>,
    {
        let mut outcome = ValidationOutcome {
            accepted: Vec::new(),
            rejected: Vec::new(),
        };

        for key in keys {
            match self.validate_key(context, &key) {
                Ok(()) => outcome.accepted.push(key),
                Err(reason) => outcome.rejected.push(RejectedKey { key, reason }),
            }
        }

        outcome
    }
}

impl<K> Clone for KeyringValidator<K> {
    fn clone(&self) -> Self {
        Self {
            validators: Arc::clone(&self.validators),
        }
    }
}

impl<K> fmt::Debug for KeyringValidator<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyringValidator")
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// A key together with the reason it was refused.
#[derive(Debug, Clone)]
pub struct RejectedKey<K> {
    /// The refused key.
    pub key: K,
    /// Why it was refused.
    pub reason: RejectionReason,
}

/// Keys of one keyring split into accepted and rejected, in input order.
#[derive(Debug, Clone)]
pub struct ValidationOutcome<K> {
    /// Keys every validator accepted.
    pub accepted: Vec<K>,
    /// Keys some validator refused.
    pub rejected: Vec<RejectedKey<K>>,
}
