//! The certificate capability surface consumed by the client.
//!
//! Decoding OpenPGP packets is left to a [`KeyParser`] implementation; the
//! client only reads the fields exposed by [`KeyRecord`].

use std::{fmt, time::SystemTime};

use wkd_common::{MailAddress, codec::armor::armor_public_key};

use crate::errors::ErrorCollection;

/// Public key algorithm identifiers (RFC 4880, RFC 6637 and later drafts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicKeyAlgorithm {
    /// 1
    RsaEncryptOrSign,
    /// 2
    RsaEncryptOnly,
    /// 3
    RsaSignOnly,
    /// 16
    ElGamalEncryptOnly,
    /// 17
    Dsa,
    /// 18
    Ecdh,
    /// 19
    Ecdsa,
    /// 20
    ElGamalEncryptOrSign,
    /// 21
    DiffieHellman,
    /// 22
    EdDsa,
    /// 23, reserved.
    Aedh,
    /// 24, reserved.
    AeDsa,
    /// 100 to 110, private or experimental use.
    Experimental(u8),
    /// Any other identifier.
    Unknown(u8),
}

impl PublicKeyAlgorithm {
    /// The numeric identifier.
    pub fn code(self) -> u8 {
        match self {
            Self::RsaEncryptOrSign => 1,
            Self::RsaEncryptOnly => 2,
            Self::RsaSignOnly => 3,
            Self::ElGamalEncryptOnly => 16,
            Self::Dsa => 17,
            Self::Ecdh => 18,
            Self::Ecdsa => 19,
            Self::ElGamalEncryptOrSign => 20,
            Self::DiffieHellman => 21,
            Self::EdDsa => 22,
            Self::Aedh => 23,
            Self::AeDsa => 24,
            Self::Experimental(code) | Self::Unknown(code) => code,
        }
    }
}

impl From<u8> for PublicKeyAlgorithm {
    fn from(code: u8) -> Self {
        match code {
            1 => Self::RsaEncryptOrSign,
            2 => Self::RsaEncryptOnly,
            3 => Self::RsaSignOnly,
            16 => Self::ElGamalEncryptOnly,
            17 => Self::Dsa,
            18 => Self::Ecdh,
            19 => Self::Ecdsa,
            20 => Self::ElGamalEncryptOrSign,
            21 => Self::DiffieHellman,
            22 => Self::EdDsa,
            23 => Self::Aedh,
            24 => Self::AeDsa,
            100..=110 => Self::Experimental(code),
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for PublicKeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RsaEncryptOrSign => f.write_str("RsaEncryptOrSign"),
            Self::RsaEncryptOnly => f.write_str("RsaEncryptOnly"),
            Self::RsaSignOnly => f.write_str("RsaSignOnly"),
            Self::ElGamalEncryptOnly => f.write_str("ElGamalEncryptOnly"),
            Self::Dsa => f.write_str("Dsa"),
            Self::Ecdh => f.write_str("Ecdh"),
            Self::Ecdsa => f.write_str("Ecdsa"),
            Self::ElGamalEncryptOrSign => f.write_str("ElGamalEncryptOrSign"),
            Self::DiffieHellman => f.write_str("DiffieHellman"),
            Self::EdDsa => f.write_str("EdDsa"),
            Self::Aedh => f.write_str("Aedh"),
            Self::AeDsa => f.write_str("AeDsa"),
            Self::Experimental(code) => write!(f, "Experimental{:02}", code.saturating_sub(100)),
            Self::Unknown(code) => write!(f, "Unknown({code})"),
        }
    }
}

/// A decoded certificate as seen by the client.
///
/// `user_ids` must only contain identities whose self-signature binding has
/// already been verified by the parser.
pub trait KeyRecord {
    /// Key id, as rendered by the parser.
    fn key_id(&self) -> String;

    /// Packet version.
    fn version(&self) -> u8;

    /// Fingerprint, as rendered by the parser.
    fn fingerprint(&self) -> String;

    /// Public key algorithm.
    fn algorithm(&self) -> PublicKeyAlgorithm;

    /// Key size in bits.
    fn bit_strength(&self) -> u32;

    /// When the key was created.
    fn creation_time(&self) -> SystemTime;

    /// When the key expires, if ever.
    fn expiration_time(&self) -> Option<SystemTime>;

    /// Whether the key carries a revocation.
    fn is_revoked(&self) -> bool;

    /// OpenPGP transport encoding of the key.
    fn encoded(&self) -> Vec<u8>;

    /// Bound user ids.
    fn user_ids(&self) -> Vec<String>;

    /// Whether `at` lies between creation and expiration.
    fn is_valid_at(&self, at: SystemTime) -> bool {
        at >= self.creation_time() && self.expiration_time().is_none_or(|expires| at < expires)
    }

    /// Whether the expiration time has passed.
    fn is_expired(&self) -> bool {
        self.expiration_time()
            .is_some_and(|expires| SystemTime::now() > expires)
    }

    /// User ids that parse as mail addresses. Others are skipped.
    fn mail_addresses(&self) -> Vec<MailAddress> {
        self.user_ids()
            .iter()
            .filter_map(|uid| MailAddress::parse(uid).ok())
            .collect()
    }

    /// Whether a bound user id carries `address`.
    fn has_mail_address(&self, address: &MailAddress) -> bool {
        self.mail_addresses()
            .iter()
            .any(|candidate| candidate.same_address(address))
    }

    /// ASCII armored rendering of [`KeyRecord::encoded`].
    fn armored(&self) -> String {
        armor_public_key(&self.encoded())
    }
}

impl<T: KeyRecord + ?Sized> KeyRecord for &T {
    fn key_id(&self) -> String {
        (**self).key_id()
    }

    fn version(&self) -> u8 {
        (**self).version()
    }

    fn fingerprint(&self) -> String {
        (**self).fingerprint()
    }

    fn algorithm(&self) -> PublicKeyAlgorithm {
        (**self).algorithm()
    }

    fn bit_strength(&self) -> u32 {
        (**self).bit_strength()
    }

    fn creation_time(&self) -> SystemTime {
        (**self).creation_time()
    }

    fn expiration_time(&self) -> Option<SystemTime> {
        (**self).expiration_time()
    }

    fn is_revoked(&self) -> bool {
        (**self).is_revoked()
    }

    fn encoded(&self) -> Vec<u8> {
        (**self).encoded()
    }

    fn user_ids(&self) -> Vec<String> {
        (**self).user_ids()
    }
}

/// Decodes certificate bytes into [`KeyRecord`]s.
///
/// Implementations wrap an OpenPGP library. Any failure is reported as an
/// [`ErrorCollection`], typically holding a single
/// [`crate::errors::KeyParsingError`].
pub trait KeyParser: Send + Sync {
    /// The record type produced.
    type Key: KeyRecord + Clone + Send + Sync + 'static;

    /// Decode every certificate found in `bytes`, in order.
    fn parse(&self, bytes: &[u8]) -> Result<Vec<Self::Key>, ErrorCollection>;
}

/// Filters over iterators of [`KeyRecord`]s.
pub trait KeyRecordIterExt: Iterator + Sized
where
    Self::Item: KeyRecord,
{
    /// Skip revoked keys.
    fn exclude_revoked(self) -> impl Iterator<Item = Self::Item> {
        self.filter(|key| !key.is_revoked())
    }

    /// Skip expired keys.
    fn exclude_expired(self) -> impl Iterator<Item = Self::Item> {
        self.filter(|key| !key.is_expired())
    }
}

impl<I> KeyRecordIterExt for I
where
    I: Iterator,
    I::Item: KeyRecord,
{
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[derive(Debug, Clone)]
    struct Key {
        revoked: bool,
        expires: Option<SystemTime>,
        uids: Vec<&'static str>,
    }

    impl KeyRecord for Key {
        fn key_id(&self) -> String {
            "0123456789ABCDEF".into()
        }
        fn version(&self) -> u8 {
            4
        }
        fn fingerprint(&self) -> String {
            "F00D".into()
        }
        fn algorithm(&self) -> PublicKeyAlgorithm {
            PublicKeyAlgorithm::EdDsa
        }
        fn bit_strength(&self) -> u32 {
            256
        }
        fn creation_time(&self) -> SystemTime {
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_000)
        }
        fn expiration_time(&self) -> Option<SystemTime> {
            self.expires
        }
        fn is_revoked(&self) -> bool {
            self.revoked
        }
        fn encoded(&self) -> Vec<u8> {
            vec![0x99, 0x00, 0x01]
        }
        fn user_ids(&self) -> Vec<String> {
            self.uids.iter().map(|uid| uid.to_string()).collect()
        }
    }

    fn key(revoked: bool, expires: Option<SystemTime>) -> Key {
        Key {
            revoked,
            expires,
            uids: vec!["Joe Doe <Joe.Doe@Example.org>", "not an address"],
        }
    }

    #[test]
    fn algorithm_codes() {
        assert_eq!(PublicKeyAlgorithm::from(1), PublicKeyAlgorithm::RsaEncryptOrSign);
        assert_eq!(PublicKeyAlgorithm::from(17), PublicKeyAlgorithm::Dsa);
        assert_eq!(PublicKeyAlgorithm::from(22), PublicKeyAlgorithm::EdDsa);
        assert_eq!(PublicKeyAlgorithm::from(105).to_string(), "Experimental05");
        assert_eq!(PublicKeyAlgorithm::from(42), PublicKeyAlgorithm::Unknown(42));

        for code in [1u8, 2, 3, 16, 17, 18, 19, 20, 21, 22, 23, 24, 100, 110, 200] {
            assert_eq!(PublicKeyAlgorithm::from(code).code(), code);
        }
    }

    #[test]
    fn validity_window() {
        let created = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let expires = created + Duration::from_secs(60);
        let key = key(false, Some(expires));

        assert!(!key.is_valid_at(created - Duration::from_secs(1)));
        assert!(key.is_valid_at(created));
        assert!(!key.is_valid_at(expires));
        assert!(key.is_expired());

        let forever = self::key(false, None);
        assert!(forever.is_valid_at(SystemTime::now()));
        assert!(!forever.is_expired());
    }

    #[test]
    fn mail_addresses_skip_other_user_ids() {
        let key = key(false, None);
        let addresses = key.mail_addresses();

        assert_eq!(addresses.len(), 1);
        assert!(key.has_mail_address(&MailAddress::parse("Joe.Doe@example.org").unwrap()));
        assert!(!key.has_mail_address(&MailAddress::parse("joe.doe@example.org").unwrap()));
    }

    #[test]
    fn iterator_filters() {
        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(2_000);
        let keys = [key(true, None), key(false, Some(past)), key(false, None)];

        assert_eq!(keys.iter().exclude_revoked().count(), 2);
        assert_eq!(keys.iter().exclude_expired().count(), 2);
        assert_eq!(keys.iter().exclude_revoked().exclude_expired().count(), 1);
    }

    #[test]
    fn armored_block() {
        let armored = key(false, None).armored();

        assert!(armored.starts_with("-----BEGIN PGP PUBLIC KEY BLOCK-----\n\nmQAB\n="));
        assert!(armored.ends_with("\n-----END PGP PUBLIC KEY BLOCK-----"));
    }
}
