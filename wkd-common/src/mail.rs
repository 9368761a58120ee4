//! Mail address value type.
//!
//! Accepts the two shapes that show up in the directory protocol:
//! - a bare `local@domain` (lookup input, `submission-address` files)
//! - `Display Name <local@domain>` (OpenPGP user ids)
//!
//! Quoted local parts and comments are not supported.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A parsed mail address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MailAddress {
    display_name: Option<String>,
    user: String,
    host: String,
}

impl MailAddress {
    /// Parse `input`, trimming surrounding whitespace first.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::Empty);
        }

        let (display_name, addr_spec) = match input.split_once('<') {
            Some((name, rest)) => {
                let addr = rest.strip_suffix('>').ok_or(Error::UnterminatedAngleBracket)?;
                let name = name.trim().trim_matches('"').trim();
                let name = (!name.is_empty()).then(|| name.to_string());
                (name, addr.trim())
            }
            None => (None, input),
        };

        let (user, host) = parse_addr_spec(addr_spec)?;

        Ok(Self {
            display_name,
            user: user.to_string(),
            host: host.to_string(),
        })
    }

    /// The display name, if the input carried one.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// The local part, with its original case.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The domain part, with its original case.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// `user@host`.
    pub fn address(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Whether `other` designates the same mailbox: local parts must match
    /// exactly, domains are compared case-insensitively.
    pub fn same_address(&self, other: &MailAddress) -> bool {
        self.user == other.user && self.host.eq_ignore_ascii_case(&other.host)
    }
}

fn parse_addr_spec(addr: &str) -> Result<(&str, &str), Error> {
    if addr.chars().any(char::is_whitespace) {
        return Err(Error::Whitespace);
    }

    let (user, host) = addr.rsplit_once('@').ok_or(Error::MissingAt)?;

    if user.contains('@') {
        return Err(Error::MultipleAt);
    }
    if user.is_empty() {
        return Err(Error::EmptyLocalPart);
    }
    if host.is_empty() {
        return Err(Error::EmptyDomain);
    }
    if let Some(c) = host
        .chars()
        .find(|c| c.is_ascii() && !(c.is_ascii_alphanumeric() || *c == '-' || *c == '.'))
    {
        return Err(Error::InvalidDomainCharacter(c));
    }

    Ok((user, host))
}

impl FromStr for MailAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for MailAddress {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Error> {
        Self::parse(value)
    }
}

impl fmt::Display for MailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.host)
    }
}

impl Serialize for MailAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.address().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MailAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let string: String = Deserialize::deserialize(deserializer)?;

        MailAddress::parse(&string).map_err(serde::de::Error::custom)
    }
}

/// Reasons an input is not a mail address.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Nothing but whitespace.
    #[error("Mail address: empty input")]
    Empty,
    /// No `@` separating local part and domain.
    #[error("Mail address: missing `@`")]
    MissingAt,
    /// Quoted local parts are unsupported, so a second `@` is an error.
    #[error("Mail address: more than one `@`")]
    MultipleAt,
    /// Nothing before the `@`.
    #[error("Mail address: empty local part")]
    EmptyLocalPart,
    /// Nothing after the `@`.
    #[error("Mail address: empty domain")]
    EmptyDomain,
    /// Whitespace inside the address itself.
    #[error("Mail address: whitespace inside the address")]
    Whitespace,
    /// An ASCII character that cannot appear in a host name.
    #[error("Mail address: invalid character {0:?} in domain")]
    InvalidDomainCharacter(char),
    /// A display name form missing its closing bracket.
    #[error("Mail address: `<` without closing `>`")]
    UnterminatedAngleBracket,
}
