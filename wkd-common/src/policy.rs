//! The WKD policy flags file.
//!
//! The file is line oriented: `keyword[: value]`, `#` starts a comment line,
//! blank lines are ignored. Parsing is lenient: a bad line is reported and
//! skipped, it never invalidates the rest of the file.

use std::{fmt, io, io::BufRead, str::FromStr};

use serde::Serialize;

use crate::mail::MailAddress;

const KEY_VALUE_SEPARATOR: char = ':';
const COMMENT: char = '#';

/// Flags published by a domain in its policy file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Policy {
    mailbox_only: bool,
    dane_only: bool,
    auth_submit: bool,
    protocol_version: Option<i32>,
    submission_address: Option<MailAddress>,
}

impl Policy {
    /// `mailbox-only`: the provider only accepts keys whose user ids consist
    /// of a bare mailbox, without a real name.
    pub fn mailbox_only(&self) -> bool {
        self.mailbox_only
    }

    /// `dane-only`: the provider runs an OpenPGP DANE service instead of a
    /// directory (deprecated keyword).
    pub fn dane_only(&self) -> bool {
        self.dane_only
    }

    /// `auth-submit`: submissions arrive over an authenticated connection and
    /// are published without a confirmation round trip.
    pub fn auth_submit(&self) -> bool {
        self.auth_submit
    }

    /// `protocol-version`: the draft revision of the update protocol the
    /// provider claims to support.
    pub fn protocol_version(&self) -> Option<i32> {
        self.protocol_version
    }

    /// `submission-address`: alternative to the `submission-address` file.
    pub fn submission_address(&self) -> Option<&MailAddress> {
        self.submission_address.as_ref()
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();

        if self.mailbox_only {
            flags.push(Flag::MailboxOnly.to_string());
        }
        if self.dane_only {
            flags.push(Flag::DaneOnly.to_string());
        }
        if self.auth_submit {
            flags.push(Flag::AuthSubmit.to_string());
        }
        if let Some(version) = self.protocol_version {
            flags.push(format!("{}: {version}", Flag::ProtocolVersion));
        }
        if let Some(address) = &self.submission_address {
            flags.push(format!("{}: {address}", Flag::SubmissionAddress));
        }

        f.write_str(&flags.join("\n"))
    }
}

/// One line of a policy file that could not be applied.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Unsupported or malformed flag at line {line_number}: {line} ({comment})")]
pub struct PolicyParsingError {
    /// 1-based line number.
    pub line_number: usize,
    /// The offending line, whitespace trimmed.
    pub line: String,
    /// What was wrong with it.
    pub comment: String,
}

/// Known keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    MailboxOnly,
    DaneOnly,
    AuthSubmit,
    ProtocolVersion,
    SubmissionAddress,
}

impl Flag {
    /// Apply this flag with its (trimmed, possibly empty) value.
    fn apply(self, policy: &mut Policy, value: &str) -> Result<(), String> {
        match self {
            Flag::MailboxOnly => policy.mailbox_only = true,
            Flag::DaneOnly => policy.dane_only = true,
            Flag::AuthSubmit => policy.auth_submit = true,
            Flag::ProtocolVersion => {
                let version = value
                    .parse::<i32>()
                    .map_err(|_| format!("Invalid number {value}"))?;
                policy.protocol_version = Some(version);
            }
            Flag::SubmissionAddress => {
                let address = MailAddress::parse(value)
                    .map_err(|_| format!("Invalid e-mail address: {value}"))?;
                policy.submission_address = Some(address);
            }
        }

        Ok(())
    }
}

impl FromStr for Flag {
    type Err = ();

    /// Keywords are matched case-insensitively.
    fn from_str(keyword: &str) -> Result<Self, Self::Err> {
        match keyword.to_lowercase().as_str() {
            "mailbox-only" => Ok(Flag::MailboxOnly),
            "dane-only" => Ok(Flag::DaneOnly),
            "auth-submit" => Ok(Flag::AuthSubmit),
            "protocol-version" => Ok(Flag::ProtocolVersion),
            "submission-address" => Ok(Flag::SubmissionAddress),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Flag::MailboxOnly => "mailbox-only",
            Flag::DaneOnly => "dane-only",
            Flag::AuthSubmit => "auth-submit",
            Flag::ProtocolVersion => "protocol-version",
            Flag::SubmissionAddress => "submission-address",
        })
    }
}

fn split_key_value(line: &str) -> (&str, &str) {
    match line.split_once(KEY_VALUE_SEPARATOR) {
        Some((keyword, value)) => (keyword.trim(), value.trim()),
        None => (line.trim(), ""),
    }
}

/// Incremental parser state, fed one line at a time.
#[derive(Debug, Default)]
struct PolicyParser {
    policy: Policy,
    errors: Vec<PolicyParsingError>,
    line_number: usize,
}

impl PolicyParser {
    fn feed(&mut self, raw_line: &str) {
        self.line_number += 1;

        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(COMMENT) {
            return;
        }

        let (keyword, value) = split_key_value(line);
        let applied = match keyword.parse::<Flag>() {
            Ok(flag) => flag.apply(&mut self.policy, value),
            Err(()) => Err(format!("Unknown keyword {keyword}")),
        };

        if let Err(comment) = applied {
            self.errors.push(PolicyParsingError {
                line_number: self.line_number,
                line: line.to_string(),
                comment,
            });
        }
    }

    fn finish(self) -> (Policy, Vec<PolicyParsingError>) {
        (self.policy, self.errors)
    }
}

/// Parse a policy file held in memory.
///
/// Always produces a [`Policy`]; lines that could not be applied are returned
/// alongside it, in file order.
pub fn parse_policy(content: &str) -> (Policy, Vec<PolicyParsingError>) {
    let mut parser = PolicyParser::default();
    for line in content.lines() {
        parser.feed(line);
    }
    parser.finish()
}

/// Parse a policy file from a reader.
///
/// Bytes that are not valid UTF-8 are replaced with `U+FFFD`, so they only
/// affect the line they appear on.
///
/// # Errors
/// Only when reading fails; malformed lines are reported through the
/// returned error list instead.
pub fn parse_policy_reader<R: BufRead>(reader: R) -> io::Result<(Policy, Vec<PolicyParsingError>)> {
    let mut parser = PolicyParser::default();
    for line in reader.split(b'\n') {
        let line = line?;
        let line = line.strip_suffix(b"\r").unwrap_or(&line);
        parser.feed(&String::from_utf8_lossy(line));
    }
    Ok(parser.finish())
}
