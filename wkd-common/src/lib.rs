#![doc = include_str!("../README.md")]
//!

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(any(), deny(clippy::unwrap_used))]

pub mod codec;
pub mod constants;
pub mod hash;
pub mod mail;
pub mod policy;

pub use mail::MailAddress;
pub use policy::{Policy, PolicyParsingError};
