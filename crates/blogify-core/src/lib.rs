//! # Blogify Core
//!
//! The domain layer of Blogify.
//! This crate contains the posting, listing and verification rules with zero
//! infrastructure dependencies. Stores, change feeds and session providers are
//! reached only through the traits in [`ports`].

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
