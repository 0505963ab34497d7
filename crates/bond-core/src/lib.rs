//! Core abstractions for bond-rs
//!
//! This crate defines the fundamental trait and types shared by every query
//! agent: the [`Agent`] trait, the [`Response`] wire envelope with its closed
//! [`ResponseType`] tag set, and the common error type.

pub mod agent;
pub mod error;
pub mod response;

pub use agent::Agent;
pub use error::{Error, Result};
pub use response::{Response, ResponseType};
