/*!

This library provides the requirement resource view shared by the local and remote sides of a
requirement, and the clients used to read and write requirements and their connection secrets.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use condition::{Condition, ConditionStatus};
pub use document::{is_empty_value, Document, FieldPath};
pub use error::{Error, Result};
pub use requirement::{Identity, ObjectKey, Requirement, SecretReference};

pub mod clients;
mod condition;
pub mod constants;
mod document;
mod error;
mod requirement;
