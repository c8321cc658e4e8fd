//! Shared utilities used across the handlers.

pub mod hit_counter;
pub mod validators;

pub use hit_counter::{HitCounter, EXPOSITION_CONTENT_TYPE};
pub use validators::{is_valid_domain, is_valid_ipv4};
