//! Unit tests for condition compatibility and graph validation.

mod helpers;
mod validate;
