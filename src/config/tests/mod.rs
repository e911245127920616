//! Unit tests for configuration loading and precedence.
//!
//! Tests are organised into modules by functional area:
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence tests
//! - `legacy_fallback`: `PORT` and `GITHUB_*` fallback tests
//! - `validation`: Configuration consistency validation tests

mod helpers;
mod precedence;
