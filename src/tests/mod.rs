//! Cross-module test suites: full-pipeline imports and property-based
//! invariants.

mod property;
