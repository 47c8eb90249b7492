//! Internal test crate; see the `tests/` directory.
