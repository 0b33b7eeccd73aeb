//! fixflow CLI library: command implementations shared by the `fixflow`
//! binary and its integration tests.

pub mod commands;
