//! Dispatch engine integration tests.


mod hooks;
mod providers;
