//! Register integration tests
//!
//! Every test drives the registers through a store, the same way writers do:
//! stage markers in a session, save, and inspect the committed head.

mod counter;
mod lww;
mod mv;
