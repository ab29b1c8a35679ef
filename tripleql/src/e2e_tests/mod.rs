//! End-to-end tests at the session level.
//!
//! Each test file covers a specific scenario, driving a `Graph` over an
//! in-memory store and checking both what reaches the store and what
//! comes back.

#![cfg(test)]

mod helpers;

mod test_cli;
mod test_define_and_validate;
mod test_query_refinement;
mod test_remove;
mod test_store_and_query;
mod test_tuples;
