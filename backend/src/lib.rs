//! HomeWork backend: a household chore-and-allowance tracker.
//!
//! Parents assign tasks, children claim and submit them, parents approve and
//! pay, and every payout lands in an append-only per-profile ledger with an
//! integer-cents balance.

pub mod domain;
pub mod rest;
pub mod storage;
