//! Storage layer: abstraction traits and the CSV-backed implementation.

pub mod csv;
pub mod traits;

pub use traits::{
    ConditionalUpdate, Connection, GoalStorage, LedgerStorage, PayscaleStorage, ProfileStorage,
    TaskFieldPatch, TaskStorage, WithdrawalUpdate,
};
