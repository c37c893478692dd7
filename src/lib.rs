//! Model checking of discrete-time Markov chains (DTMCs) by state elimination.
//!
//! Instead of solving a linear equation system, state elimination removes the states of a
//! chain one by one, redirecting every path through an eliminated state to its successors
//! until only the initial state remains. Its one-step value is then the value of the query.
//! Because only field operations are used, the same procedure works for floating point,
//! exact rational and parametric (rational function) transition probabilities.
//!
//! The crate is organised bottom-up:
//!
//!  - [`value`]: the [`value::ValueOps`] arithmetic and its implementations.
//!  - [`storage`]: state sets, sparse matrices and transition graphs.
//!  - [`reachability`], [`trimming`] and [`scc`]: cancellable graph algorithms, including
//!    the qualitative `prob = 0` / `prob = 1` analysis.
//!  - [`elimination`]: flat and SCC-based (hybrid) state elimination with configurable
//!    elimination orders.
//!  - [`model`], [`logic`] and [`modelchecker`]: labelled DTMCs, their explicit file format,
//!    the property language and the [`modelchecker::EliminationModelChecker`].
//!
//! All long-running computations are cancellable through `cancel-this`.

#[cfg(test)]
mod test_utils;

pub mod elimination;
pub mod error;
pub mod logic;
pub mod model;
pub mod modelchecker;
pub mod reachability;
pub mod scc;
pub mod storage;
pub mod trimming;
pub mod value;

use crate::storage::StateSet;

/// A utility method for printing useful metadata of state sets.
fn log_set(set: &StateSet) -> String {
    format!("elements={}", set.len())
}

/// Extract the "simple name" of a type argument at compile time.
///
/// In the future, this should be a `const fn`, but `type_name` and `unwrap_or` are not
/// yet stabilized as `const` functions (even thought they probably are).
fn simple_type_name<T>() -> &'static str {
    std::any::type_name::<T>().split("::").last().unwrap_or("?")
}
