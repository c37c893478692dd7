//! Explicit storage of state sets, transition matrices and transition graphs.
//!
//! - [`StateSet`] is a fixed-length bit set over the states of one state space.
//! - [`SparseMatrix`] is the immutable row-compressed matrix in which models are stored.
//! - [`FlexibleMatrix`] is a mutable, row-oriented matrix used during state elimination.
//! - [`TransitionGraph`] is the (cheaply cloneable) topology of a matrix, used by
//!   reachability and SCC algorithms.

mod flexible_matrix;
mod sparse_matrix;
mod state_set;
mod transition_graph;

pub use flexible_matrix::{FlexibleMatrix, FlexibleRow};
pub use sparse_matrix::{MatrixEntry, SparseMatrix, SparseMatrixBuilder};
pub use state_set::{StateId, StateSet, StateSetIterator};
pub use transition_graph::TransitionGraph;
