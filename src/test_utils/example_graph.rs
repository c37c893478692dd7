//! A small transition graph used across reachability, trimming and SCC tests.
//!
//! ```text
//!   6 --> 0 --> 1 --> 2 --> 3 <--> 4 --> 5 (loop)
//!         ^           |
//!         +-----------+           7 (isolated)
//! ```
//!
//! Strongly connected components: `{0, 1, 2}`, `{3, 4}`, and the singletons `{5}`
//! (with a self-loop), `{6}` and `{7}`.

use crate::storage::TransitionGraph;

pub const STATE_COUNT: usize = 8;

pub fn create_example_graph() -> TransitionGraph {
    TransitionGraph::from_edges(
        STATE_COUNT,
        [
            (6, 0),
            (0, 1),
            (1, 2),
            (2, 0),
            (2, 3),
            (3, 4),
            (4, 3),
            (4, 5),
            (5, 5),
        ],
    )
}
