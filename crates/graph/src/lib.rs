//! # Codemap Graph
//!
//! Dependency map of a project, projected from its [`ProjectAnalysis`].
//!
//! ## Architecture
//!
//! ```text
//! ProjectAnalysis
//!     │
//!     ├──> Builder
//!     │      ├─ Nodes: analysed and skipped files
//!     │      ├─ Resolve referencedFiles (exact, relative, implicit extension)
//!     │      └─ Unresolved targets become external nodes
//!     │
//!     └──> DependencyMap (petgraph)
//!            ├─ references_of / referenced_by
//!            ├─ tree / forest (file → referenced files)
//!            └─ reachable_from (bounded BFS)
//! ```
//!
//! [`ProjectAnalysis`]: codemap_analysis::ProjectAnalysis

mod builder;
mod error;
mod graph;
mod types;

pub use builder::resolve_reference;
pub use error::{GraphError, Result};
pub use types::{DependencyMap, FileNode, FileTreeNode, ReferenceEdge};
