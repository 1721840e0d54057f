use codemap_analysis::RelationshipKind;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// File in the dependency map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    /// Project-relative file name, or the reference as written for external targets
    pub name: String,

    /// Referenced but not part of the analysed project
    pub external: bool,

    /// `fileDescription` of analysed files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Edge in the dependency map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEdge {
    pub kind: RelationshipKind,

    /// Reference text as reported by the analysis (before resolution)
    pub raw: String,
}

/// One level of the "file → referenced files" hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTreeNode {
    pub name: String,
    #[serde(default)]
    pub external: bool,
    #[serde(default)]
    pub children: Vec<FileTreeNode>,
}

impl FileTreeNode {
    pub fn leaf(name: impl Into<String>, external: bool) -> Self {
        Self {
            name: name.into(),
            external,
            children: Vec::new(),
        }
    }
}

/// Directed graph of file references
#[derive(Debug, Clone, Default)]
pub struct DependencyMap {
    /// file -> file with `references` edges
    pub graph: DiGraph<FileNode, ReferenceEdge>,

    /// File name -> NodeIndex mapping for fast lookup
    pub file_index: HashMap<String, NodeIndex>,
}

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, or return the existing node of the same name.
    ///
    /// A node first added as external becomes internal once the file itself is added.
    pub fn add_file(&mut self, node: FileNode) -> NodeIndex {
        if let Some(&idx) = self.file_index.get(&node.name) {
            let existing = &mut self.graph[idx];
            if !node.external {
                existing.external = false;
                existing.description = node.description.or(existing.description.take());
            }
            return idx;
        }

        let name = node.name.clone();
        let idx = self.graph.add_node(node);
        self.file_index.insert(name, idx);
        idx
    }

    /// Add a reference edge; repeated references between the same pair are kept once
    pub fn add_reference(&mut self, from: NodeIndex, to: NodeIndex, edge: ReferenceEdge) {
        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, edge);
        }
    }

    pub fn find_file(&self, name: &str) -> Option<NodeIndex> {
        self.file_index.get(name).copied()
    }

    pub fn get_file(&self, idx: NodeIndex) -> Option<&FileNode> {
        self.graph.node_weight(idx)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
