use crate::error::{GraphError, Result};
use crate::types::{DependencyMap, FileTreeNode};
use codemap_analysis::FileRelationship;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashSet, VecDeque};

impl DependencyMap {
    /// Files `file` references, sorted by name
    pub fn references_of(&self, file: &str) -> Result<Vec<&str>> {
        let node = self.require(file)?;
        Ok(self.neighbor_names(node, Direction::Outgoing))
    }

    /// Files that reference `file`, sorted by name
    pub fn referenced_by(&self, file: &str) -> Result<Vec<&str>> {
        let node = self.require(file)?;
        Ok(self.neighbor_names(node, Direction::Incoming))
    }

    /// `file` with its referenced files as children (one level)
    pub fn tree(&self, file: &str) -> Result<FileTreeNode> {
        let node = self.require(file)?;
        let mut children: Vec<FileTreeNode> = self
            .graph
            .edges(node)
            .map(|edge| {
                let target = &self.graph[edge.target()];
                FileTreeNode::leaf(&target.name, target.external)
            })
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));

        let root = &self.graph[node];
        Ok(FileTreeNode {
            name: root.name.clone(),
            external: root.external,
            children,
        })
    }

    /// A synthetic `root` whose children are the trees of every project file with references
    pub fn forest(&self) -> FileTreeNode {
        let mut names: Vec<&str> = self
            .graph
            .node_indices()
            .filter(|&idx| self.graph.edges(idx).next().is_some())
            .map(|idx| self.graph[idx].name.as_str())
            .collect();
        names.sort_unstable();

        FileTreeNode {
            name: "root".to_string(),
            external: false,
            children: names
                .into_iter()
                .filter_map(|name| self.tree(name).ok())
                .collect(),
        }
    }

    /// Files reachable from `file` within `max_depth` references, with their distance
    pub fn reachable_from(&self, file: &str, max_depth: usize) -> Result<Vec<(&str, usize)>> {
        let start = self.require(file)?;
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([(start, 0usize)]);
        let mut result = Vec::new();

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for target in self.graph.neighbors_directed(current, Direction::Outgoing) {
                if visited.insert(target) {
                    result.push((self.graph[target].name.as_str(), depth + 1));
                    queue.push_back((target, depth + 1));
                }
            }
        }

        result.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        Ok(result)
    }

    /// Referenced targets that are not part of the project
    pub fn external_files(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .graph
            .node_weights()
            .filter(|node| node.external)
            .map(|node| node.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Resolved edges as relationship records
    pub fn relationships(&self) -> Vec<FileRelationship> {
        let mut edges: Vec<FileRelationship> = self
            .graph
            .edge_references()
            .map(|edge| {
                FileRelationship::references(
                    &self.graph[edge.source()].name,
                    &self.graph[edge.target()].name,
                )
            })
            .collect();
        edges.sort_by(|a, b| {
            a.source_file
                .cmp(&b.source_file)
                .then_with(|| a.target_file.cmp(&b.target_file))
        });
        edges
    }

    fn require(&self, file: &str) -> Result<NodeIndex> {
        self.find_file(file)
            .ok_or_else(|| GraphError::NodeNotFound(file.to_string()))
    }

    fn neighbor_names(&self, node: NodeIndex, direction: Direction) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .graph
            .neighbors_directed(node, direction)
            .map(|idx| self.graph[idx].name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}
