use codemap_analysis::{
    AnalysisResult, FileAnalysis, ProjectAggregator, ProjectAnalysis, SkipReason, SkippedFile,
};
use codemap_graph::{DependencyMap, FileTreeNode, GraphError};
use pretty_assertions::assert_eq;

fn analysed(filename: &str, references: &[&str]) -> FileAnalysis {
    let mut analysis = AnalysisResult {
        file_description: format!("{filename} description"),
        main_purpose: "purpose".to_string(),
        ..Default::default()
    };
    analysis.dependencies.referenced_files = references.iter().map(|r| r.to_string()).collect();
    FileAnalysis {
        filename: filename.to_string(),
        analysis,
    }
}

fn project() -> ProjectAnalysis {
    ProjectAggregator::aggregate(
        5,
        vec![
            analysed(
                "app/page.js",
                &["./components/Nav", "app/utils/api.js", "react", "./components/Nav.js"],
            ),
            analysed("app/components/Nav.js", &["../utils/api"]),
            analysed("app/utils/api.js", &["app/utils/api.js", "https://api.example.com"]),
            analysed("app/layout.js", &[]),
        ],
        vec![SkippedFile::new("public/logo.pdf", SkipReason::ParsingFailed)],
    )
}

#[test]
fn builds_nodes_and_resolved_edges() {
    let map = DependencyMap::from_analysis(&project());

    // 4 analysed + 1 skipped + 2 external targets
    assert_eq!(map.node_count(), 7);
    // page→Nav, page→api, page→react, Nav→api, api→external (self reference dropped)
    assert_eq!(map.edge_count(), 5);
    assert_eq!(map.external_files(), vec!["https://api.example.com", "react"]);
}

#[test]
fn answers_outgoing_and_incoming_queries() {
    let map = DependencyMap::from_analysis(&project());

    assert_eq!(
        map.references_of("app/page.js").unwrap(),
        vec!["app/components/Nav.js", "app/utils/api.js", "react"]
    );
    assert_eq!(
        map.referenced_by("app/utils/api.js").unwrap(),
        vec!["app/components/Nav.js", "app/page.js"]
    );
    assert!(map.references_of("app/layout.js").unwrap().is_empty());
    assert!(matches!(
        map.references_of("missing.js"),
        Err(GraphError::NodeNotFound(_))
    ));
}

#[test]
fn tree_lists_one_level_of_references() {
    let map = DependencyMap::from_analysis(&project());

    assert_eq!(
        map.tree("app/components/Nav.js").unwrap(),
        FileTreeNode {
            name: "app/components/Nav.js".to_string(),
            external: false,
            children: vec![FileTreeNode::leaf("app/utils/api.js", false)],
        }
    );

    let forest = map.forest();
    assert_eq!(forest.name, "root");
    let roots: Vec<&str> = forest.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        roots,
        vec!["app/components/Nav.js", "app/page.js", "app/utils/api.js"]
    );
}

#[test]
fn reachability_is_bounded_by_depth() {
    let map = DependencyMap::from_analysis(&project());

    let one = map.reachable_from("app/page.js", 1).unwrap();
    assert_eq!(one.len(), 3);
    assert!(one.iter().all(|(_, depth)| *depth == 1));

    let two = map.reachable_from("app/page.js", 2).unwrap();
    assert_eq!(two.last(), Some(&("https://api.example.com", 2)));
}

#[test]
fn relationships_use_resolved_names() {
    let map = DependencyMap::from_analysis(&project());
    let edges = map.relationships();

    assert_eq!(edges.len(), 5);
    assert_eq!(edges[0].source_file, "app/components/Nav.js");
    assert_eq!(edges[0].target_file, "app/utils/api.js");
    assert_eq!(
        serde_json::to_value(&edges[0]).unwrap()["type"],
        serde_json::json!("references")
    );
}
