use crate::types::{DependencyMap, FileNode, ReferenceEdge};
use codemap_analysis::{ProjectAnalysis, RelationshipKind};
use std::collections::BTreeSet;

/// Extensions tried when a reference omits one (`./utils/math` → `utils/math.js`)
const IMPLICIT_EXTENSIONS: &[&str] = &[
    "js", "jsx", "ts", "tsx", "mjs", "cjs", "vue", "svelte", "py", "rs", "go", "rb", "php",
];

impl DependencyMap {
    /// Build the map from a project analysis.
    ///
    /// Every analysed file becomes a node. References are resolved against the project's
    /// analysed and skipped files; unresolved targets become external nodes named as written.
    pub fn from_analysis(analysis: &ProjectAnalysis) -> Self {
        let known: BTreeSet<&str> = analysis
            .files
            .keys()
            .chain(analysis.skipped_files.keys())
            .map(String::as_str)
            .collect();

        let mut map = DependencyMap::new();
        for (filename, result) in &analysis.files {
            map.add_file(FileNode {
                name: filename.clone(),
                external: false,
                description: Some(result.file_description.clone()),
            });
        }
        for filename in analysis.skipped_files.keys() {
            map.add_file(FileNode {
                name: filename.clone(),
                external: false,
                description: None,
            });
        }

        for (filename, result) in &analysis.files {
            let Some(from) = map.find_file(filename) else {
                continue;
            };
            for raw in &result.dependencies.referenced_files {
                let raw = raw.trim();
                if raw.is_empty() {
                    continue;
                }

                let to = match resolve_reference(filename, raw, &known) {
                    Some(target) => map.add_file(FileNode {
                        name: target,
                        external: false,
                        description: None,
                    }),
                    None => map.add_file(FileNode {
                        name: raw.to_string(),
                        external: true,
                        description: None,
                    }),
                };
                if from == to {
                    continue;
                }
                map.add_reference(
                    from,
                    to,
                    ReferenceEdge {
                        kind: RelationshipKind::References,
                        raw: raw.to_string(),
                    },
                );
            }
        }

        log::debug!(
            "Built dependency map: {} files, {} references",
            map.node_count(),
            map.edge_count()
        );
        map
    }
}

/// Resolve `reference`, as written in `source`, to a known project file
pub fn resolve_reference(source: &str, reference: &str, known: &BTreeSet<&str>) -> Option<String> {
    if known.contains(reference) {
        return Some(reference.to_string());
    }

    let base = if reference.starts_with("./") || reference.starts_with("../") {
        parent_of(source)
    } else {
        ""
    };
    let candidate = normalize(base, reference.trim_start_matches('/'))?;
    if known.contains(candidate.as_str()) {
        return Some(candidate);
    }

    for ext in IMPLICIT_EXTENSIONS {
        for path in [format!("{candidate}.{ext}"), format!("{candidate}/index.{ext}")] {
            if known.contains(path.as_str()) {
                return Some(path);
            }
        }
    }
    None
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

/// Join `base` and `relative`, folding `.` and `..`; `None` when it climbs above the root
fn normalize(base: &str, relative: &str) -> Option<String> {
    let mut parts: Vec<&str> = base.split('/').filter(|p| !p.is_empty()).collect();
    for part in relative.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}
