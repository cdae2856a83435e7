//! Integration tests: collect → extract → build → order → render on small
//! trees written to temp directories.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use depviz_core::{DepvizConfig, DiagramError, OutputFormat};
use depviz_graph::extract::{Extraction, Extractor};
use depviz_graph::graph::NodeKind;
use depviz_graph::{analyze, generate_diagram};

fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

fn mermaid(root: &Path) -> String {
    generate_diagram(root, &DepvizConfig::default(), OutputFormat::Mermaid)
        .unwrap()
        .expect("tree has eligible files")
}

fn trimmed_lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).collect()
}

#[test]
fn single_bare_file_is_a_complete_diagram() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), &[("solo.ts", "")]);

    let text = mermaid(dir.path());
    let lines = trimmed_lines(&text);

    assert_eq!(lines[0], "flowchart TD");
    assert_eq!(text.matches("solo.ts (0 lines)").count(), 1);
    assert!(lines.contains(&"Start --> solo_ts"));
    assert!(lines.contains(&"solo_ts --> End"));
    assert!(!text.contains("-.->"));
    // only the two anchor edges
    assert_eq!(text.matches("-->").count(), 2);
}

#[test]
fn relative_import_links_files_and_orders_backbone() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), &[("a.ts", "import \"./b\";\n"), ("b.ts", "")]);

    let text = mermaid(dir.path());
    let lines = trimmed_lines(&text);

    assert_eq!(lines.iter().filter(|l| **l == "a_ts --> b_ts").count(), 1);
    assert!(lines.contains(&"a_ts -.-> b_ts"));
    assert!(!lines.contains(&"b_ts -.-> a_ts"));

    let analysis = analyze(
        dir.path(),
        &DepvizConfig::default(),
        &depviz_graph::extract::PatternExtractor::default(),
    )
    .unwrap()
    .unwrap();
    let order: Vec<&str> = analysis
        .backbone
        .order()
        .iter()
        .map(|n| analysis.graph.node(*n).label.as_str())
        .collect();
    assert_eq!(order, vec!["a.ts", "b.ts"]);
}

#[test]
fn bare_import_becomes_external_node() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), &[("a.ts", "import _ from \"lodash\";\n")]);

    let text = mermaid(dir.path());
    let lines = trimmed_lines(&text);

    assert!(lines.contains(&"ext_lodash{{\"lodash\"}}"));
    assert!(lines.contains(&"a_ts --> ext_lodash"));
    assert!(!text.contains("subgraph ext_lodash"));

    let analysis = analyze(
        dir.path(),
        &DepvizConfig::default(),
        &depviz_graph::extract::PatternExtractor::default(),
    )
    .unwrap()
    .unwrap();
    assert_eq!(analysis.graph.file_count(), 1);
    assert_eq!(analysis.graph.externals().len(), 1);
}

#[test]
fn mutual_imports_still_cover_every_file_once() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(
        dir.path(),
        &[("a.ts", "import './b';\n"), ("b.ts", "import './a';\n")],
    );

    let analysis = analyze(
        dir.path(),
        &DepvizConfig::default(),
        &depviz_graph::extract::PatternExtractor::default(),
    )
    .unwrap()
    .unwrap();

    assert!(analysis.backbone.has_cycle());
    assert_eq!(analysis.backbone.order().len(), 2);
    let unique: HashSet<_> = analysis.backbone.order().iter().collect();
    assert_eq!(unique.len(), 2);

    // neither file is an entry or a leaf, so the anchors stay unconnected
    let text = mermaid(dir.path());
    assert!(!text.contains("Start -->"));
    assert!(!text.contains("--> End"));
}

#[test]
fn empty_tree_is_nothing_to_do() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), &[("node_modules/x/index.js", "module.exports = 1;\n")]);

    let result = generate_diagram(dir.path(), &DepvizConfig::default(), OutputFormat::Mermaid);
    assert!(matches!(result, Ok(None)));
}

#[test]
fn missing_root_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = generate_diagram(
        &dir.path().join("nope"),
        &DepvizConfig::default(),
        OutputFormat::Mermaid,
    );
    assert!(matches!(result, Err(DiagramError::RootNotFound(_))));
}

#[test]
fn backbone_is_permutation_of_files_on_larger_tree() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = Vec::new();
    for i in 0..30 {
        // every file imports the next two, and the last ones wrap around into a cycle
        let content = format!(
            "import './m{}';\nimport './m{}';\nfunction f{i}() {{}}\n",
            (i + 1) % 30,
            (i + 7) % 30
        );
        files.push((format!("m{i}.ts"), content));
    }
    let borrowed: Vec<(&str, &str)> = files
        .iter()
        .map(|(n, c)| (n.as_str(), c.as_str()))
        .collect();
    write_tree(dir.path(), &borrowed);

    let analysis = analyze(
        dir.path(),
        &DepvizConfig::default(),
        &depviz_graph::extract::PatternExtractor::default(),
    )
    .unwrap()
    .unwrap();

    let order = analysis.backbone.order();
    assert_eq!(order.len(), 30);
    let unique: HashSet<_> = order.iter().collect();
    assert_eq!(unique.len(), 30);
    assert!(order.iter().all(|n| analysis.graph.node(*n).kind == NodeKind::File));
    assert_eq!(analysis.graph.edge_count(), 60);
}

#[test]
fn config_limits_reach_the_renderer() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(
        dir.path(),
        &[
            ("a.ts", "function one() {}\nfunction two() {}\nfunction three() {}\n"),
            ("b.ts", ""),
            ("c.ts", ""),
        ],
    );

    let config = DepvizConfig::from_toml(
        r#"
[graph]
max_symbols = 2

[render]
direction = "LR"
max_backbone = 2
"#,
    )
    .unwrap();

    let text = generate_diagram(dir.path(), &config, OutputFormat::Mermaid)
        .unwrap()
        .unwrap();
    assert!(text.starts_with("flowchart LR\n"));
    assert!(text.contains("one()"));
    assert!(text.contains("two()"));
    assert!(!text.contains("three()"));
    assert_eq!(text.matches("-.->").count(), 1);
}

#[test]
fn markdown_and_json_formats() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), &[("a.ts", "import './b';\n"), ("b.ts", "")]);

    let md = generate_diagram(dir.path(), &DepvizConfig::default(), OutputFormat::Markdown)
        .unwrap()
        .unwrap();
    assert!(md.starts_with("```mermaid\nflowchart TD\n"));
    assert_eq!(md, format!("```mermaid\n{}```\n", mermaid(dir.path())));

    let json = generate_diagram(dir.path(), &DepvizConfig::default(), OutputFormat::Json)
        .unwrap()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["backbone"], serde_json::json!(["a_ts", "b_ts"]));
}

struct ClassesOnly;

impl Extractor for ClassesOnly {
    fn extract(&self, content: &str) -> Extraction {
        Extraction {
            classes: content
                .lines()
                .filter_map(|l| l.strip_prefix("@class "))
                .map(str::to_string)
                .collect(),
            ..Extraction::default()
        }
    }
}

#[test]
fn custom_extractor_is_used() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), &[("notes.txt", "@class Ledger\nimport './x';\n")]);

    let analysis = analyze(dir.path(), &DepvizConfig::default(), &ClassesOnly)
        .unwrap()
        .unwrap();
    let entry = &analysis.graph.files()[0];
    assert_eq!(entry.members.len(), 1);
    assert_eq!(analysis.graph.node(entry.members[0]).label, "class Ledger");
    assert_eq!(analysis.graph.edge_count(), 0);
}
