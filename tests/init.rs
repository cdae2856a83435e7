use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn depviz(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_depviz"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn init_writes_template_matching_defaults() {
    let dir = tempfile::tempdir().unwrap();

    let output = depviz(dir.path(), &["init"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let content = fs::read_to_string(dir.path().join(".depviz.toml")).unwrap();
    for section in ["[scan]", "[graph]", "[render]", "[export]"] {
        assert!(content.contains(section), "missing {section}");
    }

    // every option is commented out, so the template parses to the defaults
    let config = depviz_core::DepvizConfig::from_toml(&content).unwrap();
    let defaults = depviz_core::DepvizConfig::default();
    assert_eq!(config.graph.max_symbols, defaults.graph.max_symbols);
    assert_eq!(config.render.max_backbone, defaults.render.max_backbone);
    assert_eq!(config.scan.ignore, defaults.scan.ignore);
}

#[test]
fn diagram_picks_up_edited_init_config() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("src/a.ts"), "import './b';\nfunction run() {}\n").unwrap();
    fs::write(root.join("src/b.ts"), "export class Store {}\n").unwrap();

    assert!(depviz(root, &["init"]).status.success());

    let config_path = root.join(".depviz.toml");
    let template = fs::read_to_string(&config_path).unwrap();
    assert!(template.contains("# direction = \"TD\""));
    fs::write(
        &config_path,
        template.replace("# direction = \"TD\"", "direction = \"LR\""),
    )
    .unwrap();

    let output = depviz(root, &["diagram", "--path", "src"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("flowchart LR\n"), "{stdout}");
    assert!(stdout.contains("a_ts --> b_ts"));
    assert!(stdout.contains("run()"));
    assert!(stdout.contains("class Store"));
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".depviz.toml"), "# existing").unwrap();

    let output = depviz(dir.path(), &["init"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));
    let content = fs::read_to_string(dir.path().join(".depviz.toml")).unwrap();
    assert_eq!(content, "# existing");
}
