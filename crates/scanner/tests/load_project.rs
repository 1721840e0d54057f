use codemap_scanner::{
    file_id, load_project, ScanOptions, BINARY_NOT_SUPPORTED, NOT_UTF8,
};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

#[tokio::test]
async fn loads_project_files_in_path_order() {
    let temp = tempdir().unwrap();
    let src = temp.path().join("src");
    fs::create_dir_all(src.join("utils")).unwrap();
    fs::write(
        src.join("index.js"),
        "import { add } from './utils/math';\n\nconsole.log(add(1, 2));\n",
    )
    .unwrap();
    fs::write(
        src.join("utils").join("math.js"),
        "export const add = (a, b) => a + b;\n",
    )
    .unwrap();
    fs::write(temp.path().join("README.md"), "# Demo\n").unwrap();
    fs::create_dir_all(temp.path().join("dist")).unwrap();
    fs::write(temp.path().join("dist").join("bundle.js"), "minified").unwrap();

    let project = load_project(temp.path(), ScanOptions::default())
        .await
        .unwrap();

    let names: Vec<&str> = project.files.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(names, vec!["README.md", "src/index.js", "src/utils/math.js"]);

    let index = &project.files[1];
    assert!(index.success);
    assert_eq!(index.id, file_id("src/index.js"));
    assert_eq!(index.language, "JavaScript");
    assert_eq!(index.file_type.as_deref(), Some("js"));
    assert_eq!(index.stats.lines, 2);

    assert_eq!(project.summary.total_files, 3);
    assert_eq!(project.summary.parsed, 3);
    assert_eq!(project.summary.by_type.get("js"), Some(&2));
}

#[tokio::test]
async fn binary_and_non_utf8_files_fail_to_parse() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("a.js"), "a();\n").unwrap();
    fs::write(temp.path().join("b.bin"), [0xff, 0xfe, 0x00, 0x81]).unwrap();
    fs::write(temp.path().join("Main.class"), [0xca, 0xfe, 0xba, 0xbe]).unwrap();

    let options = ScanOptions {
        read_concurrency: 1,
        ..ScanOptions::default().any_extension()
    };
    let project = load_project(temp.path(), options).await.unwrap();

    // `*.class` is excluded by pattern; the unknown binary is read and rejected
    let names: Vec<&str> = project.files.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(names, vec!["a.js", "b.bin"]);

    let bin = &project.files[1];
    assert!(!bin.success);
    assert_eq!(bin.error.as_deref(), Some(NOT_UTF8));
    assert_eq!(project.summary.failed, 1);
}

#[tokio::test]
async fn binary_extensions_are_not_read() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("manual.docx"), "PK\u{3}\u{4}").unwrap();

    let project = load_project(temp.path(), ScanOptions::default().any_extension())
        .await
        .unwrap();

    assert_eq!(project.files.len(), 1);
    assert_eq!(project.files[0].language, "Word Document");
    assert_eq!(project.files[0].error.as_deref(), Some(BINARY_NOT_SUPPORTED));
}
