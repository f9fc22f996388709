// 命令行接口测试

use std::fs;

use assert_cmd::Command;

const PAGE: &str = r#"<html><body>
  <div id="sidebar-nav-tree">
    <ul>
      <li><a href="/a">页面A</a></li>
      <li>分组<ul><li><a href="/b">页面B</a></li></ul></li>
    </ul>
  </div>
</body></html>"#;

fn write_page(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("page.html");
    fs::write(&path, PAGE).unwrap();
    path
}

#[test]
fn converts_page_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_page(&dir);

    let output = Command::cargo_bin("navtree")
        .unwrap()
        .arg(&input)
        .output()
        .unwrap();

    assert!(output.status.success());
    let html = String::from_utf8(output.stdout).unwrap();
    assert!(html.contains("nav-tree-container"));
    assert!(html.contains("页面A"));
}

#[test]
fn location_flag_activates_matching_node() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_page(&dir);

    let output = Command::cargo_bin("navtree")
        .unwrap()
        .arg(&input)
        .args(["--location", "http://localhost/b"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let html = String::from_utf8(output.stdout).unwrap();
    assert!(html.contains("active-link"));
}

#[test]
fn output_flag_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_page(&dir);
    let out_path = dir.path().join("out.html");

    Command::cargo_bin("navtree")
        .unwrap()
        .arg(&input)
        .args(["-o", out_path.to_str().unwrap()])
        .assert()
        .success();

    let html = fs::read_to_string(&out_path).unwrap();
    assert!(html.contains("nav-tree-container"));
}

#[test]
fn dump_tree_emits_json_forest() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_page(&dir);

    let output = Command::cargo_bin("navtree")
        .unwrap()
        .arg(&input)
        .arg("--dump-tree")
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let forest = json.as_array().unwrap();
    assert_eq!(forest.len(), 2);
    assert_eq!(forest[0]["title"], "页面A");
    assert_eq!(forest[1]["title"], "分组");
    assert_eq!(forest[1]["children"][0]["url"], "/b");
}

#[test]
fn missing_container_fails_with_message() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.html");
    fs::write(&input, "<html><body></body></html>").unwrap();

    let output = Command::cargo_bin("navtree")
        .unwrap()
        .arg(&input)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("找不到容器元素"));
}

#[test]
fn missing_input_file_fails() {
    let output = Command::cargo_bin("navtree")
        .unwrap()
        .arg("/nonexistent/page.html")
        .output()
        .unwrap();

    assert!(!output.status.success());
}
