use std::path::Path;
use std::process::{Command, Output};

fn docxref(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_docxref"))
        .args(args)
        .arg("--root")
        .arg(root)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new("tests/fixtures").join(name)
}

/// A content root with no config: one component, pages under `modules/ROOT/pages`.
fn site(pages: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("modules/ROOT/pages");
    std::fs::create_dir_all(&root).unwrap();
    for (name, content) in pages {
        std::fs::write(root.join(name), content).unwrap();
    }
    dir
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn check_clean_fixture_passes() {
    let output = docxref(&fixture("site"), &["check"]);
    assert!(output.status.success(), "check failed: {}{}", stdout(&output), stderr(&output));
    assert!(stdout(&output).contains("All 3 documents clean"));
}

#[test]
fn show_prints_rewritten_lines() {
    let output = docxref(&fixture("site"), &["show", "index.adoc"]);
    assert!(output.status.success(), "show failed: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("    3  See xref:install.adoc#setup[Setting up Guide] before anything else."));
    assert!(text.contains("    4  Roadmap: xref:index.adoc[+++[planned.adoc#later]+++]."));
    assert!(text.contains("   10  xref:admin:users.adoc#roles[User roles]"));
    assert!(text.contains("   13  The logo is at xref:image$logo.png[]."));
}

#[test]
fn show_accepts_qualified_identifier() {
    let output = docxref(&fixture("site"), &["show", "2.0@guide:admin:users.adoc"]);
    assert!(output.status.success(), "show failed: {}", stderr(&output));
    assert!(stdout(&output).contains("admin"));
}

#[test]
fn show_unknown_page_fails() {
    let output = docxref(&fixture("site"), &["show", "nope.adoc"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Document Not Found"));
}

#[test]
fn missing_fragment_exits_with_error() {
    let dir = site(&[
        ("a.adoc", "= A\n\nGo read xref:b.adoc#nope[here]\n"),
        ("b.adoc", "= B\n\n== Something\n"),
    ]);
    let output = docxref(dir.path(), &["check"]);
    assert_eq!(output.status.code(), Some(2));
    let text = stdout(&output);
    assert!(text.contains("ERROR   modules/ROOT/pages/a.adoc:3 target fragment of xref not found: b.adoc#nope"));
    assert!(text.contains("1 errors, 0 warnings"));
}

#[test]
fn diagnostics_are_reported_once_on_stdout() {
    let dir = site(&[
        ("a.adoc", "= A\n\nGo read xref:b.adoc#nope[x]\n"),
        ("b.adoc", "= B\n\n== Something\n"),
    ]);
    let message = "target fragment of xref not found: b.adoc#nope";

    let output = docxref(dir.path(), &["check"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout(&output).matches(message).count(), 1);
    assert!(!stderr(&output).contains(message), "stderr repeated the diagnostic: {}", stderr(&output));
    assert!(!stderr(&output).contains('\x1b'));

    let output = docxref(dir.path(), &["check", "--format", "json"]);
    assert!(stderr(&output).is_empty(), "unexpected stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["diagnostics"][0]["message"], message);
}

#[test]
fn empty_reftext_exits_with_warning() {
    let dir = site(&[
        ("a.adoc", "= A\n\nSee xref:b.adoc#spot[].\n"),
        ("b.adoc", "= B\n\nThe [[spot]]spot has no title.\n"),
    ]);
    let output = docxref(dir.path(), &["check"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("WARN    modules/ROOT/pages/a.adoc:3 target has no reftext: b.adoc#spot"));
}

#[test]
fn unresolved_target_is_silent() {
    let dir = site(&[("a.adoc", "= A\n\nxref:missing.adoc#frag[]\n")]);
    let output = docxref(dir.path(), &["check"]);
    assert!(output.status.success(), "check failed: {}", stdout(&output));
}

#[test]
fn json_report_lists_diagnostics() {
    let dir = site(&[
        ("a.adoc", "= A\n\nxref:b.adoc#nope[]\nxref:b.adoc#_something[Something]\n"),
        ("b.adoc", "= B\n\n== Something\n"),
    ]);
    std::fs::write(
        dir.path().join(".docxref.toml"),
        "[xref]\nlogUnnecessaryLinkTextWarnings = true\n",
    )
    .unwrap();

    let output = docxref(dir.path(), &["check", "--format", "json"]);
    assert_eq!(output.status.code(), Some(2));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["documents"], 2);
    assert_eq!(report["errors"], 1);
    assert_eq!(report["warnings"], 1);

    let diagnostics = report["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics[0]["severity"], "error");
    assert_eq!(diagnostics[0]["location"]["line"], 3);
    assert_eq!(diagnostics[0]["location"]["file"], "modules/ROOT/pages/a.adoc");
    assert_eq!(diagnostics[1]["severity"], "warn");
    assert_eq!(diagnostics[1]["message"], "unnecessary xref link text: b.adoc#_something[Something]");
}

#[test]
fn stub_config_silences_missing_target() {
    let dir = site(&[("a.adoc", "= A\n\nxref:future/page.adoc#intro[]\n")]);
    std::fs::write(dir.path().join(".docxref.toml"), "[xref]\nstub = ['^future/']\n").unwrap();

    let output = docxref(dir.path(), &["show", "a.adoc"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("xref:a.adoc[+++[future/page.adoc#intro]+++]"));
}

#[test]
fn invalid_stub_pattern_is_reported() {
    let dir = site(&[("a.adoc", "= A\n")]);
    std::fs::write(dir.path().join(".docxref.toml"), "[xref]\nstub = ['(']\n").unwrap();

    let output = docxref(dir.path(), &["check"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid Stub Pattern"));
}

#[test]
fn malformed_config_is_reported() {
    let dir = site(&[("a.adoc", "= A\n")]);
    std::fs::write(dir.path().join(".docxref.toml"), "[xref\n").unwrap();

    let output = docxref(dir.path(), &["check"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid TOML"));
}

#[test]
fn missing_root_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let output = docxref(&dir.path().join("absent"), &["check"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Content Root Not Found"));
}
