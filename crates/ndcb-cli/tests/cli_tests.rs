//! End-to-end runs of `ndcb` commands over a site on disk.

use std::fs;

use clap::Parser;
use ndcb_cli::cli::Cli;
use tempfile::TempDir;

fn write(tmp: &TempDir, relative: &str, contents: &str) {
    let path = tmp.path().join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(
        &tmp,
        "ndcb.toml",
        r#"
[source]
roots = ["content", "theme"]
exclude_segment_prefixes = ["_"]
"#,
    );
    write(&tmp, "content/index.md", "# Home\n");
    write(&tmp, "content/blog/hello.md", "# Hello\n");
    write(&tmp, "content/blog/_draft.md", "");
    write(&tmp, "content/.gitignore", "*.swp\n");
    write(&tmp, "content/blog/hello.md.swp", "");
    write(&tmp, "theme/404.md", "# Lost\n");
    write(&tmp, "theme/index.md", "# Theme home\n");
    tmp
}

async fn ndcb(tmp: &TempDir, args: &[&str]) -> anyhow::Result<String> {
    let config = tmp.path().join("ndcb.toml");
    let mut argv = vec!["ndcb", "--config", config.to_str().unwrap()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();

    let mut out = Vec::new();
    ndcb_cli::run(cli, &mut out).await?;
    Ok(String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn files_lists_visible_sources() {
    let tmp = fixture();
    let output = ndcb(&tmp, &["files"]).await.unwrap();

    let mut lines: Vec<&str> = output.lines().collect();
    lines.sort();
    assert_eq!(
        lines,
        vec![".gitignore", "404.md", "blog/hello.md", "index.md", "index.md"]
    );
}

#[tokio::test]
async fn files_as_json() {
    let tmp = fixture();
    let output = ndcb(&tmp, &["files", "--json"]).await.unwrap();

    let records: Vec<serde_json::Value> = serde_json::from_str(&output).unwrap();
    assert_eq!(records.len(), 5);
    assert!(records.iter().any(|record| record["pathname"] == "blog/hello.md"));
}

#[tokio::test]
async fn resolve_prints_source_and_destination() {
    let tmp = fixture();
    assert_eq!(
        ndcb(&tmp, &["resolve", "/blog/hello/"]).await.unwrap(),
        "blog/hello.md -> blog/hello.html\n"
    );
    assert_eq!(
        ndcb(&tmp, &["resolve", "/"]).await.unwrap(),
        "index.md -> index.html\n"
    );
    assert!(ndcb(&tmp, &["resolve", "/blog/_draft"]).await.is_err());
}

#[tokio::test]
async fn not_found_falls_back_to_root_404() {
    let tmp = fixture();
    assert_eq!(ndcb(&tmp, &["not-found", "/blog/nope"]).await.unwrap(), "404.md\n");
}

#[tokio::test]
async fn ls_merges_roots() {
    let tmp = fixture();
    let output = ndcb(&tmp, &["ls"]).await.unwrap();
    assert_eq!(output, ".gitignore\nindex.md\nblog/\n404.md\n");
}

#[tokio::test]
async fn cat_reads_from_the_first_root() {
    let tmp = fixture();
    assert_eq!(ndcb(&tmp, &["cat", "index.md"]).await.unwrap(), "# Home\n");
    assert!(ndcb(&tmp, &["cat", "blog/_draft.md"]).await.is_err());
}

#[tokio::test]
async fn overlapping_roots_fail_at_startup() {
    let tmp = fixture();
    write(&tmp, "ndcb.toml", "[source]\nroots = [\"content\", \"content/blog\"]\n");
    let err = ndcb(&tmp, &["files"]).await.unwrap_err();
    assert!(format!("{err:#}").contains("overlap"), "{err:#}");
}
