//! Routing against a populated source tree.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ndcb_fs::{
    Backend, CompositeFileSystem, Entry, File, FileBatches, FileSystem, FsError, MemoryBackend,
    RuleReaders,
};
use ndcb_path::{AbsolutePath, Extension, RelativePath};
use ndcb_router::{ExtensionMap, Router, RouterConfig};
use proptest::prelude::*;

async fn site(paths: &[&str]) -> Router<CompositeFileSystem> {
    let backend = Arc::new(MemoryBackend::new());
    for path in paths {
        let absolute = AbsolutePath::new(format!("/site/{path}")).unwrap();
        backend.write(&absolute, "").await.unwrap();
    }
    let fs = CompositeFileSystem::from_roots(
        &[AbsolutePath::new("/site").unwrap()],
        backend as Arc<dyn Backend>,
        Arc::new(RuleReaders::default()),
    )
    .unwrap();
    Router::new(Arc::new(fs), ExtensionMap::from(&RouterConfig::default()))
}

async fn route(router: &Router<CompositeFileSystem>, query: &str) -> Option<String> {
    router
        .source_pathname(&RelativePath::new(query))
        .await
        .unwrap()
        .map(String::from)
}

async fn route_404(router: &Router<CompositeFileSystem>, query: &str) -> Option<String> {
    router
        .source_pathname_404(&RelativePath::new(query))
        .await
        .unwrap()
        .map(String::from)
}

#[tokio::test]
async fn directory_index_source_is_found_last() {
    let router = site(&["fr-CA/index.md"]).await;

    let candidates: Vec<String> = router
        .possible_source_pathnames(&RelativePath::new("fr-CA"))
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(
        candidates,
        vec!["fr-CA", "fr-CA.html", "fr-CA.md", "fr-CA/index.html", "fr-CA/index.md"]
    );
    assert_eq!(route(&router, "fr-CA").await.as_deref(), Some("fr-CA/index.md"));
}

#[tokio::test]
async fn sibling_html_outranks_directory_index() {
    let router = site(&["fr-CA.html", "fr-CA/index.md"]).await;
    assert_eq!(route(&router, "fr-CA").await.as_deref(), Some("fr-CA.html"));

    let router = site(&["fr-CA/index.html", "fr-CA/index.md"]).await;
    assert_eq!(route(&router, "fr-CA").await.as_deref(), Some("fr-CA/index.html"));
}

#[tokio::test]
async fn verbatim_match_wins() {
    let router = site(&["feed", "feed.md"]).await;
    assert_eq!(route(&router, "feed").await.as_deref(), Some("feed"));
}

#[tokio::test]
async fn html_request_served_by_markdown() {
    let router = site(&["about.md"]).await;
    assert_eq!(route(&router, "about.html").await.as_deref(), Some("about.md"));
    assert_eq!(route(&router, "about").await.as_deref(), Some("about.md"));
    assert_eq!(route(&router, "contact").await, None);
}

#[tokio::test]
async fn site_root_routes_to_index() {
    let router = site(&["index.md"]).await;
    assert_eq!(route(&router, "").await.as_deref(), Some("index.md"));
}

#[tokio::test]
async fn nearest_404_wins() {
    let router = site(&["404.md", "a/404.html"]).await;
    assert_eq!(route_404(&router, "a/b/missing").await.as_deref(), Some("a/404.html"));
    assert_eq!(route_404(&router, "elsewhere/missing").await.as_deref(), Some("404.md"));
}

#[tokio::test]
async fn no_404_anywhere() {
    let router = site(&["index.md"]).await;
    assert_eq!(route_404(&router, "a/b").await, None);
}

#[tokio::test]
async fn routed_sources_map_to_html_destinations() {
    let router = site(&["docs/index.md"]).await;
    let source = router
        .source_pathname(&RelativePath::new("docs"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(router.destination_pathname(&source).as_str(), "docs/index.html");
}

#[test]
fn router_config_from_toml() {
    let config: RouterConfig = toml::from_str(
        r#"
[[extensions]]
source = ".md"
destination = ".html"

[[extensions]]
source = "adoc"
destination = "html"
"#,
    )
    .unwrap();
    let map = ExtensionMap::from(&config);
    let html = Extension::html();
    assert_eq!(map.sources_for(&html).count(), 2);
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,8}"
}

proptest! {
    #[test]
    fn markdown_sources_always_land_on_html(
        dirs in prop::collection::vec(segment(), 0..4),
        stem in segment(),
    ) {
        let map = ExtensionMap::from(&RouterConfig::default());
        let mut pathname = dirs.join("/");
        if !pathname.is_empty() {
            pathname.push('/');
        }
        pathname.push_str(&stem);

        let source = RelativePath::new(&format!("{pathname}.md"));
        let destination = map.destination_pathname(&source);
        prop_assert_eq!(destination.extension(), Some(Extension::html()));
        prop_assert_eq!(destination.as_str(), format!("{pathname}.html"));

        // already a destination: mapping again changes nothing
        prop_assert_eq!(map.destination_pathname(&destination), destination);
    }
}

/// Serves a fixed set of files and records every existence probe.
struct Probed {
    present: Vec<RelativePath>,
    probes: Mutex<Vec<String>>,
}

impl Probed {
    fn new(present: &[&str]) -> Self {
        Self {
            present: present.iter().map(|p| RelativePath::new(p)).collect(),
            probes: Mutex::new(Vec::new()),
        }
    }

    fn probes(&self) -> Vec<String> {
        self.probes.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileSystem for Probed {
    fn pathname(&self, _entry: &Entry) -> Option<RelativePath> {
        None
    }

    async fn file(&self, _pathname: &RelativePath) -> ndcb_fs::Result<Option<File>> {
        Ok(None)
    }

    fn files(&self) -> FileBatches {
        Box::pin(futures::stream::empty())
    }

    async fn file_exists(&self, pathname: &RelativePath) -> ndcb_fs::Result<bool> {
        self.probes.lock().unwrap().push(pathname.to_string());
        Ok(self.present.contains(pathname))
    }

    async fn directory_exists(&self, _pathname: &RelativePath) -> ndcb_fs::Result<bool> {
        Ok(false)
    }

    async fn read_file(&self, pathname: &RelativePath) -> ndcb_fs::Result<Vec<u8>> {
        Err(FsError::pathname_not_found(pathname))
    }

    async fn read_text_file(&self, pathname: &RelativePath) -> ndcb_fs::Result<String> {
        Err(FsError::pathname_not_found(pathname))
    }

    async fn read_directory(&self, pathname: &RelativePath) -> ndcb_fs::Result<Vec<Entry>> {
        Err(FsError::pathname_not_found(pathname))
    }
}

#[tokio::test]
async fn probing_stops_at_the_first_hit() {
    let fs = Arc::new(Probed::new(&["fr-CA.md", "fr-CA/index.html"]));
    let router = Router::new(fs.clone(), ExtensionMap::from(&RouterConfig::default()));

    let source = router.source_pathname(&RelativePath::new("fr-CA")).await.unwrap();
    assert_eq!(source, Some(RelativePath::new("fr-CA.md")));
    assert_eq!(fs.probes(), vec!["fr-CA", "fr-CA.html", "fr-CA.md"]);
}

#[tokio::test]
async fn a_miss_probes_every_candidate_in_order() {
    let fs = Arc::new(Probed::new(&[]));
    let router = Router::new(fs.clone(), ExtensionMap::from(&RouterConfig::default()));
    let query = RelativePath::new("fr-CA");

    assert_eq!(router.source_pathname(&query).await.unwrap(), None);
    let expected: Vec<String> = router
        .possible_source_pathnames(&query)
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(fs.probes(), expected);
}
