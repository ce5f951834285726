//! Layered file system behavior across several roots.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use ndcb_fs::{
    Backend, CompositeFileSystem, Entry, FileBatches, FileSystem, FsError, MemoryBackend,
    RuleReaders, File,
};
use ndcb_path::{AbsolutePath, RelativePath};

fn abs(s: &str) -> AbsolutePath {
    AbsolutePath::new(s).unwrap()
}

fn pathname(s: &str) -> RelativePath {
    RelativePath::new(s)
}

async fn two_roots() -> (Arc<MemoryBackend>, CompositeFileSystem) {
    let backend = Arc::new(MemoryBackend::new());
    for (path, contents) in [
        ("/site/content/index.md", "content index"),
        ("/site/content/posts/a.md", "a"),
        ("/site/theme/index.md", "theme index"),
        ("/site/theme/posts/b.md", "b"),
        ("/site/theme/style.css", "body {}"),
    ] {
        backend.write(&abs(path), contents).await.unwrap();
    }
    let fs = CompositeFileSystem::from_roots(
        &[abs("/site/content"), abs("/site/theme")],
        backend.clone() as Arc<dyn Backend>,
        Arc::new(RuleReaders::default()),
    )
    .unwrap();
    (backend, fs)
}

#[tokio::test]
async fn first_layer_wins_on_shared_pathnames() {
    let (_, fs) = two_roots().await;

    let file = fs.file(&pathname("index.md")).await.unwrap().unwrap();
    assert_eq!(file.path(), &abs("/site/content/index.md"));
    assert_eq!(
        fs.read_text_file(&pathname("index.md")).await.unwrap(),
        "content index"
    );
}

#[tokio::test]
async fn later_layers_fill_gaps() {
    let (_, fs) = two_roots().await;

    let file = fs.file(&pathname("style.css")).await.unwrap().unwrap();
    assert_eq!(file.path(), &abs("/site/theme/style.css"));
    assert_eq!(fs.read_file(&pathname("style.css")).await.unwrap(), b"body {}");
}

#[tokio::test]
async fn existence_is_a_union() {
    let (_, fs) = two_roots().await;

    assert!(fs.file_exists(&pathname("posts/a.md")).await.unwrap());
    assert!(fs.file_exists(&pathname("posts/b.md")).await.unwrap());
    assert!(fs.directory_exists(&pathname("posts")).await.unwrap());
    assert!(!fs.file_exists(&pathname("posts/c.md")).await.unwrap());
    assert!(fs.file(&pathname("posts/c.md")).await.unwrap().is_none());
}

#[tokio::test]
async fn existence_survives_an_erroring_layer() {
    let (backend, fs) = two_roots().await;
    backend.inject_fault(&abs("/site/content/style.css"), io::ErrorKind::PermissionDenied);

    assert!(fs.file_exists(&pathname("style.css")).await.unwrap());
}

#[tokio::test]
async fn existence_reports_errors_when_no_layer_claims() {
    let (backend, fs) = two_roots().await;
    backend.inject_fault(&abs("/site/content/nope.md"), io::ErrorKind::PermissionDenied);

    let err = fs.file_exists(&pathname("nope.md")).await.unwrap_err();
    assert!(matches!(err, FsError::Io { .. }), "{err}");
}

#[tokio::test]
async fn reads_of_missing_pathnames_fail() {
    let (_, fs) = two_roots().await;

    let err = fs.read_file(&pathname("missing.md")).await.unwrap_err();
    assert!(matches!(err, FsError::PathnameNotFound { .. }));
    let err = fs.read_directory(&pathname("missing")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn directory_listings_merge_with_first_layer_winning() {
    let (_, fs) = two_roots().await;

    let entries = fs.read_directory(&RelativePath::root()).await.unwrap();
    let paths: Vec<String> = entries.iter().map(|entry| entry.path().to_string()).collect();
    assert_eq!(
        paths,
        vec![
            "/site/content/index.md",
            "/site/content/posts",
            "/site/theme/style.css",
        ]
    );
}

#[tokio::test]
async fn files_stream_every_layer_in_order() {
    let (_, fs) = two_roots().await;

    let files = fs.collect_files().await.unwrap();
    let first_theme = files
        .iter()
        .position(|file| file.path().is_within(&abs("/site/theme")))
        .unwrap();
    assert!(files[..first_theme]
        .iter()
        .all(|file| file.path().is_within(&abs("/site/content"))));
    assert_eq!(files.len(), 5);

    let pathnames: Vec<String> = files
        .iter()
        .map(|file| fs.pathname(&Entry::File(file.clone())).unwrap().to_string())
        .collect();
    assert!(pathnames.contains(&"posts/b.md".to_string()));
}

#[test]
fn nested_roots_fail_before_any_query() {
    let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
    let err = CompositeFileSystem::from_roots(
        &[abs("/content"), abs("/content/nested")],
        backend,
        Arc::new(RuleReaders::default()),
    )
    .err()
    .unwrap();

    assert!(err.is_configuration());
    assert!(matches!(err, FsError::OverlappingRoots { .. }));
}

/// A layer whose every query fails.
struct Broken;

#[async_trait]
impl FileSystem for Broken {
    fn pathname(&self, _entry: &Entry) -> Option<RelativePath> {
        None
    }

    async fn file(&self, _pathname: &RelativePath) -> ndcb_fs::Result<Option<File>> {
        Err(broken())
    }

    fn files(&self) -> FileBatches {
        Box::pin(futures::stream::iter([Err(broken())]))
    }

    async fn file_exists(&self, _pathname: &RelativePath) -> ndcb_fs::Result<bool> {
        Err(broken())
    }

    async fn directory_exists(&self, _pathname: &RelativePath) -> ndcb_fs::Result<bool> {
        Err(broken())
    }

    async fn read_file(&self, _pathname: &RelativePath) -> ndcb_fs::Result<Vec<u8>> {
        Err(broken())
    }

    async fn read_text_file(&self, _pathname: &RelativePath) -> ndcb_fs::Result<String> {
        Err(broken())
    }

    async fn read_directory(&self, _pathname: &RelativePath) -> ndcb_fs::Result<Vec<Entry>> {
        Err(broken())
    }
}

fn broken() -> FsError {
    FsError::Io {
        path: abs("/broken"),
        source: io::Error::other("broken layer"),
    }
}

#[tokio::test]
async fn first_layer_error_does_not_hide_later_existence() {
    let (_, good) = two_roots().await;
    let fs = CompositeFileSystem::new(vec![Arc::new(Broken), Arc::new(good)]);

    assert!(fs.file_exists(&pathname("index.md")).await.unwrap());
    assert!(fs.directory_exists(&pathname("posts")).await.unwrap());
    // content reads respect precedence, so the broken layer's error surfaces
    assert!(fs.read_file(&pathname("index.md")).await.is_err());
}

#[tokio::test]
async fn file_batches_carry_layer_errors() {
    let (_, good) = two_roots().await;
    let fs = CompositeFileSystem::new(vec![Arc::new(Broken), Arc::new(good)]);

    assert!(fs.collect_files().await.is_err());
}

/// Claims every file, but the file is gone by the time it is read.
struct Vanishing;

#[async_trait]
impl FileSystem for Vanishing {
    fn pathname(&self, _entry: &Entry) -> Option<RelativePath> {
        None
    }

    async fn file(&self, _pathname: &RelativePath) -> ndcb_fs::Result<Option<File>> {
        Ok(None)
    }

    fn files(&self) -> FileBatches {
        Box::pin(futures::stream::empty())
    }

    async fn file_exists(&self, _pathname: &RelativePath) -> ndcb_fs::Result<bool> {
        Ok(true)
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
async fn file_removed_after_existence_check_fails_the_read() {
    let (_, good) = two_roots().await;
    let fs = CompositeFileSystem::new(vec![Arc::new(Vanishing), Arc::new(good)]);

    // the later layer still has index.md, but the claimant's failure wins
    let err = fs.read_file(&pathname("index.md")).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(fs.read_text_file(&pathname("index.md")).await.is_err());
}
