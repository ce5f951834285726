//! ndcb-router: from request pathnames to source files.
//!
//! A request for `/posts/hello` may be served by `posts/hello`,
//! `posts/hello.html`, `posts/hello.md`, `posts/hello/index.html` or
//! `posts/hello/index.md`. The [`Router`] enumerates those candidates in a
//! fixed precedence order and probes a [`ndcb_fs::FileSystem`] for the
//! first one that exists. It also finds the nearest `404` page for a
//! missing pathname and computes the output pathname for a source.

mod extensions;
mod router;

pub use extensions::{ExtensionMap, ExtensionMapping, RouterConfig};
pub use router::{Router, query_pathname};
