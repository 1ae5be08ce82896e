//! File serving for `/static/*` and, in debug runs, `/media/*`.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Path as UrlPath, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use gpt_resume::config::StorageConfig;
use tracing::{debug, warn};

/// Static files are always served; media uploads only while the debug flag is on.
pub(crate) fn asset_router(storage: &StorageConfig) -> Router {
    let router = Router::new().route(
        "/static/*path",
        get(serve_file).with_state(Arc::new(storage.static_root.clone())),
    );

    if storage.debug {
        router.route(
            "/media/*path",
            get(serve_file).with_state(Arc::new(storage.media_root.clone())),
        )
    } else {
        router
    }
}

/// Joins a request path onto `root`, refusing anything that could leave it.
pub(crate) fn resolve(root: &Path, requested: &str) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();
    let mut segments = 0;
    for component in Path::new(requested).components() {
        match component {
            Component::Normal(segment) => {
                resolved.push(segment);
                segments += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (segments > 0).then_some(resolved)
}

async fn serve_file(State(root): State<Arc<PathBuf>>, UrlPath(requested): UrlPath<String>) -> Response {
    let Some(path) = resolve(&root, &requested) else {
        warn!(%requested, "rejected asset path");
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                bytes,
            )
                .into_response()
        }
        Err(err) => {
            debug!(path = %path.display(), error = %err, "asset unavailable");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_refuses_traversal() {
        let root = Path::new("/srv/media");
        assert_eq!(
            resolve(root, "resume/cv.pdf"),
            Some(PathBuf::from("/srv/media/resume/cv.pdf"))
        );
        assert_eq!(
            resolve(root, "./resume/cv.pdf"),
            Some(PathBuf::from("/srv/media/resume/cv.pdf"))
        );
        assert_eq!(resolve(root, "../secrets.txt"), None);
        assert_eq!(resolve(root, "resume/../../etc/passwd"), None);
        assert_eq!(resolve(root, "/etc/passwd"), None);
        assert_eq!(resolve(root, ""), None);
    }
}
