use std::fs;

use lantern::http::parser::parse_http_request;
use lantern::http::request::{Method, Request};
use lantern::http::response::{Response, StatusCode};
use lantern::router::{Catalogue, File, Router, content_type_for};
use tempfile::TempDir;

const INDEX: &[u8] = b"<html><body>home</body></html>";

fn docroot() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), INDEX).unwrap();
    fs::write(dir.path().join("style.css"), b"body { color: red; }").unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs").join("index.html"), b"<p>docs</p>").unwrap();
    fs::write(dir.path().join("docs").join("logo.jpeg"), [0xffu8, 0xd8, 0xff]).unwrap();
    fs::write(dir.path().join("notes"), b"plain").unwrap();
    dir
}

fn router_for(dir: &TempDir) -> Router {
    let root = dir.path().to_str().unwrap();
    Router::with_default_routes(Catalogue::load(root, 16).unwrap())
}

fn request(method: &str, path: &str) -> Request {
    parse_http_request(format!("{} {} HTTP/1.1\r\nHost: localhost\r\n\r\n", method, path).as_bytes())
        .unwrap()
}

fn get(path: &str) -> Request {
    request("GET", path)
}

#[test]
fn test_content_type_for_extension() {
    assert_eq!(content_type_for("html"), "text/html; charset=UTF-8");
    assert_eq!(content_type_for("css"), "text/css");
    assert_eq!(content_type_for("js"), "application/javascript");
    assert_eq!(content_type_for("jpg"), "image/jpeg");
    assert_eq!(content_type_for("jpeg"), "image/jpeg");
    assert_eq!(content_type_for("png"), "application/octet-stream");
    assert_eq!(content_type_for(""), "application/octet-stream");
}

#[test]
fn test_file_from_path() {
    let file = File::from_path("./http_docs/css/site.min.css").unwrap();

    assert_eq!(file.fullname, "site.min.css");
    assert_eq!(file.name, "site.min");
    assert_eq!(file.extension, "css");
    assert_eq!(file.path, "./http_docs/css/site.min.css");
}

#[test]
fn test_file_from_path_without_extension() {
    let file = File::from_path("root/a.dir/README").unwrap();

    assert_eq!(file.name, "README");
    assert_eq!(file.extension, "");
}

#[test]
fn test_file_from_path_requires_separator() {
    assert!(File::from_path("index.html").is_err());
}

#[test]
fn test_catalogue_scans_recursively() {
    let dir = docroot();
    let root = dir.path().to_str().unwrap();
    let catalogue = Catalogue::load(root, 4).unwrap();

    assert_eq!(catalogue.len(), 5);
    assert!(catalogue.files().any(|f| f.fullname == "logo.jpeg" && f.extension == "jpeg"));
    assert!(catalogue.get(&format!("{}/docs/logo.jpeg", root)).is_some());
    assert!(catalogue.get(&catalogue.local_path("/style.css")).is_some());
}

#[test]
fn test_catalogue_root_trailing_slash_trimmed() {
    let dir = docroot();
    let root = format!("{}/", dir.path().to_str().unwrap());
    let catalogue = Catalogue::load(&root, 4).unwrap();

    assert_eq!(catalogue.root(), dir.path().to_str().unwrap());
    assert!(catalogue.get(&catalogue.local_path("/index.html")).is_some());
}

#[test]
fn test_catalogue_missing_root_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");

    assert!(Catalogue::load(missing.to_str().unwrap(), 4).is_err());
}

#[test]
fn test_serves_index_with_exact_bytes() {
    let dir = docroot();
    let router = router_for(&dir);

    let response = router.dispatch(&get("/index.html"));

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(
        response.headers.get("Content-Type").unwrap(),
        "text/html; charset=UTF-8"
    );
    assert_eq!(
        response.headers.get("Content-Length").unwrap(),
        &INDEX.len().to_string()
    );
    assert_eq!(response.body, INDEX);
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = docroot();
    let router = router_for(&dir);

    let response = router.dispatch(&get("/missing.html"));

    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(
        response.headers.get("Content-Type").unwrap(),
        "text/html; charset=UTF-8"
    );
    assert!(!response.body.is_empty());
}

#[test]
fn test_directory_falls_back_to_index() {
    let dir = docroot();
    let router = router_for(&dir);

    let response = router.dispatch(&get("/docs/"));

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body, b"<p>docs</p>");
}

#[test]
fn test_directory_without_slash_is_not_found() {
    let dir = docroot();
    let router = router_for(&dir);

    assert_eq!(router.dispatch(&get("/docs")).status, StatusCode::NotFound);
}

#[test]
fn test_index_fallback_only_for_get() {
    let dir = docroot();
    let router = router_for(&dir);
    let req = request("POST", "/docs/");

    assert_eq!(router.dispatch(&req).status, StatusCode::NotFound);
}

#[test]
fn test_query_string_ignored_for_lookup() {
    let dir = docroot();
    let router = router_for(&dir);

    let response = router.dispatch(&get("/style.css?v=3"));

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.headers.get("Content-Type").unwrap(), "text/css");
}

#[test]
fn test_unknown_extension_is_octet_stream() {
    let dir = docroot();
    let router = router_for(&dir);

    let response = router.dispatch(&get("/notes"));

    assert_eq!(
        response.headers.get("Content-Type").unwrap(),
        "application/octet-stream"
    );
}

#[test]
fn test_root_route_serves_index() {
    let dir = docroot();
    let router = router_for(&dir);

    let response = router.dispatch(&get("/"));

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body, INDEX);
}

#[test]
fn test_root_route_ignores_query_string() {
    let dir = tempfile::tempdir().unwrap();
    let router = router_for(&dir);

    let response = router.dispatch(&get("/?x=1"));

    assert_eq!(response.status, StatusCode::Ok);
    assert!(String::from_utf8(response.body).unwrap().contains("It works!"));
}

#[test]
fn test_registered_route_matches_without_query() {
    let dir = docroot();
    let mut router = router_for(&dir);

    router.register(Method::GET, "/brew", teapot);

    assert_eq!(router.dispatch(&get("/brew?strength=2#top")).body, b"short and stout");
}

#[test]
fn test_root_route_without_index_serves_welcome() {
    let dir = tempfile::tempdir().unwrap();
    let router = router_for(&dir);

    let response = router.dispatch(&get("/"));

    assert_eq!(response.status, StatusCode::Ok);
    assert!(String::from_utf8(response.body).unwrap().contains("It works!"));
}

#[test]
fn test_file_removed_after_scan_is_server_error() {
    let dir = docroot();
    let router = router_for(&dir);
    fs::remove_file(dir.path().join("style.css")).unwrap();

    let response = router.dispatch(&get("/style.css"));

    assert_eq!(response.status, StatusCode::InternalServerError);
}

fn teapot(_req: &Request, _catalogue: &Catalogue) -> Response {
    Response::with_content(StatusCode::Ok, "text/plain", b"short and stout".to_vec())
}

#[test]
fn test_registered_route_wins() {
    let dir = docroot();
    let mut router = router_for(&dir);

    router.register(Method::GET, "/index.html", teapot);

    let response = router.dispatch(&get("/index.html"));
    assert_eq!(response.body, b"short and stout");
}

#[test]
fn test_route_key_includes_method() {
    let dir = docroot();
    let mut router = Router::new(Catalogue::load(dir.path().to_str().unwrap(), 8).unwrap());

    router.register(Method::POST, "/brew", teapot);

    assert!(router.route(Method::POST, "/brew").is_some());
    assert!(router.route(Method::GET, "/brew").is_none());
    assert_eq!(router.dispatch(&get("/brew")).status, StatusCode::NotFound);
}

#[test]
fn test_reregistering_replaces_handler() {
    let dir = tempfile::tempdir().unwrap();
    let mut router = router_for(&dir);
    assert_eq!(router.route_count(), 1);

    router.register(Method::GET, "/", teapot);

    assert_eq!(router.route_count(), 1);
    assert_eq!(router.dispatch(&get("/")).body, b"short and stout");
}
