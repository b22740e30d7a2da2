use tracing::error;

use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::router::catalogue::{Catalogue, File};

const HTML: &str = "text/html; charset=UTF-8";

const WELCOME_PAGE: &str = "<html>\
<head><title>lantern</title></head>\
<body><h1>It works!</h1><p>Put an index.html in the document root to replace this page.</p></body>\
</html>";

const NOT_FOUND_PAGE: &str = "<html>\
<head><title>404 - Not Found</title></head>\
<body><h1>Nothing here</h1><h2>Page Not Found</h2><hr /></body>\
</html>";

/// Handler for a registered route.
pub type Handler = fn(&Request, &Catalogue) -> Response;

/// `GET /`: the root `index.html` when catalogued, else a welcome page.
pub fn home(_req: &Request, catalogue: &Catalogue) -> Response {
    match catalogue.get(&catalogue.local_path("/index.html")) {
        Some(file) => serve_file(file),
        None => Response::with_content(StatusCode::Ok, HTML, WELCOME_PAGE.as_bytes().to_vec()),
    }
}

pub fn not_found(_req: &Request, _catalogue: &Catalogue) -> Response {
    Response::with_content(
        StatusCode::NotFound,
        HTML,
        NOT_FOUND_PAGE.as_bytes().to_vec(),
    )
}

/// Reads `file` from disk into a 200 response.
pub fn serve_file(file: &File) -> Response {
    match file.read_content() {
        Ok(body) => Response::with_content(StatusCode::Ok, file.content_type(), body),
        Err(e) => {
            error!(path = %file.path, error = %e, "Unable to read catalogued file");
            Response::internal_error()
        }
    }
}
