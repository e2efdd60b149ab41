use actix_files as fs;
use actix_web::web;

use crate::websocket::ws_index;

/// HTTP handler for the index page
pub async fn index() -> actix_web::Result<fs::NamedFile> {
    Ok(fs::NamedFile::open_async("./static/index.html").await?)
}

/// Configure the HTTP routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws").route(web::get().to(ws_index)))
        .service(web::resource("/").route(web::get().to(index)))
        .service(fs::Files::new("/static", "./static"));
}
