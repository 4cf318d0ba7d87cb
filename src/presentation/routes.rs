use crate::presentation::auth::{login, signup};
use crate::presentation::handlers::ping;
use actix_web::web;

/// Registers every route served by the API. Callers supply the
/// `web::Data<AppState>` and the middleware stack.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(ping)).service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/signup", web::post().to(signup)),
    );
}
