// server/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{product_handlers, user_handlers, vending_handlers};

// Liveness only; does not touch the store.
async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1") // Base path for API version 1
      .route("/health", web::get().to(health_check_handler))
      // User Routes. `/login` is registered before `/{user_id}` so it is never taken for an id.
      .service(
        web::scope("/users")
          .service(web::resource("/login").route(web::post().to(user_handlers::login_handler)))
          .service(
            web::resource("")
              .route(web::post().to(user_handlers::register_handler))
              .route(web::get().to(user_handlers::list_users_handler)),
          )
          .service(
            web::resource("/{user_id}")
              .route(web::get().to(user_handlers::get_user_handler))
              .route(web::put().to(user_handlers::update_user_handler))
              .route(web::delete().to(user_handlers::delete_user_handler)),
          ),
      )
      // Product Routes
      .service(
        web::scope("/products")
          .service(
            web::resource("")
              .route(web::post().to(product_handlers::create_product_handler))
              .route(web::get().to(product_handlers::list_products_handler)),
          )
          .service(
            web::resource("/{product_id}")
              .route(web::get().to(product_handlers::get_product_handler))
              .route(web::put().to(product_handlers::update_product_handler))
              .route(web::delete().to(product_handlers::delete_product_handler)),
          ),
      )
      // Vending Routes (buyers only)
      .service(
        web::scope("/vending")
          .route("/deposit", web::post().to(vending_handlers::deposit_handler))
          .route("/reset", web::post().to(vending_handlers::reset_handler))
          .route("/buy", web::post().to(vending_handlers::buy_handler)),
      ),
  );
}
