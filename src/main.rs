mod api;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::env;
use utils::error::AppError;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Get configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let mongodb_url = env::var("MONGODB_URL").expect("MONGODB_URL must be set");

    log::info!("🚀 Starting Check Out Buddy service...");

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&mongodb_url)
        .await
        .expect("Failed to connect to MongoDB");

    let db_data = web::Data::new(db);

    log::info!("✅ MongoDB connected successfully");

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        // Malformed JSON bodies get the same error envelope as everything else
        let json_config = web::JsonConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into());

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(json_config)
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi),
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Auth endpoints (public)
            .service(
                web::scope("/api/auth")
                    .route("/register", web::post().to(api::auth::register))
                    .route("/login", web::post().to(api::auth::login))
                    .route("/verify_email_code", web::post().to(api::auth::verify_email_code))
                    .route("/verify_reset_code", web::post().to(api::auth::verify_reset_code))
                    .route("/forgot_password", web::patch().to(api::auth::forgot_password))
                    .route("/reset_password", web::patch().to(api::auth::reset_password))
                    .route(
                        "/resend_verification_code",
                        web::patch().to(api::auth::resend_verification_code),
                    )
                    .route(
                        "/resend_password_code",
                        web::patch().to(api::auth::resend_password_code),
                    ),
            )
            // Payments (public: the client needs an intent before checkout)
            .service(
                web::scope("/api/payments")
                    .route("/intents", web::post().to(api::payments::create_intent)),
            )
            // Users (JWT or guest)
            .service(
                web::scope("/api/users")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("", web::get().to(api::users::get_all_users))
                    .route("/{id}", web::get().to(api::users::get_user))
                    .route("/{id}", web::patch().to(api::users::update_user))
                    .route("/{id}", web::delete().to(api::users::delete_user)),
            )
            // Orders (JWT or guest)
            .service(
                web::scope("/api/orders")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("", web::get().to(api::orders::get_all_orders))
                    .route("", web::post().to(api::orders::create_order))
                    .route("/{orderId}", web::get().to(api::orders::get_order))
                    .route("/{orderId}", web::delete().to(api::orders::delete_order)),
            )
            // Receipts (JWT; guests are rejected in the handlers)
            .service(
                web::scope("/api/receipt")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("", web::post().to(api::receipt::send_receipt))
                    .route(
                        "/attachment",
                        web::post().to(api::receipt::send_receipt_attachment),
                    ),
            )
            // Scanning: nearbystores is public, the rest requires JWT or guest.
            // Literal segments are registered before the catch-all /{id}.
            .service(
                web::scope("/api/scanned")
                    .route(
                        "/nearbystores",
                        web::get().to(api::scanned::find_nearby_stores),
                    )
                    .service(
                        web::resource("")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route(web::get().to(api::scanned::get_all_scanned))
                            .route(web::post().to(api::scanned::scan_barcode)),
                    )
                    .service(
                        web::resource("/users/{userId}")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route(web::get().to(api::scanned::get_scanned_by_user)),
                    )
                    .service(
                        web::resource("/barcode/{barcode}")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route(web::post().to(api::scanned::get_scanned_by_barcode)),
                    )
                    .service(
                        web::resource("/{id}")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route(web::get().to(api::scanned::get_scanned_by_id))
                            .route(web::delete().to(api::scanned::delete_scanned)),
                    ),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
