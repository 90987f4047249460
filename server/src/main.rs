use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use socialsphere_server::middleware::JwtAuthMiddleware;
use socialsphere_server::security::jwt::JwtKeys;
use socialsphere_server::{handlers, Config};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn health(pool: web::Data<PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "socialsphere-server",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "socialsphere-server"
        })),
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting socialsphere-server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Connection pool
    let pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {}", e);
            eprintln!("ERROR: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // Apply embedded migrations
    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::error!("Migration failed: {}", e);
        eprintln!("ERROR: Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Connected to database, schema up to date");

    let jwt_keys = JwtKeys::new(&config.auth.jwt_secret, config.auth.token_ttl_secs);
    let bind_address = format!("{}:{}", config.app.host, config.app.port);

    tracing::info!("Starting HTTP server at {}", bind_address);

    let cors_origins = config.app.cors_origins.clone();
    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in cors_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(jwt_keys.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/health", web::get().to(health))
            .service(
                web::scope("/api")
                    .wrap(JwtAuthMiddleware)
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(handlers::auth::register))
                            .route("/login", web::post().to(handlers::auth::login)),
                    )
                    .service(
                        web::scope("/posts")
                            .route("", web::get().to(handlers::posts::list_posts))
                            .route("", web::post().to(handlers::posts::create_post))
                            .route("/{id}/like", web::post().to(handlers::posts::like_post))
                            .route("/{id}", web::get().to(handlers::posts::get_post))
                            .route("/{id}", web::put().to(handlers::posts::update_post))
                            .route("/{id}", web::delete().to(handlers::posts::delete_post)),
                    )
                    .service(
                        web::scope("/comments")
                            .route(
                                "/comment/{id}",
                                web::put().to(handlers::comments::update_comment),
                            )
                            .route(
                                "/comment/{id}",
                                web::delete().to(handlers::comments::delete_comment),
                            )
                            .route("/{post_id}", web::get().to(handlers::comments::list_comments))
                            .route("/{post_id}", web::post().to(handlers::comments::add_comment)),
                    )
                    .service(
                        web::scope("/messages")
                            .route("", web::post().to(handlers::messages::send_message))
                            .route(
                                "/{user_id}",
                                web::get().to(handlers::messages::get_conversation),
                            ),
                    )
                    .service(
                        // Fixed-path routes must be registered before the
                        // generic /{id} catch-all.
                        web::scope("/users")
                            .route("/search", web::get().to(handlers::users::search_users))
                            .route("/profile", web::put().to(handlers::users::update_profile))
                            .route(
                                "/profile/photo",
                                web::post().to(handlers::users::upload_profile_photo),
                            )
                            .route(
                                "/profile/banner",
                                web::post().to(handlers::users::upload_banner_photo),
                            )
                            .route("/friends", web::get().to(handlers::users::get_friends))
                            .route(
                                "/requests",
                                web::get().to(handlers::users::get_friend_requests),
                            )
                            .route(
                                "/request/{id}",
                                web::post().to(handlers::users::send_friend_request),
                            )
                            .route(
                                "/accept/{id}",
                                web::post().to(handlers::users::accept_friend_request),
                            )
                            .route(
                                "/reject/{id}",
                                web::post().to(handlers::users::reject_friend_request),
                            )
                            .route(
                                "/remove/{id}",
                                web::post().to(handlers::users::remove_friend),
                            )
                            .route("/{id}", web::get().to(handlers::users::get_profile)),
                    )
                    .service(
                        web::scope("/notifications")
                            .route(
                                "",
                                web::get().to(handlers::notifications::list_notifications),
                            )
                            .route(
                                "/{id}/read",
                                web::put().to(handlers::notifications::mark_as_read),
                            ),
                    )
                    .service(
                        web::scope("/media")
                            .route("/{id}", web::get().to(handlers::media::get_media)),
                    ),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
