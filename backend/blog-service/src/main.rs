use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use blog_service::{db, handlers, jobs, middleware, Config};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn health_summary(pool: web::Data<sqlx::PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "blog-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "blog-service"
        })),
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("info,sqlx=warn")
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Invalid config: {}", e)))?;

    match &config.identity.public_key_pem {
        Some(pem) => {
            middleware::initialize_identity_key(pem).map_err(|e| {
                io::Error::new(io::ErrorKind::Other, format!("Identity key error: {}", e))
            })?;
            tracing::info!("Identity token verification enabled");
        }
        None => {
            tracing::warn!(
                "JWT_PUBLIC_KEY_PEM not set; all requests will resolve to the anonymous identity"
            );
        }
    }

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("Failed to connect to PostgreSQL: {}", e),
            )
        })?;

    db::ensure_tables(&db_pool).await.map_err(|e| {
        io::Error::new(io::ErrorKind::Other, format!("Failed to ensure schema: {}", e))
    })?;

    // One-shot deferred publications run on their own task; the publish
    // operation is idempotent, so the loop tolerates overlap with manual
    // publishes and restarts.
    let scheduler_pool = db_pool.clone();
    let poll_interval = Duration::from_secs(config.publish.poll_interval_secs);
    tokio::spawn(async move {
        jobs::start_publish_scheduler(scheduler_pool, poll_interval).await;
    });

    let http_bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!(address = %http_bind_address, "Starting blog-service HTTP server");

    let config_data = web::Data::new(config.clone());
    let db_pool_http = db_pool.clone();
    let allowed_origins = config.cors.allowed_origins.clone();

    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(web::Data::new(db_pool_http.clone()))
            .app_data(config_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/health", web::get().to(health_summary))
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/posts")
                            .service(
                                web::resource("")
                                    .route(web::get().to(handlers::list_posts))
                                    .route(web::post().to(handlers::create_post)),
                            )
                            .route("/published", web::get().to(handlers::list_published))
                            .route("/drafts", web::get().to(handlers::list_drafts))
                            .service(
                                web::resource("/{post_id}")
                                    .route(web::get().to(handlers::get_post))
                                    .route(web::patch().to(handlers::update_post))
                                    .route(web::delete().to(handlers::delete_post)),
                            )
                            .route("/{post_id}/publish", web::post().to(handlers::publish_post))
                            .service(
                                web::resource("/{post_id}/comments")
                                    .route(web::get().to(handlers::list_post_comments))
                                    .route(web::post().to(handlers::create_comment)),
                            ),
                    )
                    .service(
                        web::scope("/comments").service(
                            web::resource("/{comment_id}")
                                .route(web::patch().to(handlers::update_comment))
                                .route(web::delete().to(handlers::delete_comment)),
                        ),
                    ),
            )
    })
    .bind(&http_bind_address)?
    .run()
    .await
}
