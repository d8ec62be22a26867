use actix_web::{web, App, HttpServer};
use sea_orm::{ConnectOptions, Database};
use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use migration::{Migrator, MigratorTrait};
use snapvault::{
    identity::{
        adapter::outgoing::jwt::{JwtConfig, JwtIdentityVerifier},
        application::ports::outgoing::IdentityVerifier,
    },
    multimedia::{
        adapter::outgoing::{
            cloud_storage::GcsObjectStore, db::MediaStorePostgres,
            drive::GoogleDriveDocumentService,
        },
        application::{
            domain::policies::MediaPolicy,
            ports::incoming::services::{CommitMediaService, GallerySyncService},
            repair_ledger::RepairLedger,
            MultimediaUseCases,
        },
    },
    shared::api::media_payload_config,
    AppState,
};

#[actix_web::main]
#[cfg(not(tarpaulin_include))]
async fn start() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting application...");

    // Try .env.{environment} first, then fall back to .env
    let rust_env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
    let env_file = format!(".env.{}", rust_env);
    if dotenvy::from_filename(&env_file).is_err() {
        dotenvy::dotenv().ok();
    }

    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL is not set in .env file");
    let host = env::var("HOST").expect("HOST is not set in .env file");
    let port = env::var("PORT").expect("PORT is not set in .env file");
    let server_url = format!("{host}:{port}");

    // Database connection
    let mut opt = ConnectOptions::new(db_url);
    opt.max_connections(20)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(false);

    let conn = Database::connect(opt)
        .await
        .expect("Failed to connect to database");

    if env::var("RUN_MIGRATIONS").as_deref() == Ok("true") {
        Migrator::up(&conn, None)
            .await
            .expect("Failed to run migrations");
        info!("Migrations applied");
    }

    let db_arc = Arc::new(conn);

    // Media adapters and services
    let policy = MediaPolicy::from_env();
    let objects = GcsObjectStore::new(&policy);
    let records = MediaStorePostgres::new(Arc::clone(&db_arc));
    let documents = GoogleDriveDocumentService::new(&policy);
    let ledger = Arc::new(RepairLedger::new());

    let multimedia = MultimediaUseCases {
        commit_media: Arc::new(CommitMediaService::new(
            objects.clone(),
            records.clone(),
            Arc::clone(&ledger),
            policy.clone(),
        )),
        gallery: Arc::new(GallerySyncService::new(
            objects,
            records,
            documents,
            Arc::clone(&ledger),
            policy.clone(),
        )),
    };
    let state = AppState { multimedia };

    let verifier: Arc<dyn IdentityVerifier> =
        Arc::new(JwtIdentityVerifier::new(JwtConfig::from_env()));
    let max_upload_bytes = policy.max_upload_bytes;

    info!("Server run on: {}", server_url);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(Arc::clone(&verifier)))
            .app_data(web::Data::new(Arc::clone(&db_arc)))
            .app_data(media_payload_config(max_upload_bytes))
            .configure(init_routes)
    })
    .bind(server_url)?
    .run()
    .await
}

#[cfg(not(tarpaulin_include))]
fn init_routes(cfg: &mut web::ServiceConfig) {
    // Health
    cfg.service(snapvault::health::health);
    cfg.service(snapvault::health::readiness);
    // Media
    cfg.service(snapvault::multimedia::adapter::incoming::web::routes::upload_media_handler);
    cfg.service(snapvault::multimedia::adapter::incoming::web::routes::list_media_handler);
    cfg.service(snapvault::multimedia::adapter::incoming::web::routes::delete_media_handler);
    cfg.service(snapvault::multimedia::adapter::incoming::web::routes::mirror_media_handler);
}

#[cfg(not(tarpaulin_include))]
fn main() {
    if let Err(e) = start() {
        eprintln!("Error starting app: {e}");
    }
}
