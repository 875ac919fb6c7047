//! Server initialization and routing

use crate::api;
use crate::cache::{AppCache, CacheManager, NoOpCache};
use crate::config::Config;
use crate::migration;
use crate::repository::{
    enrollment_request::EnrollmentRequestRepositoryImpl, loyalty_card::LoyaltyCardRepositoryImpl,
    notification::NotificationRepositoryImpl, program_enrollment::ProgramEnrollmentRepositoryImpl,
    relationship::RelationshipRepositoryImpl,
};
use crate::service::{CardService, EnrollmentResponseService, NotificationService};
use crate::state::{HasCards, HasEnrollments, HasNotifications};
use crate::sync::BroadcastSyncPublisher;
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::{mysql::MySqlPoolOptions, MySqlPool};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

type EnrollmentResponseServiceImpl = EnrollmentResponseService<
    EnrollmentRequestRepositoryImpl,
    ProgramEnrollmentRepositoryImpl,
    LoyaltyCardRepositoryImpl,
    RelationshipRepositoryImpl,
    NotificationRepositoryImpl,
    BroadcastSyncPublisher,
    AppCache,
>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: MySqlPool,
    pub cache: Arc<AppCache>,
    pub sync_publisher: Arc<BroadcastSyncPublisher>,
    pub enrollment_response_service: Arc<EnrollmentResponseServiceImpl>,
    pub card_service: Arc<CardService<LoyaltyCardRepositoryImpl, AppCache>>,
    pub notification_service: Arc<NotificationService<NotificationRepositoryImpl>>,
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Wire repositories and services over a connected pool
    pub fn new(
        config: Config,
        db_pool: MySqlPool,
        cache: AppCache,
        prometheus: Option<PrometheusHandle>,
    ) -> Self {
        let cache = Arc::new(cache);
        let sync_publisher = Arc::new(BroadcastSyncPublisher::new(
            config.app.sync_channel_capacity,
        ));

        let request_repo = Arc::new(EnrollmentRequestRepositoryImpl::new(db_pool.clone()));
        let membership_repo = Arc::new(ProgramEnrollmentRepositoryImpl::new(db_pool.clone()));
        let card_repo = Arc::new(LoyaltyCardRepositoryImpl::new(db_pool.clone()));
        let relationship_repo = Arc::new(RelationshipRepositoryImpl::new(db_pool.clone()));
        let notification_repo = Arc::new(NotificationRepositoryImpl::new(db_pool.clone()));

        let card_service = Arc::new(CardService::new(
            card_repo,
            cache.clone(),
            config.app.card_number_prefix.clone(),
            Duration::from_secs(config.app.card_list_ttl_secs),
        ));
        let notification_service = Arc::new(NotificationService::new(notification_repo));
        let enrollment_response_service = Arc::new(EnrollmentResponseService::new(
            request_repo,
            membership_repo,
            card_service.clone(),
            relationship_repo,
            notification_service.clone(),
            sync_publisher.clone(),
        ));

        Self {
            config: Arc::new(config),
            db_pool,
            cache,
            sync_publisher,
            enrollment_response_service,
            card_service,
            notification_service,
            prometheus,
        }
    }
}

impl HasEnrollments for AppState {
    type RequestRepo = EnrollmentRequestRepositoryImpl;
    type MembershipRepo = ProgramEnrollmentRepositoryImpl;
    type CardRepo = LoyaltyCardRepositoryImpl;
    type RelationshipRepo = RelationshipRepositoryImpl;
    type NotificationRepo = NotificationRepositoryImpl;
    type SyncPublisher = BroadcastSyncPublisher;
    type Cache = AppCache;

    fn config(&self) -> &Config {
        &self.config
    }

    fn enrollment_response_service(&self) -> &EnrollmentResponseServiceImpl {
        &self.enrollment_response_service
    }
}

impl HasCards for AppState {
    type CardRepo = LoyaltyCardRepositoryImpl;
    type Cache = AppCache;

    fn card_service(&self) -> &CardService<Self::CardRepo, Self::Cache> {
        &self.card_service
    }
}

impl HasNotifications for AppState {
    type NotificationRepo = NotificationRepositoryImpl;

    fn notification_service(&self) -> &NotificationService<Self::NotificationRepo> {
        &self.notification_service
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health::health))
        .route("/ready", get(api::health::ready))
        .route("/metrics", get(api::metrics::render))
        .route(
            "/api/v1/enrollment-requests/{id}",
            get(api::enrollment::get::<AppState>),
        )
        .route(
            "/api/v1/enrollment-requests/{id}/respond",
            post(api::enrollment::respond::<AppState>),
        )
        .route(
            "/api/v1/customers/{customer_id}/cards",
            get(api::card::list_for_customer::<AppState>),
        )
        .route(
            "/api/v1/customers/{recipient_id}/notifications",
            get(api::notification::list_for_recipient::<AppState>),
        )
        .route(
            "/api/v1/notifications/{id}/read",
            post(api::notification::mark_read::<AppState>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(config: Config, prometheus: Option<PrometheusHandle>) -> Result<()> {
    migration::ensure_database_exists(&config).await?;

    let db_pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    migration::run_migrations(&db_pool).await?;

    let cache = if config.redis.enabled {
        AppCache::Redis(CacheManager::new(&config.redis).await?)
    } else {
        info!("Redis disabled, running with no-op cache");
        AppCache::NoOp(NoOpCache)
    };

    let addr = config.http_addr();
    let state = AppState::new(config, db_pool, cache, prometheus);
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
