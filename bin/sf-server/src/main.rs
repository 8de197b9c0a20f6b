//! SkillForge LMS Server
//!
//! Production server for the LMS REST and GraphQL APIs:
//! - Catalog APIs: courses, chapters, lessons, categories
//! - Learning APIs: enrollments, progress
//! - Commerce APIs: checkout, payment webhook
//! - Media, messaging, analytics, admin, and auth APIs
//!
//! Configuration comes from config.toml plus SKILLFORGE_* environment
//! overrides (see sf-config). Key variables:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SKILLFORGE_HTTP_PORT` | `8080` | HTTP API port |
//! | `SKILLFORGE_METRICS_PORT` | `9090` | Metrics/health port |
//! | `SKILLFORGE_MONGODB_URI` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `SKILLFORGE_OIDC_ISSUER` | - | Hosted IdP issuer URL |
//! | `SKILLFORGE_PAYMENTS_SECRET_KEY` | - | Payment processor API key |
//! | `SKILLFORGE_STORAGE_BUCKET` | `skillforge-media` | Media bucket |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;
use axum::{routing::get, Router};
use utoipa_axum::router::OpenApiRouter;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use anyhow::Result;
use tracing::{info, warn};
use tokio::{signal, net::TcpListener};
use utoipa_swagger_ui::SwaggerUi;

use sf_config::AppConfig;
use sf_platform::api::{
    analytics_router, audit_logs_router, auth_router, build_schema, categories_router,
    chapters_router, conversations_router, courses_router, enrollments_router, graphql_router,
    health_router, lessons_router, media_router, payments_router, principals_router,
    progress_router, roles_router,
    AnalyticsState, AppState, AuditLogsState, AuthApiState, AuthLayer, CategoriesState,
    ChaptersState, ConversationsState, CoursesState, EnrollmentsState, GraphQLContext,
    HealthState, LessonsState, MediaState, PaymentsState, PrincipalsState, ProgressState,
    RolesState, SessionCookieSettings,
};
use sf_platform::auth::oidc_service::OidcProviderConfig;
use sf_platform::media::storage::StorageConfig;
use sf_platform::operations::{
    ArchiveCourseUseCase, CreateCourseUseCase, EnrollUseCase, FulfillCheckoutUseCase,
    PublishCourseUseCase, RevokeEnrollmentUseCase, UnpublishCourseUseCase, UpdateCourseUseCase,
};
use sf_platform::payment::client::PaymentConfig;
use sf_platform::seed::DevDataSeeder;
use sf_platform::shared::mailer::MailerConfig;
use sf_platform::{
    AnalyticsService, AuditLogRepository, AuditService, AuthService, AuthorizationService,
    CategoryRepository, ChapterRepository, CheckoutRepository, ConversationRepository,
    CourseRepository, EnrollmentRepository, LessonRepository, Mailer, MediaAssetRepository,
    MessageRepository, MongoUnitOfWork, OidcService, PaymentClient, PrincipalRepository,
    ProgressRepository, RoleRepository, RoleSyncService, StorageService,
    auth::login_state_repository::OidcLoginStateRepository,
};

#[tokio::main]
async fn main() -> Result<()> {
    sf_common::logging::init_logging("sf-server");

    info!("Starting SkillForge LMS Server");

    let config = AppConfig::load()?;

    // Connect to MongoDB
    info!("Connecting to MongoDB: {}/{}", config.mongodb.uri, config.mongodb.database);
    let mongo_client = mongodb::Client::with_uri_str(&config.mongodb.uri).await?;
    let db = mongo_client.database(&config.mongodb.database);

    // Seed development data if in dev mode
    if config.dev_mode {
        let seeder = DevDataSeeder::new(db.clone());
        if let Err(e) = seeder.seed().await {
            warn!("Dev data seeding skipped (data may already exist): {}", e);
        }
    }

    // Initialize repositories
    let course_repo = Arc::new(CourseRepository::new(&db));
    let category_repo = Arc::new(CategoryRepository::new(&db));
    let chapter_repo = Arc::new(ChapterRepository::new(&db));
    let lesson_repo = Arc::new(LessonRepository::new(&db));
    let enrollment_repo = Arc::new(EnrollmentRepository::new(&db));
    let progress_repo = Arc::new(ProgressRepository::new(&db));
    let conversation_repo = Arc::new(ConversationRepository::new(&db));
    let message_repo = Arc::new(MessageRepository::new(&db));
    let media_repo = Arc::new(MediaAssetRepository::new(&db));
    let checkout_repo = Arc::new(CheckoutRepository::new(&db));
    let principal_repo = Arc::new(PrincipalRepository::new(&db));
    let role_repo = Arc::new(RoleRepository::new(&db));
    let audit_log_repo = Arc::new(AuditLogRepository::new(&db));
    let login_state_repo = Arc::new(OidcLoginStateRepository::new(&db));
    info!("Repositories initialized");

    // Sync code-defined roles to database
    {
        let role_sync = RoleSyncService::new(RoleRepository::new(&db));
        if let Err(e) = role_sync.sync_code_defined_roles().await {
            warn!("Role sync failed: {}", e);
        }
    }

    // Initialize auth (load or generate RSA keys)
    let (private_key, public_key) = sf_platform::auth::auth_service::AuthConfig::load_or_generate_rsa_keys(
        Some(config.auth.jwt.private_key_path.as_str()),
        Some(config.auth.jwt.public_key_path.as_str()),
    )?;

    let auth_config = sf_platform::auth::auth_service::AuthConfig {
        rsa_private_key: Some(private_key),
        rsa_public_key: Some(public_key),
        secret_key: String::new(),
        issuer: config.auth.jwt.issuer.clone(),
        audience: "skillforge".to_string(),
        session_token_expiry_secs: config.auth.jwt.session_token_expiry_secs as i64,
    };
    let auth_service = Arc::new(AuthService::new(auth_config));
    let authz_service = Arc::new(AuthorizationService::new(role_repo.clone()));
    let audit_service = Arc::new(AuditService::new(audit_log_repo.clone()));

    // Register the hosted identity provider
    let oidc_service = Arc::new(OidcService::new());
    if config.oidc.issuer.is_empty() {
        warn!("No OIDC issuer configured; login endpoints will reject requests");
    } else {
        let idp_adapter = sf_platform::idp::adapter_for(&config.oidc.provider);
        let provider_config = OidcProviderConfig {
            provider_id: config.oidc.provider.clone(),
            client_id: config.oidc.client_id.clone(),
            client_secret: Some(config.oidc.client_secret.clone()),
            issuer_url: config.oidc.issuer.clone(),
            scopes: idp_adapter.required_scopes(),
            redirect_uri: format!("{}{}", config.auth.external_base, config.oidc.redirect_path),
        };
        if let Err(e) = oidc_service.register_provider(provider_config).await {
            warn!("Failed to register OIDC provider (login disabled): {}", e);
        }
    }
    info!("Auth services initialized");

    // Payment client (optional: paid courses require it)
    let payment_client = if config.payments.secret_key.is_empty() {
        warn!("Payments not configured; paid courses cannot be published");
        None
    } else {
        Some(Arc::new(PaymentClient::new(PaymentConfig {
            api_base: config.payments.api_base.clone(),
            secret_key: config.payments.secret_key.clone(),
            success_url: config.payments.success_url.clone(),
            cancel_url: config.payments.cancel_url.clone(),
        })))
    };

    // Object storage for the media library
    let storage = Arc::new(StorageService::new(StorageConfig {
        bucket: config.storage.bucket.clone(),
        region: config.storage.region.clone(),
        endpoint: if config.storage.endpoint.is_empty() {
            None
        } else {
            Some(config.storage.endpoint.clone())
        },
        presign_expiry_secs: config.storage.presign_expiry_secs,
        max_upload_bytes: config.storage.max_upload_bytes,
    }).await);

    // Mailer for message notifications and receipts
    let mailer = Arc::new(Mailer::new(MailerConfig {
        enabled: config.email.enabled,
        smtp_host: config.email.smtp_host.clone(),
        smtp_port: config.email.smtp_port,
        smtp_username: config.email.smtp_username.clone(),
        smtp_password: config.email.smtp_password.clone(),
        from_address: config.email.from_address.clone(),
    }));

    // Create AppState
    let app_state = AppState {
        auth_service: auth_service.clone(),
        authz_service,
    };

    // Create UnitOfWork for atomic commits with events and audit logs
    let unit_of_work = Arc::new(MongoUnitOfWork::new(mongo_client.clone(), db.clone()));

    // Course use cases
    let create_course = Arc::new(CreateCourseUseCase::new(course_repo.clone(), unit_of_work.clone()));
    let update_course = Arc::new(UpdateCourseUseCase::new(course_repo.clone(), unit_of_work.clone()));
    let publish_course = Arc::new(PublishCourseUseCase::new(
        course_repo.clone(),
        chapter_repo.clone(),
        lesson_repo.clone(),
        payment_client.clone(),
        unit_of_work.clone(),
    ));
    let unpublish_course = Arc::new(UnpublishCourseUseCase::new(course_repo.clone(), unit_of_work.clone()));
    let archive_course = Arc::new(ArchiveCourseUseCase::new(
        course_repo.clone(),
        enrollment_repo.clone(),
        unit_of_work.clone(),
    ));

    // Enrollment use cases
    let enroll = Arc::new(EnrollUseCase::new(
        enrollment_repo.clone(),
        course_repo.clone(),
        unit_of_work.clone(),
    ));
    let revoke_enrollment = Arc::new(RevokeEnrollmentUseCase::new(
        enrollment_repo.clone(),
        unit_of_work.clone(),
    ));

    // Payment fulfillment use case
    let fulfill_checkout = Arc::new(FulfillCheckoutUseCase::new(
        checkout_repo.clone(),
        enrollment_repo.clone(),
        unit_of_work.clone(),
    ));

    // Analytics
    let analytics = Arc::new(AnalyticsService::new(
        course_repo.clone(),
        lesson_repo.clone(),
        enrollment_repo.clone(),
        checkout_repo.clone(),
        progress_repo.clone(),
    ));

    // Build API states
    let courses_state = CoursesState {
        course_repo: course_repo.clone(),
        create_use_case: create_course,
        update_use_case: update_course,
        publish_use_case: publish_course,
        unpublish_use_case: unpublish_course,
        archive_use_case: archive_course,
    };
    let categories_state = CategoriesState {
        category_repo: category_repo.clone(),
        course_repo: course_repo.clone(),
        audit_service: audit_service.clone(),
    };
    let chapters_state = ChaptersState {
        chapter_repo: chapter_repo.clone(),
        course_repo: course_repo.clone(),
        lesson_repo: lesson_repo.clone(),
        audit_service: audit_service.clone(),
    };
    let lessons_state = LessonsState {
        lesson_repo: lesson_repo.clone(),
        chapter_repo: chapter_repo.clone(),
        course_repo: course_repo.clone(),
        media_repo: media_repo.clone(),
        audit_service: audit_service.clone(),
    };
    let enrollments_state = EnrollmentsState {
        enrollment_repo: enrollment_repo.clone(),
        course_repo: course_repo.clone(),
        enroll_use_case: enroll,
        revoke_use_case: revoke_enrollment,
    };
    let progress_state = ProgressState {
        progress_repo: progress_repo.clone(),
        lesson_repo: lesson_repo.clone(),
        chapter_repo: chapter_repo.clone(),
        enrollment_repo: enrollment_repo.clone(),
    };
    let conversations_state = ConversationsState {
        conversation_repo: conversation_repo.clone(),
        message_repo: message_repo.clone(),
        course_repo: course_repo.clone(),
        enrollment_repo: enrollment_repo.clone(),
        principal_repo: principal_repo.clone(),
        mailer: mailer.clone(),
    };
    let media_state = MediaState {
        media_repo: media_repo.clone(),
        lesson_repo: lesson_repo.clone(),
        storage,
        audit_service: audit_service.clone(),
    };
    let payments_state = PaymentsState {
        checkout_repo: checkout_repo.clone(),
        course_repo: course_repo.clone(),
        enrollment_repo: enrollment_repo.clone(),
        principal_repo: principal_repo.clone(),
        payment_client,
        fulfill_use_case: fulfill_checkout,
        mailer,
        webhook_secret: config.payments.webhook_secret.clone(),
    };
    let analytics_state = AnalyticsState {
        analytics,
        course_repo: course_repo.clone(),
    };
    let principals_state = PrincipalsState {
        principal_repo: principal_repo.clone(),
        audit_service: audit_service.clone(),
    };
    let roles_state = RolesState { role_repo };
    let audit_logs_state = AuditLogsState { audit_log_repo };

    let auth_api_state = AuthApiState {
        oidc_service,
        login_state_repo,
        principal_repo: principal_repo.clone(),
        auth_service,
        audit_service,
        idp_adapter: Arc::from(sf_platform::idp::adapter_for(&config.oidc.provider)),
        provider_id: config.oidc.provider.clone(),
        cookie: SessionCookieSettings {
            name: config.auth.session.cookie_name.clone(),
            secure: config.auth.session.secure,
            same_site: config.auth.session.same_site.clone(),
            max_age_secs: config.auth.jwt.session_token_expiry_secs as i64,
        },
        external_base: config.auth.external_base.clone(),
    };

    // GraphQL schema over the same repositories
    let graphql_schema = build_schema(GraphQLContext {
        course_repo,
        chapter_repo,
        lesson_repo,
        enrollment_repo,
        progress_repo,
        conversation_repo,
        message_repo,
    });

    // Build the API router with auto-collected OpenAPI paths
    let (router, mut openapi) = OpenApiRouter::new()
        .nest("/api/categories", categories_router(categories_state))
        .nest("/api/courses/:course_id/chapters", chapters_router(chapters_state))
        .nest("/api/chapters/:chapter_id/lessons", lessons_router(lessons_state))
        .nest("/api/progress", progress_router(progress_state))
        .nest("/api/conversations", conversations_router(conversations_state))
        .nest("/api/media", media_router(media_state))
        .nest("/api/analytics", analytics_router(analytics_state))
        .nest("/api/admin/principals", principals_router(principals_state))
        .nest("/api/admin/roles", roles_router(roles_state))
        .nest("/api/admin/audit-logs", audit_logs_router(audit_logs_state))
        .split_for_parts();

    // Add missing schemas that are referenced but not auto-collected (e.g., from #[serde(flatten)])
    use utoipa::openapi::{ObjectBuilder, schema::Type};
    if let Some(components) = openapi.components.as_mut() {
        // PaginationParams is used in query params with #[serde(flatten)]
        components.schemas.insert(
            "PaginationParams".to_string(),
            ObjectBuilder::new()
                .property("page", ObjectBuilder::new().schema_type(Type::Integer))
                .property("limit", ObjectBuilder::new().schema_type(Type::Integer))
                .into(),
        );
    }

    openapi.info.title = "SkillForge LMS API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description = Some("REST APIs for courses, enrollment, payments, and analytics".to_string());

    let cors = if config.http.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = config.http.cors_origins.iter()
            .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    };

    let health_state = HealthState::new(Some(db.clone()), Some(env!("CARGO_PKG_VERSION").to_string()));
    health_state.set_ready();

    let app = Router::new()
        .merge(router)
        // Routes that return regular Router (not collected in OpenAPI)
        .nest("/api/courses", courses_router(courses_state))
        .nest("/api/enrollments", enrollments_router(enrollments_state))
        .nest("/api", payments_router(payments_state))
        .nest("/auth", auth_router(auth_api_state))
        .nest("/graphql", graphql_router(graphql_schema))
        // OpenAPI / Swagger UI with auto-collected paths
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        // Auth middleware
        .layer(AuthLayer::new(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start API server
    let api_addr = format!("{}:{}", config.http.host, config.http.port);
    info!("API server listening on http://{}", api_addr);

    let api_listener = TcpListener::bind(&api_addr).await?;
    let api_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(api_listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    // Start metrics/health server
    let metrics_addr = format!("{}:{}", config.http.host, config.http.metrics_port);
    info!("Metrics server listening on http://{}/metrics", metrics_addr);

    let metrics_app = Router::new()
        .route("/metrics", get(metrics_handler))
        .nest("/health", health_router(health_state));

    let metrics_listener = TcpListener::bind(&metrics_addr).await?;
    let metrics_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, metrics_app).await {
            tracing::error!("Metrics server error: {}", e);
        }
    });

    info!("SkillForge LMS Server started");
    info!("Press Ctrl+C to shutdown");

    // Wait for shutdown
    shutdown_signal().await;
    info!("Shutdown signal received...");

    api_task.abort();
    metrics_task.abort();

    info!("SkillForge LMS Server shutdown complete");
    Ok(())
}

async fn metrics_handler() -> &'static str {
    "# HELP sf_server_up Server is up\n# TYPE sf_server_up gauge\nsf_server_up 1\n"
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
