//! SkillForge LMS Platform
//!
//! Core platform providing:
//! - Course authoring (courses, chapters, lessons) with publish lifecycle
//! - Enrollment and per-lesson progress tracking
//! - Checkout and webhook fulfillment against the payment processor
//! - Media library with pre-signed direct-to-storage uploads
//! - Student/instructor messaging
//! - Period-over-period analytics for instructor/admin dashboards
//! - Identity via a hosted OIDC provider with local principals and RBAC
//! - Use Case pattern with guaranteed audit logging
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access
//! - `api` - REST endpoints
//! - `operations` - Use case operations (where applicable)

// Catalog aggregates
pub mod course;
pub mod chapter;
pub mod lesson;

// Learning aggregates
pub mod enrollment;
pub mod progress;

// Communication
pub mod message;

// Media library
pub mod media;

// Commerce
pub mod payment;

// Read-side analytics
pub mod analytics;

// Identity & access
pub mod principal;
pub mod role;
pub mod auth;
pub mod idp;
pub mod audit;

// Event store
pub mod event;

// GraphQL API
pub mod graphql;

// Shared infrastructure
pub mod shared;

// Cross-cutting concerns
pub mod usecase;
pub mod seed;

// Re-export common types from shared
pub use shared::error::{PlatformError, Result};
pub use shared::tsid::TsidGenerator;

// Re-export use case infrastructure
pub use usecase::{
    UseCaseResult, UseCaseError, DomainEvent, ExecutionContext,
    UnitOfWork, MongoUnitOfWork,
};
// Note: impl_domain_event! and details! macros are exported at crate root

// Re-export main entity types for convenience
pub use course::entity::{Course, CourseStatus};
pub use course::category::Category;
pub use chapter::entity::{Chapter, ChapterStatus};
pub use lesson::entity::{Lesson, LessonStatus};
pub use enrollment::entity::{Enrollment, EnrollmentSource, EnrollmentStatus};
pub use progress::entity::LessonProgress;
pub use message::entity::{Conversation, Message};
pub use media::entity::{MediaAsset, MediaKind, MediaStatus};
pub use payment::entity::{CheckoutSession, CheckoutStatus};
pub use principal::entity::{Principal, UserScope};
pub use role::entity::{AuthRole, RoleSource, permissions};
pub use event::entity::{Event, ContextData};
pub use audit::entity::AuditLog;

// Re-export repositories
pub use course::repository::CourseRepository;
pub use course::category_repository::CategoryRepository;
pub use chapter::repository::ChapterRepository;
pub use lesson::repository::LessonRepository;
pub use enrollment::repository::EnrollmentRepository;
pub use progress::repository::ProgressRepository;
pub use message::repository::{ConversationRepository, MessageRepository};
pub use media::repository::MediaAssetRepository;
pub use payment::repository::CheckoutRepository;
pub use principal::repository::PrincipalRepository;
pub use role::repository::RoleRepository;
pub use audit::repository::AuditLogRepository;

// Re-export services
pub use audit::service::AuditService;
pub use auth::auth_service::{AuthService, AccessTokenClaims};
pub use auth::oidc_service::OidcService;
pub use analytics::service::AnalyticsService;
pub use media::storage::StorageService;
pub use payment::client::PaymentClient;
pub use role::sync_service::RoleSyncService;
pub use shared::authorization_service::{AuthorizationService, AuthContext, checks};
pub use shared::mailer::Mailer;

/// API state and router re-exports for server binaries
pub mod api {
    // Middleware
    pub use crate::shared::middleware::{Authenticated, OptionalAuth, AppState, AuthLayer};
    pub use crate::shared::api_common::{
        ApiError, CreatedResponse, PaginatedResponse, PaginationParams, SuccessResponse,
    };

    // API state and router exports from each aggregate
    pub use crate::course::api::{courses_router, CoursesState};
    pub use crate::course::category_api::{categories_router, CategoriesState};
    pub use crate::chapter::api::{chapters_router, ChaptersState};
    pub use crate::lesson::api::{lessons_router, LessonsState};
    pub use crate::enrollment::api::{enrollments_router, EnrollmentsState};
    pub use crate::progress::api::{progress_router, ProgressState};
    pub use crate::message::api::{conversations_router, ConversationsState};
    pub use crate::media::api::{media_router, MediaState};
    pub use crate::payment::api::{payments_router, PaymentsState};
    pub use crate::analytics::api::{analytics_router, AnalyticsState};
    pub use crate::principal::api::{principals_router, PrincipalsState};
    pub use crate::role::api::{roles_router, RolesState};
    pub use crate::audit::api::{audit_logs_router, AuditLogsState};
    pub use crate::auth::auth_api::{auth_router, AuthApiState, SessionCookieSettings};

    // Shared APIs
    pub use crate::shared::health_api::{health_router, HealthState};

    // GraphQL
    pub use crate::graphql::{build_schema, graphql_router, AppSchema, GraphQLContext};
}

/// Use case re-exports for server binaries
pub mod operations {
    pub use crate::course::operations::{
        CreateCourseUseCase, UpdateCourseUseCase, PublishCourseUseCase,
        UnpublishCourseUseCase, ArchiveCourseUseCase,
        CreateCourseCommand, UpdateCourseCommand, PublishCourseCommand,
        UnpublishCourseCommand, ArchiveCourseCommand,
    };
    pub use crate::enrollment::operations::{
        EnrollUseCase, RevokeEnrollmentUseCase,
        EnrollCommand, RevokeEnrollmentCommand,
    };
    pub use crate::payment::operations::{
        FulfillCheckoutUseCase, FulfillCheckoutCommand,
    };

    // Nested modules for organized access
    pub mod course {
        pub use crate::course::operations::*;
    }
    pub mod enrollment {
        pub use crate::enrollment::operations::*;
    }
    pub mod payment {
        pub use crate::payment::operations::*;
    }
}
