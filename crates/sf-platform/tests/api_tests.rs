//! Platform API Integration Tests
//!
//! Tests for platform domain models, authorization, and the analytics
//! comparison logic.

use std::collections::HashSet;

use sf_platform::analytics::{percent_change, MetricDelta, Period};
use sf_platform::payment::webhook::{sign_payload, verify_signature, DEFAULT_TOLERANCE_SECS};
use sf_platform::progress::entity::completion_percent;
use sf_platform::{
    AuthContext, Course, CourseStatus, Enrollment, EnrollmentSource, LessonProgress, Principal,
    TsidGenerator, UserScope,
};

// Unit tests for domain models
mod domain_tests {
    use super::*;

    #[test]
    fn test_course_creation_defaults() {
        let course = Course::new("Advanced Rust", "instructor-1");
        assert_eq!(course.status, CourseStatus::Draft);
        assert_eq!(course.slug, "advanced-rust");
        assert!(course.is_free());
        assert!(course.payment_product_id.is_none());
    }

    #[test]
    fn test_course_publish_cycle() {
        let mut course = Course::new("Advanced Rust", "instructor-1");
        course.publish();
        assert!(course.is_published());

        course.archive();
        assert_eq!(course.status, CourseStatus::Archived);
    }

    #[test]
    fn test_enrollment_revocation_keeps_record() {
        let mut enrollment = Enrollment::new("course-1", "student-1", EnrollmentSource::Purchase);
        enrollment.revoke();

        assert!(!enrollment.is_active());
        assert_eq!(enrollment.course_id, "course-1");
    }

    #[test]
    fn test_progress_watch_time_is_monotonic() {
        let mut progress = LessonProgress::new("student-1", "lesson-1", "course-1");
        progress.record_heartbeat(120, 60);
        progress.record_heartbeat(30, 0); // seek backwards

        assert_eq!(progress.watch_seconds, 60);
        assert_eq!(progress.last_position_seconds, 30);
    }

    #[test]
    fn test_principal_scope_change() {
        let mut principal = Principal::new("ada@example.com", "Ada", UserScope::Student);
        assert!(principal.has_role("lms:student"));

        principal.change_scope(UserScope::Instructor);
        assert!(principal.has_role("lms:instructor"));
        assert!(!principal.has_role("lms:student"));
        assert!(principal.is_instructor());
    }

    #[test]
    fn test_tsid_sorting() {
        let a = TsidGenerator::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = TsidGenerator::generate();
        assert!(a < b);
    }
}

// Authorization context tests
mod authorization_tests {
    use super::*;

    fn create_auth_context(permissions: Vec<&str>, scope: &str) -> AuthContext {
        AuthContext {
            principal_id: TsidGenerator::generate(),
            scope: scope.to_string(),
            email: Some("test@example.com".to_string()),
            name: "Test User".to_string(),
            permissions: permissions.into_iter().map(String::from).collect(),
            roles: vec!["lms:instructor".to_string()],
        }
    }

    #[test]
    fn test_admin_scope() {
        let ctx = create_auth_context(vec![], "ADMIN");
        assert!(ctx.is_admin());
        assert!(ctx.is_instructor());
    }

    #[test]
    fn test_instructor_scope_is_not_admin() {
        let ctx = create_auth_context(vec![], "INSTRUCTOR");
        assert!(!ctx.is_admin());
        assert!(ctx.is_instructor());
    }

    #[test]
    fn test_direct_permission() {
        let ctx = create_auth_context(vec!["lms:catalog:course:create"], "INSTRUCTOR");
        assert!(ctx.has_permission("lms:catalog:course:create"));
        assert!(!ctx.has_permission("lms:catalog:course:delete"));
    }

    #[test]
    fn test_wildcard_permission() {
        let ctx = create_auth_context(vec!["lms:catalog:*"], "INSTRUCTOR");
        assert!(ctx.has_permission("lms:catalog:course:create"));
        assert!(ctx.has_permission("lms:catalog:category:manage"));
        assert!(!ctx.has_permission("lms:iam:user:view"));
    }

    #[test]
    fn test_superuser_permission() {
        let ctx = create_auth_context(vec!["*:*"], "ADMIN");
        assert!(ctx.has_permission("lms:audit:log:view"));
        assert!(ctx.has_permission("lms:insights:analytics:admin"));
    }

    #[test]
    fn test_has_all_permissions() {
        let ctx = create_auth_context(
            vec!["lms:catalog:course:view", "lms:learning:enrollment:view"],
            "INSTRUCTOR",
        );
        assert!(ctx.has_all_permissions(&[
            "lms:catalog:course:view",
            "lms:learning:enrollment:view",
        ]));
        assert!(!ctx.has_all_permissions(&[
            "lms:catalog:course:view",
            "lms:audit:log:view",
        ]));
    }

    #[test]
    fn test_permission_checks_helpers() {
        use sf_platform::checks;

        let instructor = create_auth_context(vec!["lms:catalog:*"], "INSTRUCTOR");
        assert!(checks::can_author_courses(&instructor).is_ok());
        assert!(checks::can_read_audit_logs(&instructor).is_err());

        let admin = create_auth_context(vec!["*:*"], "ADMIN");
        assert!(checks::can_read_audit_logs(&admin).is_ok());
    }

    #[test]
    fn test_permissions_deduplicate() {
        let mut permissions = HashSet::new();
        permissions.insert("lms:catalog:course:view".to_string());
        permissions.insert("lms:catalog:course:view".to_string());
        assert_eq!(permissions.len(), 1);
    }
}

// Analytics comparison logic
mod analytics_tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_percent_change_cases() {
        assert_eq!(percent_change(200.0, 100.0), Some(100.0));
        assert_eq!(percent_change(75.0, 100.0), Some(-25.0));
        assert_eq!(percent_change(0.0, 0.0), Some(0.0));
        assert_eq!(percent_change(42.0, 0.0), None);
    }

    #[test]
    fn test_metric_delta_serializes_camel_case() {
        let delta = MetricDelta::from_counts(3, 2);
        let json = serde_json::to_value(&delta).unwrap();
        assert_eq!(json["current"], 3.0);
        assert_eq!(json["changePercent"], 50.0);
    }

    #[test]
    fn test_metric_delta_undefined_change_omitted() {
        let delta = MetricDelta::from_counts(3, 0);
        let json = serde_json::to_value(&delta).unwrap();
        assert!(json.get("changePercent").is_none());
    }

    #[test]
    fn test_period_previous_chain() {
        let now = at("2026-08-06T00:00:00Z");
        let current = Period::last_days(7, now);
        let previous = current.previous();
        let before_that = previous.previous();

        assert_eq!(previous.to, current.from);
        assert_eq!(before_that.to, previous.from);
        assert_eq!(current.to - current.from, before_that.to - before_that.from);
    }

    #[test]
    fn test_completion_percent_zero_denominator() {
        assert_eq!(completion_percent(3, 0), 0.0);
        assert_eq!(completion_percent(3, 6), 50.0);
    }
}

// Webhook signature verification
mod webhook_tests {
    use super::*;

    #[test]
    fn test_signature_round_trip() {
        let payload = br#"{"id":"evt_1","type":"checkout.session.completed"}"#;
        let header = sign_payload(payload, "whsec_abc", 1_750_000_000);

        assert!(verify_signature(
            payload,
            &header,
            "whsec_abc",
            DEFAULT_TOLERANCE_SECS,
            1_750_000_005,
        )
        .is_ok());
    }

    #[test]
    fn test_signature_replay_outside_tolerance() {
        let payload = b"{}";
        let header = sign_payload(payload, "whsec_abc", 1_750_000_000);

        assert!(verify_signature(
            payload,
            &header,
            "whsec_abc",
            DEFAULT_TOLERANCE_SECS,
            1_750_000_000 + DEFAULT_TOLERANCE_SECS + 1,
        )
        .is_err());
    }
}
