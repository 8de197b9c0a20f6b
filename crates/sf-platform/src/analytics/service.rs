//! Analytics Service
//!
//! Translates period-bounded repository aggregates into dashboard
//! summaries. All percentage arithmetic lives in pure functions so the
//! comparison logic is unit-testable without a database.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::analytics::metrics::MetricDelta;
use crate::analytics::period::Period;
use crate::progress::entity::completion_percent;
use crate::progress::repository::CompletedCount;
use crate::{
    CheckoutRepository, CourseRepository, EnrollmentRepository, LessonRepository,
    ProgressRepository,
};
use crate::shared::error::Result;

/// Top-course row for the dashboard table
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopCourse {
    pub course_id: String,
    pub title: String,
    pub revenue_cents: i64,
    pub purchases: u64,
}

/// Dashboard summary for an instructor or the whole platform
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Sum of completed checkout amounts in the window (cents)
    pub revenue_cents: MetricDelta,
    /// Enrollments created in the window (any source)
    pub enrollments: MetricDelta,
    /// Distinct students with a playback heartbeat in the window
    pub active_students: MetricDelta,
    /// Students who finished their last outstanding lesson in the window
    pub course_completions: MetricDelta,
    /// Point-in-time rate: fully-completed (student, course) pairs over
    /// active enrollments in courses with published lessons
    pub completion_rate_percent: f64,
    /// Watch time recorded in the window
    pub watch_hours: MetricDelta,
    /// Courses ranked by revenue in the window
    pub top_courses: Vec<TopCourse>,
}

/// Per-course performance summary
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoursePerformance {
    pub course_id: String,
    pub title: String,
    pub enrollments: MetricDelta,
    pub revenue_cents: MetricDelta,
    pub completion_rate_percent: f64,
    pub watch_hours: MetricDelta,
}

/// Count course completions.
///
/// A (student, course) pair counts as completed when its completed-lesson
/// count reaches the course's published-lesson total. The completion is
/// attributed to the window containing the final lesson's completion
/// timestamp. Returns (current window, previous window, all time).
pub fn count_completions(
    counts: &[CompletedCount],
    published_per_course: &HashMap<String, u64>,
    period: &Period,
) -> (u64, u64, u64) {
    let previous = period.previous();
    let mut in_current = 0;
    let mut in_previous = 0;
    let mut all_time = 0;

    for count in counts {
        let Some(&total) = published_per_course.get(&count.course_id) else {
            continue;
        };
        if total == 0 || count.completed_lessons < total {
            continue;
        }

        all_time += 1;
        if let Some(at) = count.last_completed_at {
            if period.contains(at) {
                in_current += 1;
            } else if previous.contains(at) {
                in_previous += 1;
            }
        }
    }

    (in_current, in_previous, all_time)
}

/// Analytics aggregation service
pub struct AnalyticsService {
    course_repo: Arc<CourseRepository>,
    lesson_repo: Arc<LessonRepository>,
    enrollment_repo: Arc<EnrollmentRepository>,
    checkout_repo: Arc<CheckoutRepository>,
    progress_repo: Arc<ProgressRepository>,
}

impl AnalyticsService {
    pub fn new(
        course_repo: Arc<CourseRepository>,
        lesson_repo: Arc<LessonRepository>,
        enrollment_repo: Arc<EnrollmentRepository>,
        checkout_repo: Arc<CheckoutRepository>,
        progress_repo: Arc<ProgressRepository>,
    ) -> Self {
        Self {
            course_repo,
            lesson_repo,
            enrollment_repo,
            checkout_repo,
            progress_repo,
        }
    }

    /// Dashboard over the instructor's own courses
    pub async fn instructor_dashboard(
        &self,
        instructor_id: &str,
        period: Period,
    ) -> Result<Dashboard> {
        let courses = self.course_repo.find_by_instructor(instructor_id).await?;
        self.dashboard_for_courses(courses, period).await
    }

    /// Platform-wide dashboard (admin)
    pub async fn admin_dashboard(&self, period: Period) -> Result<Dashboard> {
        let courses = self.course_repo
            .find_by_status(crate::course::entity::CourseStatus::Published)
            .await?;
        self.dashboard_for_courses(courses, period).await
    }

    /// Performance summary for one course
    pub async fn course_performance(
        &self,
        course: &crate::Course,
        period: Period,
    ) -> Result<CoursePerformance> {
        let ids = vec![course.id.clone()];
        let previous = period.previous();

        let enrollments_current = self.enrollment_repo
            .count_created_between(Some(&ids), period.from, period.to).await?;
        let enrollments_previous = self.enrollment_repo
            .count_created_between(Some(&ids), previous.from, previous.to).await?;

        let revenue_current = self.checkout_repo
            .sum_completed_revenue(Some(&ids), period.from, period.to).await?;
        let revenue_previous = self.checkout_repo
            .sum_completed_revenue(Some(&ids), previous.from, previous.to).await?;

        let watch_current = self.progress_repo
            .sum_watch_seconds(Some(&ids), period.from, period.to).await?;
        let watch_previous = self.progress_repo
            .sum_watch_seconds(Some(&ids), previous.from, previous.to).await?;

        let published = self.lesson_repo.count_published_by_course(&course.id).await?;
        let completion_rate = if published == 0 {
            0.0
        } else {
            let counts = self.progress_repo.completed_lesson_counts(&ids).await?;
            let completed_pairs = counts.iter()
                .filter(|c| c.completed_lessons >= published)
                .count() as u64;
            let enrolled = self.enrollment_repo.find_active_by_courses(&ids).await?.len() as u64;
            completion_percent(completed_pairs, enrolled.max(completed_pairs))
        };

        Ok(CoursePerformance {
            course_id: course.id.clone(),
            title: course.title.clone(),
            enrollments: MetricDelta::from_counts(enrollments_current, enrollments_previous),
            revenue_cents: MetricDelta::new(revenue_current as f64, revenue_previous as f64),
            completion_rate_percent: completion_rate,
            watch_hours: MetricDelta::new(
                watch_current as f64 / 3600.0,
                watch_previous as f64 / 3600.0,
            ),
        })
    }

    async fn dashboard_for_courses(
        &self,
        courses: Vec<crate::Course>,
        period: Period,
    ) -> Result<Dashboard> {
        if courses.is_empty() {
            return Ok(Dashboard {
                revenue_cents: MetricDelta::zero(),
                enrollments: MetricDelta::zero(),
                active_students: MetricDelta::zero(),
                course_completions: MetricDelta::zero(),
                completion_rate_percent: 0.0,
                watch_hours: MetricDelta::zero(),
                top_courses: vec![],
            });
        }

        let ids: Vec<String> = courses.iter().map(|c| c.id.clone()).collect();
        let titles: HashMap<&str, &str> = courses.iter()
            .map(|c| (c.id.as_str(), c.title.as_str()))
            .collect();
        let previous = period.previous();

        // Revenue
        let revenue_current = self.checkout_repo
            .sum_completed_revenue(Some(&ids), period.from, period.to).await?;
        let revenue_previous = self.checkout_repo
            .sum_completed_revenue(Some(&ids), previous.from, previous.to).await?;

        // Enrollments
        let enrollments_current = self.enrollment_repo
            .count_created_between(Some(&ids), period.from, period.to).await?;
        let enrollments_previous = self.enrollment_repo
            .count_created_between(Some(&ids), previous.from, previous.to).await?;

        // Active students
        let active_current = self.progress_repo
            .count_active_students(Some(&ids), period.from, period.to).await?;
        let active_previous = self.progress_repo
            .count_active_students(Some(&ids), previous.from, previous.to).await?;

        // Watch time
        let watch_current = self.progress_repo
            .sum_watch_seconds(Some(&ids), period.from, period.to).await?;
        let watch_previous = self.progress_repo
            .sum_watch_seconds(Some(&ids), previous.from, previous.to).await?;

        // Completions and point-in-time completion rate
        let mut published_per_course = HashMap::new();
        for id in &ids {
            let published = self.lesson_repo.count_published_by_course(id).await?;
            published_per_course.insert(id.clone(), published);
        }

        let counts = self.progress_repo.completed_lesson_counts(&ids).await?;
        let (completions_current, completions_previous, completions_all_time) =
            count_completions(&counts, &published_per_course, &period);

        let eligible_ids: Vec<String> = ids.iter()
            .filter(|id| published_per_course.get(*id).copied().unwrap_or(0) > 0)
            .cloned()
            .collect();
        let eligible_enrollments = if eligible_ids.is_empty() {
            0
        } else {
            self.enrollment_repo.find_active_by_courses(&eligible_ids).await?.len() as u64
        };
        let completion_rate = completion_percent(
            completions_all_time,
            eligible_enrollments.max(completions_all_time),
        );

        // Top courses by windowed revenue
        let mut revenue_rows = self.checkout_repo
            .revenue_by_course(&ids, period.from, period.to).await?;
        revenue_rows.sort_by(|a, b| b.revenue_cents.cmp(&a.revenue_cents));
        let top_courses = revenue_rows.into_iter()
            .take(5)
            .map(|row| TopCourse {
                title: titles.get(row.course_id.as_str()).unwrap_or(&"").to_string(),
                course_id: row.course_id,
                revenue_cents: row.revenue_cents,
                purchases: row.purchases,
            })
            .collect();

        Ok(Dashboard {
            revenue_cents: MetricDelta::new(revenue_current as f64, revenue_previous as f64),
            enrollments: MetricDelta::from_counts(enrollments_current, enrollments_previous),
            active_students: MetricDelta::from_counts(active_current, active_previous),
            course_completions: MetricDelta::from_counts(completions_current, completions_previous),
            completion_rate_percent: completion_rate,
            watch_hours: MetricDelta::new(
                watch_current as f64 / 3600.0,
                watch_previous as f64 / 3600.0,
            ),
            top_courses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn count(student: &str, course: &str, lessons: u64, last: Option<&str>) -> CompletedCount {
        CompletedCount {
            student_id: student.to_string(),
            course_id: course.to_string(),
            completed_lessons: lessons,
            last_completed_at: last.map(at),
        }
    }

    #[test]
    fn test_count_completions_windows() {
        let period = Period {
            from: at("2026-08-01T00:00:00Z"),
            to: at("2026-08-06T00:00:00Z"),
        };
        let published: HashMap<String, u64> =
            [("c-1".to_string(), 3), ("c-2".to_string(), 2)].into();

        let counts = vec![
            // Completed in the current window
            count("s-1", "c-1", 3, Some("2026-08-03T10:00:00Z")),
            // Completed in the previous window
            count("s-2", "c-1", 3, Some("2026-07-29T10:00:00Z")),
            // Completed long ago: all-time only
            count("s-3", "c-2", 2, Some("2026-01-01T00:00:00Z")),
            // Not finished yet
            count("s-4", "c-1", 2, Some("2026-08-04T00:00:00Z")),
        ];

        let (current, previous, all_time) = count_completions(&counts, &published, &period);
        assert_eq!(current, 1);
        assert_eq!(previous, 1);
        assert_eq!(all_time, 3);
    }

    #[test]
    fn test_count_completions_ignores_courses_without_published_lessons() {
        let period = Period {
            from: at("2026-08-01T00:00:00Z"),
            to: at("2026-08-06T00:00:00Z"),
        };
        let published: HashMap<String, u64> = [("c-1".to_string(), 0)].into();

        let counts = vec![count("s-1", "c-1", 5, Some("2026-08-03T00:00:00Z"))];

        let (current, previous, all_time) = count_completions(&counts, &published, &period);
        assert_eq!((current, previous, all_time), (0, 0, 0));
    }
}
