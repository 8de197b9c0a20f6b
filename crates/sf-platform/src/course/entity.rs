//! Course Entity

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use sf_common::Currency;

/// Course lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseStatus {
    Draft,
    Published,
    Archived,
}

impl Default for CourseStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// Course entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Course title
    pub title: String,

    /// URL-safe slug (unique), derived from the title at creation
    pub slug: String,

    /// Long description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Owning instructor principal ID
    pub instructor_id: String,

    /// Category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,

    /// Price in minor units; None means the course is free
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,

    /// Settlement currency
    #[serde(default)]
    pub currency: Currency,

    /// Cover image media asset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_asset_id: Option<String>,

    /// Payment processor product id (set on first paid publish)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_product_id: Option<String>,

    /// Payment processor price id (tracks price_cents)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_price_id: Option<String>,

    #[serde(default)]
    pub status: CourseStatus,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn new(title: impl Into<String>, instructor_id: impl Into<String>) -> Self {
        let title = title.into();
        let slug = slugify(&title);
        let now = Utc::now();

        Self {
            id: crate::TsidGenerator::generate(),
            title,
            slug,
            description: None,
            instructor_id: instructor_id.into(),
            category_id: None,
            price_cents: None,
            currency: Currency::default(),
            image_asset_id: None,
            payment_product_id: None,
            payment_price_id: None,
            status: CourseStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category_id(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn with_price(mut self, price_cents: i64, currency: Currency) -> Self {
        self.price_cents = Some(price_cents);
        self.currency = currency;
        self
    }

    pub fn is_published(&self) -> bool {
        self.status == CourseStatus::Published
    }

    pub fn is_free(&self) -> bool {
        self.price_cents.map_or(true, |p| p == 0)
    }

    pub fn publish(&mut self) {
        self.status = CourseStatus::Published;
        self.updated_at = Utc::now();
    }

    pub fn unpublish(&mut self) {
        self.status = CourseStatus::Draft;
        self.updated_at = Utc::now();
    }

    pub fn archive(&mut self) {
        self.status = CourseStatus::Archived;
        self.updated_at = Utc::now();
    }
}

/// Derive a URL-safe slug from a title.
///
/// Lowercases, maps runs of non-alphanumerics to single dashes, and trims
/// leading/trailing dashes. The caller is responsible for uniqueness.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Rust for Beginners"), "rust-for-beginners");
        assert_eq!(slugify("  Async & Await!  "), "async-await");
        assert_eq!(slugify("C++ 101"), "c-101");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_new_course_is_draft() {
        let course = Course::new("Rust for Beginners", "instructor-1");
        assert_eq!(course.status, CourseStatus::Draft);
        assert_eq!(course.slug, "rust-for-beginners");
        assert!(course.is_free());
    }

    #[test]
    fn test_priced_course_not_free() {
        let course = Course::new("Rust", "i-1").with_price(1999, Currency::Usd);
        assert!(!course.is_free());

        let zero = Course::new("Intro", "i-1").with_price(0, Currency::Usd);
        assert!(zero.is_free());
    }

    #[test]
    fn test_lifecycle() {
        let mut course = Course::new("Rust", "i-1");
        course.publish();
        assert!(course.is_published());
        course.unpublish();
        assert_eq!(course.status, CourseStatus::Draft);
        course.archive();
        assert_eq!(course.status, CourseStatus::Archived);
    }
}
