//! Development Data Seeder
//!
//! Seeds demo data on application startup when dev_mode is enabled.
//!
//! Demo accounts (log in through the configured IdP with these emails):
//!   Admin:      admin@skillforge.local
//!   Instructor: marie@skillforge.local
//!   Student:    alan@skillforge.local

use mongodb::Database;
use sf_common::Currency;
use tracing::info;

use crate::chapter::entity::Chapter;
use crate::course::category::Category;
use crate::lesson::entity::Lesson;
use crate::{
    CategoryRepository, ChapterRepository, Course, CourseRepository, LessonRepository,
    Principal, PrincipalRepository, UserScope,
};

/// Development data seeder
pub struct DevDataSeeder {
    db: Database,
}

impl DevDataSeeder {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Seed all development data
    pub async fn seed(&self) -> Result<(), Box<dyn std::error::Error>> {
        info!("=== DEV DATA SEEDER ===");

        let (instructor_id, _) = self.seed_principals().await?;
        let category_id = self.seed_categories().await?;
        self.seed_demo_course(&instructor_id, &category_id).await?;

        info!("Development data seeded");
        info!("Demo accounts: admin@skillforge.local, marie@skillforge.local, alan@skillforge.local");
        info!("=======================");

        Ok(())
    }

    async fn seed_principals(&self) -> Result<(String, String), Box<dyn std::error::Error>> {
        let repo = PrincipalRepository::new(&self.db);

        let _admin = self.ensure_principal(&repo, "admin@skillforge.local", "Dev Admin", UserScope::Admin).await?;
        let instructor = self.ensure_principal(&repo, "marie@skillforge.local", "Marie Curie", UserScope::Instructor).await?;
        let student = self.ensure_principal(&repo, "alan@skillforge.local", "Alan Turing", UserScope::Student).await?;

        Ok((instructor, student))
    }

    async fn ensure_principal(
        &self,
        repo: &PrincipalRepository,
        email: &str,
        name: &str,
        scope: UserScope,
    ) -> Result<String, Box<dyn std::error::Error>> {
        if let Some(existing) = repo.find_by_email(email).await? {
            return Ok(existing.id);
        }

        let principal = Principal::new(email, name, scope);
        let id = principal.id.clone();
        repo.insert(&principal).await?;
        info!(email = %email, scope = %scope.as_str(), "Created demo principal");
        Ok(id)
    }

    async fn seed_categories(&self) -> Result<String, Box<dyn std::error::Error>> {
        let repo = CategoryRepository::new(&self.db);

        if let Some(existing) = repo.find_by_slug("programming").await? {
            return Ok(existing.id);
        }

        let programming = Category::new("Programming");
        let id = programming.id.clone();
        repo.insert(&programming).await?;
        repo.insert(&Category::new("Data Science")).await?;
        repo.insert(&Category::new("Design")).await?;
        info!("Created demo categories");

        Ok(id)
    }

    async fn seed_demo_course(
        &self,
        instructor_id: &str,
        category_id: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let course_repo = CourseRepository::new(&self.db);
        let chapter_repo = ChapterRepository::new(&self.db);
        let lesson_repo = LessonRepository::new(&self.db);

        if course_repo.find_by_slug("systems-programming-basics").await?.is_some() {
            return Ok(());
        }

        let course = Course::new("Systems Programming Basics", instructor_id)
            .with_description("Memory, processes, and the machinery under your code.")
            .with_category_id(category_id)
            .with_price(2999, Currency::Usd);
        course_repo.insert(&course).await?;

        let chapter = {
            let mut c = Chapter::new(&course.id, "Getting Started", 0);
            c.free_preview = true;
            c
        };
        chapter_repo.insert(&chapter).await?;

        let mut lesson = Lesson::new(&chapter.id, &course.id, "What is a process?", 0);
        lesson.description = Some("A first look at processes and address spaces.".to_string());
        lesson_repo.insert(&lesson).await?;

        lesson_repo.insert(&Lesson::new(&chapter.id, &course.id, "Stack and heap", 1)).await?;

        info!(course_id = %course.id, "Created demo course (draft)");
        Ok(())
    }
}
