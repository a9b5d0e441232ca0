//! Course breadcrumb label

use crate::api::Course;
use crate::error::DashboardError;

/// Label shown above lecture views and the course id it links back to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub label: String,
    pub course_id: Option<String>,
}

impl Default for Breadcrumb {
    fn default() -> Self {
        Self { label: "Courses".to_string(), course_id: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreadcrumbTicket {
    generation: u64,
    course_id: String,
}

impl BreadcrumbTicket {
    pub fn course_id(&self) -> &str {
        &self.course_id
    }
}

/// Resolves course labels in the background. Only the most recent request can
/// change the label, and a failed one leaves it as it was.
#[derive(Debug, Default)]
pub struct BreadcrumbResolver {
    generation: u64,
    current: Breadcrumb,
}

impl BreadcrumbResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Breadcrumb {
        &self.current
    }

    pub fn begin(&mut self, course_id: impl Into<String>) -> BreadcrumbTicket {
        self.generation += 1;
        BreadcrumbTicket { generation: self.generation, course_id: course_id.into() }
    }

    /// Returns true when the label changed
    pub fn complete(&mut self, ticket: &BreadcrumbTicket, result: Result<Course, DashboardError>) -> bool {
        if ticket.generation != self.generation {
            log::debug!("Ignoring stale breadcrumb for course {}", ticket.course_id);
            return false;
        }
        match result {
            Ok(course) => {
                self.current = Breadcrumb { label: course.display_name(), course_id: Some(course.id) };
                true
            }
            Err(e) => {
                log::warn!("Breadcrumb for course {} not resolved: {}", ticket.course_id, e);
                false
            }
        }
    }
}
