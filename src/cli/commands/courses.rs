use anyhow::Result;
use colored::*;

use crate::api::{Course, DashboardApi, PraxisClient};
use crate::config::Config;

pub async fn courses_command(config: &Config) -> Result<()> {
    let client = PraxisClient::new(
        config.api_base_url.clone(),
        config.request_timeout(),
        config.retry.to_retry_config(),
    )?;
    let courses = client.list_courses().await?;
    print_courses(&courses, &config.sample_course_id);
    Ok(())
}

fn print_courses(courses: &[Course], sample_course_id: &str) {
    if courses.is_empty() {
        println!("  {}", "No classes yet".bright_yellow().bold());
        println!("  {}", "Add one from the dashboard with 'praxis tui'.".dimmed());
        return;
    }

    println!("{}", format!("{} classes", courses.len()).bold());
    for course in courses {
        let progress = format!("{}/{} lectures", course.current_lecture, course.total_lectures);
        let sample = if course.id == sample_course_id { " (sample)".dimmed().to_string() } else { String::new() };
        println!(
            "  {} {}  {}{}",
            "•".bright_blue(),
            course.display_name().bright_green().bold(),
            progress.dimmed(),
            sample
        );
        if !course.semester.is_empty() {
            println!("    {}", course.semester.cyan());
        }
    }
}
