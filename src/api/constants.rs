//! API constants and endpoint builders for the Praxis REST surface

/// Default REST base when nothing is configured
pub const DEFAULT_API_BASE: &str = "http://localhost:8001/api";

/// Query parameter on the entry URL that routes straight into survey taking
pub const SURVEY_ID_PARAM: &str = "survey_id";

/// Query parameter used to defeat HTTP caches on template fetches
pub const CACHE_BUST_PARAM: &str = "v";

/// Standard headers
pub mod headers {
    pub const ACCEPT_JSON: &str = "application/json";
    pub const ACCEPT_HTML: &str = "text/html";
    pub const USER_AGENT: &str = "praxis-dashboard/0.1";
}

/// Multipart part names expected by the backend
pub mod parts {
    pub const VIDEO: &str = "video";
    pub const MATERIALS: &str = "materials";
    pub const FILE: &str = "file";
}

fn join(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub fn classes(base_url: &str) -> String {
    join(base_url, "classes")
}

pub fn class(base_url: &str, id: &str) -> String {
    join(base_url, &format!("classes/{}", urlencoding::encode(id)))
}

pub fn class_overview(base_url: &str, id: &str) -> String {
    format!("{}/overview", class(base_url, id))
}

pub fn class_feedback(base_url: &str, id: &str) -> String {
    format!("{}/feedback", class(base_url, id))
}

pub fn lectures(base_url: &str) -> String {
    join(base_url, "lectures")
}

pub fn lecture(base_url: &str, id: &str) -> String {
    join(base_url, &format!("lectures/{}", urlencoding::encode(id)))
}

/// Sub-resource of a lecture, e.g. `analysis`, `video`, `analyze`, `surveys`
pub fn lecture_resource(base_url: &str, id: &str, resource: &str) -> String {
    format!("{}/{}", lecture(base_url, id), resource)
}

pub fn survey(base_url: &str, id: &str) -> String {
    join(base_url, &format!("surveys/{}", urlencoding::encode(id)))
}

pub fn survey_submit(base_url: &str, id: &str) -> String {
    format!("{}/submit", survey(base_url, id))
}

pub fn assignments(base_url: &str) -> String {
    join(base_url, "assignments")
}

pub fn assignment(base_url: &str, id: &str) -> String {
    join(base_url, &format!("assignments/{}", urlencoding::encode(id)))
}

pub fn assignment_file(base_url: &str, id: &str) -> String {
    format!("{}/file", assignment(base_url, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_tolerate_trailing_slash() {
        assert_eq!(classes("http://h/api/"), "http://h/api/classes");
        assert_eq!(classes("http://h/api"), "http://h/api/classes");
    }

    #[test]
    fn test_lecture_sub_resources() {
        let base = "http://h/api";
        assert_eq!(lecture_resource(base, "l1", "analyze"), "http://h/api/lectures/l1/analyze");
        assert_eq!(lecture_resource(base, "l1", "materials-analysis"), "http://h/api/lectures/l1/materials-analysis");
        assert_eq!(class_overview(base, "c1"), "http://h/api/classes/c1/overview");
        assert_eq!(assignment_file(base, "a 1"), "http://h/api/assignments/a%201/file");
        assert_eq!(survey_submit(base, "s9"), "http://h/api/surveys/s9/submit");
    }
}
