use crate::error::DashboardError;

/// Remote data as a view sees it.
///
/// One value per fetched list or document instead of separate
/// `loading: bool` and `data: Option<T>` fields. A new result always
/// replaces the old one, so re-running a fetch never accumulates rows.
#[derive(Clone, Debug, PartialEq)]
pub enum Resource<T, E = DashboardError> {
    /// Nothing requested for the mounted screen yet
    NotAsked,

    Loading,

    Success(T),

    Failure(E),
}

impl<T, E> Resource<T, E> {
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Resource::Success(data),
            Err(e) => Resource::Failure(e),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Resource::Success(_))
    }

    /// Borrow the data if the last request succeeded
    pub fn to_option(&self) -> Option<&T> {
        match self {
            Resource::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Resource::Failure(e) => Some(e),
            _ => None,
        }
    }

    /// Map the success value to a new type
    pub fn map<U, F>(self, f: F) -> Resource<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Resource::NotAsked => Resource::NotAsked,
            Resource::Loading => Resource::Loading,
            Resource::Success(data) => Resource::Success(f(data)),
            Resource::Failure(e) => Resource::Failure(e),
        }
    }
}

impl<T, E> Default for Resource<T, E> {
    fn default() -> Self {
        Resource::NotAsked
    }
}

impl<T, E> From<Result<T, E>> for Resource<T, E> {
    fn from(result: Result<T, E>) -> Self {
        Resource::from_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_replaces_previous_state() {
        let mut lectures: Resource<Vec<&str>> = Resource::Success(vec!["Lecture 1", "Lecture 2"]);
        assert!(lectures.is_success());
        lectures = Resource::Loading;
        assert!(lectures.is_loading());
        assert!(lectures.to_option().is_none());

        lectures = Ok(vec!["Lecture 1"]).into();
        assert_eq!(lectures.to_option().map(Vec::len), Some(1));
    }

    #[test]
    fn test_failure_exposes_error() {
        let resource: Resource<u8> = Resource::from_result(Err(DashboardError::Network("timeout".into())));
        assert!(resource.error().is_some_and(|e| !e.is_user_facing()));
        assert_eq!(resource.map(|n| n + 1).to_option(), None);
    }
}
