use crate::error::{EntryError, Result};

const LOGS_SEGMENT: &str = "/logs/";

/// Extract the short logger name from a fully-qualified log path.
///
/// `projects/my-project/logs/my.logger~v2` yields `my.logger~v2`. The name
/// is returned verbatim; characters such as `.`, `~`, `%` or `-` are not
/// decoded. The parent (`projects/<id>`, `folders/<id>`, ...) is not checked.
///
/// **Returns**
/// - `Ok(name)` borrowed from `path`.
/// - `Err(EntryError::InvalidLogPath)` if `/logs/` is absent or the name
///   after it is empty.
pub fn logger_name_from_path(path: &str) -> Result<&str> {
    match path.split_once(LOGS_SEGMENT) {
        Some((_, name)) if !name.is_empty() => Ok(name),
        _ => Err(EntryError::InvalidLogPath(path.to_string())),
    }
}

/// Build the fully-qualified path of a project-level log.
pub fn log_path(project: &str, name: &str) -> String {
    format!("projects/{}{}{}", project, LOGS_SEGMENT, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_name() {
        let path = "projects/my-project-1234/logs/LOGGER_NAME";
        assert_eq!(logger_name_from_path(path).unwrap(), "LOGGER_NAME");
    }

    #[test]
    fn name_with_all_extras() {
        let name = "LOGGER_NAME-part.one~part.two%part-three";
        let path = log_path("my-project-1234", name);
        assert_eq!(logger_name_from_path(&path).unwrap(), name);
    }

    #[test]
    fn non_project_parent() {
        let path = "organizations/1234/logs/audit";
        assert_eq!(logger_name_from_path(path).unwrap(), "audit");
    }

    #[test]
    fn missing_segment_is_an_error() {
        let err = logger_name_from_path("projects/p/sinks/s").unwrap_err();
        assert!(matches!(err, EntryError::InvalidLogPath(p) if p == "projects/p/sinks/s"));
    }

    #[test]
    fn empty_name_is_an_error() {
        assert!(logger_name_from_path("projects/p/logs/").is_err());
    }
}
