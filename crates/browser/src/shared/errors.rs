use hrepr_core::{ErrorCategory, LoadError};

/// Classifies a chromiumoxide failure that happened while working on `src`.
pub fn to_load_error(e: impl std::fmt::Display, src: &str) -> LoadError {
    let s = e.to_string();
    if s.contains("timeout") || s.contains("Timeout") {
        LoadError::new(ErrorCategory::Timeout, format!("{} timed out: {}", src, s))
            .for_resource(src)
            .recoverable()
    } else if s.contains("net::") || s.contains("Network") {
        LoadError::load_failed(src, s)
    } else {
        LoadError::bridge(format!("{} failed: {}", src, s)).for_resource(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_message() {
        assert_eq!(to_load_error("Request timeout", "a.js").category, ErrorCategory::Timeout);
        assert_eq!(to_load_error("net::ERR_NAME_NOT_RESOLVED", "a.js").category, ErrorCategory::Network);
        let other = to_load_error("Execution context was destroyed", "a.js");
        assert_eq!(other.category, ErrorCategory::Bridge);
        assert!(!other.recoverable);
    }
}
