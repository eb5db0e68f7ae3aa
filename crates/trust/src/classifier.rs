//! Action classification.
//!
//! The engine only needs a yes/no answer per action; richer action encodings
//! plug in through [`ActionClassifier`].

/// Decides whether an observed action is malicious.
pub trait ActionClassifier: Send + Sync {
    fn is_malicious(&self, action: &str) -> bool;
}

/// Flags actions containing any of a fixed set of marker substrings.
#[derive(Debug, Clone)]
pub struct MarkerClassifier {
    markers: Vec<String>,
}

impl MarkerClassifier {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

impl Default for MarkerClassifier {
    fn default() -> Self {
        Self::new(["exfiltrate", "bypass_auth"])
    }
}

impl ActionClassifier for MarkerClassifier {
    fn is_malicious(&self, action: &str) -> bool {
        self.markers.iter().any(|m| action.contains(m.as_str()))
    }
}

impl<F> ActionClassifier for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_malicious(&self, action: &str) -> bool {
        self(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_markers() {
        let c = MarkerClassifier::default();
        assert!(c.is_malicious("exfiltrate:secret"));
        assert!(c.is_malicious("bypass_auth:token"));
        assert!(c.is_malicious("try to bypass_auth quietly"));
        assert!(!c.is_malicious("request_info:general"));
        assert!(!c.is_malicious("request_info:config"));
        assert!(!c.is_malicious(""));
    }

    #[test]
    fn test_markers_are_case_sensitive() {
        let c = MarkerClassifier::default();
        assert!(!c.is_malicious("EXFILTRATE:secret"));
    }

    #[test]
    fn test_custom_markers() {
        let c = MarkerClassifier::new(vec!["rm -rf".to_string()]);
        assert!(c.is_malicious("exec: rm -rf /"));
        assert!(!c.is_malicious("exfiltrate:secret"));
    }

    #[test]
    fn test_closure_classifier() {
        let c = |action: &str| action.len() > 10;
        assert!(c.is_malicious("a very long action"));
        assert!(!c.is_malicious("short"));
    }
}
