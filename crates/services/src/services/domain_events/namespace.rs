/// Restricts which events reach the handlers by namespace.
///
/// Patterns are `:`-separated segments where `*` matches any single
/// segment, so `*:appOne` accepts `space:appOne` and `workbook:appOne` but
/// not `space:appTwo`. Several patterns can be given separated by commas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceFilter {
    patterns: Vec<Vec<String>>,
}

impl NamespaceFilter {
    pub fn parse(raw: &str) -> Self {
        let patterns = raw
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| p.split(':').map(str::to_string).collect())
            .collect();
        Self { patterns }
    }

    /// True when any of the event's namespaces matches any pattern.
    pub fn matches<S: AsRef<str>>(&self, namespaces: &[S]) -> bool {
        namespaces
            .iter()
            .any(|ns| self.matches_namespace(ns.as_ref()))
    }

    fn matches_namespace(&self, namespace: &str) -> bool {
        let segments: Vec<&str> = namespace.split(':').collect();
        self.patterns.iter().any(|pattern| {
            pattern.len() == segments.len()
                && pattern
                    .iter()
                    .zip(&segments)
                    .all(|(p, s)| p == "*" || p == s)
        })
    }
}
