use strsim::normalized_levenshtein;

/// Best-candidate name matcher over the store's display-name catalog.
///
/// No match is a normal outcome: the caller treats it as "this record does
/// not exist yet", never as an error. For a fixed catalog and cutoff the
/// result is deterministic; ties keep the first catalog entry encountered.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    cutoff: f64,
}

pub const DEFAULT_MATCH_CUTOFF: f64 = 0.85;

impl NameMatcher {
    pub fn new(cutoff: f64) -> Self {
        Self { cutoff }
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Find the catalog name most similar to `candidate`, if its score
    /// reaches the cutoff. Case-insensitive and whitespace-tolerant.
    pub fn best_match<'a>(&self, candidate: &str, catalog: &'a [String]) -> Option<&'a str> {
        let needle = normalize(candidate);
        if needle.is_empty() {
            return None;
        }

        let mut best: Option<(&'a str, f64)> = None;
        for name in catalog {
            let score = normalized_levenshtein(&needle, &normalize(name));
            // Strictly greater keeps the first-encountered entry on ties.
            if score >= self.cutoff && best.map_or(true, |(_, s)| score > s) {
                best = Some((name.as_str(), score));
            }
        }
        best.map(|(name, _)| name)
    }
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_CUTOFF)
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_close_spelling_matches_at_default_cutoff() {
        let matcher = NameMatcher::default();
        let names = catalog(&["Erling Haaland", "Jorrel Hato"]);

        assert_eq!(
            matcher.best_match("Erling Haland", &names),
            Some("Erling Haaland")
        );
    }

    #[test]
    fn test_different_name_does_not_match() {
        let matcher = NameMatcher::default();
        let names = catalog(&["Erling Haaland", "Jorrel Hato"]);

        assert_eq!(matcher.best_match("Erling Smith", &names), None);
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let matcher = NameMatcher::default();
        let names = catalog(&["Brian Brobbey"]);

        assert_eq!(
            matcher.best_match("  brian   BROBBEY ", &names),
            Some("Brian Brobbey")
        );
    }

    #[test]
    fn test_exact_match_wins_over_near_match() {
        let matcher = NameMatcher::default();
        let names = catalog(&["Jorrel Hato", "Jorrel Hatos"]);

        assert_eq!(matcher.best_match("Jorrel Hatos", &names), Some("Jorrel Hatos"));
    }

    #[test]
    fn test_tie_keeps_first_catalog_entry() {
        let matcher = NameMatcher::new(0.5);
        // Both entries are equally distant from the candidate.
        let names = catalog(&["Jorrel Hatoa", "Jorrel Hatob"]);

        assert_eq!(
            matcher.best_match("Jorrel Hato", &names),
            Some("Jorrel Hatoa")
        );
    }

    #[test]
    fn test_empty_inputs() {
        let matcher = NameMatcher::default();
        assert_eq!(matcher.best_match("Someone", &[]), None);
        assert_eq!(matcher.best_match("   ", &catalog(&["Someone"])), None);
    }
}
