use std::collections::HashSet;

/// Decides which clubs' results are forwarded to persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClubFilter {
    #[default]
    Any,
    /// Lower-cased, trimmed club names.
    Whitelist(HashSet<String>),
}

impl ClubFilter {
    /// Builds a whitelist; an empty list admits every club.
    pub fn whitelist<I, S>(clubs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let clubs: HashSet<String> = clubs
            .into_iter()
            .map(|club| normalize(club.as_ref()))
            .filter(|club| !club.is_empty())
            .collect();

        if clubs.is_empty() {
            Self::Any
        } else {
            Self::Whitelist(clubs)
        }
    }

    pub fn allows(&self, club_name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Whitelist(clubs) => clubs.contains(&normalize(club_name)),
        }
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_admits_everything() {
        let filter = ClubFilter::Any;
        assert!(filter.allows("Harriers"));
        assert!(filter.allows(""));
    }

    #[test]
    fn test_whitelist_matches_case_and_whitespace_insensitively() {
        let filter = ClubFilter::whitelist(["Harriers", " Road Runners "]);

        assert!(filter.allows("harriers"));
        assert!(filter.allows("ROAD RUNNERS"));
        assert!(!filter.allows("Striders"));
        assert!(!filter.allows(""));
    }

    #[test]
    fn test_blank_whitelist_admits_everything() {
        assert_eq!(ClubFilter::whitelist(["", "  "]), ClubFilter::Any);
        assert_eq!(ClubFilter::whitelist(Vec::<String>::new()), ClubFilter::Any);
    }
}
