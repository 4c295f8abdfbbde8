//! Maps a fetch target's endpoint path to the record kind its response
//! represents.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::RecordKind;

static STANDINGS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/competitions/([^/]+)/standings/?$").expect("valid pattern"));
static COMPETITION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/competitions/([^/]+)/?$").expect("valid pattern"));

/// Classification result: the record kind plus the competition code the
/// endpoint addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub kind: RecordKind,
    pub code: String,
}

/// Classify an endpoint path. The query string is ignored.
///
/// Checks run in a fixed order: standings first, then the bare competition
/// form, then anything carrying a `matches` segment. The ordering matters;
/// `/competitions/{code}/matches` must not satisfy the bare-competition
/// rule.
pub fn classify(endpoint: &str) -> Option<Classified> {
    let path = endpoint.split('?').next().unwrap_or(endpoint);

    if let Some(caps) = STANDINGS_RE.captures(path) {
        return Some(Classified {
            kind: RecordKind::Standing,
            code: caps[1].to_string(),
        });
    }

    if let Some(caps) = COMPETITION_RE.captures(path) {
        return Some(Classified {
            kind: RecordKind::Competition,
            code: caps[1].to_string(),
        });
    }

    if path.split('/').any(|segment| segment == "matches") {
        // code sits in the same position as in the other two forms
        let code = path.split('/').filter(|s| !s.is_empty()).nth(1)?;
        return Some(Classified {
            kind: RecordKind::Match,
            code: code.to_string(),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standings_endpoint() {
        let c = classify("/competitions/PL/standings").unwrap();
        assert_eq!(c.kind, RecordKind::Standing);
        assert_eq!(c.code, "PL");
    }

    #[test]
    fn bare_competition_endpoint() {
        let c = classify("/competitions/PL").unwrap();
        assert_eq!(c.kind, RecordKind::Competition);
        assert_eq!(c.code, "PL");
    }

    #[test]
    fn matches_endpoint_with_query() {
        let c = classify("/competitions/PL/matches?status=FINISHED").unwrap();
        assert_eq!(c.kind, RecordKind::Match);
        assert_eq!(c.code, "PL");
    }

    #[test]
    fn matches_endpoint_is_not_a_competition() {
        let c = classify("/competitions/SA/matches").unwrap();
        assert_eq!(c.kind, RecordKind::Match);
        assert_eq!(c.code, "SA");
    }

    #[test]
    fn query_string_ignored_for_standings() {
        let c = classify("/competitions/PD/standings?season=2025").unwrap();
        assert_eq!(c.kind, RecordKind::Standing);
        assert_eq!(c.code, "PD");
    }

    #[test]
    fn unknown_paths_classify_to_none() {
        assert!(classify("/areas/2072").is_none());
        assert!(classify("/competitions").is_none());
        assert!(classify("/").is_none());
    }
}
