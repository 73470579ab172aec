//! Administrative catalog ingestion helpers.

/// Parse the admin `name|quality` answer: single split on the first `|`,
/// both halves trimmed and lowercased. `None` when the separator is missing
/// or either half comes out empty.
pub fn parse_name_quality(text: &str) -> Option<(String, String)> {
    let (name, quality) = text.split_once('|')?;
    let name = name.trim().to_lowercase();
    let quality = quality.trim().to_lowercase();
    if name.is_empty() || quality.is_empty() {
        return None;
    }
    Some((name, quality))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_the_first_pipe_only() {
        assert_eq!(
            parse_name_quality("inception|720p"),
            Some(("inception".to_string(), "720p".to_string()))
        );
        assert_eq!(
            parse_name_quality("odd|name|720p"),
            Some(("odd".to_string(), "name|720p".to_string()))
        );
    }

    #[test]
    fn trims_and_lowercases_both_halves() {
        assert_eq!(
            parse_name_quality("  The Matrix | 1080P "),
            Some(("the matrix".to_string(), "1080p".to_string()))
        );
    }

    #[test]
    fn rejects_missing_separator_and_empty_halves() {
        assert_eq!(parse_name_quality("inception 720p"), None);
        assert_eq!(parse_name_quality("|720p"), None);
        assert_eq!(parse_name_quality("inception|"), None);
        assert_eq!(parse_name_quality(""), None);
    }
}
