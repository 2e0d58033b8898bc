//! Structural path parser
//!
//! Grammar:
//! ```text
//! path    = "/" | ( "/" step )+
//! step    = name [ "[" ordinal "]" ]
//! ordinal = digit+            ; 1-based, missing means 1
//! ```

use thiserror::Error;

use super::types::{PathStep, StructuralPath};

/// Path parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
    #[error("Empty path string")]
    Empty,

    #[error("Path must start with '/'")]
    MissingLeadingSlash,

    #[error("Empty step at position {0}")]
    EmptyStep(usize),

    #[error("Unclosed bracket in step {0}")]
    UnclosedBracket(usize),

    #[error("Invalid ordinal '{1}' in step {0}")]
    InvalidOrdinal(usize, String),

    #[error("Invalid tag name '{1}' in step {0}")]
    InvalidTag(usize, String),
}

/// Parse the text form of a [`StructuralPath`]
pub fn parse_path(input: &str) -> Result<StructuralPath, PathParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(PathParseError::Empty);
    }
    let rest = input
        .strip_prefix('/')
        .ok_or(PathParseError::MissingLeadingSlash)?;
    if rest.is_empty() {
        return Ok(StructuralPath::root());
    }

    let mut path = StructuralPath::root();
    for (index, raw) in rest.split('/').enumerate() {
        path.push(parse_step(index, raw)?);
    }
    Ok(path)
}

fn parse_step(index: usize, raw: &str) -> Result<PathStep, PathParseError> {
    if raw.is_empty() {
        return Err(PathParseError::EmptyStep(index));
    }

    let (tag, ordinal) = match raw.find('[') {
        Some(open) => {
            let inner = raw[open + 1..]
                .strip_suffix(']')
                .ok_or(PathParseError::UnclosedBracket(index))?;
            let ordinal: u32 = inner
                .parse()
                .map_err(|_| PathParseError::InvalidOrdinal(index, inner.to_string()))?;
            if ordinal == 0 {
                return Err(PathParseError::InvalidOrdinal(index, inner.to_string()));
            }
            (&raw[..open], ordinal)
        }
        None => (raw, 1),
    };

    let valid = !tag.is_empty()
        && tag
            .chars()
            .all(|ch| ch.is_alphanumeric() || matches!(ch, '-' | '_' | ':' | '.'));
    if !valid {
        return Err(PathParseError::InvalidTag(index, tag.to_string()));
    }

    Ok(PathStep::new(tag.to_ascii_lowercase(), ordinal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root() {
        assert!(parse_path("/").unwrap().is_root());
    }

    #[test]
    fn test_parse_steps() {
        let path = parse_path("/html[1]/body[1]/div[3]/p[12]").unwrap();
        assert_eq!(path.depth(), 4);
        assert_eq!(path.steps()[2], PathStep::new("div", 3));
        assert_eq!(path.steps()[3], PathStep::new("p", 12));
    }

    #[test]
    fn test_parse_missing_ordinal_defaults_to_first() {
        let path = parse_path("/html/BODY").unwrap();
        assert_eq!(path.to_string(), "/html[1]/body[1]");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_path(""), Err(PathParseError::Empty));
        assert_eq!(
            parse_path("html[1]"),
            Err(PathParseError::MissingLeadingSlash)
        );
        assert_eq!(parse_path("/html[1]//p[1]"), Err(PathParseError::EmptyStep(1)));
        assert_eq!(parse_path("/p[2"), Err(PathParseError::UnclosedBracket(0)));
        assert_eq!(
            parse_path("/p[0]"),
            Err(PathParseError::InvalidOrdinal(0, "0".to_string()))
        );
        assert_eq!(
            parse_path("/p[x]"),
            Err(PathParseError::InvalidOrdinal(0, "x".to_string()))
        );
        assert_eq!(
            parse_path("/#text[1]"),
            Err(PathParseError::InvalidTag(0, "#text".to_string()))
        );
    }
}
