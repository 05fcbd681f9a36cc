use crate::error::{InsightError, InsightResult};
use serde::de::DeserializeOwned;
use tracing::warn;

/// How a JSON-mode response that doesn't decode should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Fall back to `T::default()` and log a warning
    Lenient,
    /// Surface an `InsightError::Parse` to the caller
    Strict,
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an info string such as "json" on the opening fence line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Outermost `{..}` or `[..]` block, whichever opens first
fn bracketed_block(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let close = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

/// Decode a JSON document that may be wrapped in a code fence or stray prose.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> InsightResult<T> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(InsightError::Parse("empty response body".to_string()));
    }

    match serde_json::from_str::<T>(body) {
        Ok(value) => Ok(value),
        Err(first_err) => {
            let block = bracketed_block(body).ok_or_else(|| {
                InsightError::Parse(format!("no JSON document found: {}", first_err))
            })?;
            serde_json::from_str::<T>(block).map_err(|_| InsightError::Parse(first_err.to_string()))
        }
    }
}

/// Decode a JSON-mode response according to `mode`.
pub fn parse_json_response<T>(text: &str, mode: ParseMode) -> InsightResult<T>
where
    T: DeserializeOwned + Default,
{
    match (extract_json::<T>(text), mode) {
        (Ok(value), _) => Ok(value),
        (Err(err), ParseMode::Strict) => Err(err),
        (Err(err), ParseMode::Lenient) => {
            warn!("Ignoring malformed JSON response: {}", err);
            Ok(T::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Slip {
        legs: Vec<u32>,
    }

    #[test]
    fn test_plain_json() {
        let slip: Slip = extract_json(r#"{"legs": [1, 2]}"#).unwrap();
        assert_eq!(slip.legs, vec![1, 2]);
    }

    #[test]
    fn test_fenced_json() {
        let text = "```json\n{\"legs\": [3]}\n```";
        let slip: Slip = extract_json(text).unwrap();
        assert_eq!(slip.legs, vec![3]);
    }

    #[test]
    fn test_json_inside_prose() {
        let text = "Sure! Here is the slip: {\"legs\": [4, 5]} Good luck.";
        let slip: Slip = extract_json(text).unwrap();
        assert_eq!(slip.legs, vec![4, 5]);

        let list: Vec<u32> = extract_json("Odds follow: [1, 2, 3]").unwrap();
        assert_eq!(list, vec![1, 2, 3]);
    }

    #[test]
    fn test_lenient_defaults() {
        let slip: Slip = parse_json_response("not json at all", ParseMode::Lenient).unwrap();
        assert_eq!(slip, Slip::default());
        let list: Vec<u32> = parse_json_response("", ParseMode::Lenient).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_strict_fails() {
        let result: InsightResult<Slip> = parse_json_response("{\"legs\": [", ParseMode::Strict);
        assert!(matches!(result, Err(InsightError::Parse(_))));
        let result: InsightResult<Slip> = parse_json_response("   ", ParseMode::Strict);
        assert!(matches!(result, Err(InsightError::Parse(_))));
    }
}
