//! LLM response parsing into typed observation results.
//!
//! The LLM returns raw text (ideally JSON). This module extracts and
//! validates the response into an [`ObservationResult`] from
//! `sidequest-types`. Malformed responses are handled gracefully by
//! falling back to the known-safe default payload, never by propagating
//! an undefined danger level.

use sidequest_types::ObservationResult;
use tracing::warn;

use crate::error::VisionError;

/// The raw JSON shape the producer prompt asks for.
///
/// Field names mirror the schema in `templates/system.j2`; everything is
/// defaulted so a partial response still parses.
#[derive(Debug, serde::Deserialize)]
struct RawObservationResponse {
    #[serde(default)]
    objective: String,
    #[serde(default)]
    message_text: String,
    #[serde(default)]
    message_visible: bool,
    #[serde(default)]
    show_notification: bool,
    #[serde(default)]
    danger_level: String,
    #[serde(default)]
    encounter_active: bool,
    #[serde(default)]
    encounter_name: Option<String>,
    #[serde(default)]
    environment_summary: String,
}

/// Parse an LLM response string into a sanitized [`ObservationResult`].
///
/// Attempts multiple recovery strategies if the raw text is not clean JSON:
/// 1. Direct `serde_json` deserialization
/// 2. Extract JSON from markdown code blocks
/// 3. Strip trailing commas and retry
///
/// If all attempts fail, returns [`ObservationResult::safe_default`] with
/// a warning log (fail closed).
pub fn parse_observation(raw: &str) -> ObservationResult {
    match try_parse(raw) {
        Ok(result) => result.sanitize(),
        Err(e) => {
            warn!(
                error = %e,
                raw_response = raw,
                "failed to parse vision response, falling back to safe default"
            );
            ObservationResult::safe_default()
        }
    }
}

/// Attempt to parse the response through multiple recovery strategies.
fn try_parse(raw: &str) -> Result<ObservationResult, VisionError> {
    let trimmed = raw.trim();

    // Strategy 1: direct parse
    if let Ok(parsed) = serde_json::from_str::<RawObservationResponse>(trimmed) {
        return Ok(convert_raw_response(parsed));
    }

    // Strategy 2: extract from markdown code block
    if let Some(json_str) = extract_json_from_codeblock(trimmed)
        && let Ok(parsed) = serde_json::from_str::<RawObservationResponse>(json_str)
    {
        return Ok(convert_raw_response(parsed));
    }

    // Strategy 3: strip trailing commas and retry
    let cleaned = strip_trailing_commas(trimmed);
    if let Ok(parsed) = serde_json::from_str::<RawObservationResponse>(&cleaned) {
        return Ok(convert_raw_response(parsed));
    }

    // Strategy 4: extract from code block then strip commas
    if let Some(json_str) = extract_json_from_codeblock(trimmed) {
        let cleaned_inner = strip_trailing_commas(json_str);
        if let Ok(parsed) = serde_json::from_str::<RawObservationResponse>(&cleaned_inner) {
            return Ok(convert_raw_response(parsed));
        }
    }

    Err(VisionError::Parse(format!(
        "all parse strategies failed for: {trimmed}"
    )))
}

/// Convert the raw response into an [`ObservationResult`].
///
/// An unknown danger level string degrades to `none` rather than failing
/// the whole response; the rest of the payload is usually still usable.
fn convert_raw_response(raw: RawObservationResponse) -> ObservationResult {
    let danger_level = match raw.danger_level.to_lowercase().as_str() {
        "low" => sidequest_types::DangerLevel::Low,
        "high" => sidequest_types::DangerLevel::High,
        "none" | "" => sidequest_types::DangerLevel::None,
        other => {
            warn!(danger_level = other, "unknown danger level, treating as none");
            sidequest_types::DangerLevel::None
        }
    };

    ObservationResult {
        objective: raw.objective,
        message_text: raw.message_text,
        message_visible: raw.message_visible,
        show_notification: raw.show_notification,
        danger_level,
        encounter_active: raw.encounter_active,
        encounter_name: raw.encounter_name,
        environment_summary: raw.environment_summary,
    }
}

/// Extract the contents of the first markdown code block, if any.
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = text.get(start.checked_add(3)?..)?;
    // Skip an optional language tag on the fence line.
    let body_start = after_fence.find('\n')?.checked_add(1)?;
    let body = after_fence.get(body_start..)?;
    let end = body.find("```")?;
    body.get(..end).map(str::trim)
}

/// Remove trailing commas before closing braces and brackets.
///
/// LLMs frequently emit `{"a": 1,}` which strict JSON rejects.
fn strip_trailing_commas(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ',' {
            // Look ahead past whitespace for a closing brace or bracket.
            let mut lookahead = chars.clone();
            let mut next_significant = None;
            while let Some(&n) = lookahead.peek() {
                if n.is_whitespace() {
                    lookahead.next();
                } else {
                    next_significant = Some(n);
                    break;
                }
            }
            if matches!(next_significant, Some('}' | ']')) {
                continue;
            }
        }
        result.push(c);
    }

    result
}

#[cfg(test)]
mod tests {
    use sidequest_types::DangerLevel;

    use super::*;

    #[test]
    fn parses_clean_json() {
        let raw = r#"{
            "objective": "Survive the confrontation",
            "message_text": "DANGER APPROACHING!",
            "message_visible": true,
            "show_notification": true,
            "danger_level": "high",
            "encounter_active": true,
            "encounter_name": "The Enraged Stranger",
            "environment_summary": "dim alley"
        }"#;

        let result = parse_observation(raw);
        assert_eq!(result.danger_level, DangerLevel::High);
        assert!(result.encounter_active);
        assert_eq!(result.encounter_name.as_deref(), Some("The Enraged Stranger"));
        assert_eq!(result.environment_summary, "dim alley");
    }

    #[test]
    fn parses_json_inside_codeblock() {
        let raw = "Here is the update:\n```json\n{\"objective\": \"Explore the archives\", \"danger_level\": \"none\"}\n```";
        let result = parse_observation(raw);
        assert_eq!(result.objective, "Explore the archives");
        assert_eq!(result.danger_level, DangerLevel::None);
    }

    #[test]
    fn recovers_from_trailing_commas() {
        let raw = r#"{"objective": "Navigate the guild hall", "danger_level": "low",}"#;
        let result = parse_observation(raw);
        assert_eq!(result.objective, "Navigate the guild hall");
        assert_eq!(result.danger_level, DangerLevel::Low);
    }

    #[test]
    fn garbage_falls_back_to_safe_default() {
        let result = parse_observation("I cannot help with that.");
        assert_eq!(result, ObservationResult::safe_default());
    }

    #[test]
    fn unknown_danger_level_degrades_to_none() {
        let raw = r#"{"objective": "Rest", "danger_level": "extreme"}"#;
        let result = parse_observation(raw);
        assert_eq!(result.danger_level, DangerLevel::None);
    }

    #[test]
    fn parse_output_is_sanitized() {
        // Name without an active encounter must be cleared.
        let raw = r#"{"encounter_active": false, "encounter_name": "Ghost"}"#;
        let result = parse_observation(raw);
        assert!(result.encounter_name.is_none());

        // Active encounter without a name gets the placeholder.
        let raw = r#"{"danger_level": "high", "encounter_active": true}"#;
        let result = parse_observation(raw);
        assert_eq!(result.encounter_name.as_deref(), Some("Unknown Enemy"));
    }

    #[test]
    fn partial_json_defaults_missing_fields() {
        let raw = r#"{"objective": "Wander"}"#;
        let result = parse_observation(raw);
        assert_eq!(result.objective, "Wander");
        assert!(!result.message_visible);
        assert!(!result.encounter_active);
        assert_eq!(result.danger_level, DangerLevel::None);
    }
}
