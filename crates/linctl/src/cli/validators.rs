//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

/// Maximum length of a team key prefix.
const MAX_TEAM_KEY_LENGTH: usize = 10;

/// Validate an issue display key and normalize it to upper case.
///
/// Expected format: `TEAM-NUMBER` where:
/// - TEAM: 1-10 ASCII alphanumerics, starting with a letter
/// - NUMBER: 1+ ASCII digits
///
/// Examples: `ENG-123`, `eng-7`, `OPS2-40`
pub fn validate_issue_key(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Issue key cannot be empty".to_string());
    }

    let Some((team, number)) = s.split_once('-') else {
        return Err(format!(
            "Invalid issue key: '{s}'. Expected format: TEAM-NUMBER (e.g., ENG-123)"
        ));
    };

    validate_team_key(team).map_err(|e| format!("Issue key {}", e.to_lowercase()))?;

    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!(
            "Invalid issue key: '{s}'. The part after '-' must be a number"
        ));
    }

    Ok(s.to_ascii_uppercase())
}

/// Validate a team key such as `ENG`.
pub fn validate_team_key(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Team key cannot be empty".to_string());
    }

    if s.len() > MAX_TEAM_KEY_LENGTH {
        return Err(format!(
            "Team key cannot exceed {MAX_TEAM_KEY_LENGTH} characters"
        ));
    }

    if !s.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err("Team key must start with a letter".to_string());
    }

    if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Team key must contain only alphanumerics".to_string());
    }

    Ok(s.to_string())
}

/// Validate a team reference, which may be a key or a full team name.
pub fn validate_team(s: &str) -> Result<String, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Team cannot be empty".to_string());
    }
    Ok(s.to_string())
}
