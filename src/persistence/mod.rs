//! Level persistence in the tile-code matrix format
//!
//! Two encodings of the same data:
//! - Plain text: one grid row per line, codes separated by whitespace or
//!   commas, `#` starts a comment
//! - JSON envelope (`Level`) carrying the matrix plus level parameters
//!
//! File access belongs to the host; this module only converts strings.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_TIME_LIMIT_SECS;
use crate::error::{Result, SimError};

/// A level template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Tile codes, row-major
    pub codes: Vec<Vec<u8>>,
    /// Diamonds needed before the exit accepts the player
    #[serde(default)]
    pub diamonds_required: u32,
    /// Countdown in seconds; `None` disables it
    #[serde(default = "default_time_limit")]
    pub time_limit_secs: Option<u32>,
}

fn default_time_limit() -> Option<u32> {
    Some(DEFAULT_TIME_LIMIT_SECS)
}

impl Level {
    pub fn new(codes: Vec<Vec<u8>>, diamonds_required: u32) -> Self {
        Self {
            codes,
            diamonds_required,
            time_limit_secs: default_time_limit(),
        }
    }

    /// Level with the countdown disabled
    pub fn untimed(codes: Vec<Vec<u8>>, diamonds_required: u32) -> Self {
        Self {
            codes,
            diamonds_required,
            time_limit_secs: None,
        }
    }

    pub fn from_text(text: &str, diamonds_required: u32) -> Result<Self> {
        Ok(Self::new(parse_codes(text)?, diamonds_required))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Parse the plain text matrix. Row lengths are validated at grid
/// construction, not here.
pub fn parse_codes(text: &str) -> Result<Vec<Vec<u8>>> {
    let mut rows = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let row = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(|token| {
                token.parse::<u8>().map_err(|_| SimError::Parse {
                    line: i + 1,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<u8>>>()?;
        rows.push(row);
    }
    Ok(rows)
}

/// Format a matrix as plain text, space separated
pub fn format_codes(codes: &[Vec<u8>]) -> String {
    let mut out = String::new();
    for row in codes {
        let line: Vec<String> = row.iter().map(u8::to_string).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_with_comments() {
        let text = "# level 1\n4 4 4\n4,2,4\n\n4 4 4  # bottom\n";
        let codes = parse_codes(text).unwrap();
        assert_eq!(codes, vec![vec![4, 4, 4], vec![4, 2, 4], vec![4, 4, 4]]);
    }

    #[test]
    fn test_parse_reports_line() {
        let err = parse_codes("0 0\n0 x\n").unwrap_err();
        assert!(matches!(err, SimError::Parse { line: 2, ref token } if token == "x"));
    }

    #[test]
    fn test_text_round_trip() {
        let codes = vec![vec![4, 4, 4, 4], vec![4, 2, 15, 20], vec![4, 4, 4, 4]];
        assert_eq!(parse_codes(&format_codes(&codes)).unwrap(), codes);
    }

    #[test]
    fn test_json_defaults_time_limit() {
        let level = Level::from_json(r#"{ "codes": [[2, 0]], "diamonds_required": 3 }"#).unwrap();
        assert_eq!(level.diamonds_required, 3);
        assert_eq!(level.time_limit_secs, Some(DEFAULT_TIME_LIMIT_SECS));

        let json = level.to_json().unwrap();
        assert_eq!(Level::from_json(&json).unwrap(), level);
    }
}
