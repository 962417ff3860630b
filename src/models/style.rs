use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LineThickness {
    Thin,
    #[default]
    Medium,
    Bold,
}

impl LineThickness {
    pub const ALL: [LineThickness; 3] =
        [LineThickness::Thin, LineThickness::Medium, LineThickness::Bold];

    /// Clause substituted into the line-art prompt.
    pub fn phrase(&self) -> &'static str {
        match self {
            LineThickness::Thin => "thin, delicate and precise lines",
            LineThickness::Medium => "medium-weight, clean and even lines",
            LineThickness::Bold => "thick, bold outlines that are easy to color inside",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineThickness::Thin => "thin",
            LineThickness::Medium => "medium",
            LineThickness::Bold => "bold",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl DetailLevel {
    pub const ALL: [DetailLevel; 3] = [DetailLevel::Low, DetailLevel::Medium, DetailLevel::High];

    pub fn phrase(&self) -> &'static str {
        match self {
            DetailLevel::Low => {
                "simple, large shapes with minimal detail, suitable for young children"
            }
            DetailLevel::Medium => "a moderate amount of detail while keeping the main shapes clear",
            DetailLevel::High => "intricate, highly detailed linework suitable for adults",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DetailLevel::Low => "low",
            DetailLevel::Medium => "medium",
            DetailLevel::High => "high",
        }
    }
}

impl fmt::Display for LineThickness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineThickness {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "thin" => Ok(LineThickness::Thin),
            "medium" => Ok(LineThickness::Medium),
            "bold" => Ok(LineThickness::Bold),
            other => Err(format!(
                "unknown line thickness '{}' (expected thin, medium or bold)",
                other
            )),
        }
    }
}

impl FromStr for DetailLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(DetailLevel::Low),
            "medium" => Ok(DetailLevel::Medium),
            "high" => Ok(DetailLevel::High),
            other => Err(format!(
                "unknown detail level '{}' (expected low, medium or high)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleOptions {
    pub thickness: LineThickness,
    pub detail: DetailLevel,
}

impl StyleOptions {
    pub fn new(thickness: LineThickness, detail: DetailLevel) -> Self {
        Self { thickness, detail }
    }

    pub fn with_thickness(mut self, thickness: LineThickness) -> Self {
        self.thickness = thickness;
        self
    }

    pub fn with_detail(mut self, detail: DetailLevel) -> Self {
        self.detail = detail;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("BOLD".parse::<LineThickness>(), Ok(LineThickness::Bold));
        assert_eq!(" high ".parse::<DetailLevel>(), Ok(DetailLevel::High));
        assert!("extra".parse::<DetailLevel>().is_err());
    }

    #[test]
    fn test_defaults_are_medium() {
        let options = StyleOptions::default();
        assert_eq!(options.thickness, LineThickness::Medium);
        assert_eq!(options.detail, DetailLevel::Medium);
    }

    #[test]
    fn test_phrases_are_distinct() {
        let thickness: Vec<_> = LineThickness::ALL.iter().map(|t| t.phrase()).collect();
        assert_ne!(thickness[0], thickness[1]);
        assert_ne!(thickness[1], thickness[2]);

        let detail: Vec<_> = DetailLevel::ALL.iter().map(|d| d.phrase()).collect();
        assert_ne!(detail[0], detail[1]);
        assert_ne!(detail[1], detail[2]);
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&StyleOptions::new(
            LineThickness::Thin,
            DetailLevel::High,
        ))
        .unwrap();
        assert_eq!(json, r#"{"thickness":"thin","detail":"high"}"#);
    }
}
