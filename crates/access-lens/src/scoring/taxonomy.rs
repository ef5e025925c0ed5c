use serde::Serialize;

/// WCAG conformance tier. Tag sets are cumulative: AA includes A's tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WcagLevel {
    A,
    AA,
    AAA,
}

impl WcagLevel {
    pub const ALL: [WcagLevel; 3] = [WcagLevel::A, WcagLevel::AA, WcagLevel::AAA];

    pub fn tags(self) -> &'static [&'static str] {
        match self {
            WcagLevel::A => &["wcag2a"],
            WcagLevel::AA => &["wcag2a", "wcag2aa"],
            WcagLevel::AAA => &["wcag2a", "wcag2aa", "wcag2aaa"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WcagLevel::A => "A",
            WcagLevel::AA => "AA",
            WcagLevel::AAA => "AAA",
        }
    }
}

/// The four WCAG principles and the auditor category tags that belong to each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PourCategory {
    Perceivable,
    Operable,
    Understandable,
    Robust,
}

impl PourCategory {
    pub const ALL: [PourCategory; 4] = [
        PourCategory::Perceivable,
        PourCategory::Operable,
        PourCategory::Understandable,
        PourCategory::Robust,
    ];

    /// Tags are matched verbatim (case-sensitive).
    pub fn tags(self) -> &'static [&'static str] {
        match self {
            PourCategory::Perceivable => &[
                "cat.color",
                "cat.text-alternatives",
                "cat.time-and-media",
                "cat.adaptable",
            ],
            PourCategory::Operable => &["cat.keyboard", "cat.navigation", "cat.seizure"],
            PourCategory::Understandable => &["cat.language", "cat.readable", "cat.predictable"],
            PourCategory::Robust => &["cat.parsing", "cat.name-role-value"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PourCategory::Perceivable => "Perceivable",
            PourCategory::Operable => "Operable",
            PourCategory::Understandable => "Understandable",
            PourCategory::Robust => "Robust",
        }
    }
}

/// Letter grade shown next to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreGrade {
    A,
    B,
    C,
    D,
    F,
}

impl ScoreGrade {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => ScoreGrade::A,
            80..=89 => ScoreGrade::B,
            70..=79 => ScoreGrade::C,
            60..=69 => ScoreGrade::D,
            _ => ScoreGrade::F,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreGrade::A => "A",
            ScoreGrade::B => "B",
            ScoreGrade::C => "C",
            ScoreGrade::D => "D",
            ScoreGrade::F => "F",
        }
    }
}

/// Coarser bucket used for highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Good,
    Fair,
    Poor,
    Failing,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => ScoreBand::Good,
            70..=89 => ScoreBand::Fair,
            50..=69 => ScoreBand::Poor,
            _ => ScoreBand::Failing,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Good => "good",
            ScoreBand::Fair => "fair",
            ScoreBand::Poor => "poor",
            ScoreBand::Failing => "failing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wcag_tag_sets_are_cumulative() {
        for tag in WcagLevel::A.tags() {
            assert!(WcagLevel::AA.tags().contains(tag));
        }
        for tag in WcagLevel::AA.tags() {
            assert!(WcagLevel::AAA.tags().contains(tag));
        }
    }

    #[test]
    fn category_tag_sets_do_not_overlap() {
        for (idx, left) in PourCategory::ALL.iter().enumerate() {
            for right in &PourCategory::ALL[idx + 1..] {
                assert!(left.tags().iter().all(|tag| !right.tags().contains(tag)));
            }
        }
    }

    #[test]
    fn grades_and_bands_follow_thresholds() {
        assert_eq!(ScoreGrade::from_score(100), ScoreGrade::A);
        assert_eq!(ScoreGrade::from_score(90), ScoreGrade::A);
        assert_eq!(ScoreGrade::from_score(89), ScoreGrade::B);
        assert_eq!(ScoreGrade::from_score(70), ScoreGrade::C);
        assert_eq!(ScoreGrade::from_score(60), ScoreGrade::D);
        assert_eq!(ScoreGrade::from_score(59), ScoreGrade::F);
        assert_eq!(ScoreBand::from_score(75), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_score(50), ScoreBand::Poor);
        assert_eq!(ScoreBand::from_score(12), ScoreBand::Failing);
    }
}
