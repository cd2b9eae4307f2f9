use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recording strategy for which generation summaries to persist.
///
/// Final summaries are always persisted regardless of strategy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecordingStrategy {
    /// Record every N generations, starting at generation 0.
    EveryN(usize),

    /// Record at specific generations.
    Specific(Vec<usize>),

    /// Record all generations.
    #[default]
    All,

    /// Only the final summary.
    None,
}

impl RecordingStrategy {
    /// Check if generation should be recorded
    pub fn should_record(&self, generation: usize) -> bool {
        match self {
            Self::EveryN(0) => false,
            Self::EveryN(n) => generation % n == 0,
            Self::Specific(gens) => gens.contains(&generation),
            Self::All => true,
            Self::None => false,
        }
    }
}

impl fmt::Display for RecordingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EveryN(n) => write!(f, "every:{n}"),
            Self::Specific(gens) => {
                let gens: Vec<String> = gens.iter().map(|g| g.to_string()).collect();
                write!(f, "at:{}", gens.join(","))
            }
            Self::All => write!(f, "all"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Parses `all`, `none`, `every:N` or `at:G1,G2,...`.
impl FromStr for RecordingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => return Ok(Self::All),
            "none" => return Ok(Self::None),
            _ => {}
        }
        if let Some(n) = s.strip_prefix("every:") {
            let n: usize = n
                .trim()
                .parse()
                .map_err(|e| format!("invalid interval '{n}': {e}"))?;
            if n == 0 {
                return Err("interval must be at least 1".to_string());
            }
            return Ok(Self::EveryN(n));
        }
        if let Some(list) = s.strip_prefix("at:") {
            let gens = list
                .split(',')
                .map(|g| {
                    g.trim()
                        .parse::<usize>()
                        .map_err(|e| format!("invalid generation '{g}': {e}"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Self::Specific(gens));
        }
        Err(format!(
            "unknown recording strategy '{s}' (expected all, none, every:N or at:G1,G2)"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_record() {
        assert!(RecordingStrategy::All.should_record(7));
        assert!(!RecordingStrategy::None.should_record(0));

        let every = RecordingStrategy::EveryN(10);
        assert!(every.should_record(0));
        assert!(every.should_record(20));
        assert!(!every.should_record(15));
        assert!(!RecordingStrategy::EveryN(0).should_record(0));

        let specific = RecordingStrategy::Specific(vec![3, 8]);
        assert!(specific.should_record(8));
        assert!(!specific.should_record(4));
    }

    #[test]
    fn test_parse_strategies() {
        assert_eq!("all".parse(), Ok(RecordingStrategy::All));
        assert_eq!("none".parse(), Ok(RecordingStrategy::None));
        assert_eq!("every:5".parse(), Ok(RecordingStrategy::EveryN(5)));
        assert_eq!(
            "at:1, 4,9".parse(),
            Ok(RecordingStrategy::Specific(vec![1, 4, 9]))
        );
        assert!("every:0".parse::<RecordingStrategy>().is_err());
        assert!("sometimes".parse::<RecordingStrategy>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for strategy in [
            RecordingStrategy::All,
            RecordingStrategy::EveryN(25),
            RecordingStrategy::Specific(vec![0, 10]),
        ] {
            assert_eq!(strategy.to_string().parse(), Ok(strategy));
        }
    }
}
