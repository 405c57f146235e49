//! Persist the best results to disk (XDG config or ~/.config/tetrion).

use anyhow::Result;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

const FILENAME: &str = "highscores";

/// Best results across sessions, stored as `key=value` lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighScores {
    pub score: u32,
    pub lines: u32,
    pub level: u32,
}

impl HighScores {
    /// Fold a finished session's results in; true when anything improved.
    pub fn absorb(&mut self, score: u32, lines: u32, level: u32) -> bool {
        let improved = score > self.score || lines > self.lines || level > self.level;
        self.score = self.score.max(score);
        self.lines = self.lines.max(lines);
        self.level = self.level.max(level);
        improved
    }
}

/// Path to the high scores file (config dir / tetrion / highscores).
fn config_path() -> Result<PathBuf> {
    let base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if xdg.is_empty() {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".config")
        } else {
            PathBuf::from(xdg)
        }
    } else {
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from("."))
    };
    Ok(base.join("tetrion").join(FILENAME))
}

fn parse(content: &str) -> HighScores {
    let mut scores = HighScores::default();
    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().parse::<u32>().unwrap_or(0);
        match key.trim() {
            "score" => scores.score = value,
            "lines" => scores.lines = value,
            "level" => scores.level = value,
            _ => {}
        }
    }
    scores
}

/// Load high scores from disk; zeros on missing or unreadable file.
pub fn load_high_scores() -> HighScores {
    let path = match config_path() {
        Ok(p) => p,
        Err(_) => return HighScores::default(),
    };
    match fs::read_to_string(path) {
        Ok(content) => parse(&content),
        Err(_) => HighScores::default(),
    }
}

/// Save high scores to disk. Creates the config directory if needed.
pub fn save_high_scores(scores: &HighScores) -> Result<()> {
    let path = config_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut f = fs::File::create(path)?;
    writeln!(f, "score={}", scores.score)?;
    writeln!(f, "lines={}", scores.lines)?;
    writeln!(f, "level={}", scores.level)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value_lines() {
        let scores = parse("score=1200\nlines=14\nlevel=2\n");
        assert_eq!(
            scores,
            HighScores {
                score: 1200,
                lines: 14,
                level: 2
            }
        );
    }

    #[test]
    fn test_parse_ignores_garbage() {
        let scores = parse("score=90\nnot a line\nrank=gold\nlines=abc\n");
        assert_eq!(scores.score, 90);
        assert_eq!(scores.lines, 0);
        assert_eq!(scores.level, 0);
    }

    #[test]
    fn test_absorb_keeps_maxima() {
        let mut scores = HighScores {
            score: 500,
            lines: 9,
            level: 1,
        };
        assert!(scores.absorb(300, 12, 2));
        assert_eq!(
            scores,
            HighScores {
                score: 500,
                lines: 12,
                level: 2
            }
        );
        assert!(!scores.absorb(100, 1, 1));
    }
}
