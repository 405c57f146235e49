//! Puzzle definitions: prefilled grids plus goals, stored as JSON files.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::pieces::TetrominoKind;
use crate::ConfigError;

#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed puzzle file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("grid cannot be empty")]
    EmptyGrid,
    #[error("all grid rows must have the same width")]
    RaggedGrid,
    #[error("puzzle must have at least one goal")]
    NoGoals,
    #[error("unknown color: {0}")]
    UnknownColor(String),
    #[error("puzzle grid is {found:?}, session expects {expected:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What a goal measures. Pattern goals carry the region of color names to
/// match against the playfield at a fixed offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "goal_type", rename_all = "snake_case")]
pub enum GoalKind {
    ClearLines,
    MaxPieces,
    Score,
    Pattern {
        pattern: Vec<Vec<Option<String>>>,
        pattern_x: i32,
        pattern_y: i32,
    },
}

/// One goal that must be achieved to complete the puzzle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleGoal {
    #[serde(flatten)]
    kind: GoalKind,
    target_value: u32,
    #[serde(default)]
    current_value: u32,
}

impl PuzzleGoal {
    pub fn new(kind: GoalKind, target_value: u32) -> Self {
        Self {
            kind,
            target_value,
            current_value: 0,
        }
    }

    pub fn kind(&self) -> &GoalKind {
        &self.kind
    }

    pub fn target(&self) -> u32 {
        self.target_value
    }

    pub fn progress(&self) -> u32 {
        self.current_value
    }

    pub fn is_achieved(&self) -> bool {
        self.current_value >= self.target_value
    }

    pub(crate) fn update(&mut self, value: u32) {
        self.current_value = value;
    }
}

/// A puzzle: name, description, prefilled grid (color names, `null` for
/// empty) and the goals to achieve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Puzzle {
    pub name: String,
    pub description: String,
    grid_data: Vec<Vec<Option<String>>>,
    goals: Vec<PuzzleGoal>,
}

impl Puzzle {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        grid_data: Vec<Vec<Option<String>>>,
        goals: Vec<PuzzleGoal>,
    ) -> Result<Self, PuzzleError> {
        let puzzle = Self {
            name: name.into(),
            description: description.into(),
            grid_data,
            goals,
        };
        puzzle.validate()?;
        Ok(puzzle)
    }

    /// Structural checks, run on every load: non-empty rectangular grid, at
    /// least one goal, every color name known.
    pub fn validate(&self) -> Result<(), PuzzleError> {
        let Some(first) = self.grid_data.first() else {
            return Err(PuzzleError::EmptyGrid);
        };
        let width = first.len();
        if width == 0 {
            return Err(PuzzleError::EmptyGrid);
        }
        if self.grid_data.iter().any(|row| row.len() != width) {
            return Err(PuzzleError::RaggedGrid);
        }
        if self.goals.is_empty() {
            return Err(PuzzleError::NoGoals);
        }
        for name in self.grid_data.iter().flatten().flatten() {
            if TetrominoKind::from_color_name(name).is_none() {
                return Err(PuzzleError::UnknownColor(name.clone()));
            }
        }
        for goal in &self.goals {
            if let GoalKind::Pattern { pattern, .. } = goal.kind() {
                for name in pattern.iter().flatten().flatten() {
                    if TetrominoKind::from_color_name(name).is_none() {
                        return Err(PuzzleError::UnknownColor(name.clone()));
                    }
                }
            }
        }
        Ok(())
    }

    /// (width, height) of the prefilled grid.
    pub fn dimensions(&self) -> (usize, usize) {
        let height = self.grid_data.len();
        let width = self.grid_data.first().map_or(0, Vec::len);
        (width, height)
    }

    pub fn grid(&self) -> &[Vec<Option<String>>] {
        &self.grid_data
    }

    pub fn goals(&self) -> &[PuzzleGoal] {
        &self.goals
    }

    pub(crate) fn goals_mut(&mut self) -> impl Iterator<Item = &mut PuzzleGoal> {
        self.goals.iter_mut()
    }

    pub fn is_completed(&self) -> bool {
        self.goals.iter().all(PuzzleGoal::is_achieved)
    }

    pub(crate) fn reset_progress(&mut self) {
        for goal in &mut self.goals {
            goal.current_value = 0;
        }
    }

    /// Parse and validate a puzzle from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, PuzzleError> {
        let puzzle: Self = serde_json::from_str(json)?;
        puzzle.validate()?;
        Ok(puzzle)
    }

    /// Load a puzzle from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PuzzleError> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Save a puzzle to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PuzzleError> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_grid(width: usize, height: usize) -> Vec<Vec<Option<String>>> {
        vec![vec![None; width]; height]
    }

    #[test]
    fn test_new_validates() {
        let puzzle = Puzzle::new(
            "Clear one",
            "Clear a single line",
            empty_grid(10, 20),
            vec![PuzzleGoal::new(GoalKind::ClearLines, 1)],
        )
        .unwrap();
        assert_eq!(puzzle.dimensions(), (10, 20));
        assert!(!puzzle.is_completed());
    }

    #[test]
    fn test_empty_grid_rejected() {
        let err = Puzzle::new(
            "bad",
            "",
            Vec::new(),
            vec![PuzzleGoal::new(GoalKind::Score, 100)],
        )
        .unwrap_err();
        assert!(matches!(err, PuzzleError::EmptyGrid));
    }

    #[test]
    fn test_ragged_grid_rejected() {
        let mut grid = empty_grid(10, 20);
        grid[5].pop();
        let err = Puzzle::new(
            "bad",
            "",
            grid,
            vec![PuzzleGoal::new(GoalKind::Score, 100)],
        )
        .unwrap_err();
        assert!(matches!(err, PuzzleError::RaggedGrid));
    }

    #[test]
    fn test_no_goals_rejected() {
        let err = Puzzle::new("bad", "", empty_grid(10, 20), Vec::new()).unwrap_err();
        assert!(matches!(err, PuzzleError::NoGoals));
    }

    #[test]
    fn test_unknown_color_rejected() {
        let mut grid = empty_grid(10, 20);
        grid[19][0] = Some("CHARTREUSE".into());
        let err = Puzzle::new(
            "bad",
            "",
            grid,
            vec![PuzzleGoal::new(GoalKind::Score, 100)],
        )
        .unwrap_err();
        assert!(matches!(err, PuzzleError::UnknownColor(name) if name == "CHARTREUSE"));
    }

    #[test]
    fn test_json_round_trip() {
        let json = r#"{
            "name": "Budget clear",
            "description": "Clear two lines in ten pieces",
            "grid_data": [[null, "CYAN"], ["RED", null]],
            "goals": [
                {"goal_type": "clear_lines", "target_value": 2},
                {"goal_type": "max_pieces", "target_value": 10}
            ]
        }"#;
        let puzzle = Puzzle::from_json_str(json).unwrap();
        assert_eq!(puzzle.name, "Budget clear");
        assert_eq!(puzzle.dimensions(), (2, 2));
        assert_eq!(puzzle.goals().len(), 2);
        assert!(matches!(puzzle.goals()[0].kind(), GoalKind::ClearLines));
        assert_eq!(puzzle.goals()[1].target(), 10);

        let back = serde_json::to_string(&puzzle).unwrap();
        let reparsed = Puzzle::from_json_str(&back).unwrap();
        assert_eq!(reparsed.grid()[0][1].as_deref(), Some("CYAN"));
    }

    #[test]
    fn test_pattern_goal_parses() {
        let json = r#"{
            "name": "Checker",
            "description": "Build a checker corner",
            "grid_data": [[null]],
            "goals": [{
                "goal_type": "pattern",
                "target_value": 2,
                "pattern": [["RED", null], [null, "RED"]],
                "pattern_x": 0,
                "pattern_y": 18
            }]
        }"#;
        let puzzle = Puzzle::from_json_str(json).unwrap();
        match puzzle.goals()[0].kind() {
            GoalKind::Pattern {
                pattern,
                pattern_x,
                pattern_y,
            } => {
                assert_eq!(pattern.len(), 2);
                assert_eq!((*pattern_x, *pattern_y), (0, 18));
            }
            other => panic!("expected pattern goal, got {other:?}"),
        }
    }

    #[test]
    fn test_goal_progress() {
        let mut goal = PuzzleGoal::new(GoalKind::ClearLines, 3);
        assert!(!goal.is_achieved());
        goal.update(2);
        assert_eq!(goal.progress(), 2);
        assert!(!goal.is_achieved());
        goal.update(3);
        assert!(goal.is_achieved());
    }
}
