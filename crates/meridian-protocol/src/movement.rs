use serde::{Deserialize, Serialize};

/// Movement points in tenths of a move, so road and railroad discounts stay exact.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MovePoints(pub i32);

impl MovePoints {
    pub const SCALE: i32 = 10;
    pub const ZERO: MovePoints = MovePoints(0);

    #[inline]
    pub const fn from_moves(moves: i32) -> Self {
        Self(moves * Self::SCALE)
    }

    #[inline]
    pub const fn tenths(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 <= 0
    }

    pub fn as_moves(self) -> f32 {
        self.0 as f32 / Self::SCALE as f32
    }

    #[inline]
    pub fn saturating_sub(self, other: MovePoints) -> MovePoints {
        MovePoints((self.0 - other.0).max(0))
    }
}

impl std::ops::Add for MovePoints {
    type Output = MovePoints;

    fn add(self, other: MovePoints) -> MovePoints {
        MovePoints(self.0.saturating_add(other.0))
    }
}

impl std::ops::Mul<u32> for MovePoints {
    type Output = MovePoints;

    fn mul(self, rhs: u32) -> MovePoints {
        MovePoints(self.0.saturating_mul(rhs as i32))
    }
}

impl std::fmt::Display for MovePoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.0 / Self::SCALE, (self.0 % Self::SCALE).abs())
    }
}

/// Why a move request ended the way it did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveReason {
    UnitNotFound,
    InvalidTarget,
    NoMovesLeft,
    TerrainImpassable,
    InsufficientMoves,
    CombatVictory,
    CombatDefeat,
}

impl MoveReason {
    pub const fn code(self) -> &'static str {
        match self {
            MoveReason::UnitNotFound => "unit_not_found",
            MoveReason::InvalidTarget => "invalid_target",
            MoveReason::NoMovesLeft => "no_moves_left",
            MoveReason::TerrainImpassable => "terrain_impassable",
            MoveReason::InsufficientMoves => "insufficient_moves",
            MoveReason::CombatVictory => "combat_victory",
            MoveReason::CombatDefeat => "combat_defeat",
        }
    }

    /// Failures after which an AI unit gives up for the rest of its turn without
    /// trying another target.
    pub const fn is_terminal_for_turn(self) -> bool {
        matches!(
            self,
            MoveReason::InsufficientMoves
                | MoveReason::NoMovesLeft
                | MoveReason::TerrainImpassable
                | MoveReason::InvalidTarget
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    pub success: bool,
    pub reason: Option<MoveReason>,
}

impl MoveResult {
    pub const fn moved() -> Self {
        Self {
            success: true,
            reason: None,
        }
    }

    pub const fn rejected(reason: MoveReason) -> Self {
        Self {
            success: false,
            reason: Some(reason),
        }
    }

    pub const fn combat(attacker_won: bool) -> Self {
        if attacker_won {
            Self {
                success: true,
                reason: Some(MoveReason::CombatVictory),
            }
        } else {
            Self {
                success: false,
                reason: Some(MoveReason::CombatDefeat),
            }
        }
    }
}
