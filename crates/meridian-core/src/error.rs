use thiserror::Error;

/// Rejections from state-mutating engine operations other than movement.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("unknown unit")]
    UnitNotFound,
    #[error("unknown city")]
    CityNotFound,
    #[error("unknown civilization")]
    CivilizationNotFound,
    #[error("unknown technology")]
    UnknownTechnology,
    #[error("technology prerequisites not met")]
    TechPrerequisitesNotMet,
    #[error("technology already known")]
    TechAlreadyKnown,
    #[error("not enough gold: need {needed}, have {available}")]
    NotEnoughGold { needed: i32, available: i32 },
    #[error("unit cannot found a city")]
    NotASettler,
    #[error("cannot found a city here")]
    CannotFoundCity,
    #[error("another city is within {min_distance} tiles")]
    CityTooClose { min_distance: u32 },
    #[error("cannot found a city on water")]
    WaterTile,
    #[error("cannot build improvement here")]
    CannotBuildImprovement,
    #[error("build queue has no entry at index {0}")]
    InvalidQueueIndex(usize),
    #[error("production item not available")]
    ItemNotAvailable,
    #[error("unit belongs to a civilization whose turn it is not")]
    NotActiveCivilization,
    #[error("game is already over")]
    GameOver,
    #[error("{0}")]
    InvalidSettings(String),
}

impl GameError {
    /// Stable machine-readable reason code.
    pub const fn code(&self) -> &'static str {
        match self {
            GameError::UnitNotFound => "unit_not_found",
            GameError::CityNotFound => "city_not_found",
            GameError::CivilizationNotFound => "civilization_not_found",
            GameError::UnknownTechnology => "unknown_technology",
            GameError::TechPrerequisitesNotMet => "tech_prerequisites_not_met",
            GameError::TechAlreadyKnown => "tech_already_known",
            GameError::NotEnoughGold { .. } => "not_enough_gold",
            GameError::NotASettler => "not_a_settler",
            GameError::CannotFoundCity => "cannot_found_city",
            GameError::CityTooClose { .. } => "city_too_close",
            GameError::WaterTile => "water_tile",
            GameError::CannotBuildImprovement => "cannot_build_improvement",
            GameError::InvalidQueueIndex(_) => "invalid_queue_index",
            GameError::ItemNotAvailable => "item_not_available",
            GameError::NotActiveCivilization => "not_active_civilization",
            GameError::GameOver => "game_over",
            GameError::InvalidSettings(_) => "invalid_settings",
        }
    }
}
