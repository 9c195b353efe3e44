use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Five-point ordinal mood scale. Charted as 1 (Terrible) to 5 (Excellent).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "mood")]
pub enum Mood {
    Excellent,
    Good,
    Okay,
    Poor,
    Terrible,
}

impl Mood {
    pub fn score(self) -> i32 {
        match self {
            Self::Terrible => 1,
            Self::Poor => 2,
            Self::Okay => 3,
            Self::Good => 4,
            Self::Excellent => 5,
        }
    }

    pub fn from_score(score: i32) -> Option<Self> {
        match score {
            1 => Some(Self::Terrible),
            2 => Some(Self::Poor),
            3 => Some(Self::Okay),
            4 => Some(Self::Good),
            5 => Some(Self::Excellent),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Okay => "Okay",
            Self::Poor => "Poor",
            Self::Terrible => "Terrible",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "sleep_quality")]
pub enum SleepQuality {
    Excellent,
    Good,
    Fair,
    Poor,
    Terrible,
}

impl SleepQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::Terrible => "Terrible",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "recovery_status")]
pub enum Recovery {
    #[sqlx(rename = "Fully Recovered")]
    #[serde(rename = "Fully Recovered")]
    FullyRecovered,
    #[sqlx(rename = "Mostly Recovered")]
    #[serde(rename = "Mostly Recovered")]
    MostlyRecovered,
    #[sqlx(rename = "Somewhat Recovered")]
    #[serde(rename = "Somewhat Recovered")]
    SomewhatRecovered,
    #[sqlx(rename = "Still Sore")]
    #[serde(rename = "Still Sore")]
    StillSore,
    #[sqlx(rename = "Very Sore")]
    #[serde(rename = "Very Sore")]
    VerySore,
}

impl Recovery {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullyRecovered => "Fully Recovered",
            Self::MostlyRecovered => "Mostly Recovered",
            Self::SomewhatRecovered => "Somewhat Recovered",
            Self::StillSore => "Still Sore",
            Self::VerySore => "Very Sore",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "nutrition_quality")]
pub enum NutritionQuality {
    Excellent,
    Good,
    Fair,
    Poor,
    #[sqlx(rename = "Very Poor")]
    #[serde(rename = "Very Poor")]
    VeryPoor,
}

impl NutritionQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "fitness_goal")]
pub enum FitnessGoal {
    #[sqlx(rename = "Muscle Gain")]
    #[serde(rename = "Muscle Gain")]
    MuscleGain,
    #[sqlx(rename = "Fat Loss")]
    #[serde(rename = "Fat Loss")]
    FatLoss,
    Endurance,
    Strength,
    #[sqlx(rename = "General Fitness")]
    #[serde(rename = "General Fitness")]
    GeneralFitness,
    Recovery,
}

impl FitnessGoal {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MuscleGain => "Muscle Gain",
            Self::FatLoss => "Fat Loss",
            Self::Endurance => "Endurance",
            Self::Strength => "Strength",
            Self::GeneralFitness => "General Fitness",
            Self::Recovery => "Recovery",
        }
    }
}

/// One immutable daily wellness record. Rows are insert-only; the owner
/// reference and server-assigned timestamp never change.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: Mood,
    pub energy: i32,
    pub soreness: i32,
    pub sleep_hours: Option<f64>,
    pub sleep_quality: Option<SleepQuality>,
    pub stress_level: Option<i32>,
    pub recovery: Option<Recovery>,
    pub hydration: Option<i32>,
    pub nutrition_quality: Option<NutritionQuality>,
    pub workout_motivation: Option<i32>,
    pub fitness_goal: Option<FitnessGoal>,
    pub notes: Option<String>,
    pub weight: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Body of POST /api/checkin. Enum fields reject unknown variants at
/// deserialization; range constraints are checked by `validate()`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckInRequest {
    pub mood: Mood,
    #[validate(range(min = 1, max = 10, message = "energy must be between 1 and 10"))]
    pub energy: i32,
    #[validate(range(min = 1, max = 10, message = "soreness must be between 1 and 10"))]
    pub soreness: i32,
    #[validate(range(min = 0.0, max = 24.0, message = "sleepHours must be between 0 and 24"))]
    pub sleep_hours: Option<f64>,
    pub sleep_quality: Option<SleepQuality>,
    #[validate(range(min = 1, max = 10, message = "stressLevel must be between 1 and 10"))]
    pub stress_level: Option<i32>,
    pub recovery: Option<Recovery>,
    #[validate(range(min = 1, max = 10, message = "hydration must be between 1 and 10"))]
    pub hydration: Option<i32>,
    pub nutrition_quality: Option<NutritionQuality>,
    #[validate(range(min = 1, max = 10, message = "workoutMotivation must be between 1 and 10"))]
    pub workout_motivation: Option<i32>,
    pub fitness_goal: Option<FitnessGoal>,
    #[validate(length(max = 500, message = "notes must be at most 500 characters"))]
    pub notes: Option<String>,
    #[validate(range(min = 1.0, message = "weight must be a positive number of pounds"))]
    pub weight: Option<f64>,
}
