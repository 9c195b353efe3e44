//! Coaching text generation: renders recent check-in history into prompts
//! and forwards them to the text-generation service. Every call degrades to
//! a fixed fallback string on external failure instead of surfacing an error.

use std::sync::Arc;

use crate::models::checkin::{CheckIn, CreateCheckInRequest};
use crate::services::textgen::TextGenerator;

/// How many of the most recent check-ins feed a prompt.
pub const RECENT_HISTORY_LIMIT: usize = 7;

const ANALYSIS_MAX_TOKENS: u32 = 500;
const WORKOUT_MAX_TOKENS: u32 = 400;
const QUESTION_MAX_TOKENS: u32 = 300;

const ANALYSIS_SYSTEM: &str = "You are FitCoach AI, a supportive and knowledgeable fitness and wellness coach. Provide personalized, actionable advice based on user data. Be encouraging, realistic, and focus on practical steps users can take.";

const WORKOUT_SYSTEM: &str = "You are a personal trainer creating customized workout plans. Consider the user's current physical and mental state to provide safe, effective, and motivating workout recommendations.";

const QUESTION_SYSTEM: &str = "You are FitCoach AI, a supportive health and fitness coach. Answer questions based on the user's data, provide personalized insights, and offer practical advice.";

const ANALYSIS_FALLBACK: &str =
    "I'm having trouble analyzing your data right now. Please try again later.";

const WORKOUT_FALLBACK: &str = "I'm having trouble generating a workout recommendation right now. Consider taking a rest day or doing light stretching.";

const QUESTION_FALLBACK: &str =
    "I'm having trouble processing your question right now. Please try again later.";

const ONBOARDING_MESSAGE: &str = "You haven't logged any check-ins yet. Submit your first daily check-in and I'll start building personalized coaching for you.";

pub struct CoachService {
    generator: Arc<dyn TextGenerator>,
}

impl CoachService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Analyze the most recent check-ins into coaching prose. Zero check-ins
    /// short-circuits to a static onboarding message without an external call.
    pub async fn analyze(&self, checkins: &[CheckIn]) -> String {
        if checkins.is_empty() {
            return ONBOARDING_MESSAGE.to_string();
        }

        let prompt = analysis_prompt(checkins);
        match self
            .generator
            .generate(ANALYSIS_SYSTEM, &prompt, ANALYSIS_MAX_TOKENS)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Analysis generation failed, returning fallback");
                ANALYSIS_FALLBACK.to_string()
            }
        }
    }

    /// Answer a free-text question against the user's recent history.
    pub async fn answer_question(&self, question: &str, checkins: &[CheckIn]) -> String {
        let prompt = question_prompt(question, checkins);
        match self
            .generator
            .generate(QUESTION_SYSTEM, &prompt, QUESTION_MAX_TOKENS)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Question answering failed, returning fallback");
                QUESTION_FALLBACK.to_string()
            }
        }
    }

    /// Recommend a workout from a single current-state snapshot (not history).
    pub async fn recommend_workout(&self, snapshot: &CreateCheckInRequest) -> String {
        let prompt = workout_prompt(snapshot);
        match self
            .generator
            .generate(WORKOUT_SYSTEM, &prompt, WORKOUT_MAX_TOKENS)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Workout recommendation failed, returning fallback");
                WORKOUT_FALLBACK.to_string()
            }
        }
    }
}

fn fmt_opt_i32(value: Option<i32>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn fmt_opt_f64(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

/// One paragraph per check-in, every field enumerated, "N/A" for absent
/// optional metrics and "None" for absent notes.
fn render_checkin(c: &CheckIn) -> String {
    format!(
        "Date: {}\n\
         Mood: {}\n\
         Energy: {}/10\n\
         Soreness: {}/10\n\
         Sleep: {} hours, Quality: {}\n\
         Stress: {}/10\n\
         Recovery: {}\n\
         Hydration: {}/10\n\
         Nutrition: {}\n\
         Workout Motivation: {}/10\n\
         Fitness Goal: {}\n\
         Notes: {}\n",
        c.timestamp.date_naive(),
        c.mood.as_str(),
        c.energy,
        c.soreness,
        fmt_opt_f64(c.sleep_hours),
        c.sleep_quality.map_or("N/A", |q| q.as_str()),
        fmt_opt_i32(c.stress_level),
        c.recovery.map_or("N/A", |r| r.as_str()),
        fmt_opt_i32(c.hydration),
        c.nutrition_quality.map_or("N/A", |n| n.as_str()),
        fmt_opt_i32(c.workout_motivation),
        c.fitness_goal.map_or("N/A", |g| g.as_str()),
        c.notes.as_deref().unwrap_or("None"),
    )
}

/// Render the most recent `RECENT_HISTORY_LIMIT` check-ins as paragraphs.
/// Expects repository order (most recent first).
fn render_history(checkins: &[CheckIn]) -> String {
    checkins
        .iter()
        .take(RECENT_HISTORY_LIMIT)
        .map(render_checkin)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn analysis_prompt(checkins: &[CheckIn]) -> String {
    format!(
        "As a fitness and wellness AI coach, analyze this user's recent health check-ins and provide personalized insights and recommendations.\n\n\
         Recent Check-ins:\n{}\n\
         Please provide:\n\
         1. **Overall Health Assessment** (2-3 sentences)\n\
         2. **Key Patterns** you notice (mood, energy, sleep, stress trends)\n\
         3. **Workout Recommendations** based on current state\n\
         4. **Recovery Advice** if needed\n\
         5. **Nutrition Tips** based on goals and current state\n\
         6. **Motivation Boost** if energy/motivation is low\n\n\
         Keep each section concise and actionable. Be encouraging but realistic.",
        render_history(checkins),
    )
}

pub fn question_prompt(question: &str, checkins: &[CheckIn]) -> String {
    format!(
        "A user is asking about their health data. Here's their question:\n\
         \"{}\"\n\n\
         Recent Check-in Data:\n{}\n\
         Please provide a helpful, personalized answer based on their data. Be encouraging and actionable.",
        question,
        render_history(checkins),
    )
}

pub fn workout_prompt(snapshot: &CreateCheckInRequest) -> String {
    format!(
        "Based on this user's current state, suggest a personalized workout:\n\n\
         Current State:\n\
         - Mood: {}\n\
         - Energy Level: {}/10\n\
         - Soreness: {}/10\n\
         - Recovery Status: {}\n\
         - Stress Level: {}/10\n\
         - Workout Motivation: {}/10\n\
         - Fitness Goal: {}\n\n\
         Provide:\n\
         1. **Workout Type** (strength, cardio, yoga, rest day, etc.)\n\
         2. **Intensity Level** (low, moderate, high)\n\
         3. **Duration** (15, 30, 45, 60 minutes)\n\
         4. **Specific Exercises** (3-5 exercises with sets/reps)\n\
         5. **Modifications** if needed for current state\n\
         6. **Recovery Tips** if soreness is high\n\n\
         Be specific and consider their current energy, soreness, and motivation levels.",
        snapshot.mood.as_str(),
        snapshot.energy,
        snapshot.soreness,
        snapshot.recovery.map_or("N/A", |r| r.as_str()),
        fmt_opt_i32(snapshot.stress_level),
        fmt_opt_i32(snapshot.workout_motivation),
        snapshot.fitness_goal.map_or("General Fitness", |g| g.as_str()),
    )
}
