//! Department inference from the complaint text.
//!
//! Rules are checked in a fixed order and the first match wins:
//! age under 18, trauma, neurological, cardio-respiratory, then the default.
//! Keywords cover English and Russian intake text.

use std::sync::LazyLock;

use regex::Regex;
use triagedesk_common::Profile;

/// Patients younger than this are routed to pediatrics.
pub const PEDIATRIC_AGE_LIMIT: u32 = 18;

static TRAUMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)trauma|injur|fractur|wound|bruis|bleed|травм|перелом|рана|ушиб|кровотеч")
        .expect("trauma keywords")
});

static NEURO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)numb|asymmetr|speech|seizure|convuls|stroke|онемени|асимметри|речь|судорог|инсульт")
        .expect("neuro keywords")
});

static CARDIO_RESPIRATORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)dyspn|breath|chest|heart|cardi|одышк|дыхани|грудин|сердц|боль в груди")
        .expect("cardio-respiratory keywords")
});

/// Infer the department for a complaint and optional age.
pub fn classify_profile(complaint: &str, age: Option<u32>) -> Profile {
    if age.is_some_and(|a| a < PEDIATRIC_AGE_LIMIT) {
        return Profile::Peds;
    }
    if TRAUMA.is_match(complaint) {
        return Profile::Trauma;
    }
    if NEURO.is_match(complaint) {
        return Profile::Neuro;
    }
    if CARDIO_RESPIRATORY.is_match(complaint) {
        return Profile::Therapy;
    }
    Profile::Therapy
}
