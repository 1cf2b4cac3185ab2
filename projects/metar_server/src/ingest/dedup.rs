use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::db::metar::models::NewMetar;

pub type ObservationKey = (String, NaiveDateTime);

/// Keeps the candidates whose (station, observation time) is neither stored
/// already nor seen earlier in the same batch. Survivors keep their order.
pub fn select_new(candidates: Vec<NewMetar>, stored: &[ObservationKey]) -> Vec<NewMetar> {
    let mut seen: HashSet<ObservationKey> = stored.iter().cloned().collect();

    candidates
        .into_iter()
        .filter(|metar| seen.insert(metar.observation_key()))
        .collect()
}
