use std::collections::HashSet;

use meridian_protocol::{CityId, CivId, CivSnapshot, TechId};
use serde::{Deserialize, Serialize};

use crate::{rules::CivTemplate, yields::Yields};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Civilization {
    pub id: CivId,
    pub name: String,
    pub is_human: bool,
    pub is_alive: bool,
    pub gold: i32,
    /// Science produced on the civilization's most recent turn.
    pub science: i32,
    /// Totals produced on the civilization's most recent turn.
    pub last_yields: Yields,
    pub researching: Option<TechId>,
    /// Banked science; carries over between research targets.
    pub research_progress: i32,
    pub known_techs: HashSet<TechId>,
    /// Looked up in the city store; cleared when the city changes hands.
    pub capital: Option<CityId>,
    city_names: Vec<String>,
    cities_named: usize,
}

impl Civilization {
    pub fn new(id: CivId, template: &CivTemplate, is_human: bool, starting_gold: i32) -> Self {
        Self {
            id,
            name: template.name.clone(),
            is_human,
            is_alive: true,
            gold: starting_gold,
            science: 0,
            last_yields: Yields::default(),
            researching: None,
            research_progress: 0,
            known_techs: HashSet::new(),
            capital: None,
            city_names: template.cities.clone(),
            cities_named: 0,
        }
    }

    pub fn knows(&self, tech: &TechId) -> bool {
        self.known_techs.contains(tech)
    }

    /// Next unused name from the template, then numbered variants of the capital's name.
    pub fn next_city_name(&mut self) -> String {
        let n = self.cities_named;
        self.cities_named += 1;
        match self.city_names.get(n) {
            Some(name) => name.clone(),
            None => {
                let base = self.city_names.first().map_or(self.name.as_str(), String::as_str);
                format!("{base} {}", n + 2 - self.city_names.len())
            }
        }
    }

    pub fn snapshot(&self) -> CivSnapshot {
        let mut known_techs: Vec<TechId> = self.known_techs.iter().cloned().collect();
        known_techs.sort();
        CivSnapshot {
            id: self.id,
            name: self.name.clone(),
            is_human: self.is_human,
            is_alive: self.is_alive,
            gold: self.gold,
            science: self.science,
            researching: self.researching.clone(),
            research_progress: self.research_progress,
            known_techs,
            capital: self.capital,
        }
    }
}
