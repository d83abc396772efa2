use std::collections::{HashMap, HashSet};

use meridian_protocol::{
    BuildingKind, ImprovementKind, ResourceKind, TechId, TerrainKind, UnitKind,
};
use serde::Deserialize;
use thiserror::Error;

use crate::yields::Yields;

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no {section} entry for {kind}")]
    MissingEntry { section: &'static str, kind: String },
    #[error("unknown technology referenced: {0}")]
    UnknownTech(String),
    #[error("ruleset defines no civilizations")]
    NoCivilizations,
}

pub enum RulesSource<'a> {
    Embedded,
    Path(String),
    Str(&'a str),
}

#[derive(Clone, Debug, Deserialize)]
pub struct TerrainStats {
    pub kind: TerrainKind,
    #[serde(default)]
    pub food: i32,
    #[serde(default)]
    pub production: i32,
    #[serde(default)]
    pub trade: i32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ResourceStats {
    pub kind: ResourceKind,
    #[serde(default)]
    pub food: i32,
    #[serde(default)]
    pub production: i32,
    #[serde(default)]
    pub trade: i32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ImprovementStats {
    pub kind: ImprovementKind,
    #[serde(default)]
    pub food: i32,
    #[serde(default)]
    pub production: i32,
    #[serde(default)]
    pub trade: i32,
    /// Terrain on which the trade bonus applies; empty means everywhere.
    #[serde(default)]
    pub trade_terrain: Vec<TerrainKind>,
    pub allowed: Vec<TerrainKind>,
    #[serde(default)]
    pub requires_tech: Option<TechId>,
    #[serde(default)]
    pub requires_improvement: Option<ImprovementKind>,
}

impl ImprovementStats {
    pub fn yields_on(&self, terrain: TerrainKind) -> Yields {
        let trade = if self.trade_terrain.is_empty() || self.trade_terrain.contains(&terrain) {
            self.trade
        } else {
            0
        };
        Yields {
            food: self.food,
            production: self.production,
            trade,
            ..Yields::default()
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct UnitStats {
    pub kind: UnitKind,
    pub attack: i32,
    pub defense: i32,
    pub moves: i32,
    pub cost: i32,
    #[serde(default)]
    pub requires_tech: Option<TechId>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BuildingStats {
    pub kind: BuildingKind,
    pub cost: i32,
    #[serde(default)]
    pub food: i32,
    #[serde(default)]
    pub production: i32,
    #[serde(default)]
    pub science: i32,
    #[serde(default)]
    pub gold: i32,
    #[serde(default)]
    pub requires_tech: Option<TechId>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TechDef {
    pub id: TechId,
    pub cost: i32,
    #[serde(default)]
    pub requires: Vec<TechId>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CivTemplate {
    pub name: String,
    pub cities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawRules {
    terrain: Vec<TerrainStats>,
    resources: Vec<ResourceStats>,
    improvements: Vec<ImprovementStats>,
    units: Vec<UnitStats>,
    buildings: Vec<BuildingStats>,
    techs: Vec<TechDef>,
    civilizations: Vec<CivTemplate>,
}

/// Validated ruleset. Every enumerated kind is guaranteed an entry.
#[derive(Clone, Debug)]
pub struct Rules {
    terrain: HashMap<TerrainKind, TerrainStats>,
    resources: HashMap<ResourceKind, ResourceStats>,
    improvements: HashMap<ImprovementKind, ImprovementStats>,
    units: HashMap<UnitKind, UnitStats>,
    buildings: HashMap<BuildingKind, BuildingStats>,
    techs: Vec<TechDef>,
    tech_index: HashMap<TechId, usize>,
    civilizations: Vec<CivTemplate>,
}

pub fn load_rules(source: RulesSource<'_>) -> Result<Rules, RulesError> {
    let raw: RawRules = match source {
        RulesSource::Embedded => serde_yaml::from_str(include_str!("../data/rules.yaml"))?,
        RulesSource::Path(path) => serde_yaml::from_str(&std::fs::read_to_string(path)?)?,
        RulesSource::Str(yaml) => serde_yaml::from_str(yaml)?,
    };
    compile_rules(raw)
}

fn index_by<K, V>(
    section: &'static str,
    all: &[K],
    entries: Vec<V>,
    key: impl Fn(&V) -> K,
) -> Result<HashMap<K, V>, RulesError>
where
    K: Copy + Eq + std::hash::Hash + std::fmt::Debug,
{
    let map: HashMap<K, V> = entries.into_iter().map(|v| (key(&v), v)).collect();
    for kind in all {
        if !map.contains_key(kind) {
            return Err(RulesError::MissingEntry {
                section,
                kind: format!("{kind:?}"),
            });
        }
    }
    Ok(map)
}

fn compile_rules(raw: RawRules) -> Result<Rules, RulesError> {
    let terrain = index_by("terrain", &TerrainKind::ALL, raw.terrain, |t| t.kind)?;
    let resources = index_by("resources", &ResourceKind::ALL, raw.resources, |r| r.kind)?;
    let improvements = index_by(
        "improvements",
        &ImprovementKind::ALL,
        raw.improvements,
        |i| i.kind,
    )?;
    let units = index_by("units", &UnitKind::ALL, raw.units, |u| u.kind)?;
    let buildings = index_by("buildings", &BuildingKind::ALL, raw.buildings, |b| b.kind)?;

    let tech_index: HashMap<TechId, usize> = raw
        .techs
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.clone(), i))
        .collect();

    let referenced = raw
        .techs
        .iter()
        .flat_map(|t| t.requires.iter())
        .chain(units.values().filter_map(|u| u.requires_tech.as_ref()))
        .chain(buildings.values().filter_map(|b| b.requires_tech.as_ref()))
        .chain(improvements.values().filter_map(|i| i.requires_tech.as_ref()));
    for tech in referenced {
        if !tech_index.contains_key(tech) {
            return Err(RulesError::UnknownTech(tech.0.clone()));
        }
    }

    if raw.civilizations.is_empty() {
        return Err(RulesError::NoCivilizations);
    }

    Ok(Rules {
        terrain,
        resources,
        improvements,
        units,
        buildings,
        techs: raw.techs,
        tech_index,
        civilizations: raw.civilizations,
    })
}

impl Rules {
    pub fn embedded() -> Result<Self, RulesError> {
        load_rules(RulesSource::Embedded)
    }

    pub fn terrain(&self, kind: TerrainKind) -> &TerrainStats {
        &self.terrain[&kind]
    }

    pub fn resource(&self, kind: ResourceKind) -> &ResourceStats {
        &self.resources[&kind]
    }

    pub fn improvement(&self, kind: ImprovementKind) -> &ImprovementStats {
        &self.improvements[&kind]
    }

    pub fn unit(&self, kind: UnitKind) -> &UnitStats {
        &self.units[&kind]
    }

    pub fn building(&self, kind: BuildingKind) -> &BuildingStats {
        &self.buildings[&kind]
    }

    pub fn tech(&self, id: &TechId) -> Option<&TechDef> {
        self.tech_index.get(id).map(|&i| &self.techs[i])
    }

    /// Technologies in rules-file order.
    pub fn techs(&self) -> &[TechDef] {
        &self.techs
    }

    pub fn civilization(&self, index: usize) -> &CivTemplate {
        &self.civilizations[index % self.civilizations.len()]
    }

    pub fn civilization_count(&self) -> usize {
        self.civilizations.len()
    }

    /// Technologies not yet known whose prerequisites are all known.
    pub fn available_techs(&self, known: &HashSet<TechId>) -> Vec<TechId> {
        self.techs
            .iter()
            .filter(|t| !known.contains(&t.id))
            .filter(|t| t.requires.iter().all(|r| known.contains(r)))
            .map(|t| t.id.clone())
            .collect()
    }

    pub fn tech_requirement_met(&self, requirement: Option<&TechId>, known: &HashSet<TechId>) -> bool {
        requirement.is_none_or(|t| known.contains(t))
    }
}
