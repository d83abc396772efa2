//! Seeded square-grid map generation.
//!
//! Layered gradient noise gives elevation and moisture, latitude gives
//! temperature. Rivers run downhill from high ground; start positions are
//! spread by Chebyshev distance.

use meridian_protocol::{Coord, ResourceKind, TerrainKind};

use crate::{
    grid::Grid,
    map::{GameMap, Tile},
    rng::GameRng,
};

#[derive(Clone, Debug)]
pub struct MapGenConfig {
    pub width: u32,
    pub height: u32,
    pub num_civs: u32,
    /// Fraction of tiles below sea level (0.0-1.0).
    pub water_ratio: f32,
    /// How hilly the land is (0.0-1.0).
    pub elevation_variance: f32,
    pub resource_density: f32,
    pub river_count: u32,
}

impl Default for MapGenConfig {
    fn default() -> Self {
        Self {
            width: 40,
            height: 25,
            num_civs: 4,
            water_ratio: 0.4,
            elevation_variance: 0.5,
            resource_density: 0.12,
            river_count: 6,
        }
    }
}

pub struct GeneratedMap {
    pub map: GameMap,
    /// One per civilization, on land.
    pub start_positions: Vec<Coord>,
}

const MAX_RIVER_LENGTH: usize = 14;

pub fn generate_map(config: &MapGenConfig, seed: u64) -> GeneratedMap {
    let mut rng = GameRng::seed_from_u64(seed);
    let grid = Grid::new(config.width, config.height);

    let elevation = noise_layer(config.width, config.height, &mut rng, 4, 0.6);
    let moisture = noise_layer(config.width, config.height, &mut rng, 3, 0.5);
    let sea_level = percentile(&elevation, config.water_ratio);

    let mut tiles: Vec<Tile> = grid
        .coords()
        .enumerate()
        .map(|(i, c)| {
            let temperature = latitude_temperature(c.row, config.height);
            Tile::new(pick_terrain(
                elevation[i],
                moisture[i],
                temperature,
                sea_level,
                config.elevation_variance,
            ))
        })
        .collect();

    mark_coast(&grid, &mut tiles);
    carve_rivers(&grid, &mut tiles, &elevation, config.river_count, &mut rng);
    place_resources(&mut tiles, config.resource_density, &mut rng);
    let start_positions = find_start_positions(&grid, &mut tiles, config.num_civs, &mut rng);

    let map = GameMap::from_tiles(config.width, config.height, tiles)
        .unwrap_or_else(|| GameMap::new(config.width, config.height, TerrainKind::Grassland));
    GeneratedMap {
        map,
        start_positions,
    }
}

fn noise_layer(width: u32, height: u32, rng: &mut GameRng, octaves: u32, persistence: f64) -> Vec<f64> {
    let size = (width * height) as usize;
    let mut out = vec![0.0f64; size];
    let mut amplitude = 1.0;
    let mut total_amplitude = 0.0;

    for octave in 0..octaves {
        let scale = 1u32 << octave;
        let cells_w = (scale * 2 + 1).min(width.max(2));
        let cells_h = (scale * 2 + 1).min(height.max(2));
        let gradients: Vec<(f64, f64)> = (0..cells_w * cells_h)
            .map(|_| {
                let angle = rng.next_f64() * std::f64::consts::TAU;
                (angle.cos(), angle.sin())
            })
            .collect();

        for row in 0..height {
            for col in 0..width {
                let fx = f64::from(col) / f64::from(width) * f64::from(cells_w - 1);
                let fy = f64::from(row) / f64::from(height) * f64::from(cells_h - 1);
                out[(row * width + col) as usize] += gradient_noise(fx, fy, cells_w, cells_h, &gradients) * amplitude;
            }
        }
        total_amplitude += amplitude;
        amplitude *= persistence;
    }

    for v in &mut out {
        *v = (*v / total_amplitude + 1.0) * 0.5;
    }
    out
}

fn gradient_noise(x: f64, y: f64, cells_w: u32, cells_h: u32, gradients: &[(f64, f64)]) -> f64 {
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let sx = x - f64::from(x0);
    let sy = y - f64::from(y0);
    let fade = |t: f64| t * t * t * (t * (t * 6.0 - 15.0) + 10.0);
    let (u, v) = (fade(sx), fade(sy));

    let dot = |gx: u32, gy: u32, dx: f64, dy: f64| {
        let gx = gx.min(cells_w - 1);
        let gy = gy.min(cells_h - 1);
        let (gvx, gvy) = gradients[(gy * cells_w + gx) as usize];
        dx * gvx + dy * gvy
    };

    let n00 = dot(x0, y0, sx, sy);
    let n10 = dot(x0 + 1, y0, sx - 1.0, sy);
    let n01 = dot(x0, y0 + 1, sx, sy - 1.0);
    let n11 = dot(x0 + 1, y0 + 1, sx - 1.0, sy - 1.0);
    let top = n00 + u * (n10 - n00);
    let bottom = n01 + u * (n11 - n01);
    top + v * (bottom - top)
}

/// 1.0 at the equator, 0.0 at the poles.
fn latitude_temperature(row: i32, height: u32) -> f64 {
    let lat = (f64::from(row) + 0.5) / f64::from(height) * 2.0 - 1.0;
    1.0 - lat.abs()
}

fn percentile(values: &[f64], fraction: f32) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let idx = ((f64::from(fraction) * sorted.len() as f64) as usize).min(sorted.len() - 1);
    sorted[idx]
}

fn pick_terrain(elevation: f64, moisture: f64, temperature: f64, sea_level: f64, variance: f32) -> TerrainKind {
    if elevation < sea_level {
        return TerrainKind::Ocean;
    }
    let land = 1.0 - sea_level;
    let variance = f64::from(variance);
    if elevation > sea_level + land * (0.8 - variance * 0.3) {
        return TerrainKind::Mountains;
    }
    if elevation > sea_level + land * (0.6 - variance * 0.2) {
        return TerrainKind::Hills;
    }

    if temperature < 0.15 {
        TerrainKind::Tundra
    } else if temperature > 0.75 {
        match moisture {
            m if m < 0.35 => TerrainKind::Desert,
            m if m > 0.65 => TerrainKind::Jungle,
            _ => TerrainKind::Plains,
        }
    } else {
        match moisture {
            m if m < 0.35 => TerrainKind::Plains,
            m if m > 0.8 => TerrainKind::Swamp,
            m if m > 0.62 => TerrainKind::Forest,
            _ => TerrainKind::Grassland,
        }
    }
}

fn mark_coast(grid: &Grid, tiles: &mut [Tile]) {
    let coastal: Vec<usize> = grid
        .coords()
        .enumerate()
        .filter(|&(i, _)| tiles[i].terrain == TerrainKind::Ocean)
        .filter(|&(_, c)| {
            grid.neighbors(c)
                .filter_map(|n| grid.index_of(n))
                .any(|n| !tiles[n].terrain.is_water())
        })
        .map(|(i, _)| i)
        .collect();
    for i in coastal {
        tiles[i].terrain = TerrainKind::Coast;
    }
}

fn carve_rivers(grid: &Grid, tiles: &mut [Tile], elevation: &[f64], count: u32, rng: &mut GameRng) {
    let sources: Vec<usize> = (0..tiles.len())
        .filter(|&i| tiles[i].terrain.is_elevated())
        .collect();
    if sources.is_empty() {
        return;
    }

    for _ in 0..count {
        let mut current = sources[rng.gen_index(sources.len())];
        for _ in 0..MAX_RIVER_LENGTH {
            if tiles[current].terrain.is_water() {
                break;
            }
            if tiles[current].terrain != TerrainKind::Mountains {
                tiles[current].river = true;
            }
            let Some(here) = grid.coord_at(current) else {
                break;
            };
            let lowest = grid
                .neighbors(here)
                .filter_map(|n| grid.index_of(n))
                .min_by(|&a, &b| elevation[a].total_cmp(&elevation[b]));
            match lowest {
                Some(next) if elevation[next] < elevation[current] => current = next,
                _ => break,
            }
        }
    }
}

fn place_resources(tiles: &mut [Tile], density: f32, rng: &mut GameRng) {
    for tile in tiles.iter_mut() {
        if tile.terrain == TerrainKind::Ocean || !rng.chance(f64::from(density)) {
            continue;
        }
        tile.resource = match (tile.terrain, rng.next_u32() % 3) {
            (TerrainKind::Coast, _) => Some(ResourceKind::Fish),
            (TerrainKind::Grassland, 0) => Some(ResourceKind::Wheat),
            (TerrainKind::Grassland, 1) => Some(ResourceKind::Cattle),
            (TerrainKind::Plains, 0) => Some(ResourceKind::Horses),
            (TerrainKind::Plains, 1) => Some(ResourceKind::Wheat),
            (TerrainKind::Hills, 0 | 1) => Some(ResourceKind::Iron),
            (TerrainKind::Mountains, 0) => Some(ResourceKind::Gold),
            (TerrainKind::Desert, 0) => Some(ResourceKind::Gold),
            _ => None,
        };
    }
}

fn start_score(grid: &Grid, tiles: &[Tile], c: Coord) -> u32 {
    grid.tiles_in_range(c, 2)
        .into_iter()
        .filter_map(|n| grid.index_of(n))
        .map(|i| {
            let tile = &tiles[i];
            let terrain = match tile.terrain {
                TerrainKind::Grassland => 3,
                TerrainKind::Plains | TerrainKind::Hills => 2,
                TerrainKind::Ocean | TerrainKind::Mountains => 0,
                _ => 1,
            };
            terrain + if tile.resource.is_some() { 4 } else { 0 } + u32::from(tile.river)
        })
        .sum()
}

fn has_land_neighbor(grid: &Grid, tiles: &[Tile], c: Coord) -> bool {
    grid.neighbors(c)
        .filter_map(|n| grid.index_of(n))
        .any(|i| !tiles[i].terrain.is_water())
}

fn find_start_positions(grid: &Grid, tiles: &mut [Tile], num_civs: u32, rng: &mut GameRng) -> Vec<Coord> {
    let wanted = num_civs as usize;
    let mut candidates: Vec<(Coord, u32)> = grid
        .coords()
        .filter(|&c| {
            grid.index_of(c).is_some_and(|i| {
                matches!(tiles[i].terrain, TerrainKind::Grassland | TerrainKind::Plains)
            })
        })
        .filter(|&c| has_land_neighbor(grid, tiles, c))
        .map(|c| (c, start_score(grid, tiles, c)))
        .collect();
    candidates.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut positions: Vec<Coord> = Vec::with_capacity(wanted);
    let mut min_distance = (grid.width() + grid.height()) / (num_civs + 1);
    while positions.len() < wanted && !candidates.is_empty() {
        for &(c, _) in &candidates {
            if positions.len() >= wanted {
                break;
            }
            if positions.iter().all(|&p| Grid::distance(p, c) >= min_distance.max(1)) {
                positions.push(c);
            }
        }
        if min_distance <= 1 {
            break;
        }
        min_distance /= 2;
    }

    // Not enough land: carve grassland at evenly spaced points.
    while positions.len() < wanted {
        let i = positions.len() as u32;
        let col = ((i + 1) * grid.width() / (num_civs + 1)) as i32;
        let row = (grid.height() / 2) as i32 + rng.gen_range_i32(-1..2);
        let c = Coord::new(col, row.clamp(0, grid.height() as i32 - 1));
        for n in grid.tiles_in_range(c, 1) {
            if let Some(idx) = grid.index_of(n) {
                tiles[idx] = Tile::new(TerrainKind::Grassland);
            }
        }
        if !positions.contains(&c) {
            positions.push(c);
        } else {
            break;
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn same_seed_same_map() {
        let config = MapGenConfig::default();
        let a = generate_map(&config, 42);
        let b = generate_map(&config, 42);
        assert_eq!(a.map.tiles(), b.map.tiles());
        assert_eq!(a.start_positions, b.start_positions);
    }

    #[test]
    fn different_seeds_differ() {
        let config = MapGenConfig {
            width: 20,
            height: 15,
            ..MapGenConfig::default()
        };
        let a = generate_map(&config, 1);
        let b = generate_map(&config, 2);
        assert_ne!(a.map.tiles(), b.map.tiles());
    }

    #[test]
    fn map_has_variety_and_water() {
        let map = generate_map(&MapGenConfig::default(), 7).map;
        let kinds: HashSet<TerrainKind> = map.tiles().iter().map(|t| t.terrain).collect();
        assert!(kinds.len() >= 4, "{kinds:?}");
        assert!(map.tiles().iter().any(|t| t.terrain.is_water()));
    }

    #[test]
    fn starts_are_on_distinct_land() {
        let config = MapGenConfig {
            width: 30,
            height: 20,
            num_civs: 4,
            ..MapGenConfig::default()
        };
        let generated = generate_map(&config, 99_999);
        assert_eq!(generated.start_positions.len(), 4);
        let unique: HashSet<Coord> = generated.start_positions.iter().copied().collect();
        assert_eq!(unique.len(), 4);
        for &p in &generated.start_positions {
            assert!(!generated.map.get(p).unwrap().terrain.is_water());
        }
    }
}
