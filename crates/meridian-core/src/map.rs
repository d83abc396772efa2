use meridian_protocol::{CivId, Coord, ImprovementKind, ResourceKind, TerrainKind, TileSnapshot};
use serde::{Deserialize, Serialize};

use crate::grid::Grid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub terrain: TerrainKind,
    pub resource: Option<ResourceKind>,
    pub improvement: Option<ImprovementKind>,
    #[serde(default)]
    pub river: bool,
}

impl Tile {
    pub const fn new(terrain: TerrainKind) -> Self {
        Self {
            terrain,
            resource: None,
            improvement: None,
            river: false,
        }
    }

    pub fn has_road(&self) -> bool {
        self.improvement == Some(ImprovementKind::Road)
    }

    pub fn has_railroad(&self) -> bool {
        self.improvement == Some(ImprovementKind::Railroad)
    }
}

/// One civilization's fog of war. `explored` only ever flips to true.
#[derive(Clone, Debug, Default)]
pub struct VisibilityLayer {
    visible: Vec<bool>,
    explored: Vec<bool>,
}

impl VisibilityLayer {
    pub fn new(len: usize) -> Self {
        Self {
            visible: vec![false; len],
            explored: vec![false; len],
        }
    }

    pub fn visible(&self) -> &[bool] {
        &self.visible
    }

    pub fn explored(&self) -> &[bool] {
        &self.explored
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.get(index).copied().unwrap_or(false)
    }

    pub fn is_explored(&self, index: usize) -> bool {
        self.explored.get(index).copied().unwrap_or(false)
    }

    /// Replace this turn's sight wholesale. Returns how many tiles were newly explored.
    pub fn apply(&mut self, now_visible: Vec<bool>) -> usize {
        if now_visible.len() != self.visible.len() {
            return 0;
        }
        let mut newly_explored = 0;
        for (explored, &seen) in self.explored.iter_mut().zip(&now_visible) {
            if seen && !*explored {
                *explored = true;
                newly_explored += 1;
            }
        }
        self.visible = now_visible;
        newly_explored
    }
}

/// Tiles stored row-major (`row * width + col`), plus one fog layer per civilization.
#[derive(Clone, Debug)]
pub struct GameMap {
    grid: Grid,
    tiles: Vec<Tile>,
    visibility: Vec<VisibilityLayer>,
}

impl GameMap {
    pub fn new(width: u32, height: u32, default_terrain: TerrainKind) -> Self {
        let grid = Grid::new(width, height);
        Self {
            grid,
            tiles: vec![Tile::new(default_terrain); grid.len()],
            visibility: Vec::new(),
        }
    }

    /// Build from explicit tiles; `None` when the tile count does not match the dimensions.
    pub fn from_tiles(width: u32, height: u32, tiles: Vec<Tile>) -> Option<Self> {
        let grid = Grid::new(width, height);
        if tiles.len() != grid.len() {
            return None;
        }
        Some(Self {
            grid,
            tiles,
            visibility: Vec::new(),
        })
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, c: Coord) -> Option<&Tile> {
        self.grid.index_of(c).map(|i| &self.tiles[i])
    }

    pub fn get_mut(&mut self, c: Coord) -> Option<&mut Tile> {
        self.grid.index_of(c).map(move |i| &mut self.tiles[i])
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn reset_visibility(&mut self, civ_count: usize) {
        self.visibility = vec![VisibilityLayer::new(self.tiles.len()); civ_count];
    }

    pub fn visibility(&self, civ: CivId) -> Option<&VisibilityLayer> {
        self.visibility.get(civ.index())
    }

    pub fn visibility_mut(&mut self, civ: CivId) -> Option<&mut VisibilityLayer> {
        self.visibility.get_mut(civ.index())
    }

    pub fn is_visible_to(&self, civ: CivId, c: Coord) -> bool {
        match (self.visibility(civ), self.grid.index_of(c)) {
            (Some(layer), Some(i)) => layer.is_visible(i),
            _ => false,
        }
    }

    pub fn is_explored_by(&self, civ: CivId, c: Coord) -> bool {
        match (self.visibility(civ), self.grid.index_of(c)) {
            (Some(layer), Some(i)) => layer.is_explored(i),
            _ => false,
        }
    }

    pub fn tile_snapshot(&self, c: Coord, viewer: CivId) -> Option<TileSnapshot> {
        let tile = self.get(c)?;
        Some(TileSnapshot {
            position: c,
            terrain: tile.terrain,
            resource: tile.resource,
            improvement: tile.improvement,
            river: tile.river,
            visible: self.is_visible_to(viewer, c),
            explored: self.is_explored_by(viewer, c),
        })
    }
}
