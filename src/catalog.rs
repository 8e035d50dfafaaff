//! Level definitions and the built-in campaign
//!
//! Levels are plain data. A definition is validated once when a catalog is
//! built, so loading a level during play cannot fail on bad data.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LevelError};
use crate::sim::collectible::CollectibleKind;
use crate::sim::enemy::Species;
use crate::sim::tile::{Tile, TileWorld};

/// Player spawn tile; the player stands on top of row `ty`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub tx: u32,
    pub ty: u32,
}

/// Enemy placement; `species` stays a string so unknown names can be skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub species: String,
    pub tx: u32,
    pub ty: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectibleSpawn {
    pub kind: CollectibleKind,
    pub tx: u32,
    pub ty: u32,
}

/// Lava columns that emit embers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LavaVent {
    pub col: u32,
    pub span: u32,
}

/// One level as authored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Row-major tile codes, `height` rows of `width` codes
    pub tiles: Vec<Vec<u8>>,
    pub spawn: SpawnPoint,
    /// Column whose left edge ends the level (absent on boss levels)
    #[serde(default)]
    pub goal_x: Option<u32>,
    /// Cleared by defeating the boss instead of reaching a goal
    #[serde(default)]
    pub boss_level: bool,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
    #[serde(default)]
    pub collectibles: Vec<CollectibleSpawn>,
    /// Background track index
    #[serde(default)]
    pub music: u32,
    #[serde(default)]
    pub lava_vent: Option<LavaVent>,
}

impl LevelDef {
    /// Check grid shape, tile codes, placements, goal and boss presence
    pub fn validate(&self) -> Result<(), LevelError> {
        let name = || self.name.clone();
        if self.tiles.len() != self.height as usize {
            return Err(LevelError::RowCount {
                name: name(),
                height: self.height,
                actual_rows: self.tiles.len(),
            });
        }
        for (row, codes) in self.tiles.iter().enumerate() {
            if codes.len() != self.width as usize {
                return Err(LevelError::RowWidth {
                    name: name(),
                    row,
                    width: self.width,
                    actual: codes.len(),
                });
            }
            if let Some(col) = codes.iter().position(|&c| Tile::from_code(c).is_none()) {
                return Err(LevelError::UnknownTile {
                    name: name(),
                    code: codes[col],
                    row,
                    col,
                });
            }
        }
        let SpawnPoint { tx, ty } = self.spawn;
        if tx >= self.width || ty >= self.height {
            return Err(LevelError::SpawnOutOfBounds { name: name(), tx, ty });
        }
        if let Some(e) = self.enemies.iter().find(|e| !self.contains(e.tx, e.ty)) {
            return Err(LevelError::EnemyOutOfBounds {
                name: name(),
                species: e.species.clone(),
                tx: e.tx,
                ty: e.ty,
            });
        }
        if let Some(c) = self.collectibles.iter().find(|c| !self.contains(c.tx, c.ty)) {
            return Err(LevelError::CollectibleOutOfBounds {
                name: name(),
                tx: c.tx,
                ty: c.ty,
            });
        }
        if let Some(LavaVent { col, span }) = self.lava_vent {
            if col as u64 + span as u64 > self.width as u64 {
                return Err(LevelError::VentOutOfBounds { name: name(), col, span });
            }
        }
        match self.goal_x {
            Some(goal_x) if goal_x >= self.width => {
                return Err(LevelError::GoalOutOfBounds { name: name(), goal_x });
            }
            None if !self.boss_level => return Err(LevelError::MissingGoal { name: name() }),
            _ => {}
        }
        if self.boss_level
            && !self
                .enemies
                .iter()
                .any(|e| Species::from_name(&e.species) == Some(Species::Boss))
        {
            return Err(LevelError::MissingBoss { name: name() });
        }
        Ok(())
    }

    fn contains(&self, tx: u32, ty: u32) -> bool {
        tx < self.width && ty < self.height
    }

    /// Build the mutable tile grid for a fresh play of this level
    pub fn tile_world(&self, one_way_platforms: bool) -> Result<TileWorld, LevelError> {
        self.validate()?;
        let rows = self
            .tiles
            .iter()
            .map(|codes| {
                codes
                    .iter()
                    .map(|&c| Tile::from_code(c).unwrap_or_default())
                    .collect()
            })
            .collect();
        Ok(TileWorld::from_rows(rows).with_one_way_platforms(one_way_platforms))
    }

    /// Enemy spawns with known species, in authored order
    pub fn enemy_spawns(&self) -> Vec<(Species, u32, u32)> {
        self.enemies
            .iter()
            .filter_map(|spawn| match Species::from_name(&spawn.species) {
                Some(species) => Some((species, spawn.tx, spawn.ty)),
                None => {
                    log::warn!(
                        "Level '{}': skipping unknown enemy species '{}' at ({}, {})",
                        self.name,
                        spawn.species,
                        spawn.tx,
                        spawn.ty
                    );
                    None
                }
            })
            .collect()
    }
}

/// Ordered, validated list of levels
#[derive(Debug, Clone)]
pub struct LevelCatalog {
    levels: Vec<LevelDef>,
}

impl LevelCatalog {
    /// Validate every level up front
    pub fn new(levels: Vec<LevelDef>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::EmptyCatalog);
        }
        for level in &levels {
            level.validate()?;
        }
        Ok(Self { levels })
    }

    /// Parse a JSON array of level definitions
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let levels: Vec<LevelDef> = serde_json::from_str(json)?;
        let catalog = Self::new(levels)?;
        log::info!("Loaded {} levels from JSON", catalog.len());
        Ok(catalog)
    }

    /// Grassland, Dark Cave and Boss Lair
    pub fn builtin() -> Self {
        Self {
            levels: vec![grassland(), dark_cave(), boss_lair()],
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&LevelDef, LevelError> {
        self.levels.get(index).ok_or(LevelError::NoSuchLevel {
            index,
            len: self.levels.len(),
        })
    }

    pub fn is_final(&self, index: usize) -> bool {
        index + 1 >= self.levels.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelDef> {
        self.levels.iter()
    }
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Tile-code grid under construction
struct Grid {
    cells: Vec<Vec<u8>>,
}

impl Grid {
    fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![vec![0; width]; height],
        }
    }

    /// Set columns `from..to` of `row`
    fn fill(&mut self, row: usize, from: usize, to: usize, tile: Tile) -> &mut Self {
        for cell in &mut self.cells[row][from..to] {
            *cell = tile.code();
        }
        self
    }

    fn set(&mut self, row: usize, col: usize, tile: Tile) -> &mut Self {
        self.cells[row][col] = tile.code();
        self
    }

    /// Solid ground on rows 16..20 across the full width
    fn ground(&mut self) -> &mut Self {
        let width = self.cells[0].len();
        for row in 16..20 {
            self.fill(row, 0, width, Tile::Ground);
        }
        self
    }

    /// Open a pit through the ground rows 16..19 (the bottom row stays solid)
    fn pit(&mut self, from: usize, to: usize) -> &mut Self {
        for row in 16..19 {
            self.fill(row, from, to, Tile::Air);
        }
        self
    }

    fn pipe(&mut self, col: usize, height: usize) -> &mut Self {
        for row in (16 - height)..16 {
            self.set(row, col, Tile::Pipe);
        }
        self
    }

    fn build(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.cells)
    }
}

fn enemies(list: &[(&str, u32, u32)]) -> Vec<EnemySpawn> {
    list.iter()
        .map(|&(species, tx, ty)| EnemySpawn {
            species: species.to_string(),
            tx,
            ty,
        })
        .collect()
}

fn collectibles(list: &[(CollectibleKind, u32, u32)]) -> Vec<CollectibleSpawn> {
    list.iter()
        .map(|&(kind, tx, ty)| CollectibleSpawn { kind, tx, ty })
        .collect()
}

fn grassland() -> LevelDef {
    use CollectibleKind::{Carrot, Coin, Mushroom};
    use Tile::{Brick, Platform, QuestionBlock};

    let mut grid = Grid::new(80, 20);
    grid.ground()
        .fill(13, 4, 7, Platform)
        .fill(11, 12, 16, Platform)
        .fill(10, 18, 22, Platform)
        .fill(12, 25, 29, Platform)
        .fill(9, 32, 36, Platform)
        .fill(13, 40, 44, Platform)
        .fill(10, 47, 51, Platform)
        .fill(8, 55, 59, Platform)
        .fill(12, 62, 67, Platform)
        .fill(11, 70, 74, Platform)
        .fill(12, 8, 10, Brick)
        .fill(10, 14, 16, QuestionBlock)
        .fill(8, 22, 24, Brick)
        .set(11, 27, QuestionBlock)
        .set(11, 28, QuestionBlock)
        .fill(7, 33, 35, Brick)
        .set(9, 48, QuestionBlock)
        .fill(7, 56, 58, Brick)
        .set(9, 64, QuestionBlock)
        .set(9, 65, QuestionBlock)
        .fill(9, 71, 73, Brick)
        .pipe(6, 2)
        .pipe(20, 3)
        .pipe(45, 2)
        .pipe(60, 3)
        .pipe(75, 2);

    LevelDef {
        name: "GRASSLAND".into(),
        width: 80,
        height: 20,
        tiles: grid.build(),
        spawn: SpawnPoint { tx: 2, ty: 14 },
        goal_x: Some(77),
        boss_level: false,
        enemies: enemies(&[
            ("zombie", 16, 14),
            ("zombie", 24, 14),
            ("skeleton", 30, 14),
            ("zombie", 38, 10),
            ("skeleton", 44, 14),
            ("zombie", 52, 14),
            ("skeleton", 58, 14),
            ("zombie", 64, 8),
            ("skeleton", 70, 14),
            ("zombie", 74, 14),
        ]),
        collectibles: collectibles(&[
            (Carrot, 8, 13),
            (Carrot, 9, 13),
            (Coin, 20, 12),
            (Coin, 21, 12),
            (Coin, 22, 12),
            (Carrot, 35, 12),
            (Mushroom, 40, 10),
            (Coin, 55, 11),
            (Coin, 56, 11),
            (Carrot, 68, 12),
        ]),
        music: 0,
        lava_vent: None,
    }
}

fn dark_cave() -> LevelDef {
    use CollectibleKind::{Carrot, Coin, Mushroom};
    use Tile::{Brick, Ground, Platform, QuestionBlock};

    let mut grid = Grid::new(90, 20);
    grid.ground()
        .fill(0, 0, 90, Ground)
        .fill(1, 0, 90, Ground)
        .fill(12, 5, 9, Platform)
        .fill(10, 14, 18, Platform)
        .fill(8, 20, 24, Platform)
        .fill(12, 27, 31, Platform)
        .fill(9, 35, 39, Platform)
        .fill(12, 42, 46, Platform)
        .fill(8, 50, 54, Platform)
        .fill(11, 58, 62, Platform)
        .fill(9, 66, 70, Platform)
        .fill(12, 74, 78, Platform)
        .fill(10, 82, 86, Platform)
        .fill(11, 8, 10, Brick)
        .fill(9, 15, 17, QuestionBlock)
        .fill(7, 21, 23, Brick)
        .set(11, 29, QuestionBlock)
        .fill(8, 36, 38, Brick)
        .fill(11, 44, 46, QuestionBlock)
        .fill(7, 51, 53, Brick)
        .set(10, 60, QuestionBlock)
        .fill(8, 67, 69, Brick)
        .set(11, 76, QuestionBlock)
        .fill(9, 83, 85, QuestionBlock)
        .pit(11, 13)
        .pit(31, 34)
        .pit(55, 57)
        .pit(72, 74);

    LevelDef {
        name: "DARK CAVE".into(),
        width: 90,
        height: 20,
        tiles: grid.build(),
        spawn: SpawnPoint { tx: 2, ty: 14 },
        goal_x: Some(87),
        boss_level: false,
        enemies: enemies(&[
            ("skeleton", 12, 14),
            ("dragon", 18, 7),
            ("skeleton", 26, 14),
            ("dragon", 34, 5),
            ("skeleton", 40, 14),
            ("dragon", 48, 8),
            ("skeleton", 54, 10),
            ("dragon", 62, 6),
            ("skeleton", 70, 14),
            ("dragon", 78, 7),
            ("skeleton", 84, 14),
        ]),
        collectibles: collectibles(&[
            (Coin, 10, 12),
            (Coin, 11, 12),
            (Carrot, 22, 6),
            (Carrot, 30, 12),
            (Mushroom, 36, 8),
            (Coin, 45, 11),
            (Coin, 46, 11),
            (Carrot, 58, 8),
            (Coin, 65, 12),
            (Coin, 66, 12),
            (Carrot, 75, 12),
        ]),
        music: 1,
        lava_vent: None,
    }
}

fn boss_lair() -> LevelDef {
    use CollectibleKind::{Carrot, Coin, Mushroom};
    use Tile::{Brick, Platform, QuestionBlock};

    let mut grid = Grid::new(60, 20);
    grid.ground()
        .fill(13, 4, 8, Platform)
        .fill(11, 10, 14, Platform)
        .fill(9, 16, 20, Platform)
        .fill(13, 22, 26, Platform)
        .fill(11, 30, 35, Platform)
        .fill(13, 38, 42, Platform)
        .fill(10, 44, 48, Platform)
        .fill(12, 52, 56, Platform)
        .set(12, 6, QuestionBlock)
        .set(12, 11, QuestionBlock)
        .set(12, 12, QuestionBlock)
        .set(10, 18, QuestionBlock)
        .set(12, 31, QuestionBlock)
        .set(12, 32, QuestionBlock)
        .set(12, 40, QuestionBlock)
        .fill(12, 24, 26, Brick)
        .fill(9, 46, 48, Brick)
        .fill(11, 53, 55, Brick)
        .pit(8, 10)
        .pit(26, 29)
        .pit(49, 52);

    LevelDef {
        name: "BOSS LAIR".into(),
        width: 60,
        height: 20,
        tiles: grid.build(),
        spawn: SpawnPoint { tx: 2, ty: 14 },
        goal_x: None,
        boss_level: true,
        enemies: enemies(&[
            ("zombie", 10, 14),
            ("skeleton", 16, 14),
            ("dragon", 22, 6),
            ("zombie", 28, 14),
            ("boss", 44, 11),
        ]),
        collectibles: collectibles(&[
            (Carrot, 6, 12),
            (Coin, 14, 12),
            (Coin, 15, 12),
            (Mushroom, 20, 8),
            (Carrot, 35, 12),
            (Coin, 40, 12),
        ]),
        music: 2,
        lava_vent: Some(LavaVent { col: 8, span: 2 }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny(name: &str) -> LevelDef {
        LevelDef {
            name: name.into(),
            width: 4,
            height: 3,
            tiles: vec![vec![0; 4], vec![0; 4], vec![1; 4]],
            spawn: SpawnPoint { tx: 1, ty: 1 },
            goal_x: Some(3),
            boss_level: false,
            enemies: Vec::new(),
            collectibles: Vec::new(),
            music: 0,
            lava_vent: None,
        }
    }

    #[test]
    fn test_builtin_levels_validate() {
        let catalog = LevelCatalog::builtin();
        assert_eq!(catalog.len(), 3);
        for level in catalog.iter() {
            level.validate().unwrap();
            assert_eq!(level.height, 20);
            assert_eq!(level.spawn, SpawnPoint { tx: 2, ty: 14 });
        }
        assert!(catalog.is_final(2));
        assert!(!catalog.is_final(1));
    }

    #[test]
    fn test_builtin_layout_details() {
        let catalog = LevelCatalog::builtin();
        let grass = catalog.get(0).unwrap().tile_world(false).unwrap();
        assert_eq!(grass.tile_at(14, 20), Tile::Pipe);
        assert_eq!(grass.tile_at(13, 20), Tile::Pipe);
        assert_eq!(grass.tile_at(12, 20), Tile::Air);
        assert_eq!(grass.tile_at(10, 15), Tile::QuestionBlock);

        let cave = catalog.get(1).unwrap().tile_world(false).unwrap();
        assert_eq!(cave.tile_at(16, 12), Tile::Air);
        assert_eq!(cave.tile_at(19, 12), Tile::Ground);
        assert_eq!(cave.tile_at(0, 40), Tile::Ground);

        assert!(catalog.get(2).unwrap().boss_level);
        assert_eq!(
            catalog.get(3).unwrap_err(),
            LevelError::NoSuchLevel { index: 3, len: 3 }
        );
    }

    #[test]
    fn test_validation_errors() {
        let mut level = tiny("rows");
        level.tiles.pop();
        assert!(matches!(level.validate(), Err(LevelError::RowCount { .. })));

        let mut level = tiny("width");
        level.tiles[1].push(0);
        assert!(matches!(level.validate(), Err(LevelError::RowWidth { row: 1, .. })));

        let mut level = tiny("code");
        level.tiles[0][2] = 9;
        assert!(matches!(
            level.validate(),
            Err(LevelError::UnknownTile { code: 9, row: 0, col: 2, .. })
        ));

        let mut level = tiny("spawn");
        level.spawn.tx = 4;
        assert!(matches!(level.validate(), Err(LevelError::SpawnOutOfBounds { .. })));

        let mut level = tiny("enemy");
        level.enemies = enemies(&[("zombie", 1, 1), ("zombie", 500, 900)]);
        assert!(matches!(
            level.validate(),
            Err(LevelError::EnemyOutOfBounds { tx: 500, ty: 900, .. })
        ));
        // Unknown species are still placed data and must be in bounds
        level.enemies = enemies(&[("slime", 1, 7)]);
        assert!(matches!(level.validate(), Err(LevelError::EnemyOutOfBounds { .. })));

        let mut level = tiny("coin");
        level.collectibles = vec![CollectibleSpawn {
            kind: CollectibleKind::Coin,
            tx: 1000,
            ty: 1000,
        }];
        assert!(matches!(
            level.validate(),
            Err(LevelError::CollectibleOutOfBounds { tx: 1000, ty: 1000, .. })
        ));

        let mut level = tiny("vent");
        level.lava_vent = Some(LavaVent { col: 400, span: 9 });
        assert!(matches!(level.validate(), Err(LevelError::VentOutOfBounds { col: 400, .. })));
        level.lava_vent = Some(LavaVent { col: 1, span: 3 });
        assert!(level.validate().is_ok());
        level.lava_vent = Some(LavaVent { col: 2, span: 3 });
        assert!(matches!(level.validate(), Err(LevelError::VentOutOfBounds { .. })));

        let mut level = tiny("goal");
        level.goal_x = None;
        assert!(matches!(level.validate(), Err(LevelError::MissingGoal { .. })));
        level.goal_x = Some(10);
        assert!(matches!(level.validate(), Err(LevelError::GoalOutOfBounds { .. })));

        let mut level = tiny("boss");
        level.goal_x = None;
        level.boss_level = true;
        assert!(matches!(level.validate(), Err(LevelError::MissingBoss { .. })));
        level.enemies = enemies(&[("Boss", 2, 1)]);
        assert!(level.validate().is_ok());
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert_eq!(LevelCatalog::new(Vec::new()).unwrap_err(), LevelError::EmptyCatalog);
    }

    #[test]
    fn test_unknown_species_skipped() {
        let mut level = tiny("slimes");
        level.enemies = enemies(&[("zombie", 1, 1), ("slime", 2, 1), ("dragon", 3, 0)]);
        let spawns = level.enemy_spawns();
        assert_eq!(spawns, vec![(Species::Zombie, 1, 1), (Species::Dragon, 3, 0)]);
    }

    #[test]
    fn test_catalog_from_json() {
        let json = r#"[{
            "name": "json",
            "width": 3,
            "height": 2,
            "tiles": [[0, 0, 0], [1, 1, 1]],
            "spawn": { "tx": 0, "ty": 1 },
            "goal_x": 2,
            "collectibles": [{ "kind": "coin", "tx": 1, "ty": 1 }]
        }]"#;
        let catalog = LevelCatalog::from_json(json).unwrap();
        let level = catalog.get(0).unwrap();
        assert_eq!(level.collectibles[0].kind, CollectibleKind::Coin);
        assert!(level.enemies.is_empty());

        let bad = r#"[{ "name": "bad", "width": 1, "height": 1, "tiles": [[7]], "spawn": { "tx": 0, "ty": 0 }, "goal_x": 0 }]"#;
        assert!(matches!(
            LevelCatalog::from_json(bad),
            Err(ConfigError::Level(LevelError::UnknownTile { .. }))
        ));
    }
}
