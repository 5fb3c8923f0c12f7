use serde::{Deserialize, Serialize};

use sitestrike_core::team::Team;

use crate::collision;

/// Axis-aligned rectangle in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Inclusive containment test.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Point on (or inside) the rectangle closest to `(x, y)`.
    pub fn closest_point(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x.clamp(self.x, self.x + self.width),
            y.clamp(self.y, self.y + self.height),
        )
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        ((self.x - x).powi(2) + (self.y - y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BombSite {
    pub label: String,
    pub area: Rect,
}

/// Navigation waypoint. `links` index into [`GameMap::nav`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavNode {
    pub x: f32,
    pub y: f32,
    pub links: Vec<usize>,
}

/// Static level geometry. Never mutated once a match starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMap {
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub walls: Vec<Rect>,
    pub ct_spawns: Vec<Point>,
    pub t_spawns: Vec<Point>,
    pub bomb_sites: Vec<BombSite>,
    pub nav: Vec<NavNode>,
    /// Point T bots bias their patrol toward.
    pub t_anchor: Point,
    /// Point CT bots bias their patrol toward.
    pub ct_anchor: Point,
}

impl GameMap {
    pub fn spawns(&self, team: Team) -> &[Point] {
        match team {
            Team::Ct => &self.ct_spawns,
            Team::T => &self.t_spawns,
        }
    }

    /// Spawn for the agent with arena index `index`, cycling through the team's list.
    pub fn spawn_for(&self, team: Team, index: usize) -> Point {
        let spawns = self.spawns(team);
        if spawns.is_empty() {
            return Point {
                x: self.width / 2.0,
                y: self.height / 2.0,
            };
        }
        spawns[index % spawns.len()]
    }

    pub fn anchor(&self, team: Team) -> Point {
        match team {
            Team::Ct => self.ct_anchor,
            Team::T => self.t_anchor,
        }
    }

    /// Bomb site containing the point, if any.
    pub fn site_at(&self, x: f32, y: f32) -> Option<&BombSite> {
        self.bomb_sites.iter().find(|s| s.area.contains(x, y))
    }

    /// Index of the waypoint closest to the point (0 on an empty graph).
    pub fn nearest_waypoint(&self, x: f32, y: f32) -> usize {
        let mut best = 0;
        let mut best_dist = f32::INFINITY;
        for (i, node) in self.nav.iter().enumerate() {
            let d = (node.x - x).powi(2) + (node.y - y).powi(2);
            if d < best_dist {
                best_dist = d;
                best = i;
            }
        }
        best
    }

    /// First wall a circle of `radius` at `(x, y)` overlaps.
    pub fn collide(&self, x: f32, y: f32, radius: f32) -> Option<&Rect> {
        collision::collide(&self.walls, x, y, radius)
    }

    pub fn has_line_of_sight(&self, x1: f32, y1: f32, x2: f32, y2: f32) -> bool {
        collision::has_line_of_sight(&self.walls, x1, y1, x2, y2)
    }

    /// Whether a circle of `radius` centered at the point lies strictly inside the map.
    pub fn in_bounds(&self, x: f32, y: f32, radius: f32) -> bool {
        x > radius && x < self.width - radius && y > radius && y < self.height - radius
    }

    /// Drop navigation links that point past the end of the graph.
    fn sanitize(&mut self) {
        let count = self.nav.len();
        for (i, node) in self.nav.iter_mut().enumerate() {
            let before = node.links.len();
            node.links.retain(|&l| l < count);
            if node.links.len() != before {
                tracing::warn!(map = %self.name, waypoint = i, "Dropped out-of-range nav links");
            }
        }
    }
}

/// Load a map from a JSON file. Returns `None` if the file is missing or unparseable.
pub fn load_map_from_file(path: &str) -> Option<GameMap> {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<GameMap>(&content) {
            Ok(mut map) => {
                map.sanitize();
                Some(map)
            },
            Err(e) => {
                tracing::warn!("Failed to parse {path}: {e}");
                None
            },
        },
        Err(_) => None,
    }
}

/// Load `{dir}/{name}.json`, falling back to the built-in map.
pub fn load_map_from_dir(dir: &str, name: &str) -> GameMap {
    let path = format!("{dir}/{name}.json");
    load_map_from_file(&path).unwrap_or_else(builtin_map)
}

/// Load a map by name, preferring a JSON file from the maps directory.
///
/// Checks env var `SITESTRIKE_MAPS_DIR` (default `config/maps`) for a file named
/// `{name}.json`. Falls back to [`builtin_map`] if the file is missing or unparseable.
pub fn load_map(name: &str) -> GameMap {
    let dir = std::env::var("SITESTRIKE_MAPS_DIR").unwrap_or_else(|_| "config/maps".to_string());
    load_map_from_dir(&dir, name)
}

// [x, y, width, height]
const DUST_WALLS: [[f32; 4]; 72] = [
    [0.0, 0.0, 2800.0, 25.0],
    [0.0, 1975.0, 2800.0, 25.0],
    [0.0, 0.0, 25.0, 2000.0],
    [2775.0, 0.0, 25.0, 2000.0],
    [25.0, 1500.0, 250.0, 25.0],
    [400.0, 1500.0, 25.0, 200.0],
    [25.0, 1100.0, 25.0, 400.0],
    [200.0, 25.0, 25.0, 450.0],
    [400.0, 25.0, 25.0, 350.0],
    [400.0, 475.0, 25.0, 200.0],
    [600.0, 25.0, 25.0, 300.0],
    [600.0, 425.0, 25.0, 150.0],
    [600.0, 575.0, 500.0, 25.0],
    [1200.0, 575.0, 25.0, 25.0],
    [1300.0, 25.0, 25.0, 400.0],
    [1300.0, 525.0, 25.0, 75.0],
    [750.0, 150.0, 60.0, 60.0],
    [950.0, 300.0, 50.0, 50.0],
    [1100.0, 150.0, 70.0, 50.0],
    [850.0, 400.0, 40.0, 40.0],
    [450.0, 675.0, 200.0, 25.0],
    [750.0, 675.0, 200.0, 25.0],
    [450.0, 975.0, 25.0, 250.0],
    [450.0, 1325.0, 25.0, 175.0],
    [950.0, 675.0, 25.0, 250.0],
    [950.0, 1025.0, 25.0, 200.0],
    [950.0, 1350.0, 25.0, 150.0],
    [600.0, 850.0, 50.0, 50.0],
    [750.0, 1000.0, 60.0, 40.0],
    [550.0, 1150.0, 40.0, 60.0],
    [400.0, 1700.0, 500.0, 25.0],
    [1000.0, 1700.0, 25.0, 100.0],
    [400.0, 1900.0, 625.0, 25.0],
    [1200.0, 1400.0, 25.0, 300.0],
    [1200.0, 1800.0, 25.0, 175.0],
    [1200.0, 1400.0, 500.0, 25.0],
    [1800.0, 1400.0, 25.0, 200.0],
    [1800.0, 1700.0, 25.0, 275.0],
    [1350.0, 1550.0, 60.0, 70.0],
    [1550.0, 1650.0, 50.0, 60.0],
    [1350.0, 1800.0, 70.0, 50.0],
    [1600.0, 1500.0, 40.0, 40.0],
    [2200.0, 800.0, 25.0, 300.0],
    [2200.0, 1250.0, 25.0, 300.0],
    [2400.0, 650.0, 25.0, 200.0],
    [1400.0, 200.0, 500.0, 25.0],
    [1400.0, 450.0, 350.0, 25.0],
    [1850.0, 450.0, 25.0, 200.0],
    [1850.0, 750.0, 25.0, 200.0],
    [1550.0, 300.0, 50.0, 50.0],
    [1750.0, 300.0, 40.0, 40.0],
    [1850.0, 1200.0, 350.0, 25.0],
    [1850.0, 1550.0, 350.0, 25.0],
    [1950.0, 1350.0, 50.0, 60.0],
    [2100.0, 1400.0, 60.0, 50.0],
    [1050.0, 800.0, 300.0, 25.0],
    [1050.0, 1100.0, 300.0, 25.0],
    [1050.0, 825.0, 25.0, 120.0],
    [1050.0, 1005.0, 25.0, 95.0],
    [1325.0, 825.0, 25.0, 275.0],
    [1150.0, 900.0, 40.0, 40.0],
    [1250.0, 1000.0, 35.0, 35.0],
    [300.0, 800.0, 50.0, 50.0],
    [200.0, 1300.0, 60.0, 40.0],
    [1600.0, 950.0, 50.0, 50.0],
    [2000.0, 700.0, 40.0, 60.0],
    [2300.0, 1000.0, 50.0, 50.0],
    [2500.0, 1100.0, 40.0, 40.0],
    [1700.0, 1700.0, 50.0, 50.0],
    [2400.0, 1700.0, 60.0, 50.0],
    [700.0, 1400.0, 40.0, 50.0],
    [1500.0, 1150.0, 45.0, 45.0],
];

const DUST_NAV: [(f32, f32, &[usize]); 28] = [
    (200.0, 1700.0, &[1, 2, 3]),
    (300.0, 1500.0, &[0, 4, 5]),
    (200.0, 1850.0, &[0, 3]),
    (500.0, 1800.0, &[0, 2, 12]),
    (150.0, 1200.0, &[1, 5]),
    (200.0, 900.0, &[4, 1, 6]),
    (300.0, 500.0, &[5, 7]),
    (300.0, 200.0, &[6, 8]),
    (500.0, 150.0, &[7, 9]),
    // A site
    (800.0, 250.0, &[8, 10, 11]),
    (1100.0, 200.0, &[9, 11, 18]),
    (1000.0, 450.0, &[9, 10, 15]),
    // B tunnels
    (700.0, 1800.0, &[3, 13]),
    (1000.0, 1750.0, &[12, 14]),
    (1300.0, 1600.0, &[13, 25]),
    // Mid
    (700.0, 800.0, &[11, 6, 16]),
    (700.0, 1050.0, &[15, 17, 5]),
    (700.0, 1350.0, &[16, 1, 12]),
    // CT to A
    (1500.0, 300.0, &[10, 19]),
    (1800.0, 350.0, &[18, 20]),
    (1900.0, 600.0, &[19, 21, 22]),
    // CT side
    (2100.0, 800.0, &[20, 22, 23]),
    (2100.0, 1100.0, &[21, 20, 23, 24]),
    (2500.0, 1050.0, &[21, 22, 24]),
    (2100.0, 1400.0, &[22, 25]),
    // B site
    (1500.0, 1600.0, &[14, 24, 26]),
    (1650.0, 1750.0, &[25, 14]),
    // Center building
    (1200.0, 950.0, &[15, 16, 22, 11]),
];

fn points(raw: &[(f32, f32)]) -> Vec<Point> {
    raw.iter().map(|&(x, y)| Point { x, y }).collect()
}

/// The built-in 2800x2000 desert map.
pub fn builtin_map() -> GameMap {
    GameMap {
        name: "dust".to_string(),
        width: 2800.0,
        height: 2000.0,
        walls: DUST_WALLS
            .iter()
            .map(|w| Rect::new(w[0], w[1], w[2], w[3]))
            .collect(),
        ct_spawns: points(&[
            (2500.0, 950.0),
            (2550.0, 1050.0),
            (2600.0, 1150.0),
            // Kept clear of the crate at (2500, 1100).
            (2450.0, 1180.0),
            (2650.0, 1000.0),
        ]),
        t_spawns: points(&[
            (120.0, 1650.0),
            (200.0, 1700.0),
            (150.0, 1800.0),
            (250.0, 1750.0),
            (300.0, 1850.0),
        ]),
        bomb_sites: vec![
            BombSite {
                label: "A".to_string(),
                area: Rect::new(700.0, 100.0, 500.0, 400.0),
            },
            BombSite {
                label: "B".to_string(),
                area: Rect::new(1250.0, 1475.0, 500.0, 400.0),
            },
        ],
        nav: DUST_NAV
            .iter()
            .map(|&(x, y, links)| NavNode {
                x,
                y,
                links: links.to_vec(),
            })
            .collect(),
        t_anchor: Point { x: 1400.0, y: 800.0 },
        ct_anchor: Point { x: 700.0, y: 1200.0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AGENT_RADIUS;

    #[test]
    fn builtin_map_shape() {
        let map = builtin_map();
        assert_eq!(map.walls.len(), 72);
        assert_eq!(map.ct_spawns.len(), 5);
        assert_eq!(map.t_spawns.len(), 5);
        assert_eq!(map.bomb_sites.len(), 2);
        assert_eq!(map.nav.len(), 28);
    }

    #[test]
    fn spawns_are_clear_of_walls() {
        let map = builtin_map();
        for team in [Team::Ct, Team::T] {
            for sp in map.spawns(team) {
                assert!(
                    map.collide(sp.x, sp.y, AGENT_RADIUS).is_none(),
                    "{team} spawn ({}, {}) overlaps a wall",
                    sp.x,
                    sp.y
                );
                assert!(map.in_bounds(sp.x, sp.y, AGENT_RADIUS));
            }
        }
    }

    #[test]
    fn nav_links_are_valid_indices() {
        let map = builtin_map();
        for (i, node) in map.nav.iter().enumerate() {
            assert!(!node.links.is_empty(), "waypoint {i} has no links");
            for &l in &node.links {
                assert!(l < map.nav.len(), "waypoint {i} links to {l}");
                assert_ne!(l, i, "waypoint {i} links to itself");
            }
        }
    }

    #[test]
    fn site_lookup() {
        let map = builtin_map();
        assert_eq!(map.site_at(900.0, 300.0).map(|s| s.label.as_str()), Some("A"));
        assert_eq!(map.site_at(1500.0, 1700.0).map(|s| s.label.as_str()), Some("B"));
        assert!(map.site_at(2500.0, 950.0).is_none());
    }

    #[test]
    fn nearest_waypoint_from_spawns() {
        let map = builtin_map();
        assert_eq!(map.nearest_waypoint(200.0, 1700.0), 0);
        assert_eq!(map.nearest_waypoint(2550.0, 1050.0), 23);
    }

    #[test]
    fn spawn_for_cycles() {
        let map = builtin_map();
        assert_eq!(map.spawn_for(Team::T, 5), map.t_spawns[0]);
        assert_eq!(map.spawn_for(Team::Ct, 7), map.ct_spawns[2]);
    }

    #[test]
    fn load_map_falls_back_to_builtin() {
        let map = load_map_from_dir("/nonexistent/maps/dir", "dust");
        assert_eq!(map, builtin_map());
    }

    #[test]
    fn map_json_roundtrip_through_file() {
        let map = builtin_map();
        let dir = std::env::temp_dir().join(format!("sitestrike-maps-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("custom.json");
        std::fs::write(&path, serde_json::to_string(&map).unwrap()).unwrap();

        let loaded = load_map_from_dir(dir.to_str().unwrap(), "custom");
        assert_eq!(loaded, map);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn malformed_map_file_falls_back() {
        let dir = std::env::temp_dir().join(format!("sitestrike-badmap-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("broken.json"), "{ not json").unwrap();
        let loaded = load_map_from_dir(dir.to_str().unwrap(), "broken");
        assert_eq!(loaded.name, "dust");
        std::fs::remove_dir_all(&dir).ok();
    }
}
