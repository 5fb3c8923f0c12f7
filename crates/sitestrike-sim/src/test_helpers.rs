//! Small open map and placement helpers for module tests.

use sitestrike_core::player::AgentId;
use sitestrike_core::team::{Difficulty, Team};

use crate::Simulation;
use crate::config::SimConfig;
use crate::map::{BombSite, GameMap, NavNode, Point, Rect};

/// The single wall in [`arena`].
pub(crate) const PILLAR: Rect = Rect::new(1000.0, 1200.0, 40.0, 400.0);

/// 2000×2000 map with one pillar, one site in the top-right corner and a
/// three-node waypoint line along `y = 200`.
pub(crate) fn arena() -> GameMap {
    let point = |x, y| Point { x, y };
    GameMap {
        name: "arena".to_string(),
        width: 2000.0,
        height: 2000.0,
        walls: vec![PILLAR],
        ct_spawns: vec![point(200.0, 1800.0), point(300.0, 1800.0), point(400.0, 1800.0)],
        t_spawns: vec![point(1800.0, 1800.0), point(1700.0, 1800.0), point(1600.0, 1800.0)],
        bomb_sites: vec![BombSite {
            label: "A".to_string(),
            area: Rect::new(1500.0, 100.0, 300.0, 300.0),
        }],
        nav: vec![
            NavNode {
                x: 200.0,
                y: 200.0,
                links: vec![1],
            },
            NavNode {
                x: 600.0,
                y: 200.0,
                links: vec![0, 2],
            },
            NavNode {
                x: 1000.0,
                y: 200.0,
                links: vec![1],
            },
        ],
        t_anchor: point(1650.0, 250.0),
        ct_anchor: point(100.0, 200.0),
    }
}

/// Fresh CT session on [`arena`]. Arena indices: `0` is the human,
/// `1..team_size` their teammates, the rest are T bots.
pub(crate) fn arena_sim(team_size: u8, difficulty: Difficulty) -> Simulation {
    let config = SimConfig {
        team: Team::Ct,
        difficulty,
        team_size,
        ..SimConfig::default()
    };
    Simulation::with_map(config, arena(), 7)
}

/// Move an agent and forget its previous position.
pub(crate) fn place(s: &mut Simulation, id: AgentId, x: f32, y: f32) {
    let agent = &mut s.state.agents[id.index()];
    agent.x = x;
    agent.y = y;
    agent.vx = 0.0;
    agent.vy = 0.0;
    agent.brain.last_x = x;
    agent.brain.last_y = y;
    agent.brain.stuck_timer = 0.0;
}
