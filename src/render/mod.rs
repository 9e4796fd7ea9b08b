//! Presentation snapshots
//!
//! `Scene::capture` reads the game once, between ticks, and produces an
//! immutable description of what to draw. Painters only ever see a `Scene`,
//! so they have no way to write simulation state.

#[cfg(target_arch = "wasm32")]
mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasPainter;

use crate::consts::*;
use crate::leaderboard::TimeFilter;
use crate::settings::{DifficultyLevel, Settings};
use crate::sim::collision::{Aabb, bird_box};
use crate::sim::{CountdownStep, Game, GameMode, LeaderboardOrigin, Qualification};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpriteKind {
    /// Angry face once the run is over
    Bird { angry: bool },
    PipeTop,
    PipeBottom,
    Cloud,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub rect: Aabb,
    /// Degrees, clockwise
    pub rotation: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    pub score: u32,
    pub best_local: u32,
    pub best_global: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub name: String,
    pub score: u32,
    /// ms since epoch
    pub submitted_at: f64,
}

/// Which overlay is visible; derived from the game mode alone
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// No overlay, game in progress
    None,
    /// Logo and start button
    Title,
    Settings { level: DifficultyLevel },
    Countdown { label: &'static str },
    GameOver { score: u32, qualification: Qualification },
    NameEntry { score: u32, submitting: bool },
    Leaderboard {
        filter: TimeFilter,
        rows: Vec<LeaderboardRow>,
        /// Opened after a game (offers Play Again) or from the menu
        after_game: bool,
    },
}

impl Overlay {
    /// DOM element id backing this overlay
    pub fn element_id(&self) -> Option<&'static str> {
        match self {
            Overlay::None => None,
            Overlay::Title => Some("title-menu"),
            Overlay::Settings { .. } => Some("settings-menu"),
            Overlay::Countdown { .. } => Some("countdown"),
            Overlay::GameOver { .. } => Some("game-over"),
            Overlay::NameEntry { .. } => Some("name-entry"),
            Overlay::Leaderboard { .. } => Some("leaderboard"),
        }
    }

    /// Every overlay element id, for hiding the inactive ones
    pub const ELEMENT_IDS: [&'static str; 6] = [
        "title-menu",
        "settings-menu",
        "countdown",
        "game-over",
        "name-entry",
        "leaderboard",
    ];
}

/// Everything the presentation layer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// HSL lightness of the sky, percent
    pub sky_lightness: f32,
    /// Back to front
    pub sprites: Vec<Sprite>,
    pub hud: Hud,
    pub overlay: Overlay,
}

impl Scene {
    pub fn capture(game: &Game, settings: &Settings) -> Self {
        let session = game.session();
        let mode = game.mode();
        let score = session.score.current;

        let mut sprites = Vec::new();

        if settings.show_clouds {
            sprites.extend(session.clouds.clouds.iter().map(|c| Sprite {
                kind: SpriteKind::Cloud,
                rect: Aabb::from_xywh(c.x, c.y, c.width(), CLOUD_HEIGHT * c.scale),
                rotation: 0.0,
            }));
        }

        if pipes_visible(&mode) {
            let pipe = &session.pipe;
            sprites.push(Sprite {
                kind: SpriteKind::PipeTop,
                rect: Aabb::from_xywh(pipe.position, 0.0, PIPE_WIDTH, pipe.gap_top),
                rotation: 0.0,
            });
            sprites.push(Sprite {
                kind: SpriteKind::PipeBottom,
                rect: Aabb::from_xywh(
                    pipe.position,
                    pipe.gap_bottom(),
                    PIPE_WIDTH,
                    pipe.bottom_height(),
                ),
                rotation: 0.0,
            });
        }

        let angry = matches!(
            mode,
            GameMode::GameOver { .. } | GameMode::ScoreSubmission { .. }
        );
        sprites.push(Sprite {
            kind: SpriteKind::Bird { angry },
            rect: bird_box(&session.bird),
            rotation: if settings.reduced_motion {
                0.0
            } else {
                session.bird.rotation
            },
        });

        let sky_lightness = if settings.reduced_motion {
            80.0
        } else {
            sky_lightness(score)
        };

        Self {
            sky_lightness,
            sprites,
            hud: Hud {
                score,
                best_local: session.score.best_local,
                best_global: session.score.best_global,
            },
            overlay: overlay_for(game),
        }
    }
}

/// The sky darkens as the score climbs, bottoming out at 50%
pub fn sky_lightness(score: u32) -> f32 {
    (80.0 - score as f32).max(50.0)
}

fn pipes_visible(mode: &GameMode) -> bool {
    !matches!(
        mode,
        GameMode::Idle
            | GameMode::Settings
            | GameMode::LeaderboardView {
                origin: LeaderboardOrigin::Menu,
                ..
            }
    )
}

fn overlay_for(game: &Game) -> Overlay {
    let score = game.score().current;
    match game.mode() {
        GameMode::Idle => Overlay::Title,
        GameMode::Settings => Overlay::Settings {
            level: game.level(),
        },
        GameMode::Countdown { step } => Overlay::Countdown {
            label: CountdownStep::label(step),
        },
        GameMode::Running => Overlay::None,
        GameMode::GameOver { qualification } => Overlay::GameOver {
            score,
            qualification,
        },
        GameMode::ScoreSubmission { submitting } => Overlay::NameEntry { score, submitting },
        GameMode::LeaderboardView { origin, filter } => Overlay::Leaderboard {
            filter,
            rows: game
                .leaderboard()
                .iter()
                .enumerate()
                .map(|(i, e)| LeaderboardRow {
                    rank: i + 1,
                    name: e.name.clone(),
                    score: e.score,
                    submitted_at: e.submitted_at,
                })
                .collect(),
            after_game: origin == LeaderboardOrigin::AfterGame,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Tick;

    fn game() -> Game {
        Game::new(3, DifficultyLevel::Normal, 4)
    }

    #[test]
    fn test_idle_scene() {
        let scene = Scene::capture(&game(), &Settings::default());
        assert_eq!(scene.overlay, Overlay::Title);
        assert_eq!(scene.overlay.element_id(), Some("title-menu"));
        assert_eq!(scene.hud.best_local, 4);
        assert!(!scene.sprites.iter().any(|s| s.kind == SpriteKind::PipeTop));
        // bird drawn last
        assert!(matches!(
            scene.sprites.last().map(|s| s.kind),
            Some(SpriteKind::Bird { angry: false })
        ));
    }

    #[test]
    fn test_running_scene_has_pipes_and_no_overlay() {
        let mut game = game();
        game.jump().unwrap();
        let scene = Scene::capture(&game, &Settings::default());
        assert_eq!(scene.overlay, Overlay::None);
        assert_eq!(scene.overlay.element_id(), None);

        let top = scene
            .sprites
            .iter()
            .find(|s| s.kind == SpriteKind::PipeTop)
            .unwrap();
        let bottom = scene
            .sprites
            .iter()
            .find(|s| s.kind == SpriteKind::PipeBottom)
            .unwrap();
        assert_eq!(top.rect.height() + 200.0 + bottom.rect.height(), PLAYFIELD_HEIGHT);
        assert_eq!(scene.sprites.last().unwrap().rotation, JUMP_TILT);
    }

    #[test]
    fn test_game_over_bird_is_angry() {
        let mut game = game();
        game.jump().unwrap();
        while game.mode() == GameMode::Running {
            let tick = Tick {
                generation: game.session_id(),
            };
            game.tick(tick).unwrap();
        }
        let scene = Scene::capture(&game, &Settings::default());
        assert!(matches!(scene.overlay, Overlay::GameOver { score: 0, .. }));
        assert!(matches!(
            scene.sprites.last().map(|s| s.kind),
            Some(SpriteKind::Bird { angry: true })
        ));
    }

    #[test]
    fn test_settings_toggles() {
        let mut settings = Settings::default();
        let with_clouds = Scene::capture(&game(), &settings);
        assert!(with_clouds.sprites.iter().any(|s| s.kind == SpriteKind::Cloud));

        settings.show_clouds = false;
        settings.reduced_motion = true;
        let mut game = game();
        game.jump().unwrap();
        let scene = Scene::capture(&game, &settings);
        assert!(!scene.sprites.iter().any(|s| s.kind == SpriteKind::Cloud));
        assert_eq!(scene.sprites.last().unwrap().rotation, 0.0);
    }

    #[test]
    fn test_sky_darkens_with_score() {
        assert_eq!(sky_lightness(0), 80.0);
        assert_eq!(sky_lightness(12), 68.0);
        assert_eq!(sky_lightness(300), 50.0);
    }

    #[test]
    fn test_countdown_overlay() {
        let mut game = game();
        game.jump().unwrap();
        while game.mode() == GameMode::Running {
            let tick = Tick {
                generation: game.session_id(),
            };
            game.tick(tick).unwrap();
        }
        game.play_again().unwrap();
        let scene = Scene::capture(&game, &Settings::default());
        assert_eq!(scene.overlay, Overlay::Countdown { label: "3" });
    }
}
