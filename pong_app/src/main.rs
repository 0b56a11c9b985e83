//! Pong demo application
//!
//! Two paddles, a ball and a scoreboard built from engine nodes. The demo
//! runs on the headless backend for a fixed number of frames, with the left
//! paddle driven by scripted key presses, then prints the final score.

use std::path::{Path, PathBuf};

use crank_engine::config::ConfigError;
use crank_engine::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

const CONFIG_PATH: &str = "pong.toml";

/// Side length of the ball and width of the paddles
const SIZE: f32 = 35.0;
const PADDLE_HEIGHT: f32 = 300.0;
const PADDLE_SPEED: f32 = 1000.0;
const BALL_SPEED: f32 = 400.0;
const BALL_SPEED_STEP: f32 = 25.0;
const BORDER_WIDTH: f32 = 10.0;
const SCORE_POINT_SIZE: u32 = 150;

/// Font data handed to the headless backend, which accepts any non-empty
/// buffer
static HEADLESS_FONT: &[u8] = b"headless-font";

const FRAME_TIME: f64 = 1.0 / 60.0;
const INPUT_INTERVAL: u32 = 45;

const BALL: Tag = Tag("ball");
const PADDLE: Tag = Tag("paddle");
const LEFT_GOAL: Tag = Tag("left_goal");
const RIGHT_GOAL: Tag = Tag("right_goal");
const SCORE: Tag = Tag("score");

/// Demo settings, read from `pong.toml` when present
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct PongConfig {
    game: GameConfig,
    /// Scoreboard font; the built-in headless font when unset
    font: Option<PathBuf>,
    /// Frames to simulate before quitting
    frames: u32,
}

impl Default for PongConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default().with_title("Pong Demo"),
            font: None,
            frames: 600,
        }
    }
}

impl Config for PongConfig {}

#[derive(thiserror::Error, Debug)]
enum PongError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// Moves a paddle vertically while its keys are held
struct Paddle {
    up: KeyCode,
    down: KeyCode,
}

impl Behavior for Paddle {
    fn update(&mut self, ctx: &mut NodeContext<'_>, delta_time: f64) -> HookResult {
        if !ctx.has_focus() {
            return Ok(());
        }

        let rect = ctx.rect()?;
        let distance = PADDLE_SPEED * delta_time as f32;
        let mut y = rect.y;
        if ctx.input.is_key_down(self.up) {
            y -= distance;
        } else if ctx.input.is_key_down(self.down) {
            y += distance;
        }

        let max_y = ctx.screen.height() as f32 - rect.h;
        ctx.set_position(rect.x, y.clamp(0.0, max_y))?;
        Ok(())
    }
}

/// Spawns the playing field and runs the ball, paddle hits and scoring
struct GameManager {
    font: Option<PathBuf>,
    field: Vec2,
    ball: Option<NodeId>,
    direction: Vec2,
    speed: f32,
    left_score: (Option<NodeId>, u32),
    right_score: (Option<NodeId>, u32),
}

impl GameManager {
    fn new(font: Option<PathBuf>) -> Self {
        Self {
            font,
            field: Vec2::zeros(),
            ball: None,
            direction: Vec2::new(1.0, -1.0),
            speed: BALL_SPEED,
            left_score: (None, 0),
            right_score: (None, 0),
        }
    }

    fn spawn_score(&self, ctx: &mut NodeContext<'_>, x: f32) -> Result<NodeId, GameError> {
        let source = match &self.font {
            Some(path) => AssetSource::path(path),
            None => AssetSource::memory(HEADLESS_FONT),
        };
        let font = ctx.load_font(source, SCORE_POINT_SIZE)?;

        let label = Node::text(TextVisual::new(font).with_color(Color::WHITE))
            .with_position(x, SCORE_POINT_SIZE as f32)
            .with_tag(SCORE);
        let id = ctx.add_child(label)?;
        ctx.set_text_of(id, "0")?;
        Ok(id)
    }

    fn serve(&mut self, ctx: &mut NodeContext<'_>, ball: NodeId) -> HookResult {
        let rect = ctx.scene.node(ball)?.rect();
        self.direction.x = -self.direction.x;
        self.direction.y = if rand::thread_rng().gen_bool(0.5) { 1.0 } else { -1.0 };
        self.speed = BALL_SPEED;

        let node = ctx.scene.node_mut(ball)?;
        node.set_position((self.field.x - rect.w) / 2.0, (self.field.y - rect.h) / 2.0);
        Ok(())
    }

    fn score(ctx: &mut NodeContext<'_>, score: &mut (Option<NodeId>, u32)) -> HookResult {
        score.1 += 1;
        if let Some(label) = score.0 {
            ctx.set_text_of(label, &score.1.to_string())?;
        }
        log::info!("Score changed to {}", score.1);
        Ok(())
    }

    fn touches(ctx: &NodeContext<'_>, tag: Tag, rect: &Rect) -> Option<Rect> {
        ctx.scene
            .find_tagged(tag)
            .into_iter()
            .filter_map(|id| ctx.scene.get(id).map(Node::rect))
            .find(|other| check_collision_aabb(other, rect))
    }
}

impl Behavior for GameManager {
    fn start(&mut self, ctx: &mut NodeContext<'_>) -> HookResult {
        self.field = Vec2::new(ctx.screen.width() as f32, ctx.screen.height() as f32);
        let (width, height) = (self.field.x, self.field.y);
        let paddle_y = (height - PADDLE_HEIGHT) / 2.0;

        let ball = ctx.add_child(
            Node::filled(Color::WHITE)
                .with_rect(Rect::new(0.0, 0.0, SIZE, SIZE))
                .with_tag(BALL)
                .with_name("Ball"),
        )?;
        self.ball = Some(ball);
        self.serve(ctx, ball)?;

        ctx.add_child(
            Node::filled(Color::WHITE)
                .with_rect(Rect::new(SIZE, paddle_y, SIZE, PADDLE_HEIGHT))
                .with_tag(PADDLE)
                .with_behavior(Paddle {
                    up: KeyCode::W,
                    down: KeyCode::S,
                }),
        )?;
        ctx.add_child(
            Node::filled(Color::WHITE)
                .with_rect(Rect::new(width - 2.0 * SIZE, paddle_y, SIZE, PADDLE_HEIGHT))
                .with_tag(PADDLE)
                .with_behavior(Paddle {
                    up: KeyCode::Up,
                    down: KeyCode::Down,
                }),
        )?;

        let goal = Color::rgba(0, 255, 0, 0);
        ctx.add_child(
            Node::filled(goal)
                .with_rect(Rect::new(0.0, 0.0, BORDER_WIDTH, height))
                .with_tag(LEFT_GOAL),
        )?;
        ctx.add_child(
            Node::filled(goal)
                .with_rect(Rect::new(width - BORDER_WIDTH, 0.0, BORDER_WIDTH, height))
                .with_tag(RIGHT_GOAL),
        )?;

        let point_size = SCORE_POINT_SIZE as f32;
        self.left_score.0 = Some(self.spawn_score(ctx, width / 2.0 - point_size * 1.5)?);
        self.right_score.0 = Some(self.spawn_score(ctx, width / 2.0 + point_size)?);
        Ok(())
    }

    fn update(&mut self, ctx: &mut NodeContext<'_>, delta_time: f64) -> HookResult {
        if !ctx.has_focus() {
            return Ok(());
        }
        if ctx.input.is_key_down(KeyCode::Escape) {
            ctx.quit();
        }
        let Some(ball) = self.ball else {
            return Ok(());
        };

        let rect = ctx.scene.node(ball)?.rect();
        let max = Vec2::new(self.field.x - rect.w, self.field.y - rect.h);
        let step = self.direction * self.speed * delta_time as f32;

        let mut x = rect.x + step.x;
        let mut y = rect.y + step.y;
        if x < 0.0 || x > max.x {
            self.direction.x = -self.direction.x;
        }
        if y < 0.0 || y > max.y {
            self.direction.y = -self.direction.y;
        }
        x = x.clamp(0.0, max.x);
        y = y.clamp(0.0, max.y);
        ctx.scene.node_mut(ball)?.set_position(x, y);

        // Look one step ahead so the ball turns before entering a paddle
        let ahead = Rect::new(
            (x + step.x).clamp(0.0, max.x),
            (y + step.y).clamp(0.0, max.y),
            rect.w,
            rect.h,
        );

        if let Some(paddle) = Self::touches(ctx, PADDLE, &ahead) {
            let paddle_on_left = paddle.x + paddle.w / 2.0 < ahead.x + ahead.w / 2.0;
            if paddle_on_left == (self.direction.x < 0.0) {
                self.direction.x = -self.direction.x;
                self.speed += BALL_SPEED_STEP;
            }
        }

        if Self::touches(ctx, LEFT_GOAL, &ahead).is_some() {
            Self::score(ctx, &mut self.right_score)?;
            self.serve(ctx, ball)?;
        } else if Self::touches(ctx, RIGHT_GOAL, &ahead).is_some() {
            Self::score(ctx, &mut self.left_score)?;
            self.serve(ctx, ball)?;
        }
        Ok(())
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) {
        const DASH_WIDTH: f32 = 5.0;
        const DASH_HEIGHT: f32 = 50.0;

        let x = self.field.x / 2.0 - DASH_WIDTH / 2.0;
        let mut y = 0.0;
        while y < self.field.y {
            canvas.fill_rect(Rect::new(x, y, DASH_WIDTH, DASH_HEIGHT), Color::WHITE);
            y += DASH_HEIGHT * 1.5;
        }
    }
}

fn load_config(path: &Path) -> Result<PongConfig, ConfigError> {
    if path.exists() {
        log::info!("Loading configuration from {}", path.display());
        PongConfig::load_from_file(path)
    } else {
        Ok(PongConfig::default())
    }
}

fn main() -> Result<(), PongError> {
    crank_engine::foundation::logging::init();
    log::info!("Starting Pong demo...");

    let config = load_config(Path::new(CONFIG_PATH))?;
    let frames = config.frames;

    let mut game = Game::new(HeadlessBackend::new(), config.game)?;
    game.add_child(Node::new().with_behavior(GameManager::new(config.font)).with_name("GameManager"));

    let mut rng = rand::thread_rng();
    let mut held: Option<KeyCode> = None;
    for frame in 0..frames {
        if game.is_quitting() {
            break;
        }
        if frame % INPUT_INTERVAL == 0 {
            if let Some(key) = held.take() {
                game.backend_mut().push_event(BackendEvent::KeyUp(key));
            }
            let key = if rng.gen_bool(0.5) { KeyCode::W } else { KeyCode::S };
            game.backend_mut().push_event(BackendEvent::KeyDown(key));
            held = Some(key);
        }
        game.step(FRAME_TIME)?;
    }

    game.backend_mut().push_event(BackendEvent::KeyDown(KeyCode::Escape));
    game.step(FRAME_TIME)?;

    let scores: Vec<String> = game
        .scene()
        .find_tagged(SCORE)
        .into_iter()
        .filter_map(|id| game.scene().get(id)?.text_content().map(str::to_string))
        .collect();
    log::info!("Final score: {}", scores.join(" - "));
    log::info!("Rendered {} frames", game.backend().frames_presented());

    game.shutdown();
    log::info!("Pong demo completed");
    Ok(())
}
