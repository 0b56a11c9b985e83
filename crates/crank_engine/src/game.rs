//! Game root and main loop

use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;

use crate::{
    assets::{AssetCaches, AssetError, AssetSource, Font, Sound, Texture},
    backend::{Backend, BackendError, BackendEvent, RendererHandle, SoundKind, WindowHandle},
    config::{ConfigError, GameConfig},
    foundation::{
        math::{Color, Rect, Vec2},
        time::{FixedTimestep, FramePacer, Timer},
    },
    input::InputState,
    scene::{dispatch, Node, NodeContext, NodeId, Scene, SceneError, Screen},
};

/// Pause between loop iterations in [`Game::run`]
const LOOP_SLEEP: Duration = Duration::from_millis(1);

/// Loop lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Frames are being processed
    Running,
    /// Quit was requested; the loop stops at the top of the next frame
    Quitting,
}

/// Main game struct
///
/// Owns the backend, the scene, input state and resource caches, and runs
/// the frame loop: poll input, update pass, fixed-step passes, render, then
/// the destroy sweep.
pub struct Game<B: Backend> {
    backend: B,
    window: WindowHandle,
    renderer: RendererHandle,

    scene: Scene,
    input: InputState,
    screen: Screen,
    assets: AssetCaches,

    timer: Timer,
    fixed_timestep: FixedTimestep,
    pacer: FramePacer,

    clear_color: Color,
    state: LoopState,
    torn_down: bool,
}

impl<B: Backend> Game<B> {
    /// Create the window and renderer and size the screen
    pub fn new(mut backend: B, config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        log::info!("Initializing game...");

        let window_config = &config.window;
        let window = backend.create_window(&window_config.title, window_config.width, window_config.height)?;
        log::info!(
            "Window created: {}x{} \"{}\"",
            window_config.width,
            window_config.height,
            window_config.title
        );

        let renderer = match backend.create_renderer(window) {
            Ok(renderer) => renderer,
            Err(e) => {
                backend.destroy_window(window);
                return Err(e.into());
            }
        };
        log::info!("Renderer created");

        let mut game = Self {
            backend,
            window,
            renderer,
            scene: Scene::new(),
            input: InputState::new(),
            screen: Screen::new(window_config.width, window_config.height),
            assets: AssetCaches::new(&config.assets, &config.audio),
            timer: Timer::new(),
            fixed_timestep: FixedTimestep::new(config.fixed_time_step),
            pacer: FramePacer::new(config.target_frame_rate),
            clear_color: config.clear_color,
            state: LoopState::Running,
            torn_down: false,
        };
        game.set_screen_size(window_config.width, window_config.height);

        Ok(game)
    }

    /// Run frames until quit is requested, then tear down
    pub fn run(&mut self) -> Result<(), GameError> {
        log::info!("Starting game loop...");

        while self.is_running() {
            self.frame()?;
            std::thread::sleep(LOOP_SLEEP);
        }

        self.shutdown();
        log::info!("Game loop finished");
        Ok(())
    }

    /// Run one frame timed by the wall clock
    pub fn frame(&mut self) -> Result<(), GameError> {
        self.poll_events();
        let delta_time = self.timer.update();
        self.advance(delta_time)
    }

    /// Run one frame with a given delta time
    pub fn step(&mut self, delta_time: f64) -> Result<(), GameError> {
        self.poll_events();
        self.advance(delta_time)
    }

    fn is_running(&mut self) -> bool {
        if self.screen.is_quit_requested() && self.state == LoopState::Running {
            log::info!("Quit requested, stopping game loop");
            self.state = LoopState::Quitting;
        }
        self.state == LoopState::Running
    }

    fn poll_events(&mut self) {
        self.input.begin_frame();

        while let Some(event) = self.backend.poll_event() {
            match event {
                BackendEvent::Quit => self.screen.request_quit(),
                BackendEvent::WindowResized { .. } => {
                    let (width, height) = self.backend.drawable_size(self.window);
                    self.set_drawable_size(width, height);
                }
                BackendEvent::FocusGained => self.screen.has_focus = true,
                BackendEvent::FocusLost => self.screen.has_focus = false,
                BackendEvent::KeyDown(key) => self.input.handle_key_down(key),
                BackendEvent::KeyUp(key) => self.input.handle_key_up(key),
                BackendEvent::MouseMotion { x, y } => self.input.handle_mouse_move(x, y),
                BackendEvent::MouseButtonDown(button) => self.input.handle_mouse_down(button),
                BackendEvent::MouseButtonUp(button) => self.input.handle_mouse_up(button),
            }
        }
    }

    fn advance(&mut self, delta_time: f64) -> Result<(), GameError> {
        let mut ctx = NodeContext::new(
            &mut self.scene,
            &self.input,
            &mut self.screen,
            &mut self.assets,
            &mut self.backend,
            self.renderer,
        );

        dispatch::update_scene(&mut ctx, delta_time)?;

        self.fixed_timestep.accumulate(delta_time);
        while self.fixed_timestep.consume_tick() {
            dispatch::fixed_update_scene(&mut ctx, self.fixed_timestep.step())?;
        }

        if self.pacer.should_render(delta_time) {
            self.render();
        }

        dispatch::sweep(&mut self.scene, &mut self.backend);
        Ok(())
    }

    fn render(&mut self) {
        self.backend.clear(self.renderer, self.clear_color);
        self.backend.set_viewport(self.renderer, self.screen.viewport);
        crate::scene::render_scene(&mut self.scene, &mut self.backend, self.renderer, self.screen.viewport);
        self.backend.present(self.renderer);
    }

    /// Release nodes, caches, renderer and window, in that order. Safe to
    /// call more than once.
    pub fn shutdown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        let removed = dispatch::clear(&mut self.scene, &mut self.backend);
        log::debug!("Released {removed} nodes");
        self.assets.clear(&mut self.backend);
        self.backend.destroy_renderer(self.renderer);
        self.backend.destroy_window(self.window);
        log::info!("Game shutdown complete");
    }

    /// Add a top-level node
    pub fn add_child(&mut self, node: Node) -> NodeId {
        self.scene.add_root(node)
    }

    /// Add a node under `parent`
    pub fn add_child_to(&mut self, parent: NodeId, node: Node) -> Result<NodeId, SceneError> {
        self.scene.add_child(parent, node)
    }

    /// Mark a node and its subtree for removal at the end of the frame
    pub fn destroy(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.scene.destroy(id)
    }

    /// The scene tree
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene tree
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Input state of the current frame
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Window and loop state
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// The backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable backend, e.g. to queue events on a headless backend
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Window handle
    pub fn window(&self) -> WindowHandle {
        self.window
    }

    /// Renderer handle
    pub fn renderer(&self) -> RendererHandle {
        self.renderer
    }

    /// Resize the window. Width, height and viewport take the resulting
    /// drawable size; the ratio to the requested size becomes the DPI scale
    /// applied to mouse coordinates.
    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        let (drawable_width, drawable_height) = self.backend.resize_window(self.window, width, height);

        let scale = |drawable: u32, requested: u32| {
            if requested == 0 {
                1.0
            } else {
                drawable as f32 / requested as f32
            }
        };
        let dpi_scale = Vec2::new(scale(drawable_width, width), scale(drawable_height, height));
        self.screen.dpi_scale = dpi_scale;
        self.input.set_dpi_scale(dpi_scale.x, dpi_scale.y);

        self.set_drawable_size(drawable_width, drawable_height);
        log::debug!(
            "Screen size {width}x{height}, drawable {drawable_width}x{drawable_height}"
        );
    }

    fn set_drawable_size(&mut self, width: u32, height: u32) {
        self.screen.width = width;
        self.screen.height = height;
        self.screen.viewport = Rect::new(0.0, 0.0, width as f32, height as f32);
    }

    /// Set the window title
    pub fn set_title(&mut self, title: &str) {
        self.backend.set_window_title(self.window, title);
    }

    /// Color frames are cleared to
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Change the clear color
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Drawable width in pixels
    pub fn width(&self) -> u32 {
        self.screen.width()
    }

    /// Drawable height in pixels
    pub fn height(&self) -> u32 {
        self.screen.height()
    }

    /// Region nodes are culled against
    pub fn viewport(&self) -> Rect {
        self.screen.viewport()
    }

    /// Whether the window has keyboard focus
    pub fn has_focus(&self) -> bool {
        self.screen.has_focus()
    }

    /// Render frame rate cap
    pub fn frame_rate(&self) -> Option<f64> {
        self.pacer.target_frame_rate()
    }

    /// Change the render frame rate cap; `None` renders every frame
    pub fn set_frame_rate(&mut self, frame_rate: Option<f64>) {
        self.pacer.set_target_frame_rate(frame_rate);
    }

    /// Rendered frames per second
    pub fn fps(&self) -> f64 {
        self.pacer.fps()
    }

    /// Length of one fixed tick in seconds
    pub fn fixed_time_step(&self) -> f64 {
        self.fixed_timestep.step()
    }

    /// Time carried over to the next fixed tick
    pub fn fixed_accumulator(&self) -> f64 {
        self.fixed_timestep.accumulator()
    }

    /// Stop the loop at the top of the next frame
    pub fn quit(&mut self) {
        self.screen.request_quit();
    }

    /// Whether quit has been requested
    pub fn is_quitting(&self) -> bool {
        self.state == LoopState::Quitting || self.screen.is_quit_requested()
    }

    /// Loop lifecycle state
    pub fn loop_state(&self) -> LoopState {
        self.state
    }

    /// Load a texture through the cache
    pub fn load_texture<'s>(&mut self, source: impl Into<AssetSource<'s>>) -> Result<Rc<Texture>, AssetError> {
        self.assets.load_texture(&mut self.backend, self.renderer, source.into())
    }

    /// Load a font through the cache
    pub fn load_font<'s>(
        &mut self,
        source: impl Into<AssetSource<'s>>,
        point_size: u32,
    ) -> Result<Rc<Font>, AssetError> {
        self.assets.load_font(&mut self.backend, source.into(), point_size)
    }

    /// Load a music track through the cache
    pub fn load_music<'s>(&mut self, source: impl Into<AssetSource<'s>>) -> Result<Rc<Sound>, AssetError> {
        self.assets.load_music(&mut self.backend, source.into())
    }

    /// Load a sound effect through the cache
    pub fn load_sfx<'s>(&mut self, source: impl Into<AssetSource<'s>>) -> Result<Rc<Sound>, AssetError> {
        self.assets.load_sfx(&mut self.backend, source.into())
    }

    /// Start a music track, looping until another one starts
    pub fn play_music(&mut self, music: &Sound) -> Result<(), BackendError> {
        self.play(music, SoundKind::Music)
    }

    /// Play a sound effect once
    pub fn play_sfx(&mut self, effect: &Sound) -> Result<(), BackendError> {
        self.play(effect, SoundKind::Effect)
    }

    fn play(&mut self, sound: &Sound, expected: SoundKind) -> Result<(), BackendError> {
        if sound.kind() != expected {
            return Err(BackendError::Audio(format!(
                "{:?} was loaded as {:?}, not {:?}",
                sound.handle(),
                sound.kind(),
                expected
            )));
        }
        self.assets.audio.play(&mut self.backend, sound)
    }

    /// Rasterize `text` on a text node
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), SceneError> {
        self.scene.node_mut(id)?.set_text(&mut self.backend, self.renderer, text)
    }

    /// Rasterize `text` on a text node, wrapping at its current width
    pub fn set_wrapped_text(&mut self, id: NodeId, text: &str) -> Result<(), SceneError> {
        self.scene
            .node_mut(id)?
            .set_wrapped_text(&mut self.backend, self.renderer, text)
    }
}

impl<B: Backend> Drop for Game<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Game errors
#[derive(Error, Debug)]
pub enum GameError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend failure, including window and renderer creation
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Asset loading failure
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Scene operation failure
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Error raised by gameplay code
    #[error("{0}")]
    Custom(String),
}
