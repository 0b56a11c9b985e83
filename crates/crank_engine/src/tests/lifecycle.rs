use std::cell::{Cell, RefCell};
use std::rc::Rc;

use approx::assert_relative_eq;

use super::support::{headless_game, png_bytes};
use crate::backend::HeadlessBackend;
use crate::config::GameConfig;
use crate::foundation::math::{Color, Vec2};
use crate::scene::{Behavior, HookResult, Node, NodeContext, SpriteVisual};
use crate::{Game, LoopState};

type Log = Rc<RefCell<Vec<String>>>;

struct Lifecycle {
    name: &'static str,
    log: Log,
}

impl Lifecycle {
    fn node(name: &'static str, log: &Log) -> Node {
        Node::new().with_behavior(Self {
            name,
            log: Rc::clone(log),
        })
    }

    fn push(&self, event: &str) {
        self.log.borrow_mut().push(format!("{}:{event}", self.name));
    }
}

impl Behavior for Lifecycle {
    fn start(&mut self, _ctx: &mut NodeContext<'_>) -> HookResult {
        self.push("start");
        Ok(())
    }

    fn update(&mut self, _ctx: &mut NodeContext<'_>, _delta_time: f64) -> HookResult {
        self.push("update");
        Ok(())
    }

    fn fixed_update(&mut self, _ctx: &mut NodeContext<'_>, _fixed_delta_time: f64) -> HookResult {
        self.push("fixed");
        Ok(())
    }

    fn on_destroy(&mut self) {
        self.push("destroy");
    }
}

fn quarter_tick_game() -> Game<HeadlessBackend> {
    let config = GameConfig::default().with_frame_rate(None).with_fixed_time_step(0.25);
    Game::new(HeadlessBackend::new(), config).unwrap()
}

#[test]
fn test_fixed_ticks_follow_accumulated_time() {
    let ticks = Rc::new(Cell::new(0));
    let mut game = quarter_tick_game();
    let mut node = Node::new();
    let counter = Rc::clone(&ticks);
    node.on_fixed_update(move |_ctx, fixed_delta_time| {
        assert_relative_eq!(fixed_delta_time, 0.25);
        counter.set(counter.get() + 1);
        Ok(())
    });
    game.add_child(node);

    game.step(0.625).unwrap();
    assert_eq!(ticks.get(), 2);
    assert_relative_eq!(game.fixed_accumulator(), 0.125);

    game.step(0.125).unwrap();
    assert_eq!(ticks.get(), 3);
    assert_relative_eq!(game.fixed_accumulator(), 0.0);

    game.step(0.1).unwrap();
    assert_eq!(ticks.get(), 3);
}

#[test]
fn test_default_tick_counts_decimal_frame_times_exactly() {
    let ticks = Rc::new(Cell::new(0));
    let mut game = headless_game();
    let mut node = Node::new();
    let counter = Rc::clone(&ticks);
    node.on_fixed_update(move |_ctx, _fixed_delta_time| {
        counter.set(counter.get() + 1);
        Ok(())
    });
    game.add_child(node);
    assert_relative_eq!(game.fixed_time_step(), 0.02);

    for _ in 0..3 {
        game.step(0.1).unwrap();
    }
    assert_eq!(ticks.get(), 15);

    for _ in 0..10 {
        game.step(0.06).unwrap();
    }
    assert_eq!(ticks.get(), 45);
    assert_relative_eq!(game.fixed_accumulator(), 0.0);
}

#[test]
fn test_start_update_fixed_order_within_frame() {
    let log = Log::default();
    let mut game = quarter_tick_game();
    game.add_child(Lifecycle::node("a", &log));

    game.step(0.25).unwrap();
    game.step(0.1).unwrap();

    assert_eq!(*log.borrow(), vec!["a:start", "a:update", "a:fixed", "a:update"]);
}

#[test]
fn test_root_added_mid_update_waits_for_next_frame() {
    let log = Log::default();
    let mut game = quarter_tick_game();
    let mut spawner = Node::new();
    let mut pending = Some(Lifecycle::node("late", &log));
    spawner.on_update(move |ctx, _delta_time| {
        if let Some(node) = pending.take() {
            ctx.scene.add_root(node);
        }
        Ok(())
    });
    game.add_child(spawner);

    game.step(0.25).unwrap();
    assert!(log.borrow().is_empty());

    game.step(0.25).unwrap();
    assert_eq!(*log.borrow(), vec!["late:start", "late:update", "late:fixed"]);
}

#[test]
fn test_destroyed_subtree_survives_until_end_of_frame() {
    let log = Log::default();
    let mut game = quarter_tick_game();
    let parent = game.add_child(Lifecycle::node("parent", &log));
    let child = game
        .add_child_to(parent, Lifecycle::node("child", &log))
        .unwrap();

    let seen = Rc::new(Cell::new(false));
    let mut watcher = Node::new();
    let flag = Rc::clone(&seen);
    watcher.on_update(move |ctx, _delta_time| {
        flag.set(ctx.scene.contains(child));
        Ok(())
    });
    game.add_child(watcher);

    game.step(0.1).unwrap();
    log.borrow_mut().clear();

    game.destroy(parent).unwrap();
    game.step(0.1).unwrap();

    assert!(seen.get());
    assert!(!game.scene().contains(parent));
    assert!(!game.scene().contains(child));
    assert_eq!(
        *log.borrow(),
        vec!["parent:update", "child:update", "child:destroy", "parent:destroy"]
    );
}

#[test]
fn test_node_can_destroy_itself() {
    let mut game = headless_game();
    let mut node = Node::new();
    node.on_update(|ctx, _delta_time| {
        ctx.destroy()?;
        Ok(())
    });
    let id = game.add_child(node);

    game.step(0.016).unwrap();

    assert!(!game.scene().contains(id));
    assert!(game.scene().is_empty());
}

#[test]
fn test_behavior_quits_run_loop() {
    let frames = Rc::new(Cell::new(0));
    let mut game = headless_game();
    let mut node = Node::new();
    let counter = Rc::clone(&frames);
    node.on_update(move |ctx, _delta_time| {
        counter.set(counter.get() + 1);
        if counter.get() == 3 {
            ctx.quit();
        }
        Ok(())
    });
    game.add_child(node);

    game.run().unwrap();

    assert_eq!(frames.get(), 3);
    assert_eq!(game.loop_state(), LoopState::Quitting);
    assert!(game.scene().is_empty());
    assert_eq!(game.backend().live_windows(), 0);
}

#[test]
fn test_sprite_animation_advances_with_frames() {
    let png = png_bytes(64, 32);
    let mut game = headless_game();
    let texture = game.load_texture(png).unwrap();

    let mut sprite = SpriteVisual::new(texture);
    sprite.calculate_frames(64.0, 32.0, 2, 1, Vec2::zeros(), Vec2::zeros());
    sprite.set_frame_speed(0.25);
    sprite.play();
    let id = game.add_child(Node::sprite(sprite).with_position(10.0, 10.0));
    assert_eq!(game.scene().get(id).unwrap().rect().w, 32.0);

    game.step(0.125).unwrap();
    assert_eq!(frame_of(&mut game, id), 0);

    game.step(0.125).unwrap();
    assert_eq!(frame_of(&mut game, id), 1);

    game.step(0.25).unwrap();
    assert_eq!(frame_of(&mut game, id), 0);

    game.scene_mut().node_mut(id).unwrap().sprite_mut().unwrap().pause();
    game.step(0.25).unwrap();
    assert_eq!(frame_of(&mut game, id), 0);
}

fn frame_of(game: &mut Game<HeadlessBackend>, id: crate::scene::NodeId) -> usize {
    game.scene_mut()
        .node_mut(id)
        .ok()
        .and_then(|node| node.sprite_mut().map(|sprite| sprite.frame()))
        .unwrap()
}

#[test]
fn test_clear_color_is_configurable() {
    let mut game = headless_game();
    game.set_clear_color(Color::rgb(10, 20, 30));
    assert_eq!(game.clear_color(), Color::rgb(10, 20, 30));
}
