//! Pure game-logic functions.
//!
//! Every public function takes an immutable reference to the current
//! `GameState` (and, where needed, an RNG handle) and returns a brand-new
//! `GameState`. Side effects are limited to the injected RNG and trace events.

use rand::Rng;
use tracing::{debug, info};

use crate::collision::{overlap, Placed};
use crate::entities::{
    Drift, Entity, EntityKind, GameState, GameStatus, Ship, Side, MAX_ASTEROID, MAX_BOULDER,
    MAX_FRAGMENT, MAX_PLASMA,
};
use crate::framebuffer::{LCD_X, LCD_Y};
use crate::hal::{Buttons, ANALOG_MAX};
use crate::pool::Pool;
use crate::shapes;

// ── Playfield geometry ───────────────────────────────────────────────────────

pub const SHIELD_Y: i32 = 39;
pub const SHIP_START_X: i32 = 38;
pub const SHIP_Y: i32 = 46;
pub const SHIP_MAX_X: i32 = LCD_X - shapes::SHIP.width;
/// Distance from the turret pivot to its tip.
pub const TURRET_LENGTH: f64 = (SHIP_Y - SHIELD_Y - 2) as f64;
pub const MAX_TURRET_ANGLE: f64 = 60.0;
/// Row a turret tip is pinned to once it swings past a screen edge.
const PINNED_TIP_Y: f64 = (SHIELD_Y + 2) as f64;
/// Waves start fully above the screen.
const WAVE_Y: f64 = -8.0;

// ── Rules ────────────────────────────────────────────────────────────────────

pub const START_LIVES: i32 = 5;
/// Plasma travels this far per tick regardless of the speed setting.
pub const PLASMA_STEP: f64 = 2.0;
pub const FIRE_COOLDOWN: f64 = 0.2;
/// Asteroids stay frozen (and invisible) until this much time has elapsed.
pub const ASTEROID_GRACE: f64 = 2.0;
/// Children leave a broken rock within this many degrees of its heading.
const SPREAD: i32 = 30;

fn score_for(kind: EntityKind) -> i32 {
    match kind {
        EntityKind::Plasma => 0,
        EntityKind::Asteroid => 1,
        EntityKind::Boulder => 2,
        EntityKind::Fragment => 4,
    }
}

/// Inputs consumed by one simulation tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickInput {
    /// Button levels merged with any pending remote action.
    pub buttons: Buttons,
    /// A fresh turret angle, present only when its hold window allowed a read.
    pub aim: Option<f64>,
    /// A fresh speed scale, likewise.
    pub speed: Option<f64>,
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// The state shown behind the intro screen, before the first wave.
pub fn init_state() -> GameState {
    GameState {
        ship: Ship {
            x: SHIP_START_X,
            y: SHIP_Y,
            drift: Drift::Stopped,
        },
        plasmas: Pool::new(),
        asteroids: Pool::new(),
        boulders: Pool::new(),
        fragments: Pool::new(),
        score: 0,
        lives: START_LIVES,
        elapsed: 0.0,
        paused: true,
        speed_scale: 1.0,
        turret_angle: 0.0,
        last_shot: 0.0,
        status: GameStatus::Intro,
        waves: 0,
        wave_side: None,
    }
}

/// Leave the intro: first wave on screen, paused until the player is ready.
pub fn start_game(state: &GameState, rng: &mut impl Rng) -> GameState {
    let mut next = GameState {
        status: GameStatus::Playing,
        paused: true,
        ..state.clone()
    };
    spawn_wave_into(&mut next, rng);
    next
}

/// Fresh game, paused. Only the turret aim survives.
pub fn restart(state: &GameState) -> GameState {
    GameState {
        turret_angle: state.turret_angle,
        status: GameStatus::Playing,
        ..init_state()
    }
}

// ── Analog mapping ───────────────────────────────────────────────────────────

/// Map a 10-bit pot reading onto `-60..=60` degrees.
pub fn turret_angle_from_raw(raw: u16) -> f64 {
    ((f64::from(raw) / 8.5).round() - 60.0).clamp(-MAX_TURRET_ANGLE, MAX_TURRET_ANGLE)
}

/// Map a 10-bit pot reading onto `0..=1`.
pub fn speed_from_raw(raw: u16) -> f64 {
    f64::from(raw.min(ANALOG_MAX)) / f64::from(ANALOG_MAX)
}

// ── Geometry ─────────────────────────────────────────────────────────────────

/// The tip of the turret for a ship and an aim in degrees.
///
/// A tip that would leave the screen sideways is pinned to the edge column
/// just above the shield.
pub fn turret_tip(ship: &Ship, angle: f64) -> (f64, f64) {
    let theta = angle.to_radians();
    let x = f64::from(ship.x + 2) + TURRET_LENGTH * theta.sin();
    let y = f64::from(ship.y) - TURRET_LENGTH * theta.cos();
    if x < 0.0 {
        (0.0, PINNED_TIP_Y)
    } else if x > f64::from(LCD_X) {
        (f64::from(LCD_X - 1), PINNED_TIP_Y)
    } else {
        (x, y)
    }
}

fn placed(kind: EntityKind, entity: &Entity) -> Placed {
    Placed::new(kind.stencil(), entity.x as i32, entity.y as i32)
}

/// Below the screen. Nothing comes back from here.
fn fell_off(e: &Entity) -> bool {
    e.y >= f64::from(LCD_Y)
}

fn touches_shield(kind: EntityKind, e: &Entity) -> bool {
    let right = f64::from(LCD_X - kind.stencil().width);
    let shield = f64::from(SHIELD_Y);
    match kind {
        EntityKind::Plasma => false,
        EntityKind::Asteroid => e.y + 7.0 >= shield && e.x >= 0.0 && e.x <= right,
        EntityKind::Boulder => e.y > shield - 4.0 && e.x >= 0.0 && e.x <= right,
        EntityKind::Fragment => e.y > shield - 2.0 && e.x >= 0.0 && e.x <= right,
    }
}

// ── Spawning ─────────────────────────────────────────────────────────────────

fn spread(rng: &mut impl Rng) -> f64 {
    f64::from(rng.gen_range(-SPREAD..=SPREAD))
}

fn spawn_wave_into(state: &mut GameState, rng: &mut impl Rng) {
    let width = shapes::ASTEROID.width;
    let xs = loop {
        let xs: [i32; MAX_ASTEROID] = std::array::from_fn(|_| rng.gen_range(0..LCD_X - width));
        let at = |x: i32| Placed::new(shapes::ASTEROID, x, WAVE_Y as i32);
        let clear = (0..xs.len())
            .all(|i| (i + 1..xs.len()).all(|j| !overlap(at(xs[i]), at(xs[j]))));
        if clear {
            break xs;
        }
    };

    let left = xs.iter().filter(|&&x| x + 4 < LCD_X / 2).count();
    let side = if left * 2 > xs.len() {
        Side::Left
    } else {
        Side::Right
    };
    for x in xs {
        state.asteroids.spawn(Entity::new(f64::from(x), WAVE_Y, 0.0));
    }
    state.waves += 1;
    state.wave_side = Some(side);
    debug!(wave = state.waves, ?side, ?xs, "asteroid wave spawned");
}

fn spawn_boulders_into(pool: &mut Pool<MAX_BOULDER>, parent: &Entity, rng: &mut impl Rng) {
    // The pair sits two pixels apart, so clamp the left one far enough in
    // that both stay on screen.
    let max_x = f64::from(LCD_X - shapes::BOULDER.width - 2);
    let x = (parent.x + 1.0).clamp(0.0, max_x);
    for offset in [0.0, 2.0] {
        pool.spawn(Entity::new(x + offset, parent.y, spread(rng)));
    }
}

fn spawn_fragments_into(pool: &mut Pool<MAX_FRAGMENT>, parent: &Entity, rng: &mut impl Rng) {
    let x = parent.x.clamp(3.0, f64::from(LCD_X - 10));
    for offset in [-3.0, 5.0] {
        pool.spawn(Entity::new(x + offset, parent.y, parent.angle + spread(rng)));
    }
}

/// Spawn a fresh wave of asteroids above the screen.
pub fn spawn_wave(state: &GameState, rng: &mut impl Rng) -> GameState {
    let mut next = state.clone();
    spawn_wave_into(&mut next, rng);
    next
}

/// Break `parent` into two boulders.
pub fn spawn_boulders(state: &GameState, parent: &Entity, rng: &mut impl Rng) -> GameState {
    let mut next = state.clone();
    spawn_boulders_into(&mut next.boulders, parent, rng);
    next
}

/// Break `parent` into two fragments.
pub fn spawn_fragments(state: &GameState, parent: &Entity, rng: &mut impl Rng) -> GameState {
    let mut next = state.clone();
    spawn_fragments_into(&mut next.fragments, parent, rng);
    next
}

/// Drop an entity of `kind` at a pixel position, pulled back inside the
/// playfield above the shield. `None` when that pool is already full.
pub fn place(state: &GameState, kind: EntityKind, x: i32, y: i32) -> Option<GameState> {
    let stencil = kind.stencil();
    let x = f64::from(x.clamp(0, LCD_X - stencil.width));
    let y = f64::from(y.min(SHIELD_Y - stencil.height - 1));
    let entity = Entity::new(x, y, 0.0);

    let mut next = state.clone();
    let spawned = match kind {
        EntityKind::Plasma => next.plasmas.spawn(entity),
        EntityKind::Asteroid => next.asteroids.spawn(entity),
        EntityKind::Boulder => next.boulders.spawn(entity),
        EntityKind::Fragment => next.fragments.spawn(entity),
    };
    spawned.then_some(next)
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

pub fn toggle_pause(state: &GameState) -> GameState {
    GameState {
        paused: !state.paused,
        ..state.clone()
    }
}

/// Launch a bolt from the turret tip, subject to pause, pool space and the
/// fire cooldown.
pub fn fire(state: &GameState) -> GameState {
    let mut next = state.clone();
    fire_into(&mut next);
    next
}

fn fire_into(state: &mut GameState) {
    if state.paused || state.plasmas.is_full() || state.elapsed - state.last_shot < FIRE_COOLDOWN {
        return;
    }
    let (tip_x, tip_y) = turret_tip(&state.ship, state.turret_angle);
    let theta = state.turret_angle.to_radians();
    state.plasmas.spawn(Entity::new(
        tip_x + PLASMA_STEP * theta.sin(),
        tip_y - PLASMA_STEP * theta.cos(),
        state.turret_angle,
    ));
    state.last_shot = state.elapsed;
}

/// Slide the ship one pixel along its drift, then let the joystick change the
/// drift. Pushing against the drift stops it.
pub fn move_ship(state: &GameState, buttons: Buttons) -> GameState {
    let mut next = state.clone();
    move_ship_into(&mut next, buttons);
    next
}

fn move_ship_into(state: &mut GameState, buttons: Buttons) {
    let (tip_x, _) = turret_tip(&state.ship, state.turret_angle);
    let ship = &mut state.ship;
    if !state.paused {
        match ship.drift {
            Drift::Left if ship.x > 0 && tip_x >= 1.0 => ship.x -= 1,
            Drift::Right if ship.x < SHIP_MAX_X && tip_x <= f64::from(LCD_X - 2) => ship.x += 1,
            _ => {}
        }
    }

    let left = buttons.contains(Buttons::SHIP_LEFT);
    let right = buttons.contains(Buttons::SHIP_RIGHT);
    ship.drift = match ship.drift {
        Drift::Right if left => Drift::Stopped,
        Drift::Left if right => Drift::Stopped,
        _ if left => Drift::Left,
        _ if right => Drift::Right,
        drift => drift,
    };
}

// ── Per-pool updates ─────────────────────────────────────────────────────────

/// Destroy the first live target each live bolt overlaps. Both die; `on_hit`
/// sees the target before it is marked. Returns the number of hits.
fn resolve_hits<const N: usize>(
    plasmas: &mut Pool<MAX_PLASMA>,
    targets: &mut Pool<N>,
    kind: EntityKind,
    mut on_hit: impl FnMut(&Entity),
) -> i32 {
    let mut hits = 0;
    for p in 0..plasmas.len() {
        let Some(&bolt) = plasmas.get(p) else {
            continue;
        };
        if !bolt.alive {
            continue;
        }
        let shot = placed(EntityKind::Plasma, &bolt);
        for t in 0..targets.len() {
            let Some(&target) = targets.get(t) else {
                continue;
            };
            if target.alive && overlap(placed(kind, &target), shot) {
                on_hit(&target);
                targets.kill(t);
                plasmas.kill(p);
                hits += 1;
                break;
            }
        }
    }
    hits
}

fn update_plasmas(pool: &mut Pool<MAX_PLASMA>, paused: bool) {
    for bolt in pool.iter_mut().filter(|e| e.alive) {
        if !paused {
            let theta = bolt.angle.to_radians();
            bolt.x += PLASMA_STEP * theta.sin();
            bolt.y -= PLASMA_STEP * theta.cos();
        }
        if bolt.x > f64::from(LCD_X) || bolt.x < 0.0 || bolt.y < 0.0 || bolt.y >= f64::from(LCD_Y) {
            bolt.alive = false;
        }
    }
}

/// Asteroids fall straight down. Returns the shield life lost.
fn update_asteroids(pool: &mut Pool<MAX_ASTEROID>, paused: bool, speed: f64) -> i32 {
    let mut lost = 0;
    for rock in pool.iter_mut().filter(|e| e.alive) {
        if !paused {
            rock.y += speed;
        }
        if touches_shield(EntityKind::Asteroid, rock) {
            rock.alive = false;
            lost += 1;
        } else if fell_off(rock) {
            rock.alive = false;
        }
    }
    lost
}

/// Boulders and fragments fly along their heading and bounce off the side
/// walls. Returns the shield life lost.
fn update_debris<const N: usize>(pool: &mut Pool<N>, kind: EntityKind, paused: bool, speed: f64) -> i32 {
    let right = f64::from(LCD_X - kind.stencil().width);
    let mut lost = 0;
    for rock in pool.iter_mut().filter(|e| e.alive) {
        if !paused {
            let theta = rock.angle.to_radians();
            rock.x += speed * theta.sin();
            rock.y += speed * theta.cos();
        }
        if rock.x < 1.0 || rock.x > right {
            rock.angle = -rock.angle;
        }
        if touches_shield(kind, rock) {
            rock.alive = false;
            lost += 1;
        } else if fell_off(rock) {
            rock.alive = false;
        }
    }
    lost
}

// ── Per-frame tick (nearly pure, RNG is injected) ───────────────────────────

/// Advance a game in progress by one tick. All randomness comes through `rng`
/// so callers control determinism. Anything but `Playing` is returned as is.
pub fn tick(state: &GameState, input: &TickInput, rng: &mut impl Rng) -> GameState {
    if state.status != GameStatus::Playing {
        return state.clone();
    }
    let mut next = state.clone();

    // ── 1. Plasma against rocks, largest first ───────────────────────────────
    let GameState {
        plasmas,
        asteroids,
        boulders,
        fragments,
        ..
    } = &mut next;
    let asteroid_hits = resolve_hits(plasmas, asteroids, EntityKind::Asteroid, |a| {
        spawn_boulders_into(boulders, a, rng)
    });
    let boulder_hits = resolve_hits(plasmas, boulders, EntityKind::Boulder, |b| {
        spawn_fragments_into(fragments, b, rng)
    });
    let fragment_hits = resolve_hits(plasmas, fragments, EntityKind::Fragment, |_| {});
    next.score += asteroid_hits * score_for(EntityKind::Asteroid)
        + boulder_hits * score_for(EntityKind::Boulder)
        + fragment_hits * score_for(EntityKind::Fragment);

    // ── 2. Move, bounce, shield contact, compact ─────────────────────────────
    let paused = next.paused;
    let speed = next.speed_scale;
    update_plasmas(&mut next.plasmas, paused);
    next.plasmas.compact();

    let mut lost = 0;
    if next.elapsed >= ASTEROID_GRACE {
        lost += update_asteroids(&mut next.asteroids, paused, speed);
    }
    next.asteroids.compact();
    lost += update_debris(&mut next.boulders, EntityKind::Boulder, paused, speed);
    next.boulders.compact();
    lost += update_debris(&mut next.fragments, EntityKind::Fragment, paused, speed);
    next.fragments.compact();
    if lost > 0 {
        debug!(lost, lives = next.lives - lost, "shield hit");
    }
    next.lives -= lost;

    // ── 3. Refill once the sky is clear ──────────────────────────────────────
    if next.asteroids.is_empty() && next.boulders.is_empty() && next.fragments.is_empty() {
        spawn_wave_into(&mut next, rng);
    }

    // ── 4. Ship, turret, plasma ──────────────────────────────────────────────
    move_ship_into(&mut next, input.buttons);
    if let Some(aim) = input.aim {
        next.turret_angle = aim;
    }
    if let Some(speed) = input.speed {
        next.speed_scale = speed;
    }
    if input.buttons.contains(Buttons::FIRE) {
        fire_into(&mut next);
    }

    // ── 5. Shield depletion ──────────────────────────────────────────────────
    if next.lives <= 0 {
        next.status = GameStatus::GameOver;
        info!(score = next.score, elapsed = next.elapsed, "shield depleted, game over");
    }

    next
}
