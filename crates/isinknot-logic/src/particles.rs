//! Short-lived particle entities and the burst presets that emit them.
//!
//! A particle moves along a unit direction at a constant scalar speed. An
//! optional force is added to the direction every tick before it is
//! re-normalised, which bends the path without changing the speed. Particles
//! kill themselves once the host clock passes their expiry time.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clock::FrameInfo;
use crate::constants::layers;
use crate::context::GameContext;
use crate::entity::{Entity, EntityFlags};
use crate::surface::{Color, Surface};
use crate::vector::Vec2;

#[derive(Debug, Clone)]
pub struct Particle {
    flags: EntityFlags,
    pub position: Vec2,
    /// Unit direction of travel.
    pub direction: Vec2,
    /// px per second.
    pub speed: f32,
    pub force: Option<Vec2>,
    pub created_at: f64,
    pub expires_at: f64,
    pub radius: f32,
    pub color: Color,
}

impl Particle {
    pub fn new(position: Vec2, direction: Vec2, speed: f32, now: f64, lifetime_ms: f64) -> Self {
        Self {
            flags: EntityFlags::new(layers::PARTICLES),
            position,
            direction: direction.normalize(),
            speed,
            force: None,
            created_at: now,
            expires_at: now + lifetime_ms,
            radius: 3.0,
            color: Color::WHITE,
        }
    }

    pub fn with_force(mut self, force: Vec2) -> Self {
        self.force = Some(force);
        self
    }

    /// Fraction of the lifetime left at `now`, in [0, 1].
    pub fn life_left(&self, now: f64) -> f32 {
        let total = self.expires_at - self.created_at;
        if total <= 0.0 {
            return 0.0;
        }
        ((self.expires_at - now) / total).clamp(0.0, 1.0) as f32
    }
}

impl Entity for Particle {
    fn name(&self) -> &'static str {
        "Particle"
    }

    fn flags(&self) -> &EntityFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut EntityFlags {
        &mut self.flags
    }

    fn tick(&mut self, _ctx: &mut GameContext, dt: f64, now: f64) {
        if now > self.expires_at {
            self.kill();
            return;
        }
        if let Some(force) = self.force {
            self.direction = (self.direction + force).normalize();
        }
        self.position += self.direction * (self.speed * (dt / 1000.0) as f32);
    }

    fn render(&mut self, _ctx: &GameContext, surface: &mut dyn Surface, frame: &FrameInfo) {
        let color = self.color.with_alpha(self.color.a * self.life_left(frame.now));
        surface.fill_circle(self.position, self.radius, color);
    }
}

/// A burst of particles: how many, and the ranges their properties are
/// drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDef {
    pub count: usize,
    pub speed_min: f32,
    pub speed_max: f32,
    /// Centre of the emission cone, in radians (0 = +x, -PI/2 = up).
    pub angle: f32,
    /// Half-angle of the emission cone.
    pub spread: f32,
    pub lifetime_min_ms: f64,
    pub lifetime_max_ms: f64,
    pub radius: f32,
    pub color: Color,
    pub force: Option<Vec2>,
}

impl Default for EffectDef {
    fn default() -> Self {
        Self {
            count: 8,
            speed_min: 20.0,
            speed_max: 60.0,
            angle: -std::f32::consts::FRAC_PI_2,
            spread: std::f32::consts::PI,
            lifetime_min_ms: 300.0,
            lifetime_max_ms: 800.0,
            radius: 3.0,
            color: Color::WHITE,
            force: None,
        }
    }
}

impl EffectDef {
    /// Construction dust kicked up by a finished build.
    pub fn dust() -> Self {
        Self {
            count: 12,
            color: Color::rgba(0.6, 0.55, 0.5, 0.8),
            radius: 4.0,
            force: Some(Vec2::new(0.0, 0.05)),
            ..Default::default()
        }
    }

    /// Splinters from a module breaking.
    pub fn debris() -> Self {
        Self {
            count: 10,
            speed_min: 80.0,
            speed_max: 200.0,
            spread: 1.2,
            lifetime_min_ms: 400.0,
            lifetime_max_ms: 900.0,
            radius: 3.0,
            color: Color::rgb(0.45, 0.3, 0.15),
            force: Some(Vec2::new(0.0, 0.2)),
            ..Default::default()
        }
    }

    /// One puff from a working boiler's stack.
    pub fn smoke() -> Self {
        Self {
            count: 1,
            speed_min: 15.0,
            speed_max: 30.0,
            spread: 0.4,
            lifetime_min_ms: 1500.0,
            lifetime_max_ms: 2500.0,
            radius: 8.0,
            color: Color::rgba(0.3, 0.3, 0.3, 0.6),
            force: Some(Vec2::UP.scale(0.1)),
            ..Default::default()
        }
    }

    /// Glints over a freshly repaired module.
    pub fn sparkle() -> Self {
        Self {
            count: 6,
            speed_min: 10.0,
            speed_max: 40.0,
            lifetime_min_ms: 200.0,
            lifetime_max_ms: 500.0,
            radius: 2.0,
            color: Color::rgb(1.0, 1.0, 0.8),
            ..Default::default()
        }
    }

    /// Roll one particle from this definition.
    pub fn particle<R: Rng + ?Sized>(&self, rng: &mut R, origin: Vec2, now: f64) -> Particle {
        let angle = self.angle + roll(rng, -self.spread, self.spread);
        let speed = roll(rng, self.speed_min, self.speed_max);
        let lifetime = if self.lifetime_max_ms > self.lifetime_min_ms {
            rng.gen_range(self.lifetime_min_ms..self.lifetime_max_ms)
        } else {
            self.lifetime_min_ms
        };
        let mut particle = Particle::new(origin, Vec2::from_angle(angle), speed, now, lifetime);
        particle.force = self.force;
        particle.radius = self.radius;
        particle.color = self.color;
        particle
    }

    /// Spawn the whole burst into the session.
    pub fn emit(&self, ctx: &mut GameContext, origin: Vec2, now: f64) {
        for _ in 0..self.count {
            let particle = self.particle(&mut ctx.rng, origin, now);
            ctx.spawn(Box::new(particle));
        }
    }
}

fn roll<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use crate::entity::Registry;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ctx() -> GameContext {
        GameContext::new(Tuning::default(), 9, Vec2::new(1280.0, 720.0))
    }

    #[test]
    fn test_moves_along_direction() {
        let mut ctx = ctx();
        let mut p = Particle::new(Vec2::ZERO, Vec2::new(2.0, 0.0), 100.0, 0.0, 1000.0);
        p.tick(&mut ctx, 500.0, 500.0);
        assert_eq!(p.position, Vec2::new(50.0, 0.0));
        assert!(p.is_alive());
    }

    #[test]
    fn test_force_bends_but_keeps_unit_direction() {
        let mut ctx = ctx();
        let mut p = Particle::new(Vec2::ZERO, Vec2::new(1.0, 0.0), 10.0, 0.0, 1000.0)
            .with_force(Vec2::UP);
        p.tick(&mut ctx, 100.0, 100.0);
        assert!((p.direction.length() - 1.0).abs() < 1e-6);
        assert!(p.direction.y < 0.0);
        assert!(p.position.y < 0.0);
    }

    #[test]
    fn test_dies_after_expiry() {
        let mut ctx = ctx();
        let mut p = Particle::new(Vec2::ZERO, Vec2::UP, 10.0, 0.0, 300.0);
        p.tick(&mut ctx, 100.0, 300.0);
        assert!(p.is_alive());
        p.tick(&mut ctx, 100.0, 300.5);
        assert!(!p.is_alive());
    }

    #[test]
    fn test_life_left_fades() {
        let p = Particle::new(Vec2::ZERO, Vec2::UP, 10.0, 1000.0, 400.0);
        assert_eq!(p.life_left(1000.0), 1.0);
        assert_eq!(p.life_left(1200.0), 0.5);
        assert_eq!(p.life_left(5000.0), 0.0);
    }

    #[test]
    fn test_presets_respect_ranges() {
        let mut rng = StdRng::seed_from_u64(4);
        for def in [
            EffectDef::dust(),
            EffectDef::debris(),
            EffectDef::smoke(),
            EffectDef::sparkle(),
        ] {
            for _ in 0..50 {
                let p = def.particle(&mut rng, Vec2::new(10.0, 10.0), 0.0);
                assert!(p.speed >= def.speed_min && p.speed <= def.speed_max);
                let life = p.expires_at - p.created_at;
                assert!(life >= def.lifetime_min_ms && life <= def.lifetime_max_ms);
                assert!((p.direction.length() - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_burst_expires_out_of_registry() {
        let mut ctx = ctx();
        let mut registry = Registry::new();
        EffectDef::sparkle().emit(&mut ctx, Vec2::new(100.0, 100.0), 0.0);
        registry.tick_all(&mut ctx, 100.0, 0.0);
        assert_eq!(registry.count_named("Particle"), 6);

        registry.tick_all(&mut ctx, 100.0, 1000.0);
        assert_eq!(registry.count_named("Particle"), 0);
    }
}
