//! Ship module kinds, their static descriptors, and the per-module
//! damage / flood state machine.
//!
//! Each grid slot holds one [`ShipModule`]. Per-kind data (weight, fragility,
//! build time, sprite...) lives in a static [`ModuleDescriptor`] table looked
//! up through [`ModuleKind::descriptor`]; per-slot data (damage, flood,
//! neighbour links) lives on the module itself.

use std::ops::{Add, AddAssign};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::Tuning;
use crate::constants::MODULE_HEIGHT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ModuleKind {
    Empty = 0,
    Construction = 1,
    Hull = 2,
    Sail = 3,
    Boiler = 4,
    Propeller = 5,
    FinSail = 6,
    Balloon = 7,
    Castle = 8,
    SmokeStack = 9,
    Support = 10,
}

/// Static, per-kind module data.
#[derive(Debug, Clone, Copy)]
pub struct ModuleDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    /// Sprite name in the ship sheet, if the kind has art.
    pub sprite: Option<&'static str>,
    /// Other modules may anchor against a solid module. Solid kinds may not
    /// occupy the outermost columns.
    pub solid: bool,
    pub weight: f32,
    /// Relative likelihood of accruing damage. Zero means indestructible.
    pub fragility: f32,
    pub max_health: f32,
    /// Lift of a fully submerged, dry hull.
    pub buoyancy_capacity: f32,
    /// Propulsion at full efficiency.
    pub speed: f32,
    /// Lift independent of submersion (balloons).
    pub lift: f32,
    pub build_time_ms: f64,
    /// Drawn in the second ship pass, in front of every base sprite.
    pub late_render: bool,
}

const fn descriptor(name: &'static str, description: &'static str) -> ModuleDescriptor {
    ModuleDescriptor {
        name,
        description,
        sprite: None,
        solid: false,
        weight: 0.0,
        fragility: 0.0,
        max_health: 100.0,
        buoyancy_capacity: 0.0,
        speed: 0.0,
        lift: 0.0,
        build_time_ms: 1000.0,
        late_render: false,
    }
}

static DESCRIPTORS: [ModuleDescriptor; 11] = [
    descriptor("Empty", "Open water and sky."),
    descriptor("Construction", "Work in progress."),
    ModuleDescriptor {
        sprite: Some("hull"),
        solid: true,
        weight: 10.0,
        fragility: 1.0,
        buoyancy_capacity: MODULE_HEIGHT,
        build_time_ms: 2000.0,
        late_render: true,
        ..descriptor("Hull", "Keeps the water out. Floods when broken.")
    },
    ModuleDescriptor {
        sprite: Some("sail"),
        weight: 5.0,
        fragility: 0.5,
        speed: 1.0,
        build_time_ms: 1500.0,
        ..descriptor("Sail", "Catches the wind. Must stand on a hull.")
    },
    ModuleDescriptor {
        sprite: Some("boiler"),
        solid: true,
        weight: 15.0,
        fragility: 1.5,
        speed: 2.0,
        build_time_ms: 3000.0,
        ..descriptor("Boiler", "Strong propulsion once a smoke stack is fitted above.")
    },
    ModuleDescriptor {
        sprite: Some("propeller"),
        weight: 8.0,
        fragility: 0.8,
        speed: 1.5,
        build_time_ms: 2000.0,
        ..descriptor("Propeller", "Bolted to the side of a bottom hull. Works in water.")
    },
    ModuleDescriptor {
        sprite: Some("fin_sail"),
        weight: 3.0,
        fragility: 0.6,
        speed: 0.5,
        build_time_ms: 1500.0,
        ..descriptor("Fin Sail", "A small sail hung off the side of a solid module.")
    },
    ModuleDescriptor {
        sprite: Some("balloon"),
        weight: 2.0,
        fragility: 0.7,
        lift: 15.0,
        build_time_ms: 2000.0,
        late_render: true,
        ..descriptor("Balloon", "Lifts the ship a little. Fragile.")
    },
    ModuleDescriptor {
        sprite: Some("castle"),
        solid: true,
        weight: 20.0,
        fragility: 0.3,
        max_health: 200.0,
        build_time_ms: 3000.0,
        ..descriptor("Castle", "Heavy and sturdy. Something to build on.")
    },
    ModuleDescriptor {
        sprite: Some("smoke_stack"),
        weight: 3.0,
        fragility: 0.4,
        build_time_ms: 1000.0,
        ..descriptor("Smoke Stack", "Vents a boiler below it.")
    },
    ModuleDescriptor {
        sprite: Some("support"),
        solid: true,
        weight: 4.0,
        fragility: 0.2,
        build_time_ms: 1000.0,
        ..descriptor("Support", "Braces its neighbours against damage.")
    },
];

impl ModuleKind {
    pub fn descriptor(self) -> &'static ModuleDescriptor {
        &DESCRIPTORS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Kinds the player can pick from a build menu, in menu order.
    pub fn buildable() -> &'static [ModuleKind] {
        &[
            Self::Hull,
            Self::Sail,
            Self::Boiler,
            Self::SmokeStack,
            Self::Propeller,
            Self::FinSail,
            Self::Balloon,
            Self::Castle,
            Self::Support,
        ]
    }

    pub fn all() -> &'static [ModuleKind] {
        &[
            Self::Empty,
            Self::Construction,
            Self::Hull,
            Self::Sail,
            Self::Boiler,
            Self::Propeller,
            Self::FinSail,
            Self::Balloon,
            Self::Castle,
            Self::SmokeStack,
            Self::Support,
        ]
    }

    pub fn is_placeholder(self) -> bool {
        matches!(self, Self::Empty | Self::Construction)
    }

    pub fn is_damageable(self) -> bool {
        !self.is_placeholder() && self.descriptor().fragility > 0.0
    }
}

/// Damage tiers. Transitions only run Normal → Damaged → Broken → Normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Normal,
    Damaged,
    Broken,
}

impl Condition {
    /// Share of propulsion or lift a module still delivers.
    pub fn efficiency(self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::Damaged => 0.5,
            Self::Broken => 0.0,
        }
    }
}

/// A condition change reported by a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleEvent {
    Damaged,
    Broken,
    Fixed,
}

/// Additive contributions of one module (or the whole ship).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModuleStats {
    pub weight: f32,
    pub speed: f32,
    pub buoyancy: f32,
}

impl Add for ModuleStats {
    type Output = ModuleStats;
    fn add(self, rhs: ModuleStats) -> ModuleStats {
        ModuleStats {
            weight: self.weight + rhs.weight,
            speed: self.speed + rhs.speed,
            buoyancy: self.buoyancy + rhs.buoyancy,
        }
    }
}

impl AddAssign for ModuleStats {
    fn add_assign(&mut self, rhs: ModuleStats) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for ModuleStats {
    fn sum<I: Iterator<Item = ModuleStats>>(iter: I) -> Self {
        iter.fold(ModuleStats::default(), |acc, s| acc + s)
    }
}

/// Neighbour-derived fields, rebuilt by the ship whenever an adjacent slot changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Links {
    pub hull_left: bool,
    pub hull_right: bool,
    pub hull_above: bool,
    pub hull_below: bool,
    pub smoke_stack_above: bool,
    /// Support modules in the 4-neighbourhood.
    pub supports: u8,
}

/// Inputs for one module tick.
#[derive(Debug, Clone, Copy)]
pub struct TickEnv<'a> {
    pub draught: f32,
    pub difficulty: f32,
    pub dt_ms: f64,
    pub tuning: &'a Tuning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShipModule {
    pub kind: ModuleKind,
    pub x: usize,
    pub y: usize,
    pub damage: f32,
    pub condition: Condition,
    /// A repair action is in flight for this module.
    pub repairing: bool,
    /// Water inside a hull, at most its buoyancy capacity.
    pub flood: f32,
    pub links: Links,
}

impl ShipModule {
    pub fn new(kind: ModuleKind, x: usize, y: usize) -> Self {
        Self {
            kind,
            x,
            y,
            damage: 0.0,
            condition: Condition::Normal,
            repairing: false,
            flood: 0.0,
            links: Links::default(),
        }
    }

    pub fn empty(x: usize, y: usize) -> Self {
        Self::new(ModuleKind::Empty, x, y)
    }

    pub fn descriptor(&self) -> &'static ModuleDescriptor {
        self.kind.descriptor()
    }

    pub fn is_empty(&self) -> bool {
        self.kind == ModuleKind::Empty
    }

    pub fn is_solid(&self) -> bool {
        self.descriptor().solid
    }

    /// Fraction of this module's height below the draught line, in [0, 1].
    pub fn percent_submerged(&self, draught: f32) -> f32 {
        let bottom = self.y as f32 * MODULE_HEIGHT;
        ((draught - bottom) / MODULE_HEIGHT).clamp(0.0, 1.0)
    }

    /// Fragility after bracing from adjacent supports.
    pub fn effective_fragility(&self, tuning: &Tuning) -> f32 {
        self.descriptor().fragility * tuning.support_factor.powi(self.links.supports as i32)
    }

    /// Hull lift: `capacity * pct - flood`, zero when out of the water.
    pub fn hull_buoyancy(&self, draught: f32) -> f32 {
        let pct = self.percent_submerged(draught);
        if pct <= 0.0 {
            return 0.0;
        }
        self.descriptor().buoyancy_capacity * pct - self.flood
    }

    pub fn stats(&self, draught: f32) -> ModuleStats {
        let d = self.descriptor();
        let mut stats = ModuleStats {
            weight: d.weight,
            ..Default::default()
        };

        if self.kind == ModuleKind::Hull {
            stats.buoyancy = self.hull_buoyancy(draught);
            return stats;
        }

        let pct = self.percent_submerged(draught);
        if pct >= 1.0 {
            return stats;
        }

        let efficiency = self.condition.efficiency();
        match self.kind {
            ModuleKind::Sail | ModuleKind::FinSail => stats.speed = d.speed * efficiency,
            ModuleKind::Boiler if self.links.smoke_stack_above => {
                stats.speed = d.speed * efficiency
            }
            ModuleKind::Propeller if pct > 0.0 => stats.speed = d.speed * efficiency,
            ModuleKind::Balloon => stats.buoyancy = d.lift * efficiency,
            _ => {}
        }
        stats
    }

    /// Add damage (capped at max health) and take at most one step along
    /// Normal → Damaged → Broken.
    pub fn apply_damage(&mut self, amount: f32, tuning: &Tuning) -> Option<ModuleEvent> {
        if !self.kind.is_damageable() {
            return None;
        }
        let max = self.descriptor().max_health;
        self.damage = (self.damage + amount.max(0.0)).min(max);

        match self.condition {
            Condition::Normal if self.damage >= max * tuning.damaged_fraction => {
                self.condition = Condition::Damaged;
                Some(ModuleEvent::Damaged)
            }
            Condition::Damaged if self.damage >= max => {
                self.condition = Condition::Broken;
                Some(ModuleEvent::Broken)
            }
            _ => None,
        }
    }

    /// Advance damage accrual and hull flooding by one tick.
    pub fn tick<R: Rng + ?Sized>(&mut self, env: &TickEnv<'_>, rng: &mut R) -> Option<ModuleEvent> {
        if !self.kind.is_damageable() {
            return None;
        }
        let dt_secs = (env.dt_ms / 1000.0) as f32;
        let pct = self.percent_submerged(env.draught);
        let is_hull = self.kind == ModuleKind::Hull;

        let mut event = None;
        // Fully submerged modules are out of reach of the weather; hulls only
        // take damage from the water they sit in.
        if pct < 1.0 && !self.repairing && (!is_hull || pct > 0.0) {
            let roll: f32 = rng.gen();
            let amount = roll
                * self.effective_fragility(env.tuning)
                * env.difficulty
                * env.tuning.damage_rate
                * dt_secs;
            event = self.apply_damage(amount, env.tuning);
        }

        if is_hull && self.condition == Condition::Broken && pct > 0.0 {
            let capacity = self.descriptor().buoyancy_capacity;
            self.flood = (self.flood + env.tuning.hull_flood_rate * dt_secs).min(capacity);
        }

        event
    }

    /// Only broken modules can be repaired, one repair at a time.
    pub fn can_start_repair(&self) -> bool {
        self.condition == Condition::Broken && !self.repairing
    }

    pub fn start_repair(&mut self) -> bool {
        if !self.can_start_repair() {
            return false;
        }
        self.repairing = true;
        true
    }

    /// Finish a repair: damage and flood reset, condition back to normal.
    pub fn repair(&mut self) -> Option<ModuleEvent> {
        self.repairing = false;
        if self.condition != Condition::Broken {
            return None;
        }
        self.damage = 0.0;
        self.flood = 0.0;
        self.condition = Condition::Normal;
        Some(ModuleEvent::Fixed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn env(tuning: &Tuning, draught: f32) -> TickEnv<'_> {
        TickEnv {
            draught,
            difficulty: 1.0,
            dt_ms: 100.0,
            tuning,
        }
    }

    #[test]
    fn test_descriptor_table_matches_kinds() {
        for kind in ModuleKind::all() {
            // Table order must follow the discriminants.
            assert_eq!(DESCRIPTORS[*kind as usize].name, kind.name());
        }
        assert_eq!(ModuleKind::all().len(), DESCRIPTORS.len());
    }

    #[test]
    fn test_buildable_excludes_placeholders() {
        for kind in ModuleKind::buildable() {
            assert!(!kind.is_placeholder(), "{:?}", kind);
            assert!(kind.descriptor().build_time_ms > 0.0);
        }
    }

    #[test]
    fn test_placeholders_weigh_nothing() {
        assert_eq!(ModuleKind::Empty.descriptor().weight, 0.0);
        assert_eq!(ModuleKind::Construction.descriptor().weight, 0.0);
        assert!(!ModuleKind::Construction.descriptor().solid);
    }

    #[test]
    fn test_percent_submerged() {
        let bottom = ShipModule::new(ModuleKind::Hull, 2, 0);
        assert_eq!(bottom.percent_submerged(0.0), 0.0);
        assert_eq!(bottom.percent_submerged(64.0), 0.5);
        assert_eq!(bottom.percent_submerged(500.0), 1.0);

        let upper = ShipModule::new(ModuleKind::Sail, 2, 1);
        assert_eq!(upper.percent_submerged(100.0), 0.0);
        assert_eq!(upper.percent_submerged(192.0), 0.5);
    }

    #[test]
    fn test_hull_buoyancy_zero_out_of_water() {
        let mut hull = ShipModule::new(ModuleKind::Hull, 2, 1);
        assert_eq!(hull.hull_buoyancy(50.0), 0.0);
        hull.flood = 30.0;
        assert_eq!(hull.hull_buoyancy(50.0), 0.0);
    }

    #[test]
    fn test_hull_buoyancy_non_positive_when_flooded() {
        let mut hull = ShipModule::new(ModuleKind::Hull, 2, 0);
        assert_eq!(hull.hull_buoyancy(10.0), 10.0);
        hull.flood = 10.0;
        assert_eq!(hull.hull_buoyancy(10.0), 0.0);
        hull.flood = 12.0;
        assert!(hull.hull_buoyancy(10.0) <= 0.0);
    }

    #[test]
    fn test_sail_efficiency_by_condition() {
        let tuning = Tuning::default();
        let mut sail = ShipModule::new(ModuleKind::Sail, 2, 1);
        assert_eq!(sail.stats(10.0).speed, 1.0);
        sail.apply_damage(50.0, &tuning);
        assert_eq!(sail.condition, Condition::Damaged);
        assert_eq!(sail.stats(10.0).speed, 0.5);
        sail.apply_damage(50.0, &tuning);
        assert_eq!(sail.condition, Condition::Broken);
        assert_eq!(sail.stats(10.0).speed, 0.0);
        assert_eq!(sail.stats(10.0).weight, 5.0);
    }

    #[test]
    fn test_submerged_sail_only_weighs() {
        let sail = ShipModule::new(ModuleKind::Sail, 2, 1);
        let stats = sail.stats(300.0);
        assert_eq!(stats.speed, 0.0);
        assert_eq!(stats.weight, 5.0);
    }

    #[test]
    fn test_boiler_needs_smoke_stack() {
        let mut boiler = ShipModule::new(ModuleKind::Boiler, 2, 1);
        assert_eq!(boiler.stats(10.0).speed, 0.0);
        boiler.links.smoke_stack_above = true;
        assert_eq!(boiler.stats(10.0).speed, 2.0);
    }

    #[test]
    fn test_propeller_needs_water() {
        let prop = ShipModule::new(ModuleKind::Propeller, 1, 0);
        assert_eq!(prop.stats(0.0).speed, 0.0);
        assert_eq!(prop.stats(10.0).speed, 1.5);
    }

    #[test]
    fn test_one_transition_per_step() {
        let tuning = Tuning::default();
        let mut hull = ShipModule::new(ModuleKind::Hull, 2, 0);
        // Enough damage to break outright still only reaches Damaged first.
        assert_eq!(hull.apply_damage(1000.0, &tuning), Some(ModuleEvent::Damaged));
        assert_eq!(hull.condition, Condition::Damaged);
        assert_eq!(hull.damage, 100.0);
        assert_eq!(hull.apply_damage(0.0, &tuning), Some(ModuleEvent::Broken));
        assert_eq!(hull.apply_damage(0.0, &tuning), None);
    }

    #[test]
    fn test_damage_monotonic_under_seeded_rng() {
        let tuning = Tuning::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut hull = ShipModule::new(ModuleKind::Hull, 2, 0);
        let env = env(&tuning, 10.0);
        let mut previous = hull.damage;
        let mut seen = vec![hull.condition];
        // Upper bound on damage per tick at fragility 1, difficulty 1.
        let bound = tuning.damage_rate * 0.1;

        for _ in 0..2000 {
            hull.tick(&env, &mut rng);
            assert!(hull.damage >= previous);
            assert!(hull.damage - previous <= bound + 1e-4);
            previous = hull.damage;
            if *seen.last().unwrap() != hull.condition {
                seen.push(hull.condition);
            }
        }
        assert_eq!(
            seen,
            vec![Condition::Normal, Condition::Damaged, Condition::Broken]
        );
    }

    #[test]
    fn test_dry_hull_takes_no_damage() {
        let tuning = Tuning::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut hull = ShipModule::new(ModuleKind::Hull, 2, 1);
        for _ in 0..100 {
            hull.tick(&env(&tuning, 10.0), &mut rng);
        }
        assert_eq!(hull.damage, 0.0);
    }

    #[test]
    fn test_submerged_module_takes_no_damage() {
        let tuning = Tuning::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut sail = ShipModule::new(ModuleKind::Sail, 2, 1);
        for _ in 0..100 {
            sail.tick(&env(&tuning, 400.0), &mut rng);
        }
        assert_eq!(sail.damage, 0.0);
    }

    #[test]
    fn test_supports_reduce_fragility() {
        let tuning = Tuning::default();
        let mut hull = ShipModule::new(ModuleKind::Hull, 2, 0);
        assert_eq!(hull.effective_fragility(&tuning), 1.0);
        hull.links.supports = 2;
        assert_eq!(hull.effective_fragility(&tuning), 0.25);
    }

    #[test]
    fn test_broken_hull_floods_up_to_capacity() {
        let tuning = Tuning::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut hull = ShipModule::new(ModuleKind::Hull, 2, 0);
        hull.apply_damage(100.0, &tuning);
        hull.apply_damage(0.0, &tuning);
        assert_eq!(hull.condition, Condition::Broken);

        let e = TickEnv {
            dt_ms: 1000.0,
            ..env(&tuning, 10.0)
        };
        hull.tick(&e, &mut rng);
        assert_eq!(hull.flood, 4.0);
        for _ in 0..100 {
            hull.tick(&e, &mut rng);
        }
        assert_eq!(hull.flood, MODULE_HEIGHT);
    }

    #[test]
    fn test_repair_cycle() {
        let tuning = Tuning::default();
        let mut hull = ShipModule::new(ModuleKind::Hull, 2, 0);
        assert!(!hull.start_repair());
        hull.apply_damage(100.0, &tuning);
        assert!(!hull.can_start_repair());
        hull.apply_damage(0.0, &tuning);
        hull.flood = 20.0;
        assert!(hull.start_repair());
        assert!(!hull.start_repair());
        assert_eq!(hull.repair(), Some(ModuleEvent::Fixed));
        assert_eq!(hull.condition, Condition::Normal);
        assert_eq!(hull.damage, 0.0);
        assert_eq!(hull.flood, 0.0);
        assert!(!hull.repairing);
    }

    #[test]
    fn test_placeholders_never_damaged() {
        let tuning = Tuning::default();
        let mut slot = ShipModule::empty(0, 0);
        assert_eq!(slot.apply_damage(500.0, &tuning), None);
        assert_eq!(slot.damage, 0.0);
    }

    #[test]
    fn test_stats_sum() {
        let total: ModuleStats = [
            ModuleStats {
                weight: 1.0,
                speed: 2.0,
                buoyancy: 0.0,
            },
            ModuleStats {
                weight: 3.0,
                ..Default::default()
            },
        ]
        .into_iter()
        .sum();
        assert_eq!(
            total,
            ModuleStats {
                weight: 4.0,
                speed: 2.0,
                buoyancy: 0.0
            }
        );
    }
}
