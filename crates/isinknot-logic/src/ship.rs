//! The ship grid: module placement, build rules, and stat aggregation.
//!
//! Rows are stored bottom-up (row 0 sits on the water line) and every row
//! that exists is fully populated, so neighbour lookups only ever need a
//! bounds check.

use rand::Rng;

use crate::constants::{MODULE_HEIGHT, SHIP_COLUMNS};
use crate::modules::{
    Condition, Links, ModuleEvent, ModuleKind, ModuleStats, ShipModule, TickEnv,
};

/// Something that happened to a slot, for the presentation layer to turn into
/// sounds and particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipEvent {
    Built { x: usize, y: usize, kind: ModuleKind },
    Damaged { x: usize, y: usize },
    Broken { x: usize, y: usize },
    Fixed { x: usize, y: usize },
    /// A vented boiler puffed smoke out of the stack top at (x, y).
    Smoke { x: usize, y: usize },
}

#[derive(Debug, Clone)]
pub struct Ship {
    columns: usize,
    rows: Vec<Vec<ShipModule>>,
    events: Vec<ShipEvent>,
}

impl Ship {
    /// An empty grid with no rows.
    pub fn new(columns: usize) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            events: Vec::new(),
        }
    }

    /// The session's starting ship: a single hull on the bottom row.
    pub fn starting(hull_column: usize) -> Self {
        let mut ship = Self::new(SHIP_COLUMNS);
        ship.add_module(hull_column, 0, ModuleKind::Hull);
        ship.events.clear();
        ship
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn ensure_rows(&mut self, count: usize) {
        while self.rows.len() < count {
            let y = self.rows.len();
            self.rows
                .push((0..self.columns).map(|x| ShipModule::empty(x, y)).collect());
        }
    }

    /// Place a new module of `kind` at (x, y), allocating rows y and y + 1.
    ///
    /// Callers check [`Ship::can_build_module`] first; an out-of-range column,
    /// or a row more than one past the top, is ignored.
    pub fn add_module(&mut self, x: usize, y: usize, kind: ModuleKind) {
        if x >= self.columns {
            log::warn!("add_module: column {} outside a {}-wide ship", x, self.columns);
            return;
        }
        if y > self.rows.len() {
            log::warn!("add_module: row {} above a {}-row ship", y, self.rows.len());
            return;
        }
        self.ensure_rows(y + 2);
        self.rows[y][x] = ShipModule::new(kind, x, y);

        self.refresh_links(x, y);
        for (nx, ny) in neighbours(x, y) {
            self.refresh_links(nx, ny);
        }

        if !kind.is_placeholder() {
            log::info!("Built {} at ({}, {})", kind.name(), x, y);
            self.events.push(ShipEvent::Built { x, y, kind });
        }
    }

    fn kind_at(&self, x: isize, y: isize) -> Option<ModuleKind> {
        if x < 0 || y < 0 {
            return None;
        }
        self.get_module(x as usize, y as usize, None).map(|m| m.kind)
    }

    fn solid_at(&self, x: isize, y: isize) -> bool {
        self.kind_at(x, y)
            .map(|k| k.descriptor().solid)
            .unwrap_or(false)
    }

    fn refresh_links(&mut self, x: usize, y: usize) {
        let (ix, iy) = (x as isize, y as isize);
        if self.get_module(x, y, None).is_none() {
            return;
        }
        let hull = |k: Option<ModuleKind>| k == Some(ModuleKind::Hull);
        let supports = [(ix - 1, iy), (ix + 1, iy), (ix, iy - 1), (ix, iy + 1)]
            .iter()
            .filter(|(nx, ny)| self.kind_at(*nx, *ny) == Some(ModuleKind::Support))
            .count() as u8;
        let links = Links {
            hull_left: hull(self.kind_at(ix - 1, iy)),
            hull_right: hull(self.kind_at(ix + 1, iy)),
            hull_above: hull(self.kind_at(ix, iy + 1)),
            hull_below: hull(self.kind_at(ix, iy - 1)),
            smoke_stack_above: self.kind_at(ix, iy + 1) == Some(ModuleKind::SmokeStack),
            supports,
        };
        self.rows[y][x].links = links;
    }

    /// The module at (x, y), or `None` outside the allocated grid. With a
    /// filter, `None` unless the module is of exactly that kind.
    pub fn get_module(&self, x: usize, y: usize, filter: Option<ModuleKind>) -> Option<&ShipModule> {
        let module = self.rows.get(y)?.get(x)?;
        match filter {
            Some(kind) if module.kind != kind => None,
            _ => Some(module),
        }
    }

    pub fn get_module_mut(&mut self, x: usize, y: usize) -> Option<&mut ShipModule> {
        self.rows.get_mut(y)?.get_mut(x)
    }

    pub fn modules(&self) -> impl Iterator<Item = &ShipModule> {
        self.rows.iter().flatten()
    }

    pub fn modules_mut(&mut self) -> impl Iterator<Item = &mut ShipModule> {
        self.rows.iter_mut().flatten()
    }

    /// Whether `kind` may be placed at (x, y) given the committed grid.
    pub fn can_build_module(&self, x: usize, y: usize, kind: ModuleKind) -> bool {
        if x >= self.columns || kind.is_placeholder() {
            return false;
        }
        // Slots above the allocated rows are never adjacent to anything.
        match self.get_module(x, y, None) {
            Some(m) if m.is_empty() => {}
            _ => return false,
        }
        if kind.descriptor().solid && (x == 0 || x == self.columns - 1) {
            return false;
        }

        let (ix, iy) = (x as isize, y as isize);
        let below = self.kind_at(ix, iy - 1);
        let left = self.kind_at(ix - 1, iy);
        let right = self.kind_at(ix + 1, iy);
        let hull_side = left == Some(ModuleKind::Hull) || right == Some(ModuleKind::Hull);
        let solid_side = self.solid_at(ix - 1, iy) || self.solid_at(ix + 1, iy);
        let solid_below = self.solid_at(ix, iy - 1);

        match kind {
            ModuleKind::Hull => y == 0 || below == Some(ModuleKind::Hull),
            ModuleKind::Sail | ModuleKind::Boiler => y > 0 && below == Some(ModuleKind::Hull),
            ModuleKind::SmokeStack => {
                matches!(below, Some(ModuleKind::Boiler | ModuleKind::SmokeStack))
            }
            ModuleKind::Propeller => y == 0 && hull_side,
            ModuleKind::FinSail => y > 0 && solid_side,
            ModuleKind::Balloon => solid_below || below == Some(ModuleKind::Balloon),
            ModuleKind::Castle => matches!(below, Some(ModuleKind::Hull | ModuleKind::Castle)),
            ModuleKind::Support => solid_below || solid_side,
            ModuleKind::Empty | ModuleKind::Construction => false,
        }
    }

    /// An empty slot the player may try to build on: something sits to its
    /// left, right, or directly below.
    pub fn is_build_slot(&self, x: usize, y: usize) -> bool {
        match self.get_module(x, y, None) {
            Some(m) if m.is_empty() => {}
            _ => return false,
        }
        let (ix, iy) = (x as isize, y as isize);
        [(ix - 1, iy), (ix + 1, iy), (ix, iy - 1)]
            .iter()
            .any(|(nx, ny)| matches!(self.kind_at(*nx, *ny), Some(k) if k != ModuleKind::Empty))
    }

    /// Build-menu candidates for a slot, in menu order.
    pub fn buildable_kinds(&self, x: usize, y: usize) -> Vec<ModuleKind> {
        ModuleKind::buildable()
            .iter()
            .copied()
            .filter(|kind| self.can_build_module(x, y, *kind))
            .collect()
    }

    /// Sum of every module's contributions at the given draught.
    pub fn stats(&self, draught: f32) -> ModuleStats {
        self.modules().map(|m| m.stats(draught)).sum()
    }

    /// Rows up to and including the highest non-empty one.
    pub fn stack_rows(&self) -> usize {
        self.rows
            .iter()
            .rposition(|row| row.iter().any(|m| !m.is_empty()))
            .map(|y| y + 1)
            .unwrap_or(0)
    }

    /// Visible height of the module stack in pixels.
    pub fn stack_height(&self) -> f32 {
        self.stack_rows() as f32 * MODULE_HEIGHT
    }

    /// Advance every module by one tick: damage, flooding, boiler smoke.
    pub fn tick<R: Rng + ?Sized>(&mut self, env: &TickEnv<'_>, rng: &mut R) {
        for y in 0..self.rows.len() {
            for x in 0..self.columns {
                let module = &mut self.rows[y][x];
                match module.tick(env, rng) {
                    Some(ModuleEvent::Damaged) => self.events.push(ShipEvent::Damaged { x, y }),
                    Some(ModuleEvent::Broken) => {
                        log::info!("{} at ({}, {}) broke", module.kind.name(), x, y);
                        self.events.push(ShipEvent::Broken { x, y });
                    }
                    Some(ModuleEvent::Fixed) | None => {}
                }

                let module = &self.rows[y][x];
                if module.kind == ModuleKind::Boiler
                    && module.links.smoke_stack_above
                    && module.condition != Condition::Broken
                    && module.percent_submerged(env.draught) < 1.0
                    && rng.gen::<f32>() < env.tuning.smoke_chance
                {
                    let top = self.stack_top(x, y);
                    self.events.push(ShipEvent::Smoke { x, y: top });
                }
            }
        }
    }

    /// Highest smoke stack in the unbroken column above (x, y).
    fn stack_top(&self, x: usize, y: usize) -> usize {
        let mut top = y;
        while self
            .get_module(x, top + 1, Some(ModuleKind::SmokeStack))
            .is_some()
        {
            top += 1;
        }
        top
    }

    /// Mark a broken module as under repair. Returns false if it is not repairable.
    pub fn start_repair(&mut self, x: usize, y: usize) -> bool {
        self.get_module_mut(x, y)
            .map(|m| m.start_repair())
            .unwrap_or(false)
    }

    /// Complete a repair started with [`Ship::start_repair`].
    pub fn finish_repair(&mut self, x: usize, y: usize) {
        if let Some(module) = self.get_module_mut(x, y) {
            if module.repair() == Some(ModuleEvent::Fixed) {
                self.events.push(ShipEvent::Fixed { x, y });
            }
        }
    }

    /// Remove up to `amount` flood from every hull.
    pub fn bail(&mut self, amount: f32) {
        for module in self.modules_mut() {
            if module.kind == ModuleKind::Hull {
                module.flood = (module.flood - amount).max(0.0);
            }
        }
    }

    /// Total flood across all hulls.
    pub fn flood(&self) -> f32 {
        self.modules().map(|m| m.flood).sum()
    }

    pub fn drain_events(&mut self) -> Vec<ShipEvent> {
        std::mem::take(&mut self.events)
    }
}

fn neighbours(x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> {
    let (ix, iy) = (x as isize, y as isize);
    [(ix - 1, iy), (ix + 1, iy), (ix, iy - 1), (ix, iy + 1)]
        .into_iter()
        .filter(|(nx, ny)| *nx >= 0 && *ny >= 0)
        .map(|(nx, ny)| (nx as usize, ny as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn starting() -> Ship {
        Ship::starting(2)
    }

    fn assert_full_rows(ship: &Ship) {
        for y in 0..ship.row_count() {
            for x in 0..ship.columns() {
                let m = ship.get_module(x, y, None).expect("hole in allocated row");
                assert_eq!((m.x, m.y), (x, y));
            }
        }
    }

    #[test]
    fn test_starting_ship() {
        let ship = starting();
        assert_eq!(ship.row_count(), 2);
        assert_eq!(ship.columns(), SHIP_COLUMNS);
        assert_eq!(ship.get_module(2, 0, None).unwrap().kind, ModuleKind::Hull);
        assert!(ship.get_module(2, 1, None).unwrap().is_empty());
        assert_eq!(ship.stack_rows(), 1);
        assert_full_rows(&ship);
    }

    #[test]
    fn test_add_module_allocates_next_row() {
        let mut ship = starting();
        ship.add_module(1, 1, ModuleKind::Castle);
        assert_eq!(ship.row_count(), 3);
        ship.add_module(1, 2, ModuleKind::Castle);
        assert_eq!(ship.row_count(), 4);
        assert_full_rows(&ship);

        // Lower placement never shrinks the grid.
        ship.add_module(1, 0, ModuleKind::Hull);
        assert_eq!(ship.row_count(), 4);
        assert_full_rows(&ship);
    }

    #[test]
    fn test_add_module_ignores_out_of_range() {
        let mut ship = starting();
        ship.add_module(SHIP_COLUMNS, 0, ModuleKind::Hull);
        ship.add_module(1, 3, ModuleKind::Castle);
        ship.add_module(1, usize::MAX, ModuleKind::Castle);
        assert_eq!(ship.row_count(), 2);
        assert!(ship.drain_events().is_empty());

        // One past the top is still allowed.
        ship.add_module(1, 2, ModuleKind::Castle);
        assert_eq!(ship.row_count(), 4);
    }

    #[test]
    fn test_get_module_bounds_and_filter() {
        let ship = starting();
        assert!(ship.get_module(0, 7, None).is_none());
        assert!(ship.get_module(SHIP_COLUMNS, 0, None).is_none());
        assert!(ship.get_module(2, 0, Some(ModuleKind::Hull)).is_some());
        assert!(ship.get_module(2, 0, Some(ModuleKind::Sail)).is_none());
        assert!(ship.get_module(1, 0, Some(ModuleKind::Empty)).is_some());
    }

    #[test]
    fn test_weight_is_sum_of_modules() {
        let mut ship = starting();
        ship.add_module(2, 1, ModuleKind::Sail);
        ship.add_module(3, 0, ModuleKind::Hull);
        let expected: f32 = ship.modules().map(|m| m.descriptor().weight).sum();
        assert_eq!(ship.stats(10.0).weight, expected);
        assert_eq!(expected, 25.0);
    }

    #[test]
    fn test_all_empty_ship_weighs_nothing() {
        let mut ship = Ship::new(SHIP_COLUMNS);
        ship.add_module(0, 0, ModuleKind::Empty);
        assert_eq!(ship.stats(10.0), ModuleStats::default());
    }

    #[test]
    fn test_solid_kinds_excluded_from_edges() {
        let mut ship = starting();
        ship.add_module(1, 0, ModuleKind::Hull);
        // Column 0 is the edge: no hull, but a propeller may hang there.
        assert!(!ship.can_build_module(0, 0, ModuleKind::Hull));
        assert!(ship.can_build_module(0, 0, ModuleKind::Propeller));
    }

    #[test]
    fn test_hull_build_rules() {
        let ship = starting();
        assert!(ship.can_build_module(3, 0, ModuleKind::Hull));
        assert!(ship.can_build_module(2, 1, ModuleKind::Hull));
        assert!(!ship.can_build_module(3, 1, ModuleKind::Hull));
        // Occupied.
        assert!(!ship.can_build_module(2, 0, ModuleKind::Hull));
    }

    #[test]
    fn test_sail_and_boiler_need_hull_below() {
        let ship = starting();
        assert!(ship.can_build_module(2, 1, ModuleKind::Sail));
        assert!(ship.can_build_module(2, 1, ModuleKind::Boiler));
        assert!(!ship.can_build_module(3, 0, ModuleKind::Sail));
        assert!(!ship.can_build_module(3, 1, ModuleKind::Sail));
    }

    #[test]
    fn test_smoke_stack_on_boiler() {
        let mut ship = starting();
        assert!(!ship.can_build_module(2, 2, ModuleKind::SmokeStack));
        ship.add_module(2, 1, ModuleKind::Boiler);
        assert!(ship.can_build_module(2, 2, ModuleKind::SmokeStack));
        ship.add_module(2, 2, ModuleKind::SmokeStack);
        assert!(ship.can_build_module(2, 3, ModuleKind::SmokeStack));
        assert!(ship.get_module(2, 1, None).unwrap().links.smoke_stack_above);
    }

    #[test]
    fn test_construction_is_not_an_anchor() {
        let mut ship = starting();
        ship.add_module(2, 1, ModuleKind::Construction);
        assert!(!ship.can_build_module(2, 2, ModuleKind::Balloon));
        assert!(!ship.can_build_module(2, 2, ModuleKind::Hull));
        assert!(ship.buildable_kinds(2, 2).is_empty());
    }

    #[test]
    fn test_buildable_kinds_menu_order() {
        let ship = starting();
        assert_eq!(
            ship.buildable_kinds(3, 0),
            vec![ModuleKind::Hull, ModuleKind::Propeller, ModuleKind::Support]
        );
    }

    #[test]
    fn test_build_slot_requires_neighbour() {
        let ship = starting();
        assert!(ship.is_build_slot(1, 0));
        assert!(ship.is_build_slot(3, 0));
        assert!(ship.is_build_slot(2, 1));
        assert!(!ship.is_build_slot(0, 0));
        assert!(!ship.is_build_slot(4, 1));
        assert!(!ship.is_build_slot(2, 0));
        assert!(!ship.is_build_slot(2, 5));
    }

    #[test]
    fn test_links_follow_neighbours() {
        let mut ship = starting();
        ship.add_module(3, 0, ModuleKind::Hull);
        ship.add_module(2, 1, ModuleKind::Hull);
        let base = ship.get_module(2, 0, None).unwrap();
        assert!(base.links.hull_right);
        assert!(base.links.hull_above);
        assert!(!base.links.hull_left);

        ship.add_module(1, 0, ModuleKind::Support);
        assert_eq!(ship.get_module(2, 0, None).unwrap().links.supports, 1);
        assert!(ship.get_module(3, 0, None).unwrap().links.hull_left);
    }

    #[test]
    fn test_links_never_stale() {
        let mut ship = starting();
        let placements = [
            (3, 0, ModuleKind::Hull),
            (2, 1, ModuleKind::Boiler),
            (2, 2, ModuleKind::SmokeStack),
            (3, 1, ModuleKind::Support),
            (1, 0, ModuleKind::Hull),
            (3, 1, ModuleKind::Construction),
            (3, 1, ModuleKind::Castle),
        ];
        for (x, y, kind) in placements {
            ship.add_module(x, y, kind);
            let mut fresh = ship.clone();
            for yy in 0..fresh.row_count() {
                for xx in 0..fresh.columns() {
                    fresh.refresh_links(xx, yy);
                }
            }
            for (a, b) in ship.modules().zip(fresh.modules()) {
                assert_eq!(a.links, b.links, "stale links at ({}, {})", a.x, a.y);
            }
        }
    }

    #[test]
    fn test_build_events_skip_placeholders() {
        let mut ship = starting();
        assert!(ship.drain_events().is_empty());
        ship.add_module(3, 0, ModuleKind::Construction);
        assert!(ship.drain_events().is_empty());
        ship.add_module(3, 0, ModuleKind::Hull);
        assert_eq!(
            ship.drain_events(),
            vec![ShipEvent::Built {
                x: 3,
                y: 0,
                kind: ModuleKind::Hull
            }]
        );
    }

    #[test]
    fn test_tick_reports_breakage() {
        let tuning = Tuning {
            damage_rate: 1000.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let mut ship = starting();
        let env = TickEnv {
            draught: 10.0,
            difficulty: 1.0,
            dt_ms: 1000.0,
            tuning: &tuning,
        };
        let mut events = Vec::new();
        for _ in 0..20 {
            ship.tick(&env, &mut rng);
            events.extend(ship.drain_events());
        }
        assert_eq!(
            events,
            vec![
                ShipEvent::Damaged { x: 2, y: 0 },
                ShipEvent::Broken { x: 2, y: 0 }
            ]
        );
    }

    #[test]
    fn test_boiler_smoke_from_stack_top() {
        let tuning = Tuning {
            smoke_chance: 1.0,
            damage_rate: 0.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mut ship = starting();
        ship.add_module(2, 1, ModuleKind::Boiler);
        ship.add_module(2, 2, ModuleKind::SmokeStack);
        ship.add_module(2, 3, ModuleKind::SmokeStack);
        ship.drain_events();
        let env = TickEnv {
            draught: 10.0,
            difficulty: 1.0,
            dt_ms: 100.0,
            tuning: &tuning,
        };
        ship.tick(&env, &mut rng);
        assert_eq!(ship.drain_events(), vec![ShipEvent::Smoke { x: 2, y: 3 }]);
    }

    #[test]
    fn test_repair_and_bail() {
        let tuning = Tuning::default();
        let mut ship = starting();
        {
            let hull = ship.get_module_mut(2, 0).unwrap();
            hull.apply_damage(100.0, &tuning);
            hull.apply_damage(0.0, &tuning);
            hull.flood = 40.0;
        }
        ship.bail(16.0);
        assert_eq!(ship.flood(), 24.0);

        assert!(ship.start_repair(2, 0));
        ship.finish_repair(2, 0);
        assert_eq!(ship.flood(), 0.0);
        assert_eq!(ship.drain_events(), vec![ShipEvent::Fixed { x: 2, y: 0 }]);
        assert!(!ship.start_repair(2, 0));
    }
}
