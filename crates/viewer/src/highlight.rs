//! Click highlighting.
//!
//! Two states: `Idle` and `Selected(mesh)`. At most one record carries the
//! highlight color at any time, and a restored record always gets back the
//! color captured before it was first highlighted.

use crate::normalize::{MeshId, MeshSet, Rgba};
use crate::viewport::camera::{RayCaster, ScreenPoint, ViewportRect};

/// Pure red
pub const DEFAULT_HIGHLIGHT_COLOR: Rgba = [1.0, 0.0, 0.0, 1.0];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HighlightState {
    #[default]
    Idle,
    Selected(MeshId),
}

/// What a pointer event did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickOutcome {
    /// Highlighting is off; nothing was cast
    Disabled,
    /// Ray hit nothing. Selection is kept.
    Miss,
    Selected(MeshId),
    /// Hit the already selected mesh
    Unchanged(MeshId),
    Switched { from: MeshId, to: MeshId },
}

pub struct HighlightEngine {
    enabled: bool,
    state: HighlightState,
    color: Rgba,
}

impl Default for HighlightEngine {
    fn default() -> Self {
        Self::new(DEFAULT_HIGHLIGHT_COLOR)
    }
}

impl HighlightEngine {
    pub fn new(color: Rgba) -> Self {
        Self {
            enabled: false,
            state: HighlightState::Idle,
            color,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn state(&self) -> HighlightState {
        self.state
    }

    pub fn selection(&self) -> Option<MeshId> {
        match self.state {
            HighlightState::Idle => None,
            HighlightState::Selected(id) => Some(id),
        }
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    /// Change the highlight color, repainting the current selection
    pub fn set_color(&mut self, color: Rgba, meshes: &mut MeshSet) {
        self.color = color;
        if let Some(record) = self.selection().and_then(|id| meshes.get_mut(id)) {
            record.material.set_color(color);
        }
    }

    /// Disabling restores the selected mesh and returns to `Idle`.
    /// Enabling never changes the state.
    pub fn set_enabled(&mut self, enabled: bool, meshes: &mut MeshSet) {
        self.enabled = enabled;
        if !enabled {
            self.deselect(meshes);
        }
    }

    /// Restore the selected mesh, if any, and go `Idle`
    pub fn deselect(&mut self, meshes: &mut MeshSet) -> Option<MeshId> {
        let previous = self.selection()?;
        if let Some(record) = meshes.get_mut(previous) {
            record.restore_original_color();
        }
        self.state = HighlightState::Idle;
        Some(previous)
    }

    /// Forget the selection without touching records (the set was replaced)
    pub fn reset(&mut self) {
        self.state = HighlightState::Idle;
    }

    /// Nearest pickable mesh under the pointer
    pub fn pick(
        &self,
        meshes: &MeshSet,
        caster: &dyn RayCaster,
        point: ScreenPoint,
        rect: ViewportRect,
    ) -> Option<MeshId> {
        let ndc = rect.to_ndc(point)?;
        caster
            .intersections(ndc, rect.aspect(), meshes)
            .first()
            .map(|hit| hit.mesh)
    }

    pub fn handle_pointer_event(
        &mut self,
        meshes: &mut MeshSet,
        caster: &dyn RayCaster,
        point: ScreenPoint,
        rect: ViewportRect,
    ) -> PickOutcome {
        if !self.enabled {
            return PickOutcome::Disabled;
        }
        let hit = self.pick(meshes, caster, point, rect);
        self.apply_hit(meshes, hit)
    }

    /// State transition for a resolved pick result
    pub fn apply_hit(&mut self, meshes: &mut MeshSet, hit: Option<MeshId>) -> PickOutcome {
        if !self.enabled {
            return PickOutcome::Disabled;
        }
        let Some(target) = hit.filter(|id| meshes.get(*id).is_some()) else {
            tracing::debug!("Pick miss");
            return PickOutcome::Miss;
        };

        match self.state {
            HighlightState::Selected(current) if current == target => PickOutcome::Unchanged(current),
            HighlightState::Selected(current) => {
                if let Some(record) = meshes.get_mut(current) {
                    record.restore_original_color();
                }
                self.highlight(meshes, target);
                PickOutcome::Switched {
                    from: current,
                    to: target,
                }
            }
            HighlightState::Idle => {
                self.highlight(meshes, target);
                PickOutcome::Selected(target)
            }
        }
    }

    fn highlight(&mut self, meshes: &mut MeshSet, target: MeshId) {
        if let Some(record) = meshes.get_mut(target) {
            record.capture_original_color();
            record.material.set_color(self.color);
            self.state = HighlightState::Selected(target);
            tracing::debug!("Highlighted {target} ({})", record.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::format::{parse_detected, ProbeOrder};
    use crate::normalize::DisplayState;
    use crate::viewport::picking::Ray;
    use glam::{Vec2, Vec3};

    /// Shoots straight down -Z from x = ndc.x * 3 (nudged off triangle diagonals)
    struct ParallelCaster;

    impl RayCaster for ParallelCaster {
        fn cast(&self, ndc: Vec2, _aspect: f32) -> Ray {
            Ray {
                origin: Vec3::new(ndc.x * 3.0 + 0.1, 0.2, 10.0),
                direction: Vec3::NEG_Z,
            }
        }
    }

    const RECT: ViewportRect = ViewportRect {
        x: 0.0,
        y: 0.0,
        width: 200.0,
        height: 100.0,
    };
    /// ndc.x = -0.5 → x = -1.4
    const LEFT: ScreenPoint = ScreenPoint { x: 50.0, y: 50.0 };
    const RIGHT: ScreenPoint = ScreenPoint { x: 150.0, y: 50.0 };
    /// ndc.x = 0 → x = 0.1, between the cubes
    const GAP: ScreenPoint = ScreenPoint { x: 100.0, y: 50.0 };

    fn setup() -> (MeshSet, HighlightEngine) {
        let (_, doc) = parse_detected(&fixtures::two_mesh_glb(), None, ProbeOrder::StlFirst).unwrap();
        let mut set = MeshSet::new();
        set.normalize(&doc, &DisplayState::default()).unwrap();
        let mut engine = HighlightEngine::default();
        engine.set_enabled(true, &mut set);
        (set, engine)
    }

    fn color(set: &MeshSet, id: u32) -> Rgba {
        set.get(MeshId(id)).unwrap().material.color()
    }

    #[test]
    fn test_disabled_ignores_clicks() {
        let (mut set, mut engine) = setup();
        engine.set_enabled(false, &mut set);
        let out = engine.handle_pointer_event(&mut set, &ParallelCaster, LEFT, RECT);
        assert_eq!(out, PickOutcome::Disabled);
        assert_eq!(engine.state(), HighlightState::Idle);
    }

    #[test]
    fn test_select_switch_disable() {
        let (mut set, mut engine) = setup();

        let out = engine.handle_pointer_event(&mut set, &ParallelCaster, LEFT, RECT);
        assert_eq!(out, PickOutcome::Selected(MeshId(0)));
        assert_eq!(color(&set, 0), DEFAULT_HIGHLIGHT_COLOR);

        let out = engine.handle_pointer_event(&mut set, &ParallelCaster, RIGHT, RECT);
        assert_eq!(
            out,
            PickOutcome::Switched {
                from: MeshId(0),
                to: MeshId(1)
            }
        );
        assert_eq!(color(&set, 0), fixtures::SHARED_BASE_COLOR);
        assert_eq!(color(&set, 1), DEFAULT_HIGHLIGHT_COLOR);

        engine.set_enabled(false, &mut set);
        assert_eq!(engine.state(), HighlightState::Idle);
        for r in set.iter() {
            assert_eq!(Some(r.material.color()), r.original_color());
        }
    }

    #[test]
    fn test_miss_keeps_selection() {
        let (mut set, mut engine) = setup();
        engine.handle_pointer_event(&mut set, &ParallelCaster, LEFT, RECT);
        let out = engine.handle_pointer_event(&mut set, &ParallelCaster, GAP, RECT);
        assert_eq!(out, PickOutcome::Miss);
        assert_eq!(engine.selection(), Some(MeshId(0)));
        assert_eq!(color(&set, 0), DEFAULT_HIGHLIGHT_COLOR);
    }

    #[test]
    fn test_same_mesh_unchanged() {
        let (mut set, mut engine) = setup();
        engine.handle_pointer_event(&mut set, &ParallelCaster, LEFT, RECT);
        let out = engine.handle_pointer_event(&mut set, &ParallelCaster, LEFT, RECT);
        assert_eq!(out, PickOutcome::Unchanged(MeshId(0)));
        // Original color survives repeated highlighting
        assert_eq!(set.get(MeshId(0)).unwrap().original_color(), Some(fixtures::SHARED_BASE_COLOR));
    }

    #[test]
    fn test_enable_is_noop_on_state() {
        let (mut set, mut engine) = setup();
        engine.handle_pointer_event(&mut set, &ParallelCaster, LEFT, RECT);
        engine.set_enabled(true, &mut set);
        assert_eq!(engine.selection(), Some(MeshId(0)));
    }

    #[test]
    fn test_at_most_one_highlighted() {
        let (mut set, mut engine) = setup();
        for p in [LEFT, RIGHT, GAP, RIGHT, LEFT, LEFT] {
            engine.handle_pointer_event(&mut set, &ParallelCaster, p, RECT);
            let lit = set
                .iter()
                .filter(|r| r.material.color() == DEFAULT_HIGHLIGHT_COLOR)
                .count();
            assert_eq!(lit, 1);
        }
    }

    #[test]
    fn test_nearest_hit_wins() {
        let (mut set, mut engine) = setup();
        // Ray along +X from far left passes through the left cube first
        struct SideCaster;
        impl RayCaster for SideCaster {
            fn cast(&self, _ndc: Vec2, _aspect: f32) -> Ray {
                Ray {
                    origin: Vec3::new(-10.0, 0.1, 0.3),
                    direction: Vec3::X,
                }
            }
        }
        let out = engine.handle_pointer_event(&mut set, &SideCaster, GAP, RECT);
        assert_eq!(out, PickOutcome::Selected(MeshId(0)));
    }

    #[test]
    fn test_set_color_repaints_selection() {
        let (mut set, mut engine) = setup();
        engine.handle_pointer_event(&mut set, &ParallelCaster, RIGHT, RECT);
        engine.set_color([1.0, 1.0, 0.0, 1.0], &mut set);
        assert_eq!(color(&set, 1), [1.0, 1.0, 0.0, 1.0]);
        engine.deselect(&mut set);
        assert_eq!(color(&set, 1), fixtures::SHARED_BASE_COLOR);
    }
}
