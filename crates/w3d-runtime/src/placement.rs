use w3d_core::{Quat, Transform};
use w3d_ir::Rotation;

use crate::bind::{BoundPlacement, BoundProject, FrameId, FrameRef};
use crate::state::EntityState;

/// Resolves placements to world transforms.
///
/// Declared frames are memoized until [`PlacementResolver::invalidate`] is
/// called, which the runtime does at tick start and after every entity
/// transform write. Entity frames always read the entity's current transform.
#[derive(Debug, Clone, Default)]
pub struct PlacementResolver {
    memo: Vec<Option<Transform>>,
}

impl PlacementResolver {
    pub fn new(frame_count: usize) -> Self {
        Self {
            memo: vec![None; frame_count],
        }
    }

    pub fn invalidate(&mut self) {
        self.memo.iter_mut().for_each(|m| *m = None);
    }

    /// World transform of a frame.
    pub fn frame_transform(
        &mut self,
        bound: &BoundProject,
        entities: &[EntityState],
        frame: FrameRef,
    ) -> Transform {
        match frame {
            FrameRef::Center => Transform::IDENTITY,
            FrameRef::Entity(id) => entities[id.index()].transform,
            FrameRef::Frame(id) => self.declared_frame(bound, entities, id),
        }
    }

    fn declared_frame(
        &mut self,
        bound: &BoundProject,
        entities: &[EntityState],
        id: FrameId,
    ) -> Transform {
        if let Some(cached) = self.memo[id.index()] {
            return cached;
        }
        let placement = &bound.frame(id).placement;
        let transform = self.resolve(bound, entities, placement).unwrap_or_else(|| {
            tracing::warn!(
                "frame '{}' has a degenerate look-at; using its parent orientation",
                bound.frame(id).name
            );
            self.resolve_lenient(bound, entities, placement)
        });
        self.memo[id.index()] = Some(transform);
        transform
    }

    /// World transform of `placement`: its frame composed with the local offset
    /// and rotation. A look-at rotation is computed in world space from the
    /// resolved position.
    ///
    /// Returns `None` if the rotation is degenerate (zero axis or normal, or a
    /// look-at target at the resolved position).
    pub fn resolve(
        &mut self,
        bound: &BoundProject,
        entities: &[EntityState],
        placement: &BoundPlacement,
    ) -> Option<Transform> {
        let frame = self.frame_transform(bound, entities, placement.frame);
        let position = frame.transform_point(placement.position);
        let orientation = match &placement.rotation {
            Rotation::LookAt { .. } => placement.rotation.look_at_from(position)?,
            rotation => (frame.orientation * rotation.local_orientation()?).normalize(),
        };
        Some(Transform::new(position, orientation))
    }

    /// Like [`resolve`](Self::resolve), but falls back to the frame's
    /// orientation for a degenerate rotation.
    pub fn resolve_lenient(
        &mut self,
        bound: &BoundProject,
        entities: &[EntityState],
        placement: &BoundPlacement,
    ) -> Transform {
        if let Some(t) = self.resolve(bound, entities, placement) {
            return t;
        }
        let frame = self.frame_transform(bound, entities, placement.frame);
        Transform::new(frame.transform_point(placement.position), frame.orientation)
    }

    /// End transform of a relative move from `current`.
    ///
    /// The offset is expressed in the placement's frame axes. Rotations are
    /// applied about world axes, or about the object's own axes when
    /// `own_axis` is set. A look-at rotation faces the target from the new
    /// position.
    pub fn relative(
        &mut self,
        bound: &BoundProject,
        entities: &[EntityState],
        placement: &BoundPlacement,
        current: &Transform,
        own_axis: bool,
    ) -> Option<Transform> {
        let frame = self.frame_transform(bound, entities, placement.frame);
        let position = current.position + frame.orientation * placement.position;
        let orientation = match &placement.rotation {
            Rotation::LookAt { .. } => placement.rotation.look_at_from(position)?,
            rotation => {
                let delta: Quat = rotation.local_orientation()?;
                if own_axis {
                    current.orientation * delta
                } else {
                    delta * current.orientation
                }
            }
        };
        Some(Transform::new(position, orientation.normalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::bind;
    use w3d_core::{Color, Vec3};
    use w3d_ir::{Entity, FrameDecl, Placement, Project};

    fn state_at(position: Vec3) -> EntityState {
        EntityState {
            transform: Transform::from_position(position),
            color: Color::WHITE,
            visible: true,
            opacity: 1.0,
            scale: 1.0,
        }
    }

    fn placement(bound: &BoundProject, frame: &str, position: Vec3) -> BoundPlacement {
        let frame = match frame {
            "Center" => FrameRef::Center,
            name => match bound.frame_id(name) {
                Some(id) => FrameRef::Frame(id),
                None => FrameRef::Entity(bound.entity_id(name).unwrap()),
            },
        };
        BoundPlacement {
            frame,
            position,
            rotation: Rotation::None,
        }
    }

    #[test]
    fn test_front_wall_offset() {
        let bound = bind(&Project::default()).unwrap();
        let mut resolver = PlacementResolver::new(bound.frames.len());
        let p = placement(&bound, "FrontWall", Vec3::new(1.0, 0.0, 0.0));
        let t = resolver.resolve(&bound, &[], &p).unwrap();
        assert!(t.position.abs_diff_eq(Vec3::new(1.0, 0.0, -4.0), 1e-5));
    }

    #[test]
    fn test_left_wall_rotates_offset() {
        let bound = bind(&Project::default()).unwrap();
        let mut resolver = PlacementResolver::new(bound.frames.len());
        // One unit "into" the left wall's own -Z is further left in world space.
        let p = placement(&bound, "LeftWall", Vec3::new(0.0, 0.0, -1.0));
        let t = resolver.resolve(&bound, &[], &p).unwrap();
        assert!(t.position.abs_diff_eq(Vec3::new(-5.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_nested_frames_and_memo_invalidation() {
        let mut project = Project::default();
        project.entities.push(Entity::text("anchor", "x"));
        project.settings.frames.push(FrameDecl::new(
            "shelf",
            Placement::at(Vec3::new(0.0, 1.0, 0.0)).relative_to("anchor"),
        ));
        let bound = bind(&project).unwrap();
        let mut resolver = PlacementResolver::new(bound.frames.len());
        let p = placement(&bound, "shelf", Vec3::ZERO);

        let mut entities = vec![state_at(Vec3::new(2.0, 0.0, 0.0))];
        let t = resolver.resolve(&bound, &entities, &p).unwrap();
        assert!(t.position.abs_diff_eq(Vec3::new(2.0, 1.0, 0.0), 1e-5));

        entities[0] = state_at(Vec3::new(5.0, 0.0, 0.0));
        let stale = resolver.resolve(&bound, &entities, &p).unwrap();
        assert!(stale.position.abs_diff_eq(Vec3::new(2.0, 1.0, 0.0), 1e-5));

        resolver.invalidate();
        let fresh = resolver.resolve(&bound, &entities, &p).unwrap();
        assert!(fresh.position.abs_diff_eq(Vec3::new(5.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn test_look_at_is_world_space() {
        let bound = bind(&Project::default()).unwrap();
        let mut resolver = PlacementResolver::new(bound.frames.len());
        let mut p = placement(&bound, "LeftWall", Vec3::ZERO);
        p.rotation = Rotation::LookAt {
            target: Vec3::ZERO,
            up: Vec3::Y,
        };
        let t = resolver.resolve(&bound, &[], &p).unwrap();
        let gaze = t.orientation * Vec3::NEG_Z;
        assert!(gaze.abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn test_degenerate_look_at() {
        let bound = bind(&Project::default()).unwrap();
        let mut resolver = PlacementResolver::new(bound.frames.len());
        let mut p = placement(&bound, "Center", Vec3::ZERO);
        p.rotation = Rotation::LookAt {
            target: Vec3::ZERO,
            up: Vec3::Y,
        };
        assert!(resolver.resolve(&bound, &[], &p).is_none());
        let lenient = resolver.resolve_lenient(&bound, &[], &p);
        assert_eq!(lenient.orientation, Quat::IDENTITY);
    }

    #[test]
    fn test_relative_move_adds_offset() {
        let bound = bind(&Project::default()).unwrap();
        let mut resolver = PlacementResolver::new(bound.frames.len());
        let p = placement(&bound, "Center", Vec3::new(0.0, 0.0, 2.0));
        let current = Transform::from_position(Vec3::new(0.0, 0.0, 2.0));
        let t = resolver.relative(&bound, &[], &p, &current, false).unwrap();
        assert!(t.position.abs_diff_eq(Vec3::new(0.0, 0.0, 4.0), 1e-5));
    }

    #[test]
    fn test_relative_rotation_axes() {
        let bound = bind(&Project::default()).unwrap();
        let mut resolver = PlacementResolver::new(bound.frames.len());
        let mut p = placement(&bound, "Center", Vec3::ZERO);
        p.rotation = Rotation::Axis {
            axis: Vec3::X,
            angle_degrees: 90.0,
        };
        let current = Transform::new(Vec3::ZERO, Quat::from_rotation_y(90f32.to_radians()));

        let world = resolver.relative(&bound, &[], &p, &current, false).unwrap();
        let local = resolver.relative(&bound, &[], &p, &current, true).unwrap();
        // World X pitches the already-yawed object; own X is world -Z after the yaw.
        assert!((world.orientation * Vec3::Y).abs_diff_eq(Vec3::Z, 1e-5));
        assert!((local.orientation * Vec3::Y).abs_diff_eq(Vec3::X, 1e-5));
    }
}
