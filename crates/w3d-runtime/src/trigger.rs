use w3d_core::math::{angle_between_degrees, yaw_pitch_degrees};
use w3d_core::Vec3;

use crate::bind::{ActionListId, BoundCondition, BoundProject, BoundSource, TriggerId};
use crate::host::ViewerPose;
use crate::state::SceneState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TriggerState {
    enabled: bool,
    /// Condition value at the last evaluation; false while disabled.
    last: bool,
}

/// Edge detector for every trigger of a project.
#[derive(Debug, Clone, Default)]
pub struct TriggerEvaluator {
    states: Vec<TriggerState>,
}

impl TriggerEvaluator {
    pub fn new(bound: &BoundProject) -> Self {
        let mut evaluator = Self::default();
        evaluator.reset(bound);
        evaluator
    }

    /// Restore declared enablement and forget every previous condition value.
    pub fn reset(&mut self, bound: &BoundProject) {
        self.states = bound
            .triggers
            .iter()
            .map(|t| TriggerState {
                enabled: t.enabled,
                last: false,
            })
            .collect();
    }

    pub fn is_enabled(&self, id: TriggerId) -> bool {
        self.states[id.index()].enabled
    }

    /// Enable or disable a trigger. Disabling clears its last value, so a
    /// condition that already holds fires again once re-enabled.
    pub fn set_enabled(&mut self, id: TriggerId, enabled: bool) {
        let state = &mut self.states[id.index()];
        state.enabled = enabled;
        if !enabled {
            state.last = false;
        }
    }

    /// Evaluate every enabled trigger in declaration order and return the
    /// lists fired by rising and falling edges.
    pub fn evaluate(
        &mut self,
        bound: &BoundProject,
        viewer: Option<&ViewerPose>,
        scene: &SceneState,
    ) -> Vec<ActionListId> {
        let mut fired = Vec::new();
        for id in bound.trigger_ids() {
            let trigger = bound.trigger(id);
            let state = &mut self.states[id.index()];
            if !state.enabled {
                continue;
            }
            let now = condition_holds(&trigger.condition, bound, viewer, scene);
            match (state.last, now) {
                (false, true) => {
                    tracing::debug!("trigger '{}' entered", trigger.name);
                    fired.push(trigger.enter);
                    if !trigger.remain_enabled {
                        tracing::debug!("trigger '{}' disabled after firing", trigger.name);
                        state.enabled = false;
                        state.last = false;
                        continue;
                    }
                }
                (true, false) => {
                    if let Some(exit) = trigger.exit {
                        tracing::debug!("trigger '{}' exited", trigger.name);
                        fired.push(exit);
                    }
                }
                _ => {}
            }
            state.last = now;
        }
        fired
    }
}

fn gaze_within(pose: &ViewerPose, direction: Vec3, angle: f32) -> bool {
    angle_between_degrees(pose.forward, direction).is_some_and(|a| a <= angle)
}

/// Evaluate a condition against the current viewer pose and scene.
///
/// Missing viewer input or degenerate vectors make the condition false.
pub fn condition_holds(
    condition: &BoundCondition,
    bound: &BoundProject,
    viewer: Option<&ViewerPose>,
    scene: &SceneState,
) -> bool {
    let position_of = |id| scene.entity(id).transform.position;
    match condition {
        BoundCondition::HeadOrientation { yaw, pitch } => viewer
            .and_then(|pose| yaw_pitch_degrees(pose.forward))
            .is_some_and(|(y, p)| y >= yaw.0 && y <= yaw.1 && p >= pitch.0 && p <= pitch.1),
        BoundCondition::HeadPosition { region } => match (viewer, region) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(pose), Some(region)) => region.test(pose.position),
        },
        BoundCondition::LookAtPoint { point, angle } => {
            viewer.is_some_and(|pose| gaze_within(pose, *point - pose.position, *angle))
        }
        BoundCondition::LookAtDirection { direction, angle } => {
            viewer.is_some_and(|pose| gaze_within(pose, *direction, *angle))
        }
        BoundCondition::LookAtObject { object, angle } => viewer.is_some_and(|pose| {
            gaze_within(pose, position_of(*object) - pose.position, *angle)
        }),
        BoundCondition::ObjectMovement { source, region } => match source {
            BoundSource::Object(id) => region.test(position_of(*id)),
            BoundSource::GroupAny(group) => bound
                .group(*group)
                .members
                .iter()
                .any(|id| region.test(position_of(*id))),
            BoundSource::GroupAll(group) => {
                let members = &bound.group(*group).members;
                !members.is_empty() && members.iter().all(|id| region.test(position_of(*id)))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::bind;
    use crate::state::EntityState;
    use w3d_core::{Color, Transform};
    use w3d_ir::{EventBox, Project, Trigger, TriggerCondition};

    fn pose(position: Vec3, forward: Vec3) -> ViewerPose {
        ViewerPose { position, forward }
    }

    fn project_with(condition: TriggerCondition) -> BoundProject {
        let mut project = Project::default();
        project.entities.push(w3d_ir::Entity::text("cube", "x"));
        let mut trigger = Trigger::new("t", condition);
        trigger.exit = Some(Vec::new());
        project.triggers.push(trigger);
        bind(&project).unwrap()
    }

    fn scene_with_cube(position: Vec3) -> SceneState {
        SceneState::new(
            vec![EntityState {
                transform: Transform::from_position(position),
                color: Color::WHITE,
                visible: true,
                opacity: 1.0,
                scale: 1.0,
            }],
            Transform::IDENTITY,
        )
    }

    #[test]
    fn test_enter_fires_once_then_exit() {
        let bound = project_with(TriggerCondition::HeadPosition {
            region: Some(EventBox::new(Vec3::splat(-1.0), Vec3::splat(1.0))),
        });
        let scene = scene_with_cube(Vec3::ZERO);
        let trigger = &bound.triggers[0];
        let mut eval = TriggerEvaluator::new(&bound);

        let inside = pose(Vec3::ZERO, Vec3::NEG_Z);
        let outside = pose(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_Z);

        assert!(eval.evaluate(&bound, Some(&outside), &scene).is_empty());
        assert_eq!(eval.evaluate(&bound, Some(&inside), &scene), vec![trigger.enter]);
        assert!(eval.evaluate(&bound, Some(&inside), &scene).is_empty());
        assert_eq!(
            eval.evaluate(&bound, Some(&outside), &scene),
            vec![trigger.exit.unwrap()]
        );
    }

    #[test]
    fn test_missing_viewer_is_false() {
        let bound = project_with(TriggerCondition::HeadPosition { region: None });
        let scene = scene_with_cube(Vec3::ZERO);
        let mut eval = TriggerEvaluator::new(&bound);
        assert!(eval.evaluate(&bound, None, &scene).is_empty());
        let here = pose(Vec3::ZERO, Vec3::NEG_Z);
        assert_eq!(eval.evaluate(&bound, Some(&here), &scene).len(), 1);
        // Losing tracking is a falling edge.
        assert_eq!(eval.evaluate(&bound, None, &scene).len(), 1);
    }

    #[test]
    fn test_reenable_fires_if_already_true() {
        let bound = project_with(TriggerCondition::HeadPosition { region: None });
        let scene = scene_with_cube(Vec3::ZERO);
        let here = pose(Vec3::ZERO, Vec3::NEG_Z);
        let id = bound.trigger_id("t").unwrap();
        let mut eval = TriggerEvaluator::new(&bound);

        assert_eq!(eval.evaluate(&bound, Some(&here), &scene).len(), 1);
        eval.set_enabled(id, false);
        assert!(eval.evaluate(&bound, Some(&here), &scene).is_empty());
        eval.set_enabled(id, true);
        assert_eq!(
            eval.evaluate(&bound, Some(&here), &scene),
            vec![bound.triggers[0].enter]
        );
    }

    #[test]
    fn test_look_at_object() {
        let bound = project_with(TriggerCondition::LookAtObject {
            object: "cube".into(),
            angle: 10.0,
        });
        let scene = scene_with_cube(Vec3::new(0.0, 0.0, -5.0));
        let cond = &bound.triggers[0].condition;
        let at = pose(Vec3::ZERO, Vec3::NEG_Z);
        let away = pose(Vec3::ZERO, Vec3::X);
        let degenerate = pose(Vec3::ZERO, Vec3::ZERO);
        assert!(condition_holds(cond, &bound, Some(&at), &scene));
        assert!(!condition_holds(cond, &bound, Some(&away), &scene));
        assert!(!condition_holds(cond, &bound, Some(&degenerate), &scene));
    }

    #[test]
    fn test_head_orientation_ranges() {
        let bound = project_with(TriggerCondition::HeadOrientation {
            yaw: (45.0, 135.0),
            pitch: (-30.0, 30.0),
        });
        let scene = scene_with_cube(Vec3::ZERO);
        let cond = &bound.triggers[0].condition;
        let left = pose(Vec3::ZERO, Vec3::NEG_X);
        let ahead = pose(Vec3::ZERO, Vec3::NEG_Z);
        let left_up = pose(Vec3::ZERO, Vec3::new(-1.0, 1.0, 0.0));
        assert!(condition_holds(cond, &bound, Some(&left), &scene));
        assert!(!condition_holds(cond, &bound, Some(&ahead), &scene));
        assert!(!condition_holds(cond, &bound, Some(&left_up), &scene));
    }

    #[test]
    fn test_object_movement_sources() {
        let region = EventBox::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let bound = project_with(TriggerCondition::ObjectMovement {
            source: w3d_ir::MovementSource::Object("cube".into()),
            region,
        });
        let cond = &bound.triggers[0].condition;
        assert!(condition_holds(cond, &bound, None, &scene_with_cube(Vec3::ZERO)));
        assert!(!condition_holds(
            cond,
            &bound,
            None,
            &scene_with_cube(Vec3::new(0.0, 3.0, 0.0))
        ));
    }
}
