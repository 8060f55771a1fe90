//! One-time binding pass: validates a project and replaces every name with an
//! index, so the per-frame path never looks anything up by string.

use std::collections::HashMap;
use std::fmt;

use w3d_core::{Color, FeatureKind, SelectionPolicy, Vec3, W3dError, W3dResult};
use w3d_ir::{
    Action, EventBox, LinkChange, MovementSource, ObjectChange, Placement, Project, Rotation,
    SoundChange, TimelineChange, TriggerCondition, CENTER,
};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(usize);

        impl $name {
            /// Position in declaration order.
            pub fn index(self) -> usize {
                self.0
            }

            #[allow(dead_code)]
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

define_id!(
    /// Index of an entity.
    EntityId
);
define_id!(
    /// Index of a declared (non-`Center`) reference frame.
    FrameId
);
define_id!(GroupId);
define_id!(TimelineId);
define_id!(TriggerId);
define_id!(SoundId);
define_id!(
    /// Index of an interned action list.
    ActionListId
);

/// The frame a bound placement is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRef {
    Center,
    Frame(FrameId),
    Entity(EntityId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundPlacement {
    pub frame: FrameRef,
    pub position: Vec3,
    pub rotation: Rotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundTarget {
    Entity(EntityId),
    Group(GroupId, SelectionPolicy),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundChange {
    Visible(bool),
    Color(Color),
    Scale(f32),
    Move {
        placement: BoundPlacement,
        relative: bool,
    },
    Sound(SoundChange),
    Link(LinkChange),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundAction {
    Object {
        target: BoundTarget,
        duration: f64,
        change: BoundChange,
    },
    Timeline {
        timeline: TimelineId,
        change: TimelineChange,
    },
    Sound {
        sound: SoundId,
        change: SoundChange,
    },
    Trigger {
        trigger: TriggerId,
        enable: bool,
    },
    MoveViewer {
        placement: BoundPlacement,
        relative: bool,
        duration: f64,
    },
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundSource {
    Object(EntityId),
    GroupAny(GroupId),
    GroupAll(GroupId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundCondition {
    HeadOrientation { yaw: (f32, f32), pitch: (f32, f32) },
    HeadPosition { region: Option<EventBox> },
    LookAtPoint { point: Vec3, angle: f32 },
    LookAtDirection { direction: Vec3, angle: f32 },
    LookAtObject { object: EntityId, angle: f32 },
    ObjectMovement { source: BoundSource, region: EventBox },
}

#[derive(Debug, Clone)]
pub struct BoundLink {
    pub enabled: bool,
    pub remain_enabled: bool,
    pub enabled_color: Color,
    pub selected_color: Color,
    pub lists: Vec<(Option<u32>, ActionListId)>,
    pub reset: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct BoundEntity {
    pub name: String,
    pub placement: BoundPlacement,
    pub color: Color,
    pub visible: bool,
    pub scale: f32,
    pub around_own_axis: bool,
    pub sound: Option<SoundId>,
    pub link: Option<BoundLink>,
}

#[derive(Debug, Clone)]
pub struct BoundFrame {
    pub name: String,
    pub placement: BoundPlacement,
}

#[derive(Debug, Clone)]
pub struct BoundTrigger {
    pub name: String,
    pub enabled: bool,
    pub remain_enabled: bool,
    pub condition: BoundCondition,
    pub enter: ActionListId,
    pub exit: Option<ActionListId>,
}

#[derive(Debug, Clone)]
pub struct BoundTimeline {
    pub name: String,
    pub start_immediately: bool,
    /// `(offset seconds, list)` in ascending offset order.
    pub entries: Vec<(f64, ActionListId)>,
}

#[derive(Debug, Clone)]
pub struct BoundSound {
    pub name: String,
    pub filename: String,
    pub autostart: bool,
    pub looping: bool,
    pub volume: f32,
}

#[derive(Debug, Clone)]
pub struct BoundGroup {
    pub name: String,
    /// Flattened members in declaration order, without duplicates.
    pub members: Vec<EntityId>,
}

/// A validated project with every reference resolved to an index.
#[derive(Debug, Clone)]
pub struct BoundProject {
    pub entities: Vec<BoundEntity>,
    pub frames: Vec<BoundFrame>,
    pub groups: Vec<BoundGroup>,
    pub sounds: Vec<BoundSound>,
    pub triggers: Vec<BoundTrigger>,
    pub timelines: Vec<BoundTimeline>,
    pub viewer: BoundPlacement,
    /// Action list arena.
    pub lists: Vec<Vec<BoundAction>>,
    /// Entities ordered so that every entity comes after the entities its
    /// placement depends on.
    pub resolve_order: Vec<EntityId>,
    names: Names,
}

#[derive(Debug, Clone, Default)]
struct Names {
    entities: HashMap<String, EntityId>,
    frames: HashMap<String, FrameId>,
    groups: HashMap<String, GroupId>,
    sounds: HashMap<String, SoundId>,
    triggers: HashMap<String, TriggerId>,
    timelines: HashMap<String, TimelineId>,
}

fn lookup<T: Copy>(map: &HashMap<String, T>, kind: FeatureKind, name: &str) -> W3dResult<T> {
    map.get(name)
        .copied()
        .ok_or_else(|| W3dError::unknown(kind, name))
}

impl BoundProject {
    pub fn entity_id(&self, name: &str) -> Option<EntityId> {
        self.names.entities.get(name).copied()
    }

    pub fn group_id(&self, name: &str) -> Option<GroupId> {
        self.names.groups.get(name).copied()
    }

    pub fn timeline_id(&self, name: &str) -> Option<TimelineId> {
        self.names.timelines.get(name).copied()
    }

    pub fn trigger_id(&self, name: &str) -> Option<TriggerId> {
        self.names.triggers.get(name).copied()
    }

    pub fn sound_id(&self, name: &str) -> Option<SoundId> {
        self.names.sounds.get(name).copied()
    }

    pub fn frame_id(&self, name: &str) -> Option<FrameId> {
        self.names.frames.get(name).copied()
    }

    pub fn entity(&self, id: EntityId) -> &BoundEntity {
        &self.entities[id.0]
    }

    pub fn frame(&self, id: FrameId) -> &BoundFrame {
        &self.frames[id.0]
    }

    pub fn group(&self, id: GroupId) -> &BoundGroup {
        &self.groups[id.0]
    }

    pub fn sound(&self, id: SoundId) -> &BoundSound {
        &self.sounds[id.0]
    }

    pub fn trigger(&self, id: TriggerId) -> &BoundTrigger {
        &self.triggers[id.0]
    }

    pub fn timeline(&self, id: TimelineId) -> &BoundTimeline {
        &self.timelines[id.0]
    }

    pub fn list(&self, id: ActionListId) -> &[BoundAction] {
        &self.lists[id.0]
    }

    pub fn trigger_ids(&self) -> impl Iterator<Item = TriggerId> {
        (0..self.triggers.len()).map(TriggerId)
    }

    pub fn timeline_ids(&self) -> impl Iterator<Item = TimelineId> {
        (0..self.timelines.len()).map(TimelineId)
    }

    pub fn sound_ids(&self) -> impl Iterator<Item = SoundId> {
        (0..self.sounds.len()).map(SoundId)
    }
}

/// Validate `project` and bind it.
///
/// Validation problems are returned together as [`W3dError::Validation`].
pub fn bind(project: &Project) -> W3dResult<BoundProject> {
    w3d_ir::validate_project(project).map_err(W3dError::Validation)?;

    let mut names = Names::default();
    for (i, e) in project.entities.iter().enumerate() {
        names.entities.insert(e.name.clone(), EntityId(i));
    }
    for (i, f) in project.settings.frames.iter().enumerate() {
        names.frames.insert(f.name.clone(), FrameId(i));
    }
    for (i, g) in project.groups.iter().enumerate() {
        names.groups.insert(g.name.clone(), GroupId(i));
    }
    for (i, s) in project.sounds.iter().enumerate() {
        names.sounds.insert(s.name.clone(), SoundId(i));
    }
    for (i, t) in project.triggers.iter().enumerate() {
        names.triggers.insert(t.name.clone(), TriggerId(i));
    }
    for (i, t) in project.timelines.iter().enumerate() {
        names.timelines.insert(t.name.clone(), TimelineId(i));
    }

    let mut binder = Binder {
        project,
        names: &names,
        lists: Vec::new(),
    };

    let groups = project
        .groups
        .iter()
        .map(|g| {
            Ok(BoundGroup {
                name: g.name.clone(),
                members: binder.flatten(&g.name)?,
            })
        })
        .collect::<W3dResult<Vec<_>>>()?;

    let frames = project
        .settings
        .frames
        .iter()
        .map(|f| {
            Ok(BoundFrame {
                name: f.name.clone(),
                placement: binder.placement(&f.placement)?,
            })
        })
        .collect::<W3dResult<Vec<_>>>()?;

    let mut entities = Vec::with_capacity(project.entities.len());
    for e in &project.entities {
        let link = match &e.link {
            Some(link) => {
                let mut lists = Vec::with_capacity(link.actions.len());
                for keyed in &link.actions {
                    lists.push((keyed.clicks, binder.list(&keyed.actions)?));
                }
                Some(BoundLink {
                    enabled: link.enabled,
                    remain_enabled: link.remain_enabled,
                    enabled_color: link.enabled_color,
                    selected_color: link.selected_color,
                    lists,
                    reset: link.reset,
                })
            }
            None => None,
        };
        entities.push(BoundEntity {
            name: e.name.clone(),
            placement: binder.placement(&e.placement)?,
            color: e.color,
            visible: e.visible,
            scale: e.scale,
            around_own_axis: e.around_own_axis,
            sound: match &e.sound {
                Some(s) => Some(lookup(&names.sounds, FeatureKind::Sound, s)?),
                None => None,
            },
            link,
        });
    }

    let sounds = project
        .sounds
        .iter()
        .map(|s| BoundSound {
            name: s.name.clone(),
            filename: s.filename.clone(),
            autostart: s.autostart,
            looping: s.looping,
            volume: s.volume,
        })
        .collect();

    let mut triggers = Vec::with_capacity(project.triggers.len());
    for t in &project.triggers {
        triggers.push(BoundTrigger {
            name: t.name.clone(),
            enabled: t.enabled,
            remain_enabled: t.remain_enabled,
            condition: binder.condition(&t.condition)?,
            enter: binder.list(&t.enter)?,
            exit: match &t.exit {
                Some(list) => Some(binder.list(list)?),
                None => None,
            },
        });
    }

    let mut timelines = Vec::with_capacity(project.timelines.len());
    for t in &project.timelines {
        let mut entries = Vec::with_capacity(t.actions.len());
        for timed in t.sorted() {
            entries.push((timed.offset.as_seconds(), binder.list(&timed.actions)?));
        }
        timelines.push(BoundTimeline {
            name: t.name.clone(),
            start_immediately: t.start_immediately,
            entries,
        });
    }

    let viewer = binder.placement(&project.settings.viewer)?;
    let lists = binder.lists;
    let resolve_order = resolve_order(&entities, &frames);

    tracing::debug!(
        "bound project {}: {} entities, {} triggers, {} timelines, {} action lists",
        project.id,
        entities.len(),
        triggers.len(),
        timelines.len(),
        lists.len()
    );

    Ok(BoundProject {
        entities,
        frames,
        groups,
        sounds,
        triggers,
        timelines,
        viewer,
        lists,
        resolve_order,
        names,
    })
}

struct Binder<'a> {
    project: &'a Project,
    names: &'a Names,
    lists: Vec<Vec<BoundAction>>,
}

impl Binder<'_> {
    fn frame_ref(&self, name: &str) -> W3dResult<FrameRef> {
        if name == CENTER {
            return Ok(FrameRef::Center);
        }
        if let Some(id) = self.names.frames.get(name) {
            return Ok(FrameRef::Frame(*id));
        }
        lookup(&self.names.entities, FeatureKind::Frame, name).map(FrameRef::Entity)
    }

    fn placement(&self, placement: &Placement) -> W3dResult<BoundPlacement> {
        Ok(BoundPlacement {
            frame: self.frame_ref(&placement.relative_to)?,
            position: placement.position,
            rotation: placement.rotation.clone(),
        })
    }

    fn flatten(&self, group: &str) -> W3dResult<Vec<EntityId>> {
        let mut members = Vec::new();
        let mut stack = vec![group];
        let mut seen_groups = Vec::new();
        // Depth-first, objects before nested groups, matching declaration order.
        while let Some(name) = stack.pop() {
            if seen_groups.contains(&name) {
                continue;
            }
            seen_groups.push(name);
            let decl = self
                .project
                .group(name)
                .ok_or_else(|| W3dError::unknown(FeatureKind::Group, name))?;
            for object in &decl.objects {
                let id = lookup(&self.names.entities, FeatureKind::Entity, object)?;
                if !members.contains(&id) {
                    members.push(id);
                }
            }
            for nested in decl.groups.iter().rev() {
                stack.push(nested);
            }
        }
        Ok(members)
    }

    fn condition(&self, condition: &TriggerCondition) -> W3dResult<BoundCondition> {
        let names = self.names;
        Ok(match condition {
            TriggerCondition::HeadOrientation { yaw, pitch } => BoundCondition::HeadOrientation {
                yaw: *yaw,
                pitch: *pitch,
            },
            TriggerCondition::HeadPosition { region } => BoundCondition::HeadPosition {
                region: region.clone(),
            },
            TriggerCondition::LookAtPoint { point, angle } => BoundCondition::LookAtPoint {
                point: *point,
                angle: *angle,
            },
            TriggerCondition::LookAtDirection { direction, angle } => {
                BoundCondition::LookAtDirection {
                    direction: *direction,
                    angle: *angle,
                }
            }
            TriggerCondition::LookAtObject { object, angle } => BoundCondition::LookAtObject {
                object: lookup(&names.entities, FeatureKind::Entity, object)?,
                angle: *angle,
            },
            TriggerCondition::ObjectMovement { source, region } => {
                let source = match source {
                    MovementSource::Object(o) => {
                        BoundSource::Object(lookup(&names.entities, FeatureKind::Entity, o)?)
                    }
                    MovementSource::GroupAny(g) => {
                        BoundSource::GroupAny(lookup(&names.groups, FeatureKind::Group, g)?)
                    }
                    MovementSource::GroupAll(g) => {
                        BoundSource::GroupAll(lookup(&names.groups, FeatureKind::Group, g)?)
                    }
                };
                BoundCondition::ObjectMovement {
                    source,
                    region: region.clone(),
                }
            }
        })
    }

    fn action(&self, action: &Action) -> W3dResult<BoundAction> {
        let names = self.names;
        Ok(match action {
            Action::Object {
                target,
                duration,
                change,
            } => {
                let target = match target {
                    w3d_ir::Target::Object(name) => {
                        BoundTarget::Entity(lookup(&names.entities, FeatureKind::Entity, name)?)
                    }
                    w3d_ir::Target::Group { group, policy } => BoundTarget::Group(
                        lookup(&names.groups, FeatureKind::Group, group)?,
                        *policy,
                    ),
                };
                let change = match change {
                    ObjectChange::Visible(v) => BoundChange::Visible(*v),
                    ObjectChange::Color(c) => BoundChange::Color(*c),
                    ObjectChange::Scale(s) => BoundChange::Scale(*s),
                    ObjectChange::Move {
                        placement,
                        relative,
                    } => BoundChange::Move {
                        placement: self.placement(placement)?,
                        relative: *relative,
                    },
                    ObjectChange::Sound(s) => BoundChange::Sound(*s),
                    ObjectChange::Link(l) => BoundChange::Link(*l),
                };
                BoundAction::Object {
                    target,
                    duration: duration.as_seconds(),
                    change,
                }
            }
            Action::Timeline { timeline, change } => BoundAction::Timeline {
                timeline: lookup(&names.timelines, FeatureKind::Timeline, timeline)?,
                change: *change,
            },
            Action::Sound { sound, change } => BoundAction::Sound {
                sound: lookup(&names.sounds, FeatureKind::Sound, sound)?,
                change: *change,
            },
            Action::Trigger { trigger, enable } => BoundAction::Trigger {
                trigger: lookup(&names.triggers, FeatureKind::Trigger, trigger)?,
                enable: *enable,
            },
            Action::MoveViewer {
                placement,
                relative,
                duration,
            } => BoundAction::MoveViewer {
                placement: self.placement(placement)?,
                relative: *relative,
                duration: duration.as_seconds(),
            },
            Action::Reset => BoundAction::Reset,
        })
    }

    /// Bind and intern an action list.
    fn list(&mut self, actions: &[Action]) -> W3dResult<ActionListId> {
        let bound = actions
            .iter()
            .map(|a| self.action(a))
            .collect::<W3dResult<Vec<_>>>()?;
        self.lists.push(bound);
        Ok(ActionListId(self.lists.len() - 1))
    }
}

/// Depth-first order over placement dependencies. Validation has already
/// ruled out cycles.
fn resolve_order(entities: &[BoundEntity], frames: &[BoundFrame]) -> Vec<EntityId> {
    fn anchor(frame: FrameRef, frames: &[BoundFrame]) -> Option<EntityId> {
        let mut current = frame;
        loop {
            match current {
                FrameRef::Center => return None,
                FrameRef::Entity(id) => return Some(id),
                FrameRef::Frame(id) => current = frames[id.0].placement.frame,
            }
        }
    }

    fn visit(
        id: EntityId,
        entities: &[BoundEntity],
        frames: &[BoundFrame],
        done: &mut Vec<bool>,
        order: &mut Vec<EntityId>,
    ) {
        if done[id.0] {
            return;
        }
        done[id.0] = true;
        if let Some(parent) = anchor(entities[id.0].placement.frame, frames) {
            visit(parent, entities, frames, done, order);
        }
        order.push(id);
    }

    let mut done = vec![false; entities.len()];
    let mut order = Vec::with_capacity(entities.len());
    for i in 0..entities.len() {
        visit(EntityId(i), entities, frames, &mut done, &mut order);
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use w3d_ir::{Entity, Group, Target, Timeline};

    fn text(name: &str) -> Entity {
        Entity::text(name, name)
    }

    #[test]
    fn test_bind_assigns_ids_in_declaration_order() {
        let mut project = Project::default();
        project.entities.push(text("a"));
        project.entities.push(text("b"));
        let bound = bind(&project).unwrap();
        assert_eq!(bound.entity_id("a").map(EntityId::index), Some(0));
        assert_eq!(bound.entity_id("b").map(EntityId::index), Some(1));
        assert!(bound.entity_id("c").is_none());
        assert_eq!(bound.frames.len(), 4);
        assert!(bound.frame_id("FrontWall").is_some());
    }

    #[test]
    fn test_bind_reports_all_validation_errors() {
        let mut project = Project::default();
        project.timelines.push(Timeline::new("t").at(
            0.0,
            vec![
                Action::object(Target::object("ghost"), ObjectChange::Visible(true)),
                Action::timeline("nope", TimelineChange::Start),
            ],
        ));
        match bind(&project) {
            Err(W3dError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_nested_groups_flatten_without_duplicates() {
        let mut project = Project::default();
        for name in ["a", "b", "c"] {
            project.entities.push(text(name));
        }
        project
            .groups
            .push(Group::new("outer").with_objects(["c"]).with_group("inner"));
        project
            .groups
            .push(Group::new("inner").with_objects(["a", "c", "b"]));
        let bound = bind(&project).unwrap();
        let outer = bound.group(bound.group_id("outer").unwrap());
        let names: Vec<&str> = outer
            .members
            .iter()
            .map(|id| bound.entity(*id).name.as_str())
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_resolve_order_puts_parents_first() {
        let mut project = Project::default();
        let mut child = text("child");
        child.placement = Placement::default().relative_to("parent");
        project.entities.push(child);
        project.entities.push(text("parent"));
        let bound = bind(&project).unwrap();
        let order: Vec<&str> = bound
            .resolve_order
            .iter()
            .map(|id| bound.entity(*id).name.as_str())
            .collect();
        assert_eq!(order, vec!["parent", "child"]);
    }

    #[test]
    fn test_action_lists_are_interned() {
        let mut project = Project::default();
        project.entities.push(text("a"));
        project.timelines.push(
            Timeline::new("t")
                .at(1.0, vec![Action::Reset])
                .at(0.0, vec![Action::object(Target::object("a"), ObjectChange::Scale(2.0))]),
        );
        let bound = bind(&project).unwrap();
        let timeline = bound.timeline(bound.timeline_id("t").unwrap());
        assert_eq!(timeline.entries.len(), 2);
        assert!(timeline.entries[0].0 < timeline.entries[1].0);
        assert!(matches!(
            bound.list(timeline.entries[0].1)[0],
            BoundAction::Object { .. }
        ));
        assert_eq!(bound.list(timeline.entries[1].1), &[BoundAction::Reset]);
    }
}
