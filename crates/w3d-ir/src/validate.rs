use std::collections::{HashMap, HashSet};

use w3d_core::{FeatureKind, W3dError};

use crate::action::{Action, ObjectChange, Target};
use crate::placement::{Placement, CENTER};
use crate::project::Project;
use crate::trigger::{EventBox, MovementSource, TriggerCondition};

/// Validate a project for structural correctness before it is bound.
///
/// Every problem found is reported, not just the first.
pub fn validate_project(project: &Project) -> Result<(), Vec<W3dError>> {
    let mut errors = Vec::new();

    check_names(project, &mut errors);
    check_placements(project, &mut errors);
    check_groups(project, &mut errors);
    check_entities(project, &mut errors);
    check_triggers(project, &mut errors);
    for action in project.all_actions() {
        check_action(project, action, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_names(project: &Project, errors: &mut Vec<W3dError>) {
    // Frames and entities share a namespace; Center is always taken.
    let mut frames: HashSet<&str> = HashSet::new();
    frames.insert(CENTER);
    for frame in &project.settings.frames {
        if !frames.insert(&frame.name) {
            errors.push(W3dError::duplicate(FeatureKind::Frame, &frame.name));
        }
    }
    for entity in &project.entities {
        if !frames.insert(&entity.name) {
            errors.push(W3dError::duplicate(FeatureKind::Entity, &entity.name));
        }
    }

    let mut check = |kind: FeatureKind, names: Vec<&str>| {
        let mut seen = HashSet::new();
        for name in names {
            if !seen.insert(name) {
                errors.push(W3dError::duplicate(kind, name));
            }
        }
    };
    check(
        FeatureKind::Group,
        project.groups.iter().map(|g| g.name.as_str()).collect(),
    );
    check(
        FeatureKind::Sound,
        project.sounds.iter().map(|s| s.name.as_str()).collect(),
    );
    check(
        FeatureKind::Trigger,
        project.triggers.iter().map(|t| t.name.as_str()).collect(),
    );
    check(
        FeatureKind::Timeline,
        project.timelines.iter().map(|t| t.name.as_str()).collect(),
    );
}

fn check_placement(project: &Project, owner: &str, placement: &Placement, errors: &mut Vec<W3dError>) {
    if !project.is_frame_name(&placement.relative_to) {
        errors.push(W3dError::unknown(FeatureKind::Frame, &placement.relative_to));
    }
    if !placement.position.is_finite() || !placement.rotation.is_finite() {
        errors.push(W3dError::InvalidArgument(format!(
            "placement of '{}' has a non-finite component",
            owner
        )));
    }
}

/// Declared frames and entity placements must form a forest rooted at Center.
fn check_placements(project: &Project, errors: &mut Vec<W3dError>) {
    check_placement(project, "viewer", &project.settings.viewer, errors);

    let mut parent: HashMap<&str, &str> = HashMap::new();
    for frame in &project.settings.frames {
        check_placement(project, &frame.name, &frame.placement, errors);
        parent.insert(&frame.name, &frame.placement.relative_to);
    }
    for entity in &project.entities {
        check_placement(project, &entity.name, &entity.placement, errors);
        parent.insert(&entity.name, &entity.placement.relative_to);
    }

    // Walk each chain; a cycle is reported once, from its first node in
    // declaration order.
    let mut reported: HashSet<&str> = HashSet::new();
    let starts = project
        .settings
        .frames
        .iter()
        .map(|f| f.name.as_str())
        .chain(project.entities.iter().map(|e| e.name.as_str()));
    for start in starts {
        let mut path: Vec<&str> = vec![start];
        let mut current = start;
        while let Some(&next) = parent.get(current) {
            if let Some(pos) = path.iter().position(|n| *n == next) {
                if path[pos..].iter().all(|n| !reported.contains(n)) {
                    errors.push(W3dError::PlacementCycle(next.to_string()));
                }
                reported.extend(path[pos..].iter().copied());
                break;
            }
            path.push(next);
            current = next;
        }
    }
}

/// Flatten a group's members in declaration order, without duplicates.
/// Unknown members and cycles are skipped; they are reported separately.
pub(crate) fn flatten_group<'a>(project: &'a Project, name: &str) -> Vec<&'a str> {
    fn walk<'a>(
        project: &'a Project,
        name: &str,
        visiting: &mut HashSet<String>,
        out: &mut Vec<&'a str>,
    ) {
        let Some(group) = project.group(name) else {
            return;
        };
        if !visiting.insert(group.name.clone()) {
            return;
        }
        for object in &group.objects {
            if project.entity(object).is_some() && !out.contains(&object.as_str()) {
                out.push(object);
            }
        }
        for nested in &group.groups {
            walk(project, nested, visiting, out);
        }
    }
    let mut out = Vec::new();
    walk(project, name, &mut HashSet::new(), &mut out);
    out
}

fn check_groups(project: &Project, errors: &mut Vec<W3dError>) {
    for group in &project.groups {
        for object in &group.objects {
            if project.entity(object).is_none() {
                errors.push(W3dError::unknown(FeatureKind::Entity, object));
            }
        }
        for nested in &group.groups {
            if project.group(nested).is_none() {
                errors.push(W3dError::unknown(FeatureKind::Group, nested));
            }
        }
        if group_reaches(project, &group.name, &group.name, &mut HashSet::new()) {
            errors.push(W3dError::GroupCycle(group.name.clone()));
        }
    }
}

fn group_reaches(project: &Project, from: &str, target: &str, seen: &mut HashSet<String>) -> bool {
    let Some(group) = project.group(from) else {
        return false;
    };
    for nested in &group.groups {
        if nested == target {
            return true;
        }
        if seen.insert(nested.clone()) && group_reaches(project, nested, target, seen) {
            return true;
        }
    }
    false
}

fn check_entities(project: &Project, errors: &mut Vec<W3dError>) {
    for entity in &project.entities {
        if let Some(sound) = &entity.sound {
            if project.sound(sound).is_none() {
                errors.push(W3dError::unknown(FeatureKind::Sound, sound));
            }
        }
        if !entity.scale.is_finite() || entity.scale < 0.0 {
            errors.push(W3dError::InvalidArgument(format!(
                "entity '{}' has invalid scale {}",
                entity.name, entity.scale
            )));
        }
        if !entity.color.is_finite() {
            errors.push(W3dError::InvalidArgument(format!(
                "entity '{}' has a non-finite color",
                entity.name
            )));
        }
        if let Some(link) = &entity.link {
            if !link.enabled_color.is_finite() || !link.selected_color.is_finite() {
                errors.push(W3dError::InvalidArgument(format!(
                    "link on '{}' has a non-finite color",
                    entity.name
                )));
            }
            if link.reset == Some(0) {
                errors.push(W3dError::InvalidArgument(format!(
                    "link on '{}' resets after zero clicks",
                    entity.name
                )));
            }
        }
    }
    for sound in &project.sounds {
        if !sound.volume.is_finite() || sound.volume < 0.0 {
            errors.push(W3dError::InvalidArgument(format!(
                "sound '{}' has invalid volume {}",
                sound.name, sound.volume
            )));
        }
    }
}

fn check_box(owner: &str, region: &EventBox, errors: &mut Vec<W3dError>) {
    if !region.corner1.is_finite() || !region.corner2.is_finite() {
        errors.push(W3dError::InvalidArgument(format!(
            "trigger '{}' has a non-finite box corner",
            owner
        )));
    }
}

fn check_triggers(project: &Project, errors: &mut Vec<W3dError>) {
    for trigger in &project.triggers {
        let name = trigger.name.as_str();
        let bad_angle = |angle: f32| !angle.is_finite() || angle < 0.0;
        match &trigger.condition {
            TriggerCondition::HeadOrientation { yaw, pitch } => {
                for (label, (min, max)) in [("yaw", yaw), ("pitch", pitch)] {
                    if !min.is_finite() || !max.is_finite() || min > max {
                        errors.push(W3dError::InvalidArgument(format!(
                            "trigger '{}' has an invalid {} range",
                            name, label
                        )));
                    }
                }
            }
            TriggerCondition::HeadPosition { region } => {
                if let Some(region) = region {
                    check_box(name, region, errors);
                }
            }
            TriggerCondition::LookAtPoint { point, angle } => {
                if !point.is_finite() || bad_angle(*angle) {
                    errors.push(W3dError::InvalidArgument(format!(
                        "trigger '{}' has an invalid gaze target",
                        name
                    )));
                }
            }
            TriggerCondition::LookAtDirection { direction, angle } => {
                if !direction.is_finite() || bad_angle(*angle) {
                    errors.push(W3dError::InvalidArgument(format!(
                        "trigger '{}' has an invalid gaze target",
                        name
                    )));
                }
            }
            TriggerCondition::LookAtObject { object, angle } => {
                if project.entity(object).is_none() {
                    errors.push(W3dError::unknown(FeatureKind::Entity, object));
                }
                if bad_angle(*angle) {
                    errors.push(W3dError::InvalidArgument(format!(
                        "trigger '{}' has an invalid gaze angle",
                        name
                    )));
                }
            }
            TriggerCondition::ObjectMovement { source, region } => {
                check_box(name, region, errors);
                match source {
                    MovementSource::Object(object) => {
                        if project.entity(object).is_none() {
                            errors.push(W3dError::unknown(FeatureKind::Entity, object));
                        }
                    }
                    MovementSource::GroupAny(group) | MovementSource::GroupAll(group) => {
                        if project.group(group).is_none() {
                            errors.push(W3dError::unknown(FeatureKind::Group, group));
                        } else if flatten_group(project, group).is_empty() {
                            errors.push(W3dError::EmptyGroup(group.clone()));
                        }
                    }
                }
            }
        }
    }
}

fn check_action(project: &Project, action: &Action, errors: &mut Vec<W3dError>) {
    match action {
        Action::Object {
            target,
            duration,
            change,
        } => {
            if !duration.as_seconds().is_finite() {
                errors.push(W3dError::InvalidArgument(
                    "object action has a non-finite duration".into(),
                ));
            }
            let members: Vec<&str> = match target {
                Target::Object(name) => {
                    if project.entity(name).is_none() {
                        errors.push(W3dError::unknown(FeatureKind::Entity, name));
                        return;
                    }
                    vec![name.as_str()]
                }
                Target::Group { group, .. } => {
                    if project.group(group).is_none() {
                        errors.push(W3dError::unknown(FeatureKind::Group, group));
                        return;
                    }
                    let members = flatten_group(project, group);
                    if members.is_empty() {
                        errors.push(W3dError::EmptyGroup(group.clone()));
                    }
                    members
                }
            };
            check_change(project, change, &members, errors);
        }
        Action::Timeline { timeline, .. } => {
            if project.timeline(timeline).is_none() {
                errors.push(W3dError::unknown(FeatureKind::Timeline, timeline));
            }
        }
        Action::Sound { sound, .. } => {
            if project.sound(sound).is_none() {
                errors.push(W3dError::unknown(FeatureKind::Sound, sound));
            }
        }
        Action::Trigger { trigger, .. } => {
            if project.trigger(trigger).is_none() {
                errors.push(W3dError::unknown(FeatureKind::Trigger, trigger));
            }
        }
        Action::MoveViewer {
            placement,
            duration,
            ..
        } => {
            check_placement(project, "viewer", placement, errors);
            if !duration.as_seconds().is_finite() {
                errors.push(W3dError::InvalidArgument(
                    "viewer move has a non-finite duration".into(),
                ));
            }
        }
        Action::Reset => {}
    }
}

fn check_change(project: &Project, change: &ObjectChange, members: &[&str], errors: &mut Vec<W3dError>) {
    match change {
        ObjectChange::Visible(_) => {}
        ObjectChange::Color(color) => {
            if !color.is_finite() {
                errors.push(W3dError::InvalidArgument(
                    "color change has a non-finite component".into(),
                ));
            }
        }
        ObjectChange::Scale(scale) => {
            if !scale.is_finite() || *scale < 0.0 {
                errors.push(W3dError::InvalidArgument(format!(
                    "invalid target scale {}",
                    scale
                )));
            }
        }
        ObjectChange::Move { placement, .. } => {
            let owner = members.first().copied().unwrap_or("move");
            check_placement(project, owner, placement, errors);
        }
        ObjectChange::Sound(_) => {
            for member in members {
                if project.entity(member).and_then(|e| e.sound.as_ref()).is_none() {
                    errors.push(W3dError::InvalidArgument(format!(
                        "entity '{}' has no sound to play",
                        member
                    )));
                }
            }
        }
        ObjectChange::Link(_) => {
            for member in members {
                if project.entity(member).and_then(|e| e.link.as_ref()).is_none() {
                    errors.push(W3dError::InvalidArgument(format!(
                        "entity '{}' has no link",
                        member
                    )));
                }
            }
        }
    }
}
