use std::collections::BTreeMap;

use w3d_core::{Color, Transform};
use w3d_runtime::bind::BoundSound;
use w3d_runtime::{BoundProject, EntityId, SceneHost, SoundId};

/// A headless host that logs every mutation request and counts them by kind.
pub struct LogHost {
    entities: Vec<String>,
    sounds: Vec<String>,
    counts: BTreeMap<&'static str, u64>,
}

impl LogHost {
    pub fn new(bound: &BoundProject) -> Self {
        Self {
            entities: bound.entities.iter().map(|e| e.name.clone()).collect(),
            sounds: bound.sounds.iter().map(|s| s.name.clone()).collect(),
            counts: BTreeMap::new(),
        }
    }

    pub fn counts(&self) -> &BTreeMap<&'static str, u64> {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    fn entity(&self, id: EntityId) -> &str {
        self.entities.get(id.index()).map_or("?", String::as_str)
    }

    fn sound(&self, id: SoundId) -> &str {
        self.sounds.get(id.index()).map_or("?", String::as_str)
    }

    fn count(&mut self, kind: &'static str) {
        *self.counts.entry(kind).or_default() += 1;
    }
}

fn fmt_transform(t: &Transform) -> String {
    let p = t.position;
    let q = t.orientation;
    format!(
        "({:.3}, {:.3}, {:.3}) rot ({:.3}, {:.3}, {:.3}, {:.3})",
        p.x, p.y, p.z, q.x, q.y, q.z, q.w
    )
}

impl SceneHost for LogHost {
    fn set_transform(&mut self, entity: EntityId, transform: Transform) {
        self.count("transform");
        tracing::info!("{} -> {}", self.entity(entity), fmt_transform(&transform));
    }

    fn set_color(&mut self, entity: EntityId, color: Color) {
        self.count("color");
        tracing::info!("{} color {}", self.entity(entity), color);
    }

    fn set_visibility(&mut self, entity: EntityId, visible: bool, opacity: f32) {
        self.count("visibility");
        tracing::info!(
            "{} {} (opacity {:.3})",
            self.entity(entity),
            if visible { "visible" } else { "hidden" },
            opacity
        );
    }

    fn set_scale(&mut self, entity: EntityId, scale: f32) {
        self.count("scale");
        tracing::info!("{} scale {:.3}", self.entity(entity), scale);
    }

    fn set_viewer_transform(&mut self, transform: Transform) {
        self.count("viewer");
        tracing::info!("viewer -> {}", fmt_transform(&transform));
    }

    fn set_link_highlight(&mut self, entity: EntityId, color: Option<Color>) {
        self.count("highlight");
        match color {
            Some(c) => tracing::info!("{} highlighted {}", self.entity(entity), c),
            None => tracing::info!("{} unhighlighted", self.entity(entity)),
        }
    }

    fn play_sound(&mut self, sound: SoundId, clip: &BoundSound) {
        self.count("play");
        tracing::info!(
            "play '{}' ({}, volume {:.2}{})",
            self.sound(sound),
            clip.filename,
            clip.volume,
            if clip.looping { ", looping" } else { "" }
        );
    }

    fn stop_sound(&mut self, sound: SoundId) {
        self.count("stop");
        tracing::info!("stop '{}'", self.sound(sound));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use w3d_ir::{Entity, Project, Sound};
    use w3d_runtime::bind;

    #[test]
    fn test_counts_by_kind() {
        let mut project = Project::default();
        project.entities.push(Entity::text("hello", "Hello"));
        project.sounds.push(Sound::new("chime", "chime.wav"));
        let bound = bind(&project).unwrap();
        let entity = bound.entity_id("hello").unwrap();
        let sound = bound.sound_id("chime").unwrap();

        let mut host = LogHost::new(&bound);
        host.set_color(entity, Color::RED);
        host.set_color(entity, Color::BLUE);
        host.play_sound(sound, bound.sound(sound));
        host.stop_sound(sound);

        assert_eq!(host.counts().get("color"), Some(&2));
        assert_eq!(host.counts().get("play"), Some(&1));
        assert_eq!(host.total(), 4);
        assert_eq!(host.entity(entity), "hello");
    }
}
