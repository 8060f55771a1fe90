use w3d_core::Color;

use crate::bind::{ActionListId, BoundLink, BoundProject, EntityId};
use crate::host::{PointerInput, SceneHost};

#[derive(Debug, Clone, Default)]
struct LinkState {
    enabled: bool,
    clicks: u32,
    selected_this_tick: bool,
    /// Last highlight sent to the host.
    shown: Option<Color>,
}

/// Click counting and highlight tracking for every linked entity.
#[derive(Debug, Clone, Default)]
pub struct LinkTracker {
    states: Vec<Option<LinkState>>,
    hovered: Option<EntityId>,
}

impl LinkTracker {
    pub fn new(bound: &BoundProject) -> Self {
        let mut tracker = Self::default();
        tracker.reset(bound);
        tracker
    }

    /// Restore declared enablement and zero every counter. Highlights already
    /// shown stay recorded so the next flush clears them.
    pub fn reset(&mut self, bound: &BoundProject) {
        let previous = std::mem::take(&mut self.states);
        self.states = bound
            .entities
            .iter()
            .enumerate()
            .map(|(i, e)| {
                e.link.as_ref().map(|link| LinkState {
                    enabled: link.enabled,
                    clicks: 0,
                    selected_this_tick: false,
                    shown: previous
                        .get(i)
                        .and_then(|s| s.as_ref())
                        .and_then(|s| s.shown),
                })
            })
            .collect();
        self.hovered = None;
    }

    pub fn is_enabled(&self, entity: EntityId) -> bool {
        self.state(entity).is_some_and(|s| s.enabled)
    }

    pub fn clicks(&self, entity: EntityId) -> Option<u32> {
        self.state(entity).map(|s| s.clicks)
    }

    fn state(&self, entity: EntityId) -> Option<&LinkState> {
        self.states.get(entity.index()).and_then(Option::as_ref)
    }

    pub fn set_enabled(&mut self, entity: EntityId, enabled: bool) {
        if let Some(Some(state)) = self.states.get_mut(entity.index()) {
            state.enabled = enabled;
        }
    }

    /// Record the pointer and handle a selection. Returns the lists fired.
    pub fn pointer(&mut self, bound: &BoundProject, pointer: &PointerInput) -> Vec<ActionListId> {
        self.hovered = pointer
            .hovered
            .filter(|id| id.index() < bound.entities.len());
        match pointer.selected {
            Some(entity) => self.activate(bound, entity, false),
            None => Vec::new(),
        }
    }

    /// Click a link. Disabled links only fire when `force` is set.
    ///
    /// Fires every list keyed to any click or to the new click count, then
    /// applies the counter reset and `remain_enabled`.
    pub fn activate(
        &mut self,
        bound: &BoundProject,
        entity: EntityId,
        force: bool,
    ) -> Vec<ActionListId> {
        // Ids from another runtime are ignored.
        let Some(declared) = bound.entities.get(entity.index()) else {
            return Vec::new();
        };
        let Some(link) = declared.link.as_ref() else {
            return Vec::new();
        };
        let Some(Some(state)) = self.states.get_mut(entity.index()) else {
            return Vec::new();
        };
        if !state.enabled && !force {
            return Vec::new();
        }
        state.clicks += 1;
        state.selected_this_tick = true;
        let fired = fired_lists(link, state.clicks);
        tracing::debug!(
            "link '{}' clicked ({} click(s)), firing {} list(s)",
            declared.name,
            state.clicks,
            fired.len()
        );
        if link.reset.is_some_and(|n| state.clicks >= n) {
            state.clicks = 0;
        }
        if !link.remain_enabled {
            state.enabled = false;
        }
        fired
    }

    /// Send highlight changes to the host: the selected color on the tick a
    /// link is clicked, the hover color while hovered and enabled, else none.
    pub fn flush<H: SceneHost + ?Sized>(&mut self, bound: &BoundProject, host: &mut H) {
        let hovered = self.hovered;
        for (index, slot) in self.states.iter_mut().enumerate() {
            let Some(state) = slot else {
                continue;
            };
            let entity = EntityId::from_index(index);
            let Some(link) = bound.entity(entity).link.as_ref() else {
                continue;
            };
            let wanted = if state.selected_this_tick {
                Some(link.selected_color)
            } else if state.enabled && hovered == Some(entity) {
                Some(link.enabled_color)
            } else {
                None
            };
            state.selected_this_tick = false;
            if wanted != state.shown {
                state.shown = wanted;
                host.set_link_highlight(entity, wanted);
            }
        }
    }
}

fn fired_lists(link: &BoundLink, clicks: u32) -> Vec<ActionListId> {
    link.lists
        .iter()
        .filter(|(key, _)| key.map_or(true, |k| k == clicks))
        .map(|(_, list)| *list)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::bind;
    use crate::host::{HostCommand, RecordingHost};
    use w3d_ir::{Action, Entity, Link, Project};

    fn linked(link: Link) -> (BoundProject, EntityId) {
        let mut project = Project::default();
        let mut entity = Entity::text("button", "press");
        entity.link = Some(link);
        project.entities.push(entity);
        let bound = bind(&project).unwrap();
        let id = bound.entity_id("button").unwrap();
        (bound, id)
    }

    fn click(id: EntityId) -> PointerInput {
        PointerInput {
            hovered: Some(id),
            selected: Some(id),
        }
    }

    #[test]
    fn test_click_keys_and_reset() {
        let link = Link::on_click(vec![Action::Reset])
            .with_click(2, vec![])
            .with_reset(2);
        let (bound, id) = linked(link);
        let lists = &bound.entity(id).link.as_ref().unwrap().lists;
        let any = lists[0].1;
        let second = lists[1].1;
        let mut tracker = LinkTracker::new(&bound);

        assert_eq!(tracker.pointer(&bound, &click(id)), vec![any]);
        assert_eq!(tracker.pointer(&bound, &click(id)), vec![any, second]);
        assert_eq!(tracker.clicks(id), Some(0));
        assert_eq!(tracker.pointer(&bound, &click(id)), vec![any]);
    }

    #[test]
    fn test_remain_enabled_false() {
        let mut link = Link::on_click(vec![]);
        link.remain_enabled = false;
        let (bound, id) = linked(link);
        let mut tracker = LinkTracker::new(&bound);
        assert_eq!(tracker.pointer(&bound, &click(id)).len(), 1);
        assert!(!tracker.is_enabled(id));
        assert!(tracker.pointer(&bound, &click(id)).is_empty());
        assert_eq!(tracker.activate(&bound, id, true).len(), 1);
    }

    #[test]
    fn test_highlight_only_on_change() {
        let (bound, id) = linked(Link::on_click(vec![]));
        let link = bound.entity(id).link.clone().unwrap();
        let mut tracker = LinkTracker::new(&bound);
        let mut host = RecordingHost::new();

        tracker.pointer(
            &bound,
            &PointerInput {
                hovered: Some(id),
                selected: None,
            },
        );
        tracker.flush(&bound, &mut host);
        tracker.flush(&bound, &mut host);
        tracker.pointer(&bound, &click(id));
        tracker.flush(&bound, &mut host);
        tracker.pointer(&bound, &PointerInput::default());
        tracker.flush(&bound, &mut host);

        assert_eq!(
            host.commands,
            vec![
                HostCommand::SetLinkHighlight(id, Some(link.enabled_color)),
                HostCommand::SetLinkHighlight(id, Some(link.selected_color)),
                HostCommand::SetLinkHighlight(id, None),
            ]
        );
    }

    #[test]
    fn test_disabled_link_not_highlighted() {
        let mut link = Link::on_click(vec![]);
        link.enabled = false;
        let (bound, id) = linked(link);
        let mut tracker = LinkTracker::new(&bound);
        let mut host = RecordingHost::new();
        tracker.pointer(&bound, &click(id));
        tracker.flush(&bound, &mut host);
        assert!(host.commands.is_empty());
    }

    #[test]
    fn test_foreign_entity_ids_are_ignored() {
        let (bound, id) = linked(Link::on_click(vec![]));
        let foreign = EntityId::from_index(5);
        let mut tracker = LinkTracker::new(&bound);
        let mut host = RecordingHost::new();

        assert!(tracker.pointer(&bound, &click(foreign)).is_empty());
        assert!(tracker.activate(&bound, foreign, true).is_empty());
        tracker.flush(&bound, &mut host);
        assert!(host.commands.is_empty());
        assert_eq!(tracker.clicks(id), Some(0));
    }
}
