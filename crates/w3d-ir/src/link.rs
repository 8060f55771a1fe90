use serde::{Deserialize, Serialize};
use w3d_core::Color;

use crate::action::Action;

/// An action list keyed by click count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkActions {
    /// Fire on this click number only; `None` fires on every click.
    #[serde(default)]
    pub clicks: Option<u32>,
    pub actions: Vec<Action>,
}

/// Makes an entity selectable with the pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// When false, the link disables itself after its first selection.
    #[serde(default = "default_true")]
    pub remain_enabled: bool,
    /// Highlight while hovered.
    #[serde(default = "default_enabled_color")]
    pub enabled_color: Color,
    /// Highlight on the tick the link is selected.
    #[serde(default = "default_selected_color")]
    pub selected_color: Color,
    #[serde(default)]
    pub actions: Vec<LinkActions>,
    /// The click counter returns to zero after this many clicks.
    #[serde(default)]
    pub reset: Option<u32>,
}

fn default_true() -> bool {
    true
}

fn default_enabled_color() -> Color {
    Color::from_rgb8(0, 128, 255)
}

fn default_selected_color() -> Color {
    Color::RED
}

impl Link {
    /// An enabled link firing `actions` on every click.
    pub fn on_click(actions: Vec<Action>) -> Self {
        Self {
            enabled: true,
            remain_enabled: true,
            enabled_color: default_enabled_color(),
            selected_color: default_selected_color(),
            actions: vec![LinkActions {
                clicks: None,
                actions,
            }],
            reset: None,
        }
    }

    /// Builder: add an action list firing on click number `clicks`.
    pub fn with_click(mut self, clicks: u32, actions: Vec<Action>) -> Self {
        self.actions.push(LinkActions {
            clicks: Some(clicks),
            actions,
        });
        self
    }

    /// Builder: reset the counter after `clicks` clicks.
    pub fn with_reset(mut self, clicks: u32) -> Self {
        self.reset = Some(clicks);
        self
    }

    /// Every action of every click list, in declaration order.
    pub fn all_actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().flat_map(|list| list.actions.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_defaults() {
        let link: Link = serde_json::from_str(r#"{"actions": []}"#).unwrap();
        assert!(link.enabled);
        assert!(link.remain_enabled);
        assert_eq!(link.selected_color, Color::RED);
        assert!(link.reset.is_none());
    }

    #[test]
    fn test_link_click_lists() {
        let link = Link::on_click(vec![Action::Reset])
            .with_click(2, vec![Action::Reset, Action::Reset])
            .with_reset(3);
        assert_eq!(link.actions.len(), 2);
        assert_eq!(link.actions[1].clicks, Some(2));
        assert_eq!(link.all_actions().count(), 3);
        assert_eq!(link.reset, Some(3));
    }
}
