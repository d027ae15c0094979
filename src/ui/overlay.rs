/// Overlay state kept by the front end.
///
/// The game never draws menus itself; it emits `UiIntent`s and this
/// struct remembers what is visible and what each label says.

use std::collections::{HashMap, HashSet};

use crate::sim::event::{Label, Overlay, UiIntent};

#[derive(Clone, Debug, Default)]
pub struct Overlays {
    visible: HashSet<Overlay>,
    labels: HashMap<Label, String>,
}

impl Overlays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, intents: impl IntoIterator<Item = UiIntent>) {
        for intent in intents {
            match intent {
                UiIntent::Show(o) => { self.visible.insert(o); }
                UiIntent::Hide(o) => { self.visible.remove(&o); }
                UiIntent::SetLabel(l, text) => { self.labels.insert(l, text); }
            }
        }
    }

    pub fn is_shown(&self, overlay: Overlay) -> bool {
        self.visible.contains(&overlay)
    }

    pub fn label(&self, label: Label) -> &str {
        self.labels.get(&label).map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::actor::Character;
    use crate::sim::game::Game;

    #[test]
    fn later_intents_win() {
        let mut o = Overlays::new();
        o.apply([
            UiIntent::Show(Overlay::Popup),
            UiIntent::SetLabel(Label::Score, "3".into()),
            UiIntent::Hide(Overlay::Popup),
            UiIntent::SetLabel(Label::Score, "4".into()),
        ]);
        assert!(!o.is_shown(Overlay::Popup));
        assert_eq!(o.label(Label::Score), "4");
        assert_eq!(o.label(Label::PopupMessage), "");
    }

    #[test]
    fn follows_a_game_from_selection_to_play() {
        let mut g = Game::new(&GameConfig::default(), 3);
        let mut o = Overlays::new();
        o.apply(g.take_intents());
        assert!(o.is_shown(Overlay::CharacterSelection));
        assert!(!o.is_shown(Overlay::PlayButton));

        g.select_character(Character::Ember);
        o.apply(g.take_intents());
        assert!(o.is_shown(Overlay::PlayButton));

        g.start();
        o.apply(g.take_intents());
        assert!(!o.is_shown(Overlay::CharacterSelection));
        assert!(o.is_shown(Overlay::ScoreLabel));
        assert_eq!(o.label(Label::Score), "0");
    }
}
