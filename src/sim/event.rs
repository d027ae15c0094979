/// Events emitted by the game for the presentation layer.
///
/// `GameEvent`s are one-shot cues (sound). `UiIntent`s describe overlay
/// changes; the front end keeps the resulting visibility state.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PointScored { score: u32 },
    Collision,
    LevelStarted { level: u32 },
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Overlay {
    CharacterSelection,
    PlayButton,
    Popup,
    GameOver,
    ReplayButton,
    ChangeCharacterButton,
    ScoreLabel,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Label {
    Score,
    PopupMessage,
    GameOverMessage,
    PauseButton,
    MuteButton,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum UiIntent {
    Show(Overlay),
    Hide(Overlay),
    SetLabel(Label, String),
}
