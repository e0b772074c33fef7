use crate::player::state::FilterKind;

/// The command surface the hosting bot framework maps its slash commands
/// onto, one variant per user-facing action.
#[derive(Debug, Clone)]
pub enum PlayerCommand {
    Play { query: String, force_play: bool },
    Skip,
    Previous,
    Stop,
    JumpTo { index: usize, from_history: bool },
    TogglePause,
    SetVolume(u8),
    ToggleFilter(FilterKind),
    Disconnect,
}
