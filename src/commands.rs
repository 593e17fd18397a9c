// Single-key commands for the level map.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Advance,
    Reset,
    ToggleInfo,
    ToggleMute,
}

impl Command {
    /// Maps a `KeyboardEvent.key` value. Keys held with a modifier are not commands.
    pub fn from_key(key: &str, modified: bool) -> Option<Command> {
        if modified {
            return None;
        }
        match key.to_ascii_lowercase().as_str() {
            "n" => Some(Command::Advance),
            "r" => Some(Command::Reset),
            "a" => Some(Command::ToggleInfo),
            "m" => Some(Command::ToggleMute),
            _ => None,
        }
    }

    pub fn hotkey(self) -> char {
        match self {
            Command::Advance => 'N',
            Command::Reset => 'R',
            Command::ToggleInfo => 'A',
            Command::ToggleMute => 'M',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_case_insensitive() {
        assert_eq!(Command::from_key("n", false), Some(Command::Advance));
        assert_eq!(Command::from_key("N", false), Some(Command::Advance));
        assert_eq!(Command::from_key("R", false), Some(Command::Reset));
        assert_eq!(Command::from_key("a", false), Some(Command::ToggleInfo));
        assert_eq!(Command::from_key("M", false), Some(Command::ToggleMute));
    }

    #[test]
    fn other_keys_and_modifiers_are_ignored() {
        assert_eq!(Command::from_key("x", false), None);
        assert_eq!(Command::from_key("Enter", false), None);
        assert_eq!(Command::from_key("nn", false), None);
        assert_eq!(Command::from_key("r", true), None);
    }

    #[test]
    fn hotkeys_map_back() {
        for cmd in [
            Command::Advance,
            Command::Reset,
            Command::ToggleInfo,
            Command::ToggleMute,
        ] {
            assert_eq!(
                Command::from_key(&cmd.hotkey().to_string(), false),
                Some(cmd)
            );
        }
    }
}
