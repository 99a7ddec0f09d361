//! Commands the host may send into a running session.

use serde::Deserialize;
use tui_match3_core::Session;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostCommand {
    Pause,
    Resume,
    SetVolume { volume: f32 },
}

impl HostCommand {
    /// Parse one JSON line.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }

    /// Apply to `session`. Returns whether anything changed.
    pub fn apply(self, session: &mut Session) -> bool {
        match self {
            HostCommand::Pause => session.pause(),
            HostCommand::Resume => session.resume(),
            HostCommand::SetVolume { volume } => {
                let before = (session.volume(), session.sound_enabled());
                session.set_volume(volume);
                before != (session.volume(), session.sound_enabled())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_match3_core::{CascadePacing, GameConfig};

    fn session() -> Session {
        Session::new(
            GameConfig::campaign()
                .with_seed(11)
                .with_pacing(CascadePacing::immediate()),
        )
    }

    #[test]
    fn test_parse_tagged_commands() {
        assert_eq!(HostCommand::parse(r#"{"type":"pause"}"#).unwrap(), HostCommand::Pause);
        assert_eq!(
            HostCommand::parse(" {\"type\":\"resume\"}\n").unwrap(),
            HostCommand::Resume
        );
        assert_eq!(
            HostCommand::parse(r#"{"type":"setVolume","volume":0.25}"#).unwrap(),
            HostCommand::SetVolume { volume: 0.25 }
        );
        assert!(HostCommand::parse(r#"{"type":"explode"}"#).is_err());
    }

    #[test]
    fn test_pause_and_resume_reach_session() {
        let mut session = session();
        assert!(HostCommand::Pause.apply(&mut session));
        assert!(session.is_paused());
        assert!(!HostCommand::Pause.apply(&mut session));
        assert!(HostCommand::Resume.apply(&mut session));
        assert!(!session.is_paused());
    }

    #[test]
    fn test_zero_volume_mutes() {
        let mut session = session();
        assert!(HostCommand::SetVolume { volume: 0.0 }.apply(&mut session));
        assert!(!session.sound_enabled());
        assert!(HostCommand::SetVolume { volume: 2.0 }.apply(&mut session));
        assert_eq!(session.volume(), 1.0);
        assert!(session.sound_enabled());
    }
}
