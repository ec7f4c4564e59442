//! Preview playback state: the single playing reference and its timing

use std::time::Instant;

use super::content::Melody;

/// Metadata of the melody whose preview is playing.
#[derive(Clone, Debug)]
pub struct NowPlaying {
    pub melody_id: String,
    pub title: String,
    pub producer: String,
    pub duration_ms: u32,
}

impl NowPlaying {
    pub fn from_melody(melody: &Melody) -> Self {
        Self {
            melody_id: melody.id.clone(),
            title: melody.title.clone(),
            producer: melody.producer.clone(),
            duration_ms: melody.duration_ms,
        }
    }
}

/// A running preview. Previews have no pause; progress is wall-clock from
/// the start instant, capped at the melody duration.
#[derive(Clone, Debug)]
pub struct PreviewSession {
    pub info: NowPlaying,
    started_at: Instant,
}

impl PreviewSession {
    pub fn begin(info: NowPlaying) -> Self {
        Self { info, started_at: Instant::now() }
    }

    pub fn elapsed_ms(&self) -> u32 {
        let elapsed = self.started_at.elapsed().as_millis() as u32;
        elapsed.min(self.info.duration_ms)
    }
}

/// Outcome of a play toggle on an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    Started,
    Stopped,
}

/// The single playing reference. At most one melody plays at a time:
/// toggling the playing one clears it, toggling another replaces it.
#[derive(Clone, Debug, Default)]
pub struct PlayerState {
    pub playing_id: Option<String>,
    pub visible: bool,
    pub autoplay: bool,
}

impl PlayerState {
    pub fn toggle(&mut self, melody_id: &str) -> ToggleOutcome {
        if self.is_playing(melody_id) {
            self.clear();
            ToggleOutcome::Stopped
        } else {
            self.playing_id = Some(melody_id.to_string());
            self.visible = true;
            self.autoplay = true;
            ToggleOutcome::Started
        }
    }

    pub fn clear(&mut self) {
        self.playing_id = None;
        self.visible = false;
        self.autoplay = false;
    }

    pub fn is_playing(&self, melody_id: &str) -> bool {
        self.playing_id.as_deref() == Some(melody_id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Next,
    Previous,
}

/// Position of the adjacent entry relative to the playing id within the
/// displayed order. Clamps at both ends (no wraparound); `None` means the
/// move is a no-op, including when nothing is playing or the playing item
/// was filtered out of the displayed list.
pub fn adjacent_position(displayed_ids: &[String], playing: Option<&str>, step: Step) -> Option<usize> {
    let playing = playing?;
    let pos = displayed_ids.iter().position(|id| id == playing)?;
    match step {
        Step::Next => {
            if pos + 1 < displayed_ids.len() {
                Some(pos + 1)
            } else {
                None
            }
        }
        Step::Previous => pos.checked_sub(1),
    }
}

/// Snapshot handed to the view for the player bar.
#[derive(Clone, Debug, Default)]
pub struct PlaybackView {
    pub current: Option<(NowPlaying, u32)>,
    pub visible: bool,
    pub autoplay: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn toggling_same_id_twice_returns_to_idle() {
        let mut state = PlayerState::default();
        assert_eq!(state.toggle("m1"), ToggleOutcome::Started);
        assert!(state.visible);
        assert!(state.autoplay);

        assert_eq!(state.toggle("m1"), ToggleOutcome::Stopped);
        assert_eq!(state.playing_id, None);
        assert!(!state.visible);
    }

    #[test]
    fn toggling_a_different_id_replaces_the_reference() {
        let mut state = PlayerState::default();
        state.toggle("m1");
        assert_eq!(state.toggle("m2"), ToggleOutcome::Started);
        assert_eq!(state.playing_id.as_deref(), Some("m2"));
        assert!(state.visible);
    }

    #[test]
    fn next_clamps_at_the_last_entry() {
        let list = ids(&["a", "b", "c"]);
        assert_eq!(adjacent_position(&list, Some("b"), Step::Next), Some(2));
        assert_eq!(adjacent_position(&list, Some("c"), Step::Next), None);
    }

    #[test]
    fn previous_clamps_at_the_first_entry() {
        let list = ids(&["a", "b", "c"]);
        assert_eq!(adjacent_position(&list, Some("b"), Step::Previous), Some(0));
        assert_eq!(adjacent_position(&list, Some("a"), Step::Previous), None);
    }

    #[test]
    fn moves_are_noops_when_nothing_plays_or_item_not_displayed() {
        let list = ids(&["a", "b"]);
        assert_eq!(adjacent_position(&list, None, Step::Next), None);
        // Playing item filtered out of the displayed list.
        assert_eq!(adjacent_position(&list, Some("z"), Step::Previous), None);
    }

    #[test]
    fn elapsed_is_capped_at_duration() {
        let session = PreviewSession::begin(NowPlaying {
            melody_id: "m1".to_string(),
            title: "T".to_string(),
            producer: "P".to_string(),
            duration_ms: 0,
        });
        assert_eq!(session.elapsed_ms(), 0);
    }
}
