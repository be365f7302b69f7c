use scramble_core::Position;

/// Per-player turn memory: up to two held positions, plus a pending-match
/// marker recorded when both held cards turn out to match.
///
/// Never destroyed once created — the player table grows monotonically
/// with distinct player ids, matching the source's player dictionary.
#[derive(Debug, Clone, Default)]
pub struct PlayerState {
    first_card: Option<Position>,
    second_card: Option<Position>,
    matched_pair: Option<(Position, Position)>,
}

impl PlayerState {
    pub fn first_card(&self) -> Option<Position> {
        self.first_card
    }
    pub fn second_card(&self) -> Option<Position> {
        self.second_card
    }
    pub fn matched_pair(&self) -> Option<(Position, Position)> {
        self.matched_pair
    }

    pub fn set_first_card(&mut self, pos: Option<Position>) {
        self.first_card = pos;
    }
    pub fn set_second_card(&mut self, pos: Option<Position>) {
        self.second_card = pos;
    }

    /// Records a matched pair for removal at the player's next turn boundary.
    pub fn mark_match(&mut self, a: Position, b: Position) {
        self.matched_pair = Some((a, b));
    }

    /// True iff either held position is set (spec.md §4.2 `hasControl`).
    pub fn has_control(&self) -> bool {
        self.first_card.is_some() || self.second_card.is_some()
    }

    /// A fresh set of the currently-held positions (spec.md §4.2
    /// `controlledPositions`). May include lingering positions whose card
    /// controller has already been cleared, pending cleanup.
    pub fn controlled_positions(&self) -> std::collections::HashSet<Position> {
        self.first_card.into_iter().chain(self.second_card).collect()
    }

    /// Resets all three fields. Idempotent.
    pub fn clear_state(&mut self) {
        self.first_card = None;
        self.second_card = None;
        self.matched_pair = None;
    }

    /// The dispatcher predicate from spec.md §9: route to `flipSecond` only
    /// if `first_card` is set, `second_card` is unset, and no match is
    /// pending (a player who just matched still has both set and must
    /// go through `flipFirst`'s cleanup before their next flip).
    pub fn is_mid_turn(&self) -> bool {
        self.first_card.is_some() && self.second_card.is_none() && self.matched_pair.is_none()
    }
}

/// A player id is valid iff non-empty and restricted to ASCII letters,
/// digits, and underscore.
pub fn is_valid_player_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_no_held_cards() {
        let state = PlayerState::default();
        assert_eq!(state.first_card(), None);
        assert_eq!(state.second_card(), None);
    }

    #[test]
    fn clear_state_is_idempotent() {
        let mut state = PlayerState::default();
        state.set_first_card(Some((0, 0)));
        state.mark_match((0, 0), (0, 1));
        state.clear_state();
        state.clear_state();
        assert_eq!(state.first_card(), None);
        assert_eq!(state.matched_pair(), None);
    }

    #[test]
    fn is_mid_turn_only_after_first_flip() {
        let mut state = PlayerState::default();
        assert!(!state.is_mid_turn());
        state.set_first_card(Some((0, 0)));
        assert!(state.is_mid_turn());
        state.set_second_card(Some((0, 1)));
        assert!(!state.is_mid_turn());
    }

    #[test]
    fn is_mid_turn_false_once_matched() {
        let mut state = PlayerState::default();
        state.set_first_card(Some((0, 0)));
        state.set_second_card(Some((0, 1)));
        state.mark_match((0, 0), (0, 1));
        state.set_second_card(None);
        // matched_pair set => route to flipFirst even though second is None
        assert!(!state.is_mid_turn());
    }

    #[test]
    fn has_control_and_controlled_positions() {
        let mut state = PlayerState::default();
        assert!(!state.has_control());
        state.set_first_card(Some((0, 0)));
        assert!(state.has_control());
        assert_eq!(state.controlled_positions(), [(0, 0)].into_iter().collect());
        state.set_second_card(Some((0, 1)));
        assert_eq!(state.controlled_positions(), [(0, 0), (0, 1)].into_iter().collect());
    }

    #[test]
    fn player_id_validation() {
        assert!(is_valid_player_id("p1"));
        assert!(is_valid_player_id("Player_1"));
        assert!(!is_valid_player_id(""));
        assert!(!is_valid_player_id("p 1"));
        assert!(!is_valid_player_id("p-1"));
    }
}
