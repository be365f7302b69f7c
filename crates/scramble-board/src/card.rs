use scramble_core::GameError;
use scramble_core::GameResult;

/// A single cell of the grid.
///
/// Invariants (checked after every mutation in debug builds via
/// [`Card::check_rep`]):
/// - `!on_board => !face_up && controller.is_none()`
/// - `!face_up => controller.is_none()`
/// - `value` is always non-empty and whitespace-free, even once removed, so
///   a tombstoned card retains a stable identity for match bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    value: String,
    on_board: bool,
    face_up: bool,
    controller: Option<String>,
    last_controller: Option<String>,
}

impl Card {
    /// Creates a face-down, uncontrolled, on-board card.
    ///
    /// # Panics
    /// Panics if `value` is empty or contains whitespace — callers that
    /// accept untrusted input (the parser, `Board::new`) must validate
    /// first and surface a [`GameError::InvalidInput`] instead.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        assert!(is_valid_label(&value), "card value must be non-empty and whitespace-free");
        Self {
            value,
            on_board: true,
            face_up: false,
            controller: None,
            last_controller: None,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
    pub fn on_board(&self) -> bool {
        self.on_board
    }
    pub fn face_up(&self) -> bool {
        self.face_up
    }
    pub fn controller(&self) -> Option<&str> {
        self.controller.as_deref()
    }
    #[allow(dead_code)]
    pub fn last_controller(&self) -> Option<&str> {
        self.last_controller.as_deref()
    }

    /// Turns the card face up. Fails if the card has been removed.
    pub fn flip_up(&mut self) -> GameResult<()> {
        if !self.on_board {
            return Err(GameError::invalid_state("cannot flip up a removed card"));
        }
        self.face_up = true;
        self.check_rep();
        Ok(())
    }

    /// Turns the card face down, clearing its controller.
    pub fn flip_down(&mut self) -> GameResult<()> {
        if !self.on_board {
            return Err(GameError::invalid_state("cannot flip down a removed card"));
        }
        self.face_up = false;
        self.set_controller_unchecked(None);
        self.check_rep();
        Ok(())
    }

    /// Sets the controlling player. Passing `None` always succeeds;
    /// passing `Some` fails if the card is removed or face-down.
    pub fn set_controller(&mut self, player: Option<String>) -> GameResult<()> {
        if player.is_some() {
            if !self.on_board {
                return Err(GameError::invalid_state("cannot control a removed card"));
            }
            if !self.face_up {
                return Err(GameError::invalid_state("cannot control a face-down card"));
            }
        }
        self.set_controller_unchecked(player);
        self.check_rep();
        Ok(())
    }

    fn set_controller_unchecked(&mut self, player: Option<String>) {
        if self.controller.is_some() {
            self.last_controller = self.controller.clone();
        }
        self.controller = player;
    }

    /// Removes the card from the board: terminal, clears face-up and
    /// controller, retains the label as a tombstone.
    pub fn remove(&mut self) {
        self.on_board = false;
        self.face_up = false;
        self.set_controller_unchecked(None);
        self.check_rep();
    }

    /// Relabels the card in place. Used by `Board::map`'s commit phase.
    pub(crate) fn relabel(&mut self, value: String) {
        debug_assert!(is_valid_label(&value));
        self.value = value;
    }

    fn check_rep(&self) {
        debug_assert!(is_valid_label(&self.value));
        if !self.on_board {
            debug_assert!(!self.face_up, "removed card must be face down");
            debug_assert!(self.controller.is_none(), "removed card must be uncontrolled");
        }
        if !self.face_up {
            debug_assert!(self.controller.is_none(), "face-down card must be uncontrolled");
        }
    }
}

/// A label is valid iff it is non-empty and contains no whitespace.
pub fn is_valid_label(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_card_is_face_down_uncontrolled_on_board() {
        let card = Card::new("A");
        assert!(card.on_board());
        assert!(!card.face_up());
        assert_eq!(card.controller(), None);
    }

    #[test]
    fn flip_up_then_down_clears_controller() {
        let mut card = Card::new("A");
        card.flip_up().unwrap();
        card.set_controller(Some("p1".into())).unwrap();
        card.flip_down().unwrap();
        assert!(!card.face_up());
        assert_eq!(card.controller(), None);
    }

    #[test]
    fn cannot_control_face_down_card() {
        let mut card = Card::new("A");
        assert!(card.set_controller(Some("p1".into())).is_err());
    }

    #[test]
    fn cannot_flip_removed_card() {
        let mut card = Card::new("A");
        card.remove();
        assert!(card.flip_up().is_err());
        assert!(card.flip_down().is_err());
    }

    #[test]
    fn remove_clears_controller_but_keeps_value() {
        let mut card = Card::new("A");
        card.flip_up().unwrap();
        card.set_controller(Some("p1".into())).unwrap();
        card.remove();
        assert!(!card.on_board());
        assert!(!card.face_up());
        assert_eq!(card.controller(), None);
        assert_eq!(card.value(), "A");
    }

    #[test]
    fn clearing_controller_always_succeeds() {
        let mut card = Card::new("A");
        assert!(card.set_controller(None).is_ok());
    }

    #[test]
    fn is_valid_label_rejects_empty_and_whitespace() {
        assert!(is_valid_label("A"));
        assert!(!is_valid_label(""));
        assert!(!is_valid_label("a b"));
        assert!(!is_valid_label("a\tb"));
    }
}
