use crate::card::is_valid_label;
use crate::card::Card;
use crate::format;
use crate::player::PlayerState;
use scramble_core::GameError;
use scramble_core::GameResult;
use scramble_core::Position;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::Mutex;
use tokio::sync::MutexGuard;
use tokio::sync::Notify;

/// The mutable half of a [`Board`]: everything that changes on a flip.
/// `rows`/`cols` never change after construction (`reset` preserves them) so
/// they live directly on `Board` instead, out from behind the lock.
struct BoardInner {
    grid: Vec<Card>,
    players: HashMap<String, PlayerState>,
    version: u64,
}

/// The concurrent game board. One `Board` is shared across every connected
/// player via `Arc<Board>`; every operation locks `inner` only for the
/// duration of its own critical section, never across a blocking wait.
///
/// Blocking is implemented with a `Notify` per grid cell plus one global
/// `watch_notify` for version-advance — never with polling. Every mutating
/// operation bumps `version` and calls `notify_waiters()` (broadcast, not
/// `notify_one()`) so that every blocked caller, not just one, gets a chance
/// to re-check its own predicate.
pub struct Board {
    rows: usize,
    cols: usize,
    inner: Mutex<BoardInner>,
    position_notify: Vec<Notify>,
    watch_notify: Notify,
}

fn pos_to_idx(pos: Position, cols: usize) -> usize {
    pos.0 * cols + pos.1
}

impl Board {
    /// Builds a board of the given dimensions from a row-major label list.
    pub fn new(rows: usize, cols: usize, labels: Vec<String>) -> GameResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(GameError::invalid_input("board dimensions must be positive"));
        }
        if labels.len() != rows * cols {
            return Err(GameError::invalid_input(format!(
                "expected {} labels for a {rows}x{cols} board, got {}",
                rows * cols,
                labels.len()
            )));
        }
        for label in &labels {
            if !is_valid_label(label) {
                return Err(GameError::invalid_input(format!("invalid card label {:?}", label)));
            }
        }
        let grid: Vec<Card> = labels.into_iter().map(Card::new).collect();
        let position_notify = grid.iter().map(|_| Notify::new()).collect();
        Ok(Self {
            rows,
            cols,
            inner: Mutex::new(BoardInner {
                grid,
                players: HashMap::new(),
                version: 0,
            }),
            position_notify,
            watch_notify: Notify::new(),
        })
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub async fn player_count(&self) -> usize {
        self.inner.lock().await.players.len()
    }

    fn validate_position(&self, pos: Position) -> GameResult<usize> {
        if pos.0 >= self.rows || pos.1 >= self.cols {
            return Err(GameError::invalid_input(format!(
                "position {:?} is out of bounds for a {}x{} board",
                pos, self.rows, self.cols
            )));
        }
        Ok(pos_to_idx(pos, self.cols))
    }

    /// Waits until `ready` holds of the locked state, then returns the held
    /// lock with `ready` still true. Race-free: `notify.notified()` is
    /// constructed and `enable()`d *before* the lock is taken and the
    /// predicate is checked, so a wakeup delivered between the check and the
    /// wait can never be missed (the standard tokio `Notify` recipe).
    async fn lock_when<F>(&self, notify: &Notify, mut ready: F) -> MutexGuard<'_, BoardInner>
    where
        F: FnMut(&BoardInner) -> bool,
    {
        loop {
            let notified = notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let guard = self.inner.lock().await;
            if ready(&guard) {
                return guard;
            }
            drop(guard);
            notified.await;
        }
    }

    /// A position is blocking for `player` iff some *other* player currently
    /// controls it. A removed or face-down card never blocks; the calling
    /// operation fails fast on removal instead of waiting forever.
    fn position_blocked(inner: &BoardInner, idx: usize, player: &str) -> bool {
        let card = &inner.grid[idx];
        card.on_board() && card.face_up() && card.controller().is_some_and(|c| c != player)
    }

    /// Rule 3 turn-boundary cleanup, run at the start of every `flipFirst`:
    /// a matched pair left from the player's previous turn is removed; an
    /// unmatched pair is flipped back down where still eligible (relinquish
    /// already cleared their controller in `flip_second`, so only a position
    /// a racing player has since taken over is left alone — spec.md §4.3.5).
    /// Returns the grid indices touched, so the caller can wake anyone
    /// blocked on them once the lock is released.
    fn run_cleanup(inner: &mut BoardInner, player: &str, cols: usize) -> Vec<usize> {
        let state = inner.players.entry(player.to_string()).or_default();
        let mut touched = Vec::new();

        if let Some((a, b)) = state.matched_pair() {
            debug_assert_eq!(
                state.controlled_positions(),
                [a, b].into_iter().collect(),
                "a marked match must be exactly the player's two held positions"
            );
            let (ia, ib) = (pos_to_idx(a, cols), pos_to_idx(b, cols));
            inner.grid[ia].remove();
            inner.grid[ib].remove();
            touched.push(ia);
            touched.push(ib);
            state.clear_state();
        } else if let (Some(a), Some(b)) = (state.first_card(), state.second_card()) {
            for idx in [pos_to_idx(a, cols), pos_to_idx(b, cols)] {
                let card = &mut inner.grid[idx];
                if card.on_board() && card.face_up() && card.controller().is_none() {
                    card.flip_down().expect("checked on_board above");
                    touched.push(idx);
                }
            }
            state.clear_state();
        }

        debug_assert!(!state.has_control(), "clear_state must leave no held positions");
        touched
    }

    /// Wakes every waiter on `touched` positions plus the global watch.
    /// Called only after the lock guarding `touched`'s mutation has been
    /// dropped — never while still held, or a waiter could re-lock and spin
    /// against us.
    fn broadcast(&self, touched: &[usize]) {
        for idx in touched {
            self.position_notify[*idx].notify_waiters();
        }
        self.watch_notify.notify_waiters();
    }

    /// Renders the board from `player`'s perspective without mutating any
    /// turn state. Safe to call for a player id that has never flipped.
    pub async fn look(&self, player: &str) -> String {
        let inner = self.inner.lock().await;
        format::render(self.rows, self.cols, &inner.grid, Some(player))
    }

    /// Blocks until the board's version advances past the one observed at
    /// call time, then renders a snapshot with a sentinel viewer that
    /// controls nothing, so no position ever renders as `my` (spec.md
    /// §4.3.7 — `watch` is not taken on behalf of any particular player's
    /// turn state, unlike `look`).
    pub async fn watch(&self, _player: &str) -> String {
        let start_version = self.inner.lock().await.version;
        let inner = self
            .lock_when(&self.watch_notify, |inner| inner.version != start_version)
            .await;
        format::render(self.rows, self.cols, &inner.grid, None)
    }

    /// Dispatches to `flip_first` or `flip_second` depending on whether
    /// `player` is already mid-turn (holds exactly one card with no match
    /// pending — spec.md §9's routing rule).
    pub async fn flip(&self, player: &str, pos: Position) -> GameResult<String> {
        let mid_turn = {
            let inner = self.inner.lock().await;
            inner.players.get(player).is_some_and(PlayerState::is_mid_turn)
        };
        if mid_turn {
            self.flip_second(player, pos).await
        } else {
            self.flip_first(player, pos).await
        }
    }

    /// The first flip of a turn: runs turn-boundary cleanup, then blocks
    /// until the target position is not controlled by another player, then
    /// takes control of it.
    async fn flip_first(&self, player: &str, pos: Position) -> GameResult<String> {
        let idx = self.validate_position(pos)?;

        let mut guard = self
            .lock_when(&self.position_notify[idx], |inner| !Self::position_blocked(inner, idx, player))
            .await;

        let touched = Self::run_cleanup(&mut guard, player, self.cols);

        let card = &mut guard.grid[idx];
        if !card.on_board() {
            if !touched.is_empty() {
                guard.version = guard.version.wrapping_add(1);
            }
            drop(guard);
            self.broadcast(&touched);
            return Err(GameError::removed());
        }
        if !card.face_up() {
            card.flip_up()?;
        }
        card.set_controller(Some(player.to_string()))?;

        let state = guard.players.entry(player.to_string()).or_default();
        state.set_first_card(Some(pos));
        guard.version = guard.version.wrapping_add(1);

        let rendered = format::render(self.rows, self.cols, &guard.grid, Some(player));
        drop(guard);
        self.broadcast(&touched);
        self.watch_notify.notify_waiters();
        Ok(rendered)
    }

    /// The second flip of a turn. Unlike `flip_first`, this never blocks
    /// (spec.md §4.3.2): a target that is removed or already face-up and
    /// controlled by anyone, including the caller, is an immediate error,
    /// after relinquishing the caller's first card so it doesn't linger
    /// controlled while nobody holds a second card for it.
    async fn flip_second(&self, player: &str, pos: Position) -> GameResult<String> {
        let idx = self.validate_position(pos)?;

        let mut guard = self.inner.lock().await;

        let first_pos = guard
            .players
            .get(player)
            .and_then(PlayerState::first_card)
            .ok_or_else(|| GameError::invalid_state("flipSecond called without a held first card"))?;
        if first_pos == pos {
            return Err(GameError::invalid_input("cannot flip the same position twice in one turn"));
        }
        let first_idx = pos_to_idx(first_pos, self.cols);

        let target = &guard.grid[idx];
        let removed = !target.on_board();
        let controlled = !removed && target.face_up() && target.controller().is_some();

        if removed || controlled {
            guard.grid[first_idx]
                .set_controller(None)
                .expect("first card was just controlled by this player, so it is on board and face up");
            let state = guard.players.get_mut(player).expect("checked above");
            state.set_first_card(None);
            guard.version = guard.version.wrapping_add(1);
            drop(guard);
            self.broadcast(&[first_idx]);
            return Err(if removed { GameError::removed() } else { GameError::controlled() });
        }

        if !guard.grid[idx].face_up() {
            guard.grid[idx].flip_up()?;
        }
        guard.grid[idx].set_controller(Some(player.to_string()))?;

        let matched = guard.grid[first_idx].value() == guard.grid[idx].value();
        if matched {
            let state = guard.players.get_mut(player).expect("checked above");
            state.set_second_card(Some(pos));
            state.mark_match(first_pos, pos);
        } else {
            // Relinquish both cards immediately: the controller clears now,
            // but both positions stay in the player's state (lingering) so
            // rule 3-B can flip them down at this player's next turn.
            guard.grid[first_idx].set_controller(None).expect("still on board and face up");
            guard.grid[idx].set_controller(None).expect("just controlled above");
            let state = guard.players.get_mut(player).expect("checked above");
            state.set_second_card(Some(pos));
        }
        guard.version = guard.version.wrapping_add(1);

        let rendered = format::render(self.rows, self.cols, &guard.grid, Some(player));
        drop(guard);
        if !matched {
            self.broadcast(&[first_idx, idx]);
        } else {
            self.watch_notify.notify_waiters();
        }
        Ok(rendered)
    }

    /// Relabels the board while preserving the partition "two cards match
    /// iff their labels are equal" (spec.md §4.3.6). Three phases, with the
    /// lock released between each: snapshot the current label groups, run
    /// `transform` per distinct label with no lock held (transformers may be
    /// slow or themselves suspend), then commit each group under its own
    /// lock acquisition. A concurrent flip therefore never observes a
    /// half-relabeled group: it sees the full old label or the full new one,
    /// never a mix, because one group commits atomically and independently
    /// of the others. If `transform` maps two distinct original labels to
    /// the same new label, their groups simply merge — spec.md §4.3.6 only
    /// requires each new label to be non-empty and whitespace-free, and
    /// explicitly tolerates this kind of collision elsewhere in the commit
    /// phase ("last-writer-wins per group").
    pub async fn map<F, Fut>(&self, transform: F) -> GameResult<()>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = String>,
    {
        let groups: HashMap<String, Vec<usize>> = {
            let guard = self.inner.lock().await;
            let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
            for (idx, card) in guard.grid.iter().enumerate() {
                if card.on_board() {
                    groups.entry(card.value().to_string()).or_default().push(idx);
                }
            }
            groups
        };

        let renamed = futures::future::join_all(groups.keys().cloned().map(|label| {
            let transform = &transform;
            async move {
                let new_label = transform(label.clone()).await;
                (label, new_label)
            }
        }))
        .await;

        let mut mapping = HashMap::with_capacity(renamed.len());
        for (old, new) in renamed {
            if !is_valid_label(&new) {
                return Err(GameError::invalid_input(format!("map produced invalid label {:?}", new)));
            }
            mapping.insert(old, new);
        }

        for (old_label, positions) in &groups {
            let new_label = mapping.get(old_label).expect("every group was covered by the transform pass");
            let mut guard = self.inner.lock().await;
            for &idx in positions {
                if guard.grid[idx].on_board() {
                    guard.grid[idx].relabel(new_label.clone());
                }
            }
            guard.version = guard.version.wrapping_add(1);
            drop(guard);
            self.watch_notify.notify_waiters();
        }
        Ok(())
    }

    /// Replaces the board's contents in place, preserving dimensions and
    /// discarding all player turn state. Not part of the original flip
    /// protocol; exposed for test fixtures and the `/reset` operator
    /// endpoint. Does not wait for in-progress turns — callers that need
    /// that guarantee should drive play to a natural pause first.
    pub async fn reset(&self, labels: Vec<String>) -> GameResult<()> {
        if labels.len() != self.rows * self.cols {
            return Err(GameError::invalid_input(format!(
                "expected {} labels for a {}x{} board, got {}",
                self.rows * self.cols,
                self.rows,
                self.cols,
                labels.len()
            )));
        }
        for label in &labels {
            if !is_valid_label(label) {
                return Err(GameError::invalid_input(format!("invalid card label {:?}", label)));
            }
        }

        let mut guard = self.inner.lock().await;
        guard.grid = labels.into_iter().map(Card::new).collect();
        guard.players.clear();
        guard.version = guard.version.wrapping_add(1);
        drop(guard);

        for notify in &self.position_notify {
            notify.notify_waiters();
        }
        self.watch_notify.notify_waiters();
        Ok(())
    }
}
