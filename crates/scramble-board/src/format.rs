use crate::card::Card;

/// Renders a player-relative textual snapshot of the grid: a `rows x cols`
/// header line followed by one line per cell in row-major order.
///
/// `viewer` is the id whose own flips render as `my LABEL`; pass `None` to
/// render every face-up card as `up LABEL` regardless of controller (used
/// by `watch`, whose sentinel viewer controls nothing).
pub fn render(rows: usize, cols: usize, grid: &[Card], viewer: Option<&str>) -> String {
    let mut out = String::with_capacity(grid.len() * 8 + 16);
    out.push_str(&format!("{}x{}\n", rows, cols));
    for card in grid {
        if !card.on_board() {
            out.push_str("none\n");
        } else if !card.face_up() {
            out.push_str("down\n");
        } else if viewer.is_some() && card.controller() == viewer {
            out.push_str("my ");
            out.push_str(card.value());
            out.push('\n');
        } else {
            out.push_str("up ");
            out.push_str(card.value());
            out.push('\n');
        }
    }
    out
}
