//! Balance board state.

use serde::{Deserialize, Serialize};

/// Raw load-cell values of a balance board, one per corner, plus the
/// on-board temperature sensor used for drift compensation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BalanceBoard {
    pub top_right: u16,
    pub bottom_right: u16,
    pub top_left: u16,
    pub bottom_left: u16,
    pub temperature: i32,
}
