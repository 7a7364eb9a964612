use super::domain::OrderStatus;

/// Raised when a requested status change is not the immediate successor of
/// the order's current status.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("cannot move order from '{from}' to '{to}'")]
pub struct IllegalTransition {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// The single allowed successor of each status. The lifecycle is strictly
/// linear: no backward paths, no skipping ahead, `Delivered` is terminal.
pub const fn successor(status: OrderStatus) -> Option<OrderStatus> {
    match status {
        OrderStatus::AwaitingApproval => Some(OrderStatus::AwaitingFulfilment),
        OrderStatus::AwaitingFulfilment => Some(OrderStatus::Dispatched),
        OrderStatus::Dispatched => Some(OrderStatus::Delivered),
        OrderStatus::Delivered => None,
    }
}

/// Validate a requested transition centrally rather than trusting callers to
/// only offer valid next actions.
pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), IllegalTransition> {
    match successor(from) {
        Some(next) if next == to => Ok(()),
        _ => Err(IllegalTransition { from, to }),
    }
}
