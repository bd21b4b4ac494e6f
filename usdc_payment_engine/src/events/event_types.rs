use crate::db_types::Order;

/// Emitted once an inbound deposit has been matched to an order and the order moved to `paid`.
///
/// This is the hand-off point between deposit reconciliation and payout orchestration. The event may be delivered
/// more than once (e.g. by the payout recovery worker). Handlers must tolerate that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPaidEvent {
    pub order: Order,
}

impl OrderPaidEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}
