use chainbus::event::{Event, EventState};
use chainbus_macros::event;

#[event]
struct OrderPlaced {
    order_id: u64,
}

fn main() {
    let ev = OrderPlaced {
        order_id: 7,
        state: EventState::default(),
    };
    assert_eq!(OrderPlaced::KIND, "OrderPlaced");
    assert_eq!(ev.order_id, 7);
    assert!(ev.is_success());
}
