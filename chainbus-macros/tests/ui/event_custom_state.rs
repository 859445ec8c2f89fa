use chainbus::event::{Event, EventState};
use chainbus_macros::event;

#[event(kind = "audit", state = outcome)]
pub struct AuditEvent {
    pub outcome: EventState,
    pub actor: String,
}

fn main() {
    let mut ev = AuditEvent {
        outcome: EventState::builder().description("nightly audit").build(),
        actor: "system".into(),
    };
    ev.state_mut().abort_with_success();
    assert_eq!(ev.state().description(), "nightly audit");
    assert!(ev.is_success());
    assert_eq!(ev.actor, "system");
}
