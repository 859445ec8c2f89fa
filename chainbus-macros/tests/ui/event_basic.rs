use chainbus::event::{Event, ResultState};
use chainbus_macros::event;

#[event(kind = "account.login")]
#[derive(Debug, Clone, Default)]
struct LoginEvent {
    user: String,
}

fn main() {
    let mut ev = LoginEvent {
        user: "alice".into(),
        ..Default::default()
    };
    assert_eq!(LoginEvent::KIND, "account.login");
    assert_eq!(ev.kind(), "account.login");
    assert_eq!(ev.user, "alice");
    ev.state_mut().fail("denied");
    assert_eq!(ev.result(), ResultState::Fail);
}
