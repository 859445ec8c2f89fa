use chainbus_macros::event;

#[event(name = "login")]
struct Login {
    id: u64,
}

fn main() {}
