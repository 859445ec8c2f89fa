use chainbus_macros::event;

#[event(kind = "")]
struct Nameless {
    id: u64,
}

fn main() {}
