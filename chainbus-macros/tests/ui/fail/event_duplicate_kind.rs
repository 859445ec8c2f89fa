use chainbus_macros::event;

#[event(kind = "a", kind = "b")]
struct Twice {
    id: u64,
}

fn main() {}
