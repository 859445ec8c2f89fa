use chainbus_macros::event;

#[event]
struct Pair(u64, u64);

fn main() {}
