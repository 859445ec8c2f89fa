use chainbus_macros::event;

#[event]
enum Status {
    Active,
}

fn main() {}
