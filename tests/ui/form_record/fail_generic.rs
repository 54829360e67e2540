use fieldrelay::form::FormRecord;

#[derive(FormRecord)]
struct Wrapper<T> {
    value: T,
}

fn main() {}
