use fieldrelay::form::FormRecord;

#[derive(FormRecord)]
struct Pair(String, String);

fn main() {}
