use fieldrelay::form::FormRecord;

#[derive(FormRecord)]
enum Choice {
    Yes,
    No,
}

fn main() {}
