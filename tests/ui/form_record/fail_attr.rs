use fieldrelay::form::FormRecord;

#[derive(FormRecord)]
struct Login {
    #[form(rename = "user")]
    name: String,
}

fn main() {}
