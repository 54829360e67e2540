use fieldrelay::form::{FormData, FormRecord};

#[derive(Debug, PartialEq, fieldrelay::form::FormRecord)]
struct Signup {
    email: String,
    #[form(name = "age_years")]
    age: u8,
    referral: Option<String>,
}

fn main() {
    assert_eq!(Signup::FIELD_NAMES, &["email", "age_years", "referral"]);

    let data = FormData::from_iter([("email", "a@fieldrelay.dev"), ("age_years", "31")]);
    let record = data.decode::<Signup>().expect("decode");
    assert_eq!(
        record,
        Signup {
            email: "a@fieldrelay.dev".to_string(),
            age: 31,
            referral: None,
        }
    );
}
