use std::borrow::Cow;
use trip_derive::trip_error;

#[trip_error]
pub enum CounterError {
    #[error("Counter file unreadable{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Counter overflow{}: {message}", format_context(.context))]
    Overflow { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal counter error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read_counter() -> Result<String, CounterError> {
    std::fs::read_to_string("/definitely/not/here").context("Reading registration counter")
}

fn main() {
    let err = read_counter().unwrap_err();
    assert!(err.to_string().contains("(Reading registration counter)"));

    let internal: CounterError = "boom".into();
    assert_eq!(internal.to_string(), "Internal counter error: boom");

    let overflow: Result<(), CounterError> =
        Err(CounterError::Overflow { message: "ten".into(), context: None });
    let overflow = overflow.context("increment").unwrap_err();
    assert_eq!(overflow.to_string(), "Counter overflow (increment): ten");
}
