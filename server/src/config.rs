use std::env;
use std::fmt::Debug;
use std::str::FromStr;

/// Returns the value of the named environment variable if it exists or panics.
pub fn get_variable(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("must define {} environment variable", name))
}

/// Parses the named environment variable or panics.
pub fn parse_variable<T>(name: &str) -> T
where
    T: FromStr,
    T::Err: Debug,
{
    get_variable(name)
        .parse()
        .unwrap_or_else(|e| panic!("parse {} environment variable: {:?}", name, e))
}

/// Parses the named environment variable if it is set. Panics if it is
/// set but cannot be parsed.
pub fn parse_optional_variable<T>(name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Debug,
{
    env::var(name).ok().map(|value| {
        value
            .parse()
            .unwrap_or_else(|e| panic!("parse {} environment variable: {:?}", name, e))
    })
}
