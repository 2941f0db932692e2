//! Error handling foundation for the documentation site.
//!
//! Each crate defines its own domain error enum in its `error` module. Code
//! that composes several crates (startup wiring in particular) returns this
//! `Result`, turning the domain error into a rootcause `Report` with `?`.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_type_works() {
        let ok: Result<i32> = Ok(42);
        assert_eq!(ok.expect("should be ok"), 42);
    }
}
