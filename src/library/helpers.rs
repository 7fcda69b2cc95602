//! Various small helper functions

use std::any::Any;
use std::num::ParseIntError;
use std::time::Duration;

/// Parses a Duration from a string containing seconds.
/// Useful for command line parsing
pub fn parse_seconds(src: &str) -> Result<Duration, ParseIntError> {
    let seconds = src.parse::<u64>()?;
    Ok(Duration::from_secs(seconds))
}

/// Extracts a readable message from the payload of a caught panic
pub fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        Some((*message).to_owned())
    } else {
        payload.downcast_ref::<String>().cloned()
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use std::panic::catch_unwind;

    #[test]
    fn parse_seconds_from_string() {
        assert_eq!(parse_seconds("10"), Ok(Duration::from_secs(10)));
        assert!(parse_seconds("ten").is_err());
        assert!(parse_seconds("-1").is_err());
    }

    #[test]
    fn extract_static_panic_message() {
        let payload = catch_unwind(|| panic!("static message")).unwrap_err();
        assert_eq!(
            panic_message(payload.as_ref()),
            Some("static message".to_owned())
        );
    }

    #[test]
    fn extract_formatted_panic_message() {
        let value = 42;
        let payload = catch_unwind(|| panic!("formatted {}", value)).unwrap_err();
        assert_eq!(
            panic_message(payload.as_ref()),
            Some("formatted 42".to_owned())
        );
    }

    #[test]
    fn ignore_opaque_panic_payloads() {
        let payload = catch_unwind(|| std::panic::panic_any(42usize)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), None);
    }
}
