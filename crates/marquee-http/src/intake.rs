//! Turns request parameters into a [`DisplayRequest`]
//!
//! Both endpoints funnel through [`build_request`], so query strings and
//! JSON bodies are validated, clamped and ordered identically.

use std::collections::HashMap;

use serde_json::Value;

use marquee_core::prelude::*;
use marquee_core::{truncate_chars, DisplayRequest};

/// Key carrying the text to show
pub const MESSAGE_KEY: &str = "message";

/// Optional keys and the renderer flag each maps to, in emission order
pub const ARGUMENT_FLAGS: [(&str, &str); 8] = [
    ("speed", "-s"),
    ("brightness", "-b"),
    ("xorigin", "-x"),
    ("yorigin", "-y"),
    ("spacing", "-S"),
    ("color", "-C"),
    ("background", "-B"),
    ("outline", "-O"),
];

/// Validate `params` and build a request.
///
/// Unknown keys and a missing `message` are rejected. The message is cut
/// to `max_chars` characters. If a key repeats, its last value wins.
pub fn build_request<I, K, V>(params: I, max_chars: usize) -> Result<DisplayRequest>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut message = None;
    let mut options: HashMap<&'static str, String> = HashMap::new();

    for (key, value) in params {
        let key = key.into();
        let value = value.into();
        if key == MESSAGE_KEY {
            message = Some(value);
            continue;
        }
        match ARGUMENT_FLAGS.iter().find(|(name, _)| *name == key) {
            Some((name, _)) => {
                options.insert(*name, value);
            }
            None => return Err(Error::unrecognized_argument(key)),
        }
    }

    let message =
        message.ok_or_else(|| Error::invalid_request(format!("missing `{}`", MESSAGE_KEY)))?;

    let mut extra_args = Vec::with_capacity(options.len() * 2);
    for (name, flag) in ARGUMENT_FLAGS {
        if let Some(value) = options.remove(name) {
            extra_args.push(flag.to_string());
            extra_args.push(value);
        }
    }

    let char_count = message.chars().count();
    if char_count > max_chars {
        debug!("Clamping message from {} to {} chars", char_count, max_chars);
    }

    Ok(DisplayRequest::new(
        extra_args,
        truncate_chars(&message, max_chars),
    ))
}

/// Flatten a JSON object into string pairs.
///
/// Strings pass through, numbers and booleans are rendered as text;
/// anything else is an [`Error::InvalidRequest`].
pub fn json_params(body: serde_json::Map<String, Value>) -> Result<Vec<(String, String)>> {
    body.into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(Error::invalid_request(format!(
                        "`{}` must be a string, number or boolean, got {}",
                        key, other
                    )))
                }
            };
            Ok((key, text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn object(value: Value) -> serde_json::Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_speed_maps_to_flag() {
        let req = build_request(pairs(&[("message", "hi"), ("speed", "5")]), 250).unwrap();
        assert_eq!(req.extra_args(), ["-s", "5"]);
        assert_eq!(req.text(), "hi");
    }

    #[test]
    fn test_flags_follow_fixed_order() {
        let req = build_request(
            pairs(&[
                ("outline", "0,0,0"),
                ("message", "hi"),
                ("color", "255,0,0"),
                ("speed", "3"),
            ]),
            250,
        )
        .unwrap();
        assert_eq!(
            req.extra_args(),
            ["-s", "3", "-C", "255,0,0", "-O", "0,0,0"]
        );
    }

    #[test]
    fn test_every_known_key_accepted() {
        let mut params = pairs(&[("message", "all")]);
        for (name, _) in ARGUMENT_FLAGS {
            params.push((name.to_string(), "1".to_string()));
        }
        let req = build_request(params, 250).unwrap();
        assert_eq!(req.extra_args().len(), 16);
        let flags: Vec<&str> = req.extra_args().iter().step_by(2).map(|s| s.as_str()).collect();
        assert_eq!(flags, ["-s", "-b", "-x", "-y", "-S", "-C", "-B", "-O"]);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = build_request(pairs(&[("message", "hi"), ("unknownkey", "5")]), 250).unwrap_err();
        assert!(matches!(err, Error::UnrecognizedArgument { ref key } if key == "unknownkey"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_fixed_flags_not_settable() {
        // loop and font are fixed by the renderer command line
        assert!(build_request(pairs(&[("message", "hi"), ("loop", "3")]), 250).is_err());
        assert!(build_request(pairs(&[("message", "hi"), ("font", "x.bdf")]), 250).is_err());
    }

    #[test]
    fn test_missing_message_rejected() {
        let err = build_request(pairs(&[("speed", "5")]), 250).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { .. }));
    }

    #[test]
    fn test_message_clamped_by_chars() {
        let long = "é".repeat(300);
        let req = build_request(pairs(&[("message", long.as_str())]), 250).unwrap();
        assert_eq!(req.text().chars().count(), 250);
    }

    #[test]
    fn test_repeated_key_last_wins() {
        let req = build_request(
            pairs(&[("message", "a"), ("speed", "1"), ("speed", "9"), ("message", "b")]),
            250,
        )
        .unwrap();
        assert_eq!(req.extra_args(), ["-s", "9"]);
        assert_eq!(req.text(), "b");
    }

    #[test]
    fn test_json_scalars_become_strings() {
        let params = json_params(object(json!({
            "message": "hi",
            "speed": 5,
            "brightness": 50.5,
            "outline": true
        })))
        .unwrap();
        let req = build_request(params, 250).unwrap();
        assert_eq!(
            req.extra_args(),
            ["-s", "5", "-b", "50.5", "-O", "true"]
        );
    }

    #[test]
    fn test_json_nested_values_rejected() {
        let err = json_params(object(json!({"message": "hi", "color": [1, 2, 3]}))).unwrap_err();
        assert!(err.to_string().contains("color"));

        assert!(json_params(object(json!({"message": null}))).is_err());
    }
}
