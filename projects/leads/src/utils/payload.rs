use serde_json::Value;

/// Which layout the leads array was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// The body itself is the array.
    RootArray,
    /// `{"resultObject": [...]}`
    ResultObjectArray,
    /// `{"resultObject": "[...]"}`, the array serialized a second time.
    ResultObjectString,
    Unrecognized,
}

#[derive(Debug, Clone)]
pub struct NormalizedPayload {
    pub shape: PayloadShape,
    pub leads: Vec<Value>,
}

impl NormalizedPayload {
    fn unrecognized() -> Self {
        NormalizedPayload {
            shape: PayloadShape::Unrecognized,
            leads: Vec::new(),
        }
    }

    fn found(shape: PayloadShape, leads: Vec<Value>) -> Self {
        NormalizedPayload { shape, leads }
    }
}

/// Locates the leads array in a Phantom Buster webhook body.
///
/// The body arrives as raw bytes because the upstream content type is not
/// reliable. The root may be an array, an object carrying `resultObject`,
/// or either of those serialized into a JSON string.
pub fn normalize_webhook_payload(body: &[u8]) -> NormalizedPayload {
    let Ok(text) = std::str::from_utf8(body) else {
        return NormalizedPayload::unrecognized();
    };

    let Some(root) = parse_json(text) else {
        return NormalizedPayload::unrecognized();
    };

    match unwrap_stringified(root) {
        Value::Array(items) => NormalizedPayload::found(PayloadShape::RootArray, items),
        Value::Object(mut fields) => match fields.remove("resultObject") {
            Some(Value::Array(items)) => {
                NormalizedPayload::found(PayloadShape::ResultObjectArray, items)
            }
            Some(Value::String(raw)) => match parse_json(&raw) {
                Some(Value::Array(items)) => {
                    NormalizedPayload::found(PayloadShape::ResultObjectString, items)
                }
                _ => NormalizedPayload::unrecognized(),
            },
            _ => NormalizedPayload::unrecognized(),
        },
        _ => NormalizedPayload::unrecognized(),
    }
}

fn parse_json(text: &str) -> Option<Value> {
    let text = text.trim_start_matches('\u{feff}').trim();
    if text.is_empty() {
        return None;
    }
    serde_json::from_str(text).ok()
}

/// A root that is itself a JSON string gets one more parse.
fn unwrap_stringified(value: Value) -> Value {
    match value {
        Value::String(inner) => parse_json(&inner).unwrap_or(Value::String(inner)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn root_array() {
        let body = br#"[{"username":"a","profileUrl":"https://instagram.com/a"}]"#;
        let normalized = normalize_webhook_payload(body);
        assert_eq!(normalized.shape, PayloadShape::RootArray);
        assert_eq!(normalized.leads.len(), 1);
    }

    #[test]
    fn result_object_array() {
        let body = json!({
            "agentId": "123",
            "resultObject": [{"username": "a"}, {"username": "b"}]
        })
        .to_string();
        let normalized = normalize_webhook_payload(body.as_bytes());
        assert_eq!(normalized.shape, PayloadShape::ResultObjectArray);
        assert_eq!(normalized.leads.len(), 2);
    }

    #[test]
    fn result_object_stringified() {
        let inner = json!([{"username": "a", "profileUrl": "u"}]).to_string();
        let body = json!({ "exitCode": 0, "resultObject": inner }).to_string();
        let normalized = normalize_webhook_payload(body.as_bytes());
        assert_eq!(normalized.shape, PayloadShape::ResultObjectString);
        assert_eq!(normalized.leads[0]["username"], "a");
    }

    #[test]
    fn whole_body_stringified() {
        let inner = json!({ "resultObject": [{"username": "a"}] }).to_string();
        let body = serde_json::to_string(&inner).unwrap();
        let normalized = normalize_webhook_payload(body.as_bytes());
        assert_eq!(normalized.shape, PayloadShape::ResultObjectArray);
        assert_eq!(normalized.leads.len(), 1);
    }

    #[test]
    fn tolerates_bom_and_whitespace() {
        let body = "\u{feff}  [{\"username\":\"a\"}]\n";
        let normalized = normalize_webhook_payload(body.as_bytes());
        assert_eq!(normalized.shape, PayloadShape::RootArray);
    }

    #[test]
    fn unrecognized_layouts_are_empty() {
        let bodies: [&[u8]; 8] = [
            b"",
            b"not json",
            &[0xff, 0xfe, 0x00],
            br#"{"resultObject": {"username": "a"}}"#,
            br#"{"resultObject": "not json"}"#,
            br#"{"resultObject": "{\"username\":\"a\"}"}"#,
            br#"{"status": "finished"}"#,
            b"42",
        ];
        for body in bodies {
            let normalized = normalize_webhook_payload(body);
            assert_eq!(normalized.shape, PayloadShape::Unrecognized, "body: {body:?}");
            assert!(normalized.leads.is_empty());
        }
    }
}
