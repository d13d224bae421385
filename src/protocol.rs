use crate::error::{DspError, Result};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize, Serializer};

/// Byte that terminates every frame in both directions
pub const FRAME_DELIMITER: u8 = 0x00;

/// API request structure
///
/// Serializes as `{"method": "<Method>", "params": <params>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum Request {
    /// Ask the core for its platform and run state
    StatusGet(Vec<u8>),
    /// Read the named controls
    ControlGet(Vec<String>),
    /// Write a single control
    ControlSet(ControlValue),
}

/// A named control and its value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ControlValue {
    /// Control name, e.g. "Mic1Gain"
    pub name: String,
    /// Raw value of the control
    #[serde(serialize_with = "serialize_finite")]
    pub value: f64,
}

/// JSON has no NaN or infinity; refuse them instead of writing `null`
fn serialize_finite<S: Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    if !value.is_finite() {
        return Err(serde::ser::Error::custom(format!(
            "{} cannot be represented in JSON",
            value
        )));
    }
    serializer.serialize_f64(*value)
}

/// Envelope around every reply
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Response<T> {
    /// Payload of the reply
    pub result: T,
}

/// Core status as reported by `StatusGet`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusReport {
    /// Hardware model, e.g. "Core 110f"
    pub platform: String,
    /// Run state, e.g. "Active" or "Standby"
    pub state: String,
}

/// Reply to `StatusGet`
pub type StatusGetResponse = Response<StatusReport>;

/// Reply to `ControlGet`
pub type ControlGetResponse = Response<Vec<ControlValue>>;

/// Reply to `ControlSet`
pub type ControlSetResponse = Response<ControlValue>;

impl Request {
    /// Create a status request
    pub fn status_get() -> Self {
        Request::StatusGet(vec![0])
    }

    /// Create a get request for the given control names
    pub fn control_get<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Request::ControlGet(names.into_iter().map(Into::into).collect())
    }

    /// Create a set request for one control
    pub fn control_set(name: impl Into<String>, value: f64) -> Self {
        Request::ControlSet(ControlValue {
            name: name.into(),
            value,
        })
    }

    /// Name of the protocol method, for logging
    pub fn method(&self) -> &'static str {
        match self {
            Request::StatusGet(_) => "StatusGet",
            Request::ControlGet(_) => "ControlGet",
            Request::ControlSet(_) => "ControlSet",
        }
    }
}

impl ControlGetResponse {
    /// Find the entry whose name matches exactly
    pub fn find(&self, name: &str) -> Option<&ControlValue> {
        self.result.iter().find(|v| v.name == name)
    }
}

/// Serialize a request and append the frame delimiter
pub fn encode_frame(request: &Request) -> serde_json::Result<Vec<u8>> {
    let mut frame = serde_json::to_vec(request)?;
    frame.push(FRAME_DELIMITER);
    Ok(frame)
}

/// Strip the frame delimiter from the end of a frame
pub fn trim_frame(frame: &[u8]) -> &[u8] {
    let mut end = frame.len();
    while end > 0 && frame[end - 1] == FRAME_DELIMITER {
        end -= 1;
    }
    &frame[..end]
}

/// Parse a frame payload into the expected reply shape
pub fn parse_response<T: DeserializeOwned>(address: &str, frame: &[u8]) -> Result<T> {
    serde_json::from_slice(frame).map_err(|e| {
        tracing::error!("Unexpected reply from {}: {}", address, e);
        DspError::protocol(address, e.to_string(), frame)
    })
}

/// Check that a frame holds a well-formed JSON document without keeping it
pub fn check_well_formed(address: &str, frame: &[u8]) -> Result<()> {
    serde_json::from_slice::<IgnoredAny>(frame).map_err(|e| {
        tracing::error!("Bad state received from {} on connection: {}", address, e);
        DspError::protocol(address, format!("bad state received on connection: {}", e), frame)
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_status_get_shape() {
        let value = serde_json::to_value(Request::status_get()).unwrap();
        assert_eq!(value, json!({"method": "StatusGet", "params": [0]}));
    }

    #[test]
    fn test_control_get_shape() {
        let value = serde_json::to_value(Request::control_get(["Mic1Gain", "Mic2Gain"])).unwrap();
        assert_eq!(
            value,
            json!({"method": "ControlGet", "params": ["Mic1Gain", "Mic2Gain"]})
        );
    }

    #[test]
    fn test_control_set_shape() {
        let value = serde_json::to_value(Request::control_set("Mic1Mute", 1.0)).unwrap();
        assert_eq!(
            value,
            json!({"method": "ControlSet", "params": {"Name": "Mic1Mute", "Value": 1.0}})
        );
    }

    #[test]
    fn test_encode_frame_appends_delimiter() {
        let frame = encode_frame(&Request::status_get()).unwrap();
        assert_eq!(frame.last(), Some(&FRAME_DELIMITER));
        assert_eq!(frame.iter().filter(|b| **b == FRAME_DELIMITER).count(), 1);
    }

    #[test]
    fn test_encode_frame_rejects_non_finite() {
        assert!(encode_frame(&Request::control_set("Level", f64::NAN)).is_err());
        assert!(encode_frame(&Request::control_set("Level", f64::INFINITY)).is_err());
        assert!(encode_frame(&Request::control_set("Level", f64::NEG_INFINITY)).is_err());
        assert!(encode_frame(&Request::control_set("Level", -100.0)).is_ok());
    }

    #[test]
    fn test_trim_frame() {
        assert_eq!(trim_frame(b"{}\0"), b"{}");
        assert_eq!(trim_frame(b"{}"), b"{}");
        assert_eq!(trim_frame(b"\0"), b"");
    }

    #[test]
    fn test_parse_get_response_ignores_extra_fields() {
        let frame = br#"{"jsonrpc":"2.0","id":1,"result":[{"Name":"Mic1Gain","Value":-6.02,"String":"-6.02dB","Position":0.5}]}"#;
        let resp: ControlGetResponse = parse_response("10.0.0.5", frame).unwrap();
        let entry = resp.find("Mic1Gain").unwrap();
        assert_eq!(entry.value, -6.02);
        assert!(resp.find("Mic1").is_none());
    }

    #[test]
    fn test_parse_status_response() {
        let frame = br#"{"result":{"Platform":"Core 110f","State":"Active","DesignName":"Room"}}"#;
        let resp: StatusGetResponse = parse_response("10.0.0.5", frame).unwrap();
        assert_eq!(resp.result.platform, "Core 110f");
        assert_eq!(resp.result.state, "Active");
    }

    #[test]
    fn test_parse_wrong_shape_is_protocol_error() {
        let frame = br#"{"result":{"Name":"Mic1Gain","Value":1.0}}"#;
        let err = parse_response::<ControlGetResponse>("10.0.0.5", frame).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn test_check_well_formed() {
        assert!(check_well_formed("10.0.0.5", br#"{"method":"EngineStatus"}"#).is_ok());
        let err = check_well_formed("10.0.0.5", b"garbage").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }
}
