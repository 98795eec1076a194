//! Response envelope shared by every REST endpoint.
//!
//! All endpoints answer `{"status": "Ok", "message": "...", "result": ...}` where
//! `result` is an object on some endpoints and an array of objects on others.
//! [`ApiResponse`] always exposes it as a `Vec`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};


pub const STATUS_OK: &str = "Ok";


#[derive(Deserialize, Debug, Clone)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "error_code", rename = "errorCode")]
    pub error_code: Option<String>,
    #[serde(default = "Vec::new", deserialize_with = "one_or_many")]
    pub result: Vec<T>,
}


impl<T> ApiResponse<T> {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case(STATUS_OK)
    }
}


#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}


/// Accepts `null`, a single object, or an array of objects.
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => Ok(items),
        Some(OneOrMany::One(item)) => Ok(vec![item]),
        None => Ok(Vec::new()),
    }
}


/// The vendor sends numbers as JSON strings on some endpoints and as numbers on
/// others. Both are kept as the original text.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}


/// Lenient float: accepts `84.2`, `"84.20"`, empty string or null.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
