//! Request envelope: the input side of a service invocation.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ServiceError;

/// The input envelope created once per invocation and threaded through the
/// hook pipeline.
///
/// `data` carries the operation payload (the body of a create, update, patch,
/// etc.), `params` carries named (possibly nested) parameters such as the
/// resource id or query values, and `error` is a short-circuit slot: a
/// `before` hook that sets it (e.g. after failed validation) skips the
/// business function entirely.
///
/// ## Example
///
/// ```
/// use mandrel::Request;
/// use serde_json::json;
///
/// let request = Request::with_params(json!({ "title": "hello" }), json!({ "a": { "b": "c" } }));
/// assert_eq!(request.param(&["a", "b"]).unwrap(), "c");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Operation payload.
    #[serde(default)]
    pub data: Value,
    /// Named parameters (resource id, query, nested values).
    #[serde(default)]
    pub params: Value,
    /// Request-level error set by a hook to short-circuit execution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ServiceError>,
}

impl Request {
    /// Create a request carrying only a data payload.
    pub fn new(data: Value) -> Self {
        Self {
            data,
            params: Value::Null,
            error: None,
        }
    }

    /// Create a request with both a data payload and parameters.
    pub fn with_params(data: Value, params: Value) -> Self {
        Self {
            data,
            params,
            error: None,
        }
    }

    /// Look up a parameter by drilling down the given path segments.
    pub fn param(&self, path: &[&str]) -> Option<&Value> {
        path.iter()
            .try_fold(&self.params, |value, segment| value.get(segment))
    }

    /// Look up a parameter and deserialize it into `T`.
    ///
    /// Missing paths and type mismatches both surface as validation errors.
    pub fn param_as<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T, ServiceError> {
        let value = self.param(path).ok_or_else(|| {
            ServiceError::validation(format!("missing param: {}", path.join(".")))
        })?;
        serde_json::from_value(value.clone()).map_err(ServiceError::from)
    }

    /// Return the first parameter found among several candidate paths.
    pub fn first_param(&self, paths: &[&[&str]]) -> Option<&Value> {
        paths.iter().find_map(|path| self.param(path))
    }

    /// Set the request-level error, short-circuiting the business function.
    pub fn fail(&mut self, error: ServiceError) {
        self.error = Some(error);
    }
}
