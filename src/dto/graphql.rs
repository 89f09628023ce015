use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest<'a> {
    pub operation_name: &'a str,
    pub query: &'a str,
    pub variables: Value,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    /// Absent and `null` both mean success.
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

impl GraphQlResponse {
    /// First server-side error message, if the server rejected the operation.
    pub fn first_error(&self) -> Option<&str> {
        self.errors
            .as_deref()
            .and_then(<[_]>::first)
            .map(|e| e.message.as_str())
    }

    /// Pull the payload of a single root field; `null` and missing both read as `None`.
    pub fn take_field(&mut self, field: &str) -> Option<Value> {
        self.data
            .as_mut()
            .and_then(|data| data.get_mut(field))
            .map(Value::take)
            .filter(|value| !value.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_errors_is_a_success_envelope() {
        let mut envelope: GraphQlResponse =
            serde_json::from_str(r#"{"data":{"getAllProducts":[]},"errors":null}"#).unwrap();
        assert_eq!(envelope.first_error(), None);
        assert_eq!(envelope.take_field("getAllProducts"), Some(serde_json::json!([])));
    }

    #[test]
    fn empty_errors_list_is_a_success_envelope() {
        let envelope: GraphQlResponse =
            serde_json::from_str(r#"{"data":null,"errors":[]}"#).unwrap();
        assert_eq!(envelope.first_error(), None);
    }

    #[test]
    fn first_error_message_is_reported() {
        let envelope: GraphQlResponse = serde_json::from_str(
            r#"{"data":null,"errors":[{"message":"Out of stock"},{"message":"second"}]}"#,
        )
        .unwrap();
        assert_eq!(envelope.first_error(), Some("Out of stock"));
    }
}
