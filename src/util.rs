use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

pub(crate) fn urljoin(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

pub(crate) fn check_status(
    status: StatusCode,
    method: &'static str,
    endpoint: &str,
    body: String,
    payload: Option<String>,
) -> Result<String> {
    if status == StatusCode::OK {
        return Ok(body);
    }
    Err(Error::HttpStatus {
        code: status.as_u16(),
        method,
        endpoint: endpoint.to_string(),
        body,
        payload,
    })
}

pub(crate) fn parse_json<T: DeserializeOwned>(endpoint: &str, body: String) -> Result<T> {
    match serde_json::from_str(&body) {
        Ok(v) => Ok(v),
        Err(source) => Err(Error::MalformedResponse {
            endpoint: endpoint.to_string(),
            body,
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn urljoin_handles_slashes() {
        assert_eq!(
            urljoin("https://repo.example.org/", "/RESTapi/items"),
            "https://repo.example.org/RESTapi/items"
        );
        assert_eq!(
            urljoin("https://repo.example.org", "RESTapi/items"),
            "https://repo.example.org/RESTapi/items"
        );
        assert_eq!(
            urljoin("https://repo.example.org", "http://other/x"),
            "http://other/x"
        );
    }

    #[test]
    fn only_200_passes() {
        assert_eq!(
            check_status(StatusCode::OK, "GET", "/x", "ok".into(), None).unwrap(),
            "ok"
        );

        // 201 and 204 are still failures for this API.
        let err = check_status(StatusCode::CREATED, "POST", "/x", String::new(), None).unwrap_err();
        assert!(matches!(err, Error::HttpStatus { code: 201, .. }));
        let err = check_status(StatusCode::NO_CONTENT, "DELETE", "/x", String::new(), None)
            .unwrap_err();
        assert!(matches!(err, Error::HttpStatus { code: 204, .. }));
    }

    #[test]
    fn parse_json_passes_value_through() {
        let v: Value = parse_json("/x", r#"{"id":7,"name":"Test"}"#.into()).unwrap();
        assert_eq!(v, json!({"id": 7, "name": "Test"}));
    }

    #[test]
    fn parse_json_reports_body() {
        let err = parse_json::<Value>("/RESTapi/items", "<html>".into()).unwrap_err();
        match err {
            Error::MalformedResponse { endpoint, body, .. } => {
                assert_eq!(endpoint, "/RESTapi/items");
                assert_eq!(body, "<html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
