use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Service-account identity used to sign the token assertion.
pub struct ServiceAccountCredentials<'a> {
    pub client_email: &'a str,
    /// PEM encoded RSA key, PKCS#1 or PKCS#8.
    pub private_key: &'a str,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

pub struct SheetsUpdateResult {
    pub body: String,
    pub status: StatusCode,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

/// Exchanges a signed service-account assertion for an OAuth access token.
pub async fn fetch_access_token(
    token_uri: &str,
    credentials: &ServiceAccountCredentials<'_>,
) -> Result<AccessToken, FetchAccessTokenError> {
    let assertion = sign_assertion(token_uri, credentials)?;

    let client = Client::new();

    let response = client
        .post(token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await
        .map_err(|source| FetchAccessTokenError::RequestSend { source })?;

    let status = response.status();

    let body = response
        .text()
        .await
        .map_err(|source| FetchAccessTokenError::ResponseRead { source })?;

    if !status.is_success() {
        return Err(FetchAccessTokenError::Rejected { status, body });
    }

    serde_json::from_str(&body).map_err(|source| FetchAccessTokenError::DeserializeResponseBody { source })
}

fn sign_assertion(
    token_uri: &str,
    credentials: &ServiceAccountCredentials<'_>,
) -> Result<String, FetchAccessTokenError> {
    let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())
        .map_err(|source| FetchAccessTokenError::InvalidPrivateKey { source })?;

    let iat = Utc::now().timestamp();
    let claims = AssertionClaims {
        iss: credentials.client_email,
        scope: SPREADSHEETS_SCOPE,
        aud: token_uri,
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    };

    encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|source| FetchAccessTokenError::SignAssertion { source })
}

/// Overwrites `range` of the spreadsheet with `rows`, stored as typed (RAW).
pub async fn update_values(
    base_url: &str,
    access_token: &str,
    sheet_id: &str,
    range: &str,
    rows: &[Vec<String>],
) -> Result<SheetsUpdateResult, UpdateValuesError> {
    let endpoint = format!(
        "{}/v4/spreadsheets/{}/values/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(sheet_id),
        urlencoding::encode(range),
    );

    let payload = ValueRange {
        range,
        major_dimension: "ROWS",
        values: rows,
    };

    let client = Client::new();

    let response = client
        .put(endpoint)
        .query(&[("valueInputOption", "RAW")])
        .bearer_auth(access_token)
        .json(&payload)
        .send()
        .await
        .map_err(|source| UpdateValuesError::RequestSend { source })?;

    let status = response.status();

    let body = response
        .text()
        .await
        .map_err(|source| UpdateValuesError::ResponseRead { source })?;

    Ok(SheetsUpdateResult { body, status })
}

#[derive(Debug, Error)]
pub enum FetchAccessTokenError {
    #[error("InvalidPrivateKey: {source}")]
    InvalidPrivateKey {
        source: jsonwebtoken::errors::Error,
    },

    #[error("SignAssertion: {source}")]
    SignAssertion {
        source: jsonwebtoken::errors::Error,
    },

    #[error("RequestSend: {source}")]
    RequestSend {
        source: reqwest::Error,
    },

    #[error("ResponseRead: {source}")]
    ResponseRead {
        source: reqwest::Error,
    },

    #[error("Rejected: {status}: {body}")]
    Rejected {
        status: StatusCode,
        body: String,
    },

    #[error("DeserializeResponseBody: {source}")]
    DeserializeResponseBody {
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum UpdateValuesError {
    #[error("RequestSend: {source}")]
    RequestSend {
        source: reqwest::Error,
    },

    #[error("ResponseRead: {source}")]
    ResponseRead {
        source: reqwest::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_KEY: &str = include_str!("../tests/fixtures/service_account_key.pem");

    fn credentials() -> ServiceAccountCredentials<'static> {
        ServiceAccountCredentials {
            client_email: "scraper@project.iam.gserviceaccount.com",
            private_key: TEST_KEY,
        }
    }

    #[tokio::test]
    async fn exchanges_signed_assertion_for_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"))
            .and(body_string_contains("assertion=ey"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.token",
                "token_type": "Bearer",
                "expires_in": 3599
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = fetch_access_token(&format!("{}/token", server.uri()), &credentials())
            .await
            .unwrap();

        assert_eq!(token.access_token, "ya29.token");
        assert_eq!(token.expires_in, Some(3599));
    }

    #[tokio::test]
    async fn rejected_exchange_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#))
            .mount(&server)
            .await;

        let err = fetch_access_token(&format!("{}/token", server.uri()), &credentials())
            .await
            .unwrap_err();

        match err {
            FetchAccessTokenError::Rejected { status, body } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert!(body.contains("invalid_grant"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_key_fails_before_any_request() {
        let creds = ServiceAccountCredentials {
            client_email: "x@y",
            private_key: "not a pem",
        };
        let err = fetch_access_token("http://127.0.0.1:1/token", &creds).await.unwrap_err();
        assert!(matches!(err, FetchAccessTokenError::InvalidPrivateKey { .. }));
    }

    #[tokio::test]
    async fn puts_rows_into_range() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v4/spreadsheets/sheet-1/values/Sheet1%21A2%3AB2"))
            .and(query_param("valueInputOption", "RAW"))
            .and(header("Authorization", "Bearer ya29.token"))
            .and(body_json(serde_json::json!({
                "range": "Sheet1!A2:B2",
                "majorDimension": "ROWS",
                "values": [["https://www.instagram.com/p/abc/", "7"]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"updatedCells":2}"#))
            .expect(1)
            .mount(&server)
            .await;

        let rows = vec![vec!["https://www.instagram.com/p/abc/".to_string(), "7".to_string()]];
        let result = update_values(&server.uri(), "ya29.token", "sheet-1", "Sheet1!A2:B2", &rows)
            .await
            .unwrap();

        assert_eq!(result.status, StatusCode::OK);
        assert!(result.body.contains("updatedCells"));
    }
}
