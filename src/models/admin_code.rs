use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// An access code row. Exactly one row has `is_main_admin` set.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminCode {
    pub id: i64,
    pub code: String,
    pub sub_admin_name: String,
    pub is_main_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeRequest {
    /// A non-string code can never match a row, so it reads as absent.
    #[serde(default, deserialize_with = "string_or_absent")]
    pub code: Option<String>,
}

fn string_or_absent<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CodeField {
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match CodeField::deserialize(deserializer)? {
        CodeField::Text(code) => Some(code),
        CodeField::Other(_) => None,
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_main_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<Option<AdminCode>> for VerifyCodeResponse {
    fn from(row: Option<AdminCode>) -> Self {
        match row {
            Some(row) => Self {
                valid: true,
                is_main_admin: Some(row.is_main_admin),
                admin_name: Some(row.sub_admin_name),
                code: Some(row.code),
            },
            None => Self {
                valid: false,
                is_main_admin: None,
                admin_name: None,
                code: None,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminCodeRequest {
    pub sub_admin_name: Option<String>,
    #[serde(default)]
    pub is_main_admin: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAdminCode {
    pub code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListAdminCodesQuery {
    #[serde(rename = "isMainAdmin")]
    pub is_main_admin: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_string_code_reads_as_absent() {
        for body in [r#"{"code":123}"#, r#"{"code":null}"#, r#"{"code":["A"]}"#, "{}"] {
            let req: VerifyCodeRequest = serde_json::from_str(body).unwrap();
            assert_eq!(req.code, None, "{}", body);
        }

        let req: VerifyCodeRequest = serde_json::from_str(r#"{"code":"ABCD1234"}"#).unwrap();
        assert_eq!(req.code.as_deref(), Some("ABCD1234"));
    }
}
