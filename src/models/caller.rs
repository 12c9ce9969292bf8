use serde::Deserialize;

/// Who is making a request, as asserted by the client.
///
/// Built fresh for every request from the body or query string. Nothing in
/// here is checked against a server-side session: a caller claiming
/// `is_main_admin` is treated as the main admin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
    pub code: Option<String>,
    #[serde(default)]
    pub is_main_admin: bool,
}

impl Caller {
    pub fn main_admin() -> Self {
        Self {
            code: None,
            is_main_admin: true,
        }
    }

    pub fn sub_admin(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            is_main_admin: false,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// `isMainAdmin` from a query string counts only when it is exactly `true`.
    pub fn from_query_flag(flag: Option<&str>) -> Self {
        Self {
            code: None,
            is_main_admin: flag == Some("true"),
        }
    }
}
