use serde::Deserialize;

use crate::serde_helpers::nullable_string;

/// Page of an OData collection response.
#[derive(Debug, Clone, Deserialize)]
pub struct ODataPage<T> {
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    /// Link to the next page, when the collection continues.
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

/// Signed-in user as returned by Microsoft Graph `/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    /// Directory object identifier.
    #[serde(default, deserialize_with = "nullable_string")]
    pub id: String,
    /// Display name.
    #[serde(default, deserialize_with = "nullable_string")]
    pub display_name: String,
    /// Sign-in name.
    #[serde(default)]
    pub user_principal_name: Option<String>,
}

/// Tenant organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Tenant display name.
    #[serde(default, deserialize_with = "nullable_string")]
    pub display_name: String,
}

/// Entra ID group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryGroup {
    /// Group object identifier.
    #[serde(default, deserialize_with = "nullable_string")]
    pub id: String,
    /// Display name.
    #[serde(default, deserialize_with = "nullable_string")]
    pub display_name: String,
    /// Free-text description.
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    /// Group type markers, e.g. `Unified`.
    #[serde(default)]
    pub group_types: Vec<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{DirectoryGroup, ODataPage};

    #[test]
    fn page_reads_value_and_next_link() {
        let page: Option<ODataPage<DirectoryGroup>> = serde_json::from_value(json!({
            "value": [{"id": "g1", "displayName": "Ops", "description": null, "groupTypes": []}],
            "@odata.nextLink": "https://graph.example/next"
        }))
        .ok();

        let page = page.map(|page| (page.value.len(), page.next_link));
        assert_eq!(page, Some((1, Some("https://graph.example/next".to_owned()))));
    }

    #[test]
    fn missing_value_is_an_empty_page() {
        let page: Option<ODataPage<DirectoryGroup>> = serde_json::from_value(json!({})).ok();
        assert_eq!(page.map(|page| page.value.len()), Some(0));
    }
}
