use url::form_urlencoded;

use crate::AssignmentState;

/// OData `$filter` expression scoped to one subject.
///
/// Always starts with `subjectId eq '<id>'`; further predicates are joined
/// with ` and `.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ODataFilter {
    expression: String,
}

impl ODataFilter {
    /// Starts a filter matching a single subject.
    #[must_use]
    pub fn for_subject(subject_id: &str) -> Self {
        Self {
            expression: format!("subjectId eq '{}'", quote_literal(subject_id)),
        }
    }

    /// Appends a raw predicate with ` and `.
    #[must_use]
    pub fn and(mut self, predicate: &str) -> Self {
        self.expression.push_str(" and ");
        self.expression.push_str(predicate);
        self
    }

    /// Restricts the filter to one assignment state.
    #[must_use]
    pub fn and_assignment_state(self, state: AssignmentState) -> Self {
        self.and(&format!("assignmentState eq '{}'", state.as_str()))
    }

    /// Restricts the filter to requests with the given sub-status.
    #[must_use]
    pub fn and_request_sub_status(self, sub_status: &str) -> Self {
        self.and(&format!(
            "status/subStatus eq '{}'",
            quote_literal(sub_status)
        ))
    }

    /// Returns the unencoded expression.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.expression.as_str()
    }

    /// Returns the whole expression percent-encoded as one query value.
    #[must_use]
    pub fn encoded(&self) -> String {
        form_urlencoded::byte_serialize(self.expression.as_bytes()).collect()
    }
}

fn quote_literal(value: &str) -> String {
    value.replace('\'', "''")
}
