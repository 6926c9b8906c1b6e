//! `pimg list`: eligible groups, or every directory group with `--all`.

use pimg_application::InvocationContext;
use pimg_core::AppResult;
use pimg_domain::RoleAssignment;

use super::Services;
use crate::output::{Output, Table};

/// Roles held on one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRoles {
    pub name: String,
    /// `(role, member type)` pairs in listing order.
    pub roles: Vec<(String, String)>,
}

/// Folds assignments into one entry per group name, keeping first-seen order.
pub fn condense(assignments: &[RoleAssignment]) -> Vec<GroupRoles> {
    let mut groups: Vec<GroupRoles> = Vec::new();
    for assignment in assignments {
        let role = (
            assignment.role_definition.display_name.clone(),
            assignment.member_type.clone(),
        );
        let name = assignment.resource.display_name.as_str();
        match groups.iter_mut().find(|group| group.name == name) {
            Some(group) => group.roles.push(role),
            None => groups.push(GroupRoles {
                name: name.to_owned(),
                roles: vec![role],
            }),
        }
    }
    groups
}

pub async fn eligible(
    services: &Services,
    context: &InvocationContext,
    output: &Output,
) -> AppResult<()> {
    let assignments = services
        .reader
        .list_eligible(context.subject_id(), context.cancel())
        .await?;

    if assignments.is_empty() {
        output.always("No eligible PIM groups found");
        return Ok(());
    }

    let groups = condense(&assignments);
    output.line(format!("Found {} eligible PIM group(s):\n", groups.len()));

    if output.is_quiet() {
        let mut table = Table::new(&["Group Name", "Roles"]);
        for group in &groups {
            let roles: Vec<&str> = group.roles.iter().map(|(role, _)| role.as_str()).collect();
            table.add_row(vec![group.name.clone(), roles.join(", ")]);
        }
        output.table(&table);
        return Ok(());
    }

    for group in &groups {
        output.heading(group.name.as_str());
        for (role, member_type) in &group.roles {
            output.field(2, "Role", format!("{role} ({member_type})"));
        }
        output.line("");
    }
    Ok(())
}

pub async fn all_groups(
    services: &Services,
    context: &InvocationContext,
    output: &Output,
) -> AppResult<()> {
    output.line("Fetching all groups from Entra ID...");
    let groups = services.directory.list_groups(context.cancel()).await?;

    if groups.is_empty() {
        output.always("No groups found");
        return Ok(());
    }

    output.line(format!("\nFound {} group(s):\n", groups.len()));

    if output.is_quiet() {
        let mut table = Table::new(&["Group Name", "ID"]);
        for group in &groups {
            table.add_row(vec![display_or_unknown(&group.display_name), group.id.clone()]);
        }
        output.table(&table);
        return Ok(());
    }

    for group in &groups {
        output.heading(display_or_unknown(&group.display_name).as_str());
        if !group.description.is_empty() {
            output.field(2, "Description", group.description.as_str());
        }
        output.field(2, "ID", group.id.as_str());
        output.line("");
    }
    Ok(())
}

fn display_or_unknown(name: &str) -> String {
    if name.is_empty() {
        "Unknown".to_owned()
    } else {
        name.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use pimg_domain::RoleAssignment;

    use super::{GroupRoles, condense};

    fn assignment(group: &str, role: &str, member_type: &str) -> RoleAssignment {
        let mut assignment = RoleAssignment::default();
        assignment.resource.display_name = group.to_owned();
        assignment.role_definition.display_name = role.to_owned();
        assignment.member_type = member_type.to_owned();
        assignment
    }

    #[test]
    fn condense_groups_roles_in_first_seen_order() {
        let groups = condense(&[
            assignment("Platform", "Member", "Direct"),
            assignment("Finance", "Owner", "Direct"),
            assignment("Platform", "Owner", "Inherited"),
        ]);

        assert_eq!(
            groups,
            vec![
                GroupRoles {
                    name: "Platform".to_owned(),
                    roles: vec![
                        ("Member".to_owned(), "Direct".to_owned()),
                        ("Owner".to_owned(), "Inherited".to_owned()),
                    ],
                },
                GroupRoles {
                    name: "Finance".to_owned(),
                    roles: vec![("Owner".to_owned(), "Direct".to_owned())],
                },
            ]
        );
    }

    #[test]
    fn condense_of_nothing_is_empty() {
        assert!(condense(&[]).is_empty());
    }
}
