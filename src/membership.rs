//! Membership validation for projects and tasks.
//!
//! Two policies live here: the single-project rule used by invitation
//! flows (a user may belong to at most one active project, as member or
//! leader), and assignee validation for task writes (every assignee must
//! be a member of the task's project, or its leader; the leader is not
//! listed in `members`).

use crate::error::{Error, Result};
use crate::model::{EntityId, Project, User};

/// Users eligible to be invited to `target`.
///
/// A user is available iff they are not already involved in `target` and
/// are not a member or leader of any project at all.
pub fn available_for_invite<'a>(
    users: &'a [User],
    projects: &[Project],
    target: &Project,
) -> Vec<&'a User> {
    users
        .iter()
        .filter(|user| {
            if target.involves(user.id) {
                return false;
            }
            !projects.iter().any(|project| project.involves(user.id))
        })
        .collect()
}

/// Check that every candidate may be assigned to the project's tasks.
///
/// Violations are reported, never silently filtered: a task referencing a
/// non-member must be rejected outright.
pub fn validate_assignees(project: &Project, candidates: &[EntityId]) -> Result<()> {
    let invalid: Vec<String> = candidates
        .iter()
        .filter(|id| !project.can_assign(**id))
        .map(|id| id.to_string())
        .collect();

    if invalid.is_empty() {
        return Ok(());
    }

    Err(Error::validation(
        "assignedTo",
        format!(
            "user(s) {} are not members of project {}",
            invalid.join(", "),
            project.id
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{new_storage_key, Role};
    use chrono::NaiveDate;

    fn user(id: EntityId, role: Role) -> User {
        User {
            id,
            storage_id: new_storage_key(),
            name: format!("user-{id}"),
            email: None,
            role,
        }
    }

    fn project(id: EntityId, leader_id: EntityId, members: Vec<EntityId>) -> Project {
        Project {
            id,
            storage_id: new_storage_key(),
            title: format!("project-{id}"),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            leader_id,
            members,
        }
    }

    #[test]
    fn invite_excludes_existing_involvement_anywhere() {
        let users = vec![
            user(1, Role::Leader),
            user(2, Role::Member),
            user(3, Role::Member),
            user(4, Role::Member),
        ];
        let target = project(1, 1, vec![2]);
        let other = project(2, 3, vec![]);
        let projects = vec![target.clone(), other];

        let available = available_for_invite(&users, &projects, &target);
        let ids: Vec<EntityId> = available.iter().map(|u| u.id).collect();

        // 1 leads target, 2 is a member of target, 3 leads another project.
        assert_eq!(ids, vec![4]);
    }

    #[test]
    fn invite_is_empty_when_everyone_is_taken() {
        let users = vec![user(1, Role::Leader), user(2, Role::Member)];
        let target = project(1, 1, vec![2]);
        let projects = vec![target.clone()];
        assert!(available_for_invite(&users, &projects, &target).is_empty());
    }

    #[test]
    fn assignees_must_be_members() {
        let project = project(1, 1, vec![2, 3]);
        assert!(validate_assignees(&project, &[2, 3]).is_ok());

        let err = validate_assignees(&project, &[2, 5]).unwrap_err();
        match err {
            Error::Validation { field, message } => {
                assert_eq!(field, "assignedTo");
                assert!(message.contains('5'));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn leader_counts_as_assignable() {
        let project = project(1, 9, vec![2]);
        assert!(validate_assignees(&project, &[9, 2]).is_ok());
    }

    #[test]
    fn empty_candidate_list_is_valid() {
        let project = project(1, 1, vec![]);
        assert!(validate_assignees(&project, &[]).is_ok());
    }
}
