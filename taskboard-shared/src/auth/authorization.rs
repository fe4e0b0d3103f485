//! Authorization gate: role and ownership checks for every mutating
//! operation.
//!
//! All checks take an explicit [`Actor`] and the relevant resource state;
//! none of them touch the database. Handlers load the resource, ask the
//! gate, and only then mutate, so a denial never leaves a partial write
//! behind.
//!
//! # Rules
//!
//! - Project create/update/delete and role changes: admin only.
//! - Member-set writes: the stored set is the requested set ∪ {owner}.
//! - Task create: any authenticated actor; the assignee defaults to the
//!   actor, and only an admin may assign someone else.
//! - Task update: the task's assignee or an admin.
//! - Viewing a project's tasks: project members only. A user can always
//!   list the tasks assigned to them.
//! - An admin may not change their own role away from admin.

use uuid::Uuid;

use super::middleware::Actor;
use crate::models::project::Project;
use crate::models::user::UserRole;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Operation is restricted to admins
    #[error("Only admins can perform this operation")]
    RequiresAdmin,

    /// Actor is neither the task's assignee nor an admin
    #[error("You can only update your own tasks")]
    NotAssignee,

    /// Actor is not a member of the project
    #[error("Not a member of this project")]
    NotMember,

    /// Non-admin tried to assign a task to someone else
    #[error("Only admins can assign tasks to other members")]
    AssigneeNotAllowed,

    /// Admin tried to drop their own admin role
    #[error("You cannot demote yourself")]
    SelfDemotion,
}

/// Requires the actor to be an admin.
///
/// Gates project create/update/delete and user role changes.
pub fn require_admin(actor: &Actor) -> Result<(), AuthzError> {
    if !actor.is_admin() {
        return Err(AuthzError::RequiresAdmin);
    }

    Ok(())
}

/// Requires the actor to be a member of the project.
///
/// Gates viewing a project's tasks and board.
pub fn require_project_member(actor: &Actor, project: &Project) -> Result<(), AuthzError> {
    if !project.has_member(actor.id) {
        return Err(AuthzError::NotMember);
    }

    Ok(())
}

/// Requires the actor to be allowed to edit a task: its assignee, or an
/// admin.
pub fn require_task_editor(actor: &Actor, assignee_id: Option<Uuid>) -> Result<(), AuthzError> {
    let is_assignee = assignee_id == Some(actor.id);

    if !is_assignee && !actor.is_admin() {
        return Err(AuthzError::NotAssignee);
    }

    Ok(())
}

/// Resolves the assignee for a new task.
///
/// An omitted assignee defaults to the actor. Assigning anyone else
/// requires admin.
pub fn resolve_assignee(actor: &Actor, requested: Option<Uuid>) -> Result<Uuid, AuthzError> {
    match requested {
        None => Ok(actor.id),
        Some(id) if id == actor.id => Ok(id),
        Some(id) => {
            if !actor.is_admin() {
                return Err(AuthzError::AssigneeNotAllowed);
            }
            Ok(id)
        }
    }
}

/// Resolves a requested member set into the set to store: the requested
/// members plus the owner, deduplicated, input order preserved.
///
/// Applied on every member-set write so the owner can never be removed
/// from their own project.
pub fn resolve_members(owner_id: Uuid, requested: &[Uuid]) -> Vec<Uuid> {
    let mut members = Vec::with_capacity(requested.len() + 1);

    for &id in requested {
        if !members.contains(&id) {
            members.push(id);
        }
    }
    if !members.contains(&owner_id) {
        members.push(owner_id);
    }

    members
}

/// Checks a role change against the self-demotion rule: an admin may not
/// change their own role away from admin.
///
/// Admin status itself is checked separately with [`require_admin`].
pub fn require_role_change(
    actor: &Actor,
    target_user_id: Uuid,
    new_role: UserRole,
) -> Result<(), AuthzError> {
    if target_user_id == actor.id && new_role != UserRole::Admin {
        return Err(AuthzError::SelfDemotion);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::ProjectStatus;
    use chrono::Utc;

    fn actor(role: UserRole) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role,
            name: "Test".to_string(),
        }
    }

    fn project(owner_id: Uuid, members: Vec<Uuid>) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: "Alpha".to_string(),
            description: None,
            owner_id,
            members,
            status: ProjectStatus::Active,
            start_date: Utc::now(),
            end_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&actor(UserRole::Admin)).is_ok());
        assert_eq!(
            require_admin(&actor(UserRole::Manager)),
            Err(AuthzError::RequiresAdmin)
        );
        assert_eq!(
            require_admin(&actor(UserRole::Member)),
            Err(AuthzError::RequiresAdmin)
        );
    }

    #[test]
    fn test_require_project_member() {
        let member = actor(UserRole::Member);
        let outsider = actor(UserRole::Member);
        let owner = Uuid::new_v4();
        let project = project(owner, vec![owner, member.id]);

        assert!(require_project_member(&member, &project).is_ok());
        assert_eq!(
            require_project_member(&outsider, &project),
            Err(AuthzError::NotMember)
        );
    }

    #[test]
    fn test_membership_is_not_role_based() {
        // Admins see nothing special here: membership is a per-project set
        let admin = actor(UserRole::Admin);
        let owner = Uuid::new_v4();
        let project = project(owner, vec![owner]);

        assert_eq!(
            require_project_member(&admin, &project),
            Err(AuthzError::NotMember)
        );
    }

    #[test]
    fn test_require_task_editor_assignee() {
        let member = actor(UserRole::Member);

        assert!(require_task_editor(&member, Some(member.id)).is_ok());
    }

    #[test]
    fn test_require_task_editor_admin_override() {
        let admin = actor(UserRole::Admin);

        assert!(require_task_editor(&admin, Some(Uuid::new_v4())).is_ok());
        assert!(require_task_editor(&admin, None).is_ok());
    }

    #[test]
    fn test_require_task_editor_denies_other_members() {
        let member = actor(UserRole::Member);
        let manager = actor(UserRole::Manager);

        assert_eq!(
            require_task_editor(&member, Some(Uuid::new_v4())),
            Err(AuthzError::NotAssignee)
        );
        assert_eq!(
            require_task_editor(&member, None),
            Err(AuthzError::NotAssignee)
        );
        assert_eq!(
            require_task_editor(&manager, Some(Uuid::new_v4())),
            Err(AuthzError::NotAssignee)
        );
    }

    #[test]
    fn test_resolve_assignee_defaults_to_actor() {
        let member = actor(UserRole::Member);

        assert_eq!(resolve_assignee(&member, None), Ok(member.id));
        assert_eq!(resolve_assignee(&member, Some(member.id)), Ok(member.id));
    }

    #[test]
    fn test_resolve_assignee_other_requires_admin() {
        let member = actor(UserRole::Member);
        let admin = actor(UserRole::Admin);
        let other = Uuid::new_v4();

        assert_eq!(
            resolve_assignee(&member, Some(other)),
            Err(AuthzError::AssigneeNotAllowed)
        );
        assert_eq!(resolve_assignee(&admin, Some(other)), Ok(other));
    }

    #[test]
    fn test_resolve_members_empty_yields_owner() {
        let owner = Uuid::new_v4();

        assert_eq!(resolve_members(owner, &[]), vec![owner]);
    }

    #[test]
    fn test_resolve_members_appends_missing_owner() {
        let owner = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert_eq!(resolve_members(owner, &[a, b]), vec![a, b, owner]);
    }

    #[test]
    fn test_resolve_members_dedupes() {
        let owner = Uuid::new_v4();
        let a = Uuid::new_v4();

        assert_eq!(resolve_members(owner, &[a, a, owner, a]), vec![a, owner]);
    }

    #[test]
    fn test_self_demotion_rejected() {
        let admin = actor(UserRole::Admin);

        assert_eq!(
            require_role_change(&admin, admin.id, UserRole::Member),
            Err(AuthzError::SelfDemotion)
        );
        assert_eq!(
            require_role_change(&admin, admin.id, UserRole::Manager),
            Err(AuthzError::SelfDemotion)
        );
    }

    #[test]
    fn test_self_role_reassert_allowed() {
        let admin = actor(UserRole::Admin);

        assert!(require_role_change(&admin, admin.id, UserRole::Admin).is_ok());
    }

    #[test]
    fn test_role_change_for_others_allowed() {
        let admin = actor(UserRole::Admin);

        assert!(require_role_change(&admin, Uuid::new_v4(), UserRole::Member).is_ok());
        assert!(require_role_change(&admin, Uuid::new_v4(), UserRole::Admin).is_ok());
    }
}
