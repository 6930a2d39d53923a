//! Access decisions for every entity in the tracker.
//!
//! All functions here are pure: they take caller-supplied snapshots and
//! return a boolean, with no I/O and no retained state. Every call site —
//! API handlers, CLI commands, search — routes its authorization through
//! this module; none re-implement the branches inline.
//!
//! The rules are deliberately per-(action, role) predicates rather than a
//! generic matrix: editing is strictly narrower than viewing, reassignment
//! sits between the two for managers, and each role's clauses look at
//! different attributes.

use crate::project::Project;
use crate::team::Team;
use crate::ticket::Ticket;
use crate::types::Role;
use crate::user::User;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// ProjectIndex
// ---------------------------------------------------------------------------

/// Id → project join map so batch filtering doesn't re-resolve the owning
/// project per ticket.
pub struct ProjectIndex<'a> {
    by_id: HashMap<u32, &'a Project>,
}

impl<'a> ProjectIndex<'a> {
    pub fn new(projects: &'a [Project]) -> Self {
        Self {
            by_id: projects.iter().map(|p| (p.id, p)).collect(),
        }
    }

    /// The ticket's owning project, if it has one and the project exists.
    /// A dangling `project_id` degrades to "no project", which every
    /// predicate treats as scope-less.
    pub fn project_of(&self, ticket: &Ticket) -> Option<&'a Project> {
        ticket.project_id.and_then(|id| self.by_id.get(&id).copied())
    }
}

// ---------------------------------------------------------------------------
// Ticket clauses
// ---------------------------------------------------------------------------

fn leads_project(project: Option<&Project>, actor: &User) -> bool {
    project.is_some_and(|p| p.team_lead_id == actor.id)
}

fn same_team(project: Option<&Project>, actor: &User) -> bool {
    match (project, actor.team_id) {
        (Some(p), Some(team_id)) => p.team_id == team_id,
        _ => false,
    }
}

fn is_assignee(ticket: &Ticket, actor: &User) -> bool {
    // Display-name match, not an id reference. Two users sharing a name
    // are indistinguishable here.
    ticket.assignee == actor.name
}

// ---------------------------------------------------------------------------
// Ticket decisions
// ---------------------------------------------------------------------------

/// Read access to a ticket's details and listing inclusion.
pub fn can_view(ticket: &Ticket, project: Option<&Project>, actor: &User) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Manager => {
            // Lead of the project, or the project belongs to the manager's
            // own team; otherwise fall back to public visibility. The public
            // fallback is NOT team-scoped for managers.
            leads_project(project, actor) || same_team(project, actor) || ticket.public
        }
        Role::Developer => {
            is_assignee(ticket, actor) || (ticket.public && same_team(project, actor))
        }
        Role::Visitor => ticket.public,
    }
}

/// Authorization to mutate ticket status/content. Strictly narrower than
/// `can_view`: team membership alone grants a manager nothing here, and
/// `public` grants nobody anything.
pub fn can_edit(ticket: &Ticket, project: Option<&Project>, actor: &User) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Manager => leads_project(project, actor),
        Role::Developer => is_assignee(ticket, actor),
        Role::Visitor => false,
    }
}

/// Authorization to change a ticket's assignee. For managers this is wider
/// than `can_edit` (team membership or holding the ticket suffices) —
/// handing a ticket off is a lighter action than editing it.
pub fn can_reassign(ticket: &Ticket, project: Option<&Project>, actor: &User) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Manager => {
            leads_project(project, actor) || same_team(project, actor) || is_assignee(ticket, actor)
        }
        Role::Developer => is_assignee(ticket, actor),
        Role::Visitor => false,
    }
}

// ---------------------------------------------------------------------------
// Team decisions
// ---------------------------------------------------------------------------

/// Approving (or rejecting) a registration into a team. The caller resolves
/// the team; a failed lookup denies everyone but admins.
pub fn can_approve_user(team: Option<&Team>, actor: &User) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Manager => team.is_some_and(|t| t.manager_id == actor.id),
        Role::Developer | Role::Visitor => false,
    }
}

/// Team-level administrative actions: membership changes, manager handoff.
pub fn can_manage_team(team: &Team, actor: &User) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Manager => team.manager_id == actor.id,
        Role::Developer | Role::Visitor => false,
    }
}

// ---------------------------------------------------------------------------
// Creation gates
// ---------------------------------------------------------------------------

/// Filing a ticket: admins and managers always; developers only once they
/// belong to a team; visitors never.
pub fn can_create_ticket(actor: &User) -> bool {
    match actor.role {
        Role::Admin | Role::Manager => true,
        Role::Developer => actor.team_id.is_some(),
        Role::Visitor => false,
    }
}

pub fn can_create_project(actor: &User) -> bool {
    matches!(actor.role, Role::Admin | Role::Manager)
}

/// Teams come into existence by admin fiat; managers are assigned, not
/// self-appointed.
pub fn can_create_team(actor: &User) -> bool {
    matches!(actor.role, Role::Admin)
}

/// Whether user records show up in search results for this actor.
pub fn can_search_users(actor: &User) -> bool {
    matches!(actor.role, Role::Admin | Role::Manager)
}

/// The unscoped account listing. Everyone else goes through team member
/// listings or search.
pub fn can_list_users(actor: &User) -> bool {
    matches!(actor.role, Role::Admin)
}

/// The unscoped ticket listing, bypassing visibility filtering.
pub fn can_list_all_tickets(actor: &User) -> bool {
    matches!(actor.role, Role::Admin)
}

/// The epic/feature/story hierarchy view is for people doing the work;
/// visitors only get the public board.
pub fn can_view_hierarchy(actor: &User) -> bool {
    match actor.role {
        Role::Admin | Role::Manager | Role::Developer => true,
        Role::Visitor => false,
    }
}

// ---------------------------------------------------------------------------
// Collection scoping
// ---------------------------------------------------------------------------

/// Filter a ticket collection down to what the actor may view, preserving
/// source order.
pub fn visible_tickets<'a>(
    tickets: &'a [Ticket],
    index: &ProjectIndex<'_>,
    actor: &User,
) -> Vec<&'a Ticket> {
    tickets
        .iter()
        .filter(|t| can_view(t, index.project_of(t), actor))
        .collect()
}

/// Projects the actor may list: everything for admins and visitors, led
/// projects for managers, own-team projects for developers.
pub fn visible_projects<'a>(projects: &'a [Project], actor: &User) -> Vec<&'a Project> {
    projects
        .iter()
        .filter(|p| match actor.role {
            Role::Admin | Role::Visitor => true,
            Role::Manager => p.team_lead_id == actor.id,
            Role::Developer => actor.team_id == Some(p.team_id),
        })
        .collect()
}

/// Teams the actor may list: everything for admins and visitors, managed
/// teams for managers, the own team for developers.
pub fn visible_teams<'a>(teams: &'a [Team], actor: &User) -> Vec<&'a Team> {
    teams
        .iter()
        .filter(|t| match actor.role {
            Role::Admin | Role::Visitor => true,
            Role::Manager => t.manager_id == actor.id,
            Role::Developer => actor.team_id == Some(t.id),
        })
        .collect()
}

/// Who the actor may assign tickets to: anyone approved for admins, their
/// approved team for managers, themselves for developers, nobody for
/// visitors.
pub fn assignable_users<'a>(users: &'a [User], actor: &User) -> Vec<&'a User> {
    users
        .iter()
        .filter(|u| u.approved)
        .filter(|u| match actor.role {
            Role::Admin => true,
            Role::Manager => actor.team_id.is_some() && u.team_id == actor.team_id,
            Role::Developer => u.id == actor.id,
            Role::Visitor => false,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Priority, TicketKind, TicketStatus};
    use chrono::Utc;

    fn user(id: u32, name: &str, role: Role, team_id: Option<u32>) -> User {
        User {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: String::new(),
            role,
            team_id,
            approved: true,
            created_at: Utc::now(),
        }
    }

    fn project(id: u32, team_id: u32, team_lead_id: u32) -> Project {
        Project {
            id,
            name: format!("project-{id}"),
            description: None,
            team_id,
            team_lead_id,
            status: "Active".to_string(),
            start_date: None,
            deadline: None,
            created_at: Utc::now(),
        }
    }

    fn ticket(id: u32, assignee: &str, public: bool, project_id: Option<u32>) -> Ticket {
        Ticket {
            id,
            title: format!("ticket-{id}"),
            description: None,
            kind: TicketKind::Task,
            priority: Priority::Medium,
            assignee: assignee.to_string(),
            status: TicketStatus::ToDo,
            public,
            project_id,
            parent_id: None,
            start_date: None,
            end_date: None,
            created_at: Utc::now(),
        }
    }

    // -----------------------------------------------------------------------
    // Reference scenario: ticket assigned to Bob, private, project in team 5
    // led by Carl (id 9).
    // -----------------------------------------------------------------------

    fn scenario() -> (Ticket, Project, User, User, User, User) {
        let proj = project(1, 5, 9);
        let t = ticket(1, "Bob", false, Some(proj.id));
        let bob = user(3, "Bob", Role::Developer, Some(5));
        let alice = user(4, "Alice", Role::Developer, Some(5));
        let carl = user(9, "Carl", Role::Manager, Some(5));
        let dana = user(10, "Dana", Role::Manager, Some(6));
        (t, proj, bob, alice, carl, dana)
    }

    #[test]
    fn private_ticket_scenario() {
        let (t, p, bob, alice, carl, dana) = scenario();
        let p = Some(&p);

        assert!(can_view(&t, p, &bob));
        assert!(can_edit(&t, p, &bob));
        assert!(can_reassign(&t, p, &bob));

        assert!(!can_view(&t, p, &alice), "not assignee, not public");

        assert!(can_view(&t, p, &carl), "project lead");
        assert!(can_edit(&t, p, &carl));

        assert!(!can_view(&t, p, &dana), "not lead, other team, private");
        assert!(!can_edit(&t, p, &dana));
    }

    #[test]
    fn public_ticket_scenario() {
        let (mut t, p, _bob, alice, _carl, dana) = scenario();
        t.public = true;
        let p = Some(&p);

        // Same-team developer gains view but not edit.
        assert!(can_view(&t, p, &alice));
        assert!(!can_edit(&t, p, &alice));

        // The manager public fallback is not team-scoped: Dana now sees it.
        assert!(can_view(&t, p, &dana));
        assert!(!can_edit(&t, p, &dana), "public never grants edit");
    }

    #[test]
    fn admin_sees_and_edits_everything() {
        let (t, p, ..) = scenario();
        let admin = user(1, "Root", Role::Admin, None);
        for proj in [Some(&p), None] {
            assert!(can_view(&t, proj, &admin));
            assert!(can_edit(&t, proj, &admin));
            assert!(can_reassign(&t, proj, &admin));
        }
    }

    #[test]
    fn visitor_is_public_only() {
        let (mut t, p, ..) = scenario();
        let visitor = user(20, "Guest", Role::Visitor, None);
        assert!(!can_view(&t, Some(&p), &visitor));
        t.public = true;
        assert!(can_view(&t, Some(&p), &visitor));
        assert!(!can_edit(&t, Some(&p), &visitor));
        assert!(!can_reassign(&t, Some(&p), &visitor));
    }

    #[test]
    fn projectless_ticket_only_public_clauses_apply() {
        let manager = user(9, "Carl", Role::Manager, Some(5));
        let dev = user(4, "Alice", Role::Developer, Some(5));

        let private = ticket(1, "Nobody", false, None);
        assert!(!can_view(&private, None, &manager));
        assert!(!can_view(&private, None, &dev));

        let public = ticket(2, "Nobody", true, None);
        // Manager's fallback is unconditional on team.
        assert!(can_view(&public, None, &manager));
        // Developer's public clause requires a same-team project, so a
        // projectless public ticket stays hidden.
        assert!(!can_view(&public, None, &dev));
    }

    #[test]
    fn manager_team_membership_grants_view_and_reassign_but_not_edit() {
        let proj = project(1, 6, 99);
        let t = ticket(1, "Someone", false, Some(proj.id));
        let dana = user(10, "Dana", Role::Manager, Some(6));

        assert!(can_view(&t, Some(&proj), &dana));
        assert!(can_reassign(&t, Some(&proj), &dana));
        assert!(!can_edit(&t, Some(&proj), &dana));
    }

    #[test]
    fn manager_holding_the_ticket_may_hand_it_off() {
        // Manager is the assignee of a ticket outside their team and lead.
        let proj = project(1, 6, 99);
        let t = ticket(1, "Dana", false, Some(proj.id));
        let dana = user(10, "Dana", Role::Manager, Some(7));

        assert!(!can_edit(&t, Some(&proj), &dana));
        assert!(can_reassign(&t, Some(&proj), &dana));
    }

    #[test]
    fn manager_without_team_relies_on_lead_or_public() {
        let proj = project(1, 5, 9);
        let t = ticket(1, "Bob", false, Some(proj.id));
        let floating = user(30, "Flo", Role::Manager, None);
        assert!(!can_view(&t, Some(&proj), &floating));

        let led = project(2, 5, 30);
        assert!(can_view(&t, Some(&led), &floating));
        assert!(can_edit(&t, Some(&led), &floating));
    }

    #[test]
    fn approve_user_truth_table() {
        let team = Team {
            id: 5,
            name: "alpha".to_string(),
            manager_id: 9,
            created_at: Utc::now(),
        };

        let admin = user(1, "Root", Role::Admin, None);
        let owning_manager = user(9, "Carl", Role::Manager, Some(5));
        let other_manager = user(10, "Dana", Role::Manager, Some(6));
        let dev = user(3, "Bob", Role::Developer, Some(5));
        let visitor = user(20, "Guest", Role::Visitor, None);

        assert!(can_approve_user(Some(&team), &admin));
        assert!(can_approve_user(None, &admin), "admin needs no team lookup");
        assert!(can_approve_user(Some(&team), &owning_manager));
        assert!(!can_approve_user(None, &owning_manager));
        assert!(!can_approve_user(Some(&team), &other_manager));
        assert!(!can_approve_user(Some(&team), &dev));
        assert!(!can_approve_user(Some(&team), &visitor));
    }

    #[test]
    fn manage_team_is_admin_or_owning_manager() {
        let team = Team {
            id: 5,
            name: "alpha".to_string(),
            manager_id: 9,
            created_at: Utc::now(),
        };
        assert!(can_manage_team(&team, &user(1, "Root", Role::Admin, None)));
        assert!(can_manage_team(&team, &user(9, "Carl", Role::Manager, Some(5))));
        assert!(!can_manage_team(&team, &user(10, "Dana", Role::Manager, Some(6))));
        assert!(!can_manage_team(&team, &user(3, "Bob", Role::Developer, Some(5))));
    }

    #[test]
    fn creation_gates() {
        assert!(can_create_ticket(&user(1, "Root", Role::Admin, None)));
        assert!(can_create_ticket(&user(9, "Carl", Role::Manager, None)));
        assert!(can_create_ticket(&user(3, "Bob", Role::Developer, Some(5))));
        assert!(!can_create_ticket(&user(4, "Ada", Role::Developer, None)));
        assert!(!can_create_ticket(&user(20, "Guest", Role::Visitor, None)));

        assert!(can_create_project(&user(9, "Carl", Role::Manager, None)));
        assert!(!can_create_project(&user(3, "Bob", Role::Developer, Some(5))));

        assert!(can_create_team(&user(1, "Root", Role::Admin, None)));
        assert!(!can_create_team(&user(9, "Carl", Role::Manager, None)));
    }

    #[test]
    fn unscoped_listings_are_admin_only() {
        let admin = user(1, "Root", Role::Admin, None);
        let manager = user(9, "Carl", Role::Manager, Some(5));
        let dev = user(3, "Bob", Role::Developer, Some(5));

        assert!(can_list_users(&admin));
        assert!(!can_list_users(&manager));
        assert!(can_list_all_tickets(&admin));
        assert!(!can_list_all_tickets(&manager));

        assert!(can_search_users(&admin));
        assert!(can_search_users(&manager));
        assert!(!can_search_users(&dev));
    }

    #[test]
    fn hierarchy_excludes_visitors_only() {
        assert!(can_view_hierarchy(&user(1, "Root", Role::Admin, None)));
        assert!(can_view_hierarchy(&user(9, "Carl", Role::Manager, None)));
        assert!(can_view_hierarchy(&user(3, "Bob", Role::Developer, None)));
        assert!(!can_view_hierarchy(&user(20, "Guest", Role::Visitor, None)));
    }

    #[test]
    fn visible_tickets_preserves_order() {
        let projects = vec![project(1, 5, 9)];
        let index = ProjectIndex::new(&projects);
        let tickets = vec![
            ticket(1, "Bob", false, Some(1)),
            ticket(2, "Alice", true, Some(1)),
            ticket(3, "Alice", false, Some(1)),
        ];
        let bob = user(3, "Bob", Role::Developer, Some(5));
        let visible = visible_tickets(&tickets, &index, &bob);
        let ids: Vec<u32> = visible.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn dangling_project_reference_degrades_to_projectless() {
        let projects: Vec<Project> = Vec::new();
        let index = ProjectIndex::new(&projects);
        let t = ticket(1, "Bob", true, Some(42));
        let manager = user(9, "Carl", Role::Manager, Some(5));
        let dev = user(4, "Alice", Role::Developer, Some(5));
        // Manager still gets the public fallback; the developer's same-team
        // clause cannot fire without a resolvable project.
        assert!(can_view(&t, index.project_of(&t), &manager));
        assert!(!can_view(&t, index.project_of(&t), &dev));
    }

    #[test]
    fn scoped_project_and_team_listings() {
        let projects = vec![project(1, 5, 9), project(2, 6, 10), project(3, 5, 10)];
        let teams = vec![
            Team { id: 5, name: "alpha".into(), manager_id: 9, created_at: Utc::now() },
            Team { id: 6, name: "beta".into(), manager_id: 10, created_at: Utc::now() },
        ];

        let admin = user(1, "Root", Role::Admin, None);
        let carl = user(9, "Carl", Role::Manager, Some(5));
        let bob = user(3, "Bob", Role::Developer, Some(6));
        let guest = user(20, "Guest", Role::Visitor, None);

        assert_eq!(visible_projects(&projects, &admin).len(), 3);
        assert_eq!(visible_projects(&projects, &guest).len(), 3);
        let carls: Vec<u32> = visible_projects(&projects, &carl).iter().map(|p| p.id).collect();
        assert_eq!(carls, vec![1]);
        let bobs: Vec<u32> = visible_projects(&projects, &bob).iter().map(|p| p.id).collect();
        assert_eq!(bobs, vec![2]);

        assert_eq!(visible_teams(&teams, &admin).len(), 2);
        assert_eq!(visible_teams(&teams, &carl).len(), 1);
        assert_eq!(visible_teams(&teams, &carl)[0].id, 5);
        assert_eq!(visible_teams(&teams, &bob)[0].id, 6);
        assert_eq!(visible_teams(&teams, &guest).len(), 2);
    }

    #[test]
    fn assignable_users_per_role() {
        let mut pending = user(5, "Pending", Role::Developer, Some(5));
        pending.approved = false;
        let users = vec![
            user(1, "Root", Role::Admin, None),
            user(9, "Carl", Role::Manager, Some(5)),
            user(3, "Bob", Role::Developer, Some(5)),
            user(4, "Eve", Role::Developer, Some(6)),
            pending,
        ];

        let admin = &users[0];
        assert_eq!(assignable_users(&users, admin).len(), 4, "approved only");

        let carl = &users[1];
        let names: Vec<&str> =
            assignable_users(&users, carl).iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Carl", "Bob"]);

        let bob = &users[2];
        let selfs = assignable_users(&users, bob);
        assert_eq!(selfs.len(), 1);
        assert_eq!(selfs[0].id, 3);

        let guest = user(20, "Guest", Role::Visitor, None);
        assert!(assignable_users(&users, &guest).is_empty());
    }

    // -----------------------------------------------------------------------
    // Property coverage
    // -----------------------------------------------------------------------

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn arb_role() -> impl Strategy<Value = Role> {
            prop_oneof![
                Just(Role::Admin),
                Just(Role::Manager),
                Just(Role::Developer),
                Just(Role::Visitor),
            ]
        }

        fn arb_actor() -> impl Strategy<Value = User> {
            (1u32..20, arb_role(), proptest::option::of(1u32..6), "[A-D][a-z]{2}").prop_map(
                |(id, role, team_id, name)| User {
                    id,
                    name,
                    email: format!("u{id}@example.com"),
                    password_hash: String::new(),
                    role,
                    team_id,
                    approved: true,
                    created_at: Utc::now(),
                },
            )
        }

        fn arb_project() -> impl Strategy<Value = Option<Project>> {
            proptest::option::of((1u32..6, 1u32..20).prop_map(|(team_id, lead)| Project {
                id: 1,
                name: "p".to_string(),
                description: None,
                team_id,
                team_lead_id: lead,
                status: "Active".to_string(),
                start_date: None,
                deadline: None,
                created_at: Utc::now(),
            }))
        }

        fn arb_ticket() -> impl Strategy<Value = Ticket> {
            ("[A-D][a-z]{2}", any::<bool>()).prop_map(|(assignee, public)| Ticket {
                id: 1,
                title: "t".to_string(),
                description: None,
                kind: TicketKind::Task,
                priority: Priority::Medium,
                assignee,
                status: TicketStatus::ToDo,
                public,
                project_id: None,
                parent_id: None,
                start_date: None,
                end_date: None,
                created_at: Utc::now(),
            })
        }

        proptest! {
            #[test]
            fn edit_implies_view(t in arb_ticket(), p in arb_project(), a in arb_actor()) {
                let p = p.as_ref();
                if can_edit(&t, p, &a) {
                    prop_assert!(can_view(&t, p, &a));
                }
            }

            #[test]
            fn edit_implies_reassign(t in arb_ticket(), p in arb_project(), a in arb_actor()) {
                let p = p.as_ref();
                if can_edit(&t, p, &a) {
                    prop_assert!(can_reassign(&t, p, &a));
                }
            }

            #[test]
            fn admin_is_unconditional(t in arb_ticket(), p in arb_project(), mut a in arb_actor()) {
                a.role = Role::Admin;
                let p = p.as_ref();
                prop_assert!(can_view(&t, p, &a));
                prop_assert!(can_edit(&t, p, &a));
                prop_assert!(can_reassign(&t, p, &a));
            }

            #[test]
            fn visitor_view_iff_public(t in arb_ticket(), p in arb_project(), mut a in arb_actor()) {
                a.role = Role::Visitor;
                let p = p.as_ref();
                prop_assert_eq!(can_view(&t, p, &a), t.public);
                prop_assert!(!can_edit(&t, p, &a));
                prop_assert!(!can_reassign(&t, p, &a));
            }

            #[test]
            fn assignee_developer_always_edits(
                mut t in arb_ticket(),
                p in arb_project(),
                mut a in arb_actor(),
            ) {
                a.role = Role::Developer;
                t.assignee = a.name.clone();
                let p = p.as_ref();
                prop_assert!(can_view(&t, p, &a));
                prop_assert!(can_edit(&t, p, &a));
                prop_assert!(can_reassign(&t, p, &a));
            }

            #[test]
            fn outside_manager_never_edits(
                t in arb_ticket(),
                p in arb_project(),
                mut a in arb_actor(),
            ) {
                a.role = Role::Manager;
                let not_lead = p.as_ref().is_none_or(|p| p.team_lead_id != a.id);
                let other_team = p.as_ref().is_none_or(|p| a.team_id != Some(p.team_id));
                if not_lead && other_team {
                    prop_assert!(!can_edit(&t, p.as_ref(), &a));
                }
            }
        }
    }
}
