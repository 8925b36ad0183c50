/// Integration tests for the task review workflow rules
///
/// Exercises the status machine, the role powers that gate each
/// workflow operation, and the due-date window rule together, the way
/// the API's workflow endpoints combine them.

use barq_shared::auth::authorization::check_assignment_allowed;
use barq_shared::models::task::{due_date_in_window, TaskStatus};
use barq_shared::models::user::UserRole;
use chrono::{DateTime, TimeZone, Utc};

const ALL_STATUSES: [TaskStatus; 5] = [
    TaskStatus::Pending,
    TaskStatus::InProgress,
    TaskStatus::InReview,
    TaskStatus::SentToClient,
    TaskStatus::Done,
];

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

/// The legal transition set is exactly the documented workflow
#[test]
fn test_transition_table_is_exact() {
    let expected = [
        (TaskStatus::Pending, TaskStatus::InProgress),
        (TaskStatus::Pending, TaskStatus::InReview),
        (TaskStatus::InProgress, TaskStatus::InReview),
        (TaskStatus::InReview, TaskStatus::Done),
        (TaskStatus::InReview, TaskStatus::SentToClient),
        (TaskStatus::InReview, TaskStatus::InProgress),
        (TaskStatus::SentToClient, TaskStatus::Done),
        (TaskStatus::SentToClient, TaskStatus::InProgress),
    ];

    for from in ALL_STATUSES {
        for to in ALL_STATUSES {
            let legal = expected.contains(&(from, to));
            assert_eq!(
                from.can_transition_to(to),
                legal,
                "{:?} -> {:?}",
                from,
                to
            );
        }
    }
}

/// Every non-terminal state can still reach Done
#[test]
fn test_done_reachable_from_every_open_state() {
    for start in ALL_STATUSES {
        if start.is_terminal() {
            continue;
        }

        // Breadth-first walk over legal transitions
        let mut frontier = vec![start];
        let mut seen = vec![start];
        let mut reached_done = false;

        while let Some(state) = frontier.pop() {
            for next in ALL_STATUSES {
                if state.can_transition_to(next) && !seen.contains(&next) {
                    if next == TaskStatus::Done {
                        reached_done = true;
                    }
                    seen.push(next);
                    frontier.push(next);
                }
            }
        }

        assert!(reached_done, "Done unreachable from {:?}", start);
    }
}

/// The internal approval path: submit, approve, done
#[test]
fn test_internal_approval_path() {
    let mut status = TaskStatus::Pending;

    for next in [TaskStatus::InProgress, TaskStatus::InReview, TaskStatus::Done] {
        assert!(status.can_transition_to(next));
        status = next;
    }

    assert!(status.is_terminal());
}

/// The client approval path, including a rejection loop
#[test]
fn test_client_path_with_rejection_loop() {
    let mut status = TaskStatus::InProgress;

    // Submit, forward to client, client rejects back to work
    for next in [
        TaskStatus::InReview,
        TaskStatus::SentToClient,
        TaskStatus::InProgress,
    ] {
        assert!(status.can_transition_to(next));
        status = next;
    }

    // Second round succeeds
    for next in [
        TaskStatus::InReview,
        TaskStatus::SentToClient,
        TaskStatus::Done,
    ] {
        assert!(status.can_transition_to(next));
        status = next;
    }

    assert_eq!(status, TaskStatus::Done);
}

/// Role powers line up with the workflow operations they gate
#[test]
fn test_workflow_role_powers() {
    // pass: account managers and team leaders only
    let passers: Vec<UserRole> = all_roles()
        .into_iter()
        .filter(|r| r.can_pass_tasks())
        .collect();
    assert_eq!(passers, vec![UserRole::AccountManager, UserRole::TeamLeader]);

    // extend-deadline: management plus team leaders
    let extenders: Vec<UserRole> = all_roles()
        .into_iter()
        .filter(|r| r.can_extend_deadlines())
        .collect();
    assert_eq!(
        extenders,
        vec![
            UserRole::Manager,
            UserRole::AssistantManager,
            UserRole::TeamLeader
        ]
    );

    // clients are never internal staff
    assert!(all_roles()
        .into_iter()
        .filter(|r| !r.is_internal())
        .eq([UserRole::Client]));
}

/// Management can only hand work down, never sideways or up
#[test]
fn test_management_assignment_is_downward_only() {
    for assigner in [UserRole::Manager, UserRole::AssistantManager] {
        for assignee in all_roles() {
            let allowed = check_assignment_allowed(assigner, assignee).is_ok();
            assert_eq!(
                allowed,
                matches!(assignee, UserRole::TeamLeader | UserRole::Employee),
                "{:?} -> {:?}",
                assigner,
                assignee
            );
        }
    }

    // Everyone else is unrestricted by this rule
    for assigner in [
        UserRole::AccountManager,
        UserRole::TeamLeader,
        UserRole::Employee,
    ] {
        for assignee in all_roles() {
            assert!(check_assignment_allowed(assigner, assignee).is_ok());
        }
    }
}

/// Deadline extensions must stay inside the project window
#[test]
fn test_extension_window_rule() {
    let start = Some(at(2025, 4, 1));
    let end = Some(at(2025, 6, 30));

    assert!(due_date_in_window(at(2025, 5, 15), start, end));
    assert!(!due_date_in_window(at(2025, 7, 1), start, end));
    assert!(!due_date_in_window(at(2025, 3, 31), start, end));

    // A project without dates accepts any deadline
    assert!(due_date_in_window(at(2030, 1, 1), None, None));
}

fn all_roles() -> [UserRole; 6] {
    [
        UserRole::Manager,
        UserRole::AssistantManager,
        UserRole::AccountManager,
        UserRole::TeamLeader,
        UserRole::Employee,
        UserRole::Client,
    ]
}
