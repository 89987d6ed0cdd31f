// Windows-only integration test resolving the current process identity
// both ways through the lookup pipeline.
#![cfg(windows)]
#![allow(clippy::expect_used, reason = "Expect is not an issue in tests")]
#![allow(clippy::unwrap_used, reason = "Unwrap is not an issue in tests")]

use win_principals::{token, user_by_name, user_by_sid, Error, SecurityId};

#[test]
fn current_user_round_trips_through_name_and_sid() {
    let uid = token::current_user_sid().expect("process token user SID");

    let by_sid = user_by_sid(&uid)
        .expect("lookup by SID")
        .expect("current user is a known principal");
    assert_eq!(by_sid.uid, uid, "record carries the SID it was found by");
    assert_eq!(by_sid.passwd, "x", "passwd is a placeholder");
    assert!(!by_sid.name.account.is_empty(), "account name resolved");

    let by_name = user_by_name(&by_sid.name.to_string())
        .expect("lookup by qualified name")
        .expect("resolved name maps back to an account");
    assert_eq!(by_name.uid, uid, "name lookup agrees on the SID");
}

#[test]
fn primary_group_is_among_token_groups() {
    let primary = token::current_primary_group_sid().expect("primary group SID");
    let groups = token::current_group_sids().expect("token group SIDs");
    assert!(!groups.is_empty(), "every token carries groups");
    assert!(
        groups.contains(&primary),
        "primary group {primary} missing from token groups"
    );
}

#[test]
fn unknown_name_is_none_not_an_error() {
    let looked_up = user_by_name("no-such-account-8f2c1d").expect("lookup runs");
    assert_eq!(looked_up, None, "unknown principals are not errors");
}

#[test]
fn group_sid_rejected_by_user_lookup() {
    // BUILTIN\Users, S-1-5-32-545.
    let users: SecurityId = "S-1-5-32-545".parse().unwrap();
    let err = user_by_sid(&users)
        .expect_err("an alias is not a user");
    assert!(
        matches!(err, Error::UnexpectedType { .. }),
        "got {err:?} instead of a kind mismatch"
    );
    assert_eq!(err.code(), Some(160), "surfaces ERROR_BAD_ARGUMENTS");
}
