// Windows-only integration test for group resolution and the member
// enumeration switch.
#![cfg(windows)]
#![allow(clippy::expect_used, reason = "Expect is not an issue in tests")]
#![allow(clippy::unwrap_used, reason = "Unwrap is not an issue in tests")]

use win_principals::{config, group_by_name, group_by_sid, SecurityId, SidType};

// The flag and the call counter are process-global, so every scenario
// that touches them lives in this one test.
#[test]
fn builtin_users_lookup_and_enumeration_switch() {
    // BUILTIN\Users exists on every machine.
    let users: SecurityId = "S-1-5-32-545".parse().unwrap();

    let record = group_by_sid(&users)
        .expect("lookup runs")
        .expect("BUILTIN\\Users is a known principal");
    assert_eq!(record.gid, users, "record carries the SID it was found by");
    assert_eq!(record.passwd, "x", "passwd is a placeholder");
    assert_eq!(
        record.name.domain.to_uppercase(),
        "BUILTIN",
        "aliases resolve under the BUILTIN domain"
    );

    let by_name = group_by_name(&record.name.to_string())
        .expect("lookup by qualified name")
        .expect("resolved name maps back");
    assert_eq!(by_name.gid, users, "name lookup agrees on the SID");

    // With enumeration off, the same lookup must not touch the member
    // database at all.
    config::set_enumerate_members(false);
    let calls_before = win_principals::member_enumeration_count();
    let silent = group_by_sid(&users)
        .expect("lookup runs with enumeration off")
        .expect("still a known principal");
    config::set_enumerate_members(true);

    assert!(silent.members.is_empty(), "no members when disabled");

    // Everyone, S-1-1-0: a well-known group that cannot be enumerated,
    // so it must not issue a query even while enumeration is enabled.
    let everyone: SecurityId = "S-1-1-0".parse().unwrap();
    let record = group_by_sid(&everyone)
        .expect("lookup runs")
        .expect("Everyone is a known principal");
    assert!(record.members.is_empty(), "no direct members");

    assert_eq!(
        win_principals::member_enumeration_count(),
        calls_before,
        "neither the disabled lookup nor the well-known one enumerated"
    );
}

#[test]
fn unknown_group_is_none_not_an_error() {
    let looked_up = group_by_name("no-such-group-8f2c1d").expect("lookup runs");
    assert_eq!(looked_up, None);
}

#[test]
fn sid_type_predicates_cover_lookup_kinds() {
    assert!(SidType::Alias.is_group_kind());
    assert!(SidType::WellKnownGroup.is_group_kind());
    assert!(!SidType::User.is_group_kind());
}
