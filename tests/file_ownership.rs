// Windows-only integration test for reading and writing file ownership.
#![cfg(windows)]
#![allow(clippy::expect_used, reason = "Expect is not an issue in tests")]
#![allow(clippy::unwrap_used, reason = "Unwrap is not an issue in tests")]

use std::fs::File;
use std::os::windows::io::AsHandle;
use std::thread;

use win_principals::ownership::{owner, set_owner, set_owner_text, Target};
use win_principals::{token, Error};

#[test]
fn owner_read_back_matches_through_path_and_handle() {
    let file = tempfile::NamedTempFile::new().expect("temp file");

    let via_path = owner(Target::Path(file.path())).expect("owner via path");
    let handle = File::open(file.path()).expect("reopen for handle");
    let via_handle = owner(Target::Handle(handle.as_handle())).expect("owner via handle");
    assert_eq!(via_path, via_handle, "both targets read the same object");
}

#[test]
fn set_owner_only_leaves_group_alone() {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    let uid = token::current_user_sid().expect("current user SID");
    let before = owner(Target::Path(file.path())).expect("initial ownership");

    set_owner(Target::Path(file.path()), Some(&uid), None).expect("set owner to self");

    let after = owner(Target::Path(file.path())).expect("ownership after set");
    assert_eq!(after.owner, uid, "owner was written");
    assert_eq!(after.group, before.group, "group untouched by owner-only set");
}

#[test]
fn asking_for_no_change_is_a_usage_error() {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    let err = set_owner(Target::Path(file.path()), None, None)
        .expect_err("nothing to change");
    assert!(matches!(err, Error::NothingToChange), "got {err:?}");

    let err = set_owner_text(Target::Path(file.path()), "", "")
        .expect_err("two empty parts change nothing");
    assert!(matches!(err, Error::NothingToChange), "got {err:?}");
}

#[test]
fn textual_sids_set_ownership() {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    let uid = token::current_user_sid().expect("current user SID");

    set_owner_text(Target::Path(file.path()), &uid.to_string(), "")
        .expect("set owner from text");

    let after = owner(Target::Path(file.path())).expect("read back");
    assert_eq!(after.owner, uid);

    let err = set_owner_text(Target::Path(file.path()), "not-a-sid", "")
        .expect_err("malformed SID text");
    assert!(matches!(err, Error::InvalidSid(_)), "got {err:?}");
}

// Two threads changing ownership at once must not see each other's
// privilege windows: both writes succeed and neither leaves the
// elevated privileges behind.
#[test]
fn concurrent_ownership_changes_do_not_interfere() {
    let uid = token::current_user_sid().expect("current user SID");

    let workers: Vec<_> = (0..2)
        .map(|_| {
            let uid = uid.clone();
            thread::spawn(move || {
                let file = tempfile::NamedTempFile::new().expect("temp file");
                for _ in 0..8 {
                    set_owner(Target::Path(file.path()), Some(&uid), None)?;
                    let read = owner(Target::Path(file.path()))?;
                    assert_eq!(read.owner, uid, "read back what was written");
                }
                Ok::<(), Error>(())
            })
        })
        .collect();

    for worker in workers {
        worker
            .join()
            .expect("worker did not panic")
            .expect("ownership changes succeed under contention");
    }
}
