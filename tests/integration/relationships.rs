#![allow(missing_docs)]

use friendlydb::{Action, FriendlyDb, Result, StoreOptions};
use tempfile::{tempdir, TempDir};

fn open_db() -> (TempDir, FriendlyDb) {
    let dir = tempdir().expect("tempdir");
    let db = FriendlyDb::open(dir.path().join("friendly"), StoreOptions::default())
        .expect("open store");
    (dir, db)
}

fn history_pairs(history: &friendlydb::storage::History) -> Vec<(Action, &str)> {
    history
        .records
        .iter()
        .map(|r| (r.action, r.other.as_str()))
        .collect()
}

#[test]
fn follow_builds_both_lists() -> Result<()> {
    let (_dir, db) = open_db();
    let daniel = db.lookup("daniel");
    let alice = db.lookup("alice");

    assert!(daniel.follow("alice")?);
    assert!(daniel.follow("bob")?);
    assert!(daniel.follow("joe")?);
    assert!(alice.follow("daniel")?);

    assert_eq!(daniel.following_fresh()?, ["alice", "bob", "joe"]);
    assert_eq!(daniel.followers_fresh()?, ["alice"]);
    assert_eq!(alice.following_fresh()?, ["daniel"]);
    assert_eq!(db.lookup("bob").followers_fresh()?, ["daniel"]);
    Ok(())
}

#[test]
fn refollow_keeps_first_appearance_order() -> Result<()> {
    let (_dir, db) = open_db();
    let daniel = db.lookup("daniel");
    for other in ["alice", "bob", "joe"] {
        daniel.follow(other)?;
    }
    db.lookup("alice").follow("daniel")?;

    assert!(daniel.unfollow("bob")?);
    assert!(daniel.unfollow("joe")?);
    assert!(daniel.follow("bob")?);

    assert_eq!(daniel.following_fresh()?, ["alice", "bob"]);
    assert_eq!(db.lookup("bob").followers_fresh()?, ["daniel"]);
    assert!(db.lookup("joe").followers_fresh()?.is_empty());
    Ok(())
}

#[test]
fn self_follow_writes_nothing() -> Result<()> {
    let (_dir, db) = open_db();
    let daniel = db.lookup("daniel");
    assert!(!daniel.follow("daniel")?);
    assert!(!daniel.unfollow("daniel")?);
    assert!(!db.user_dir("daniel").exists());
    assert!(daniel.following_history()?.is_empty());
    Ok(())
}

#[test]
fn empty_identifier_is_an_ordinary_user() -> Result<()> {
    let (_dir, db) = open_db();
    let daniel = db.lookup("daniel");
    assert!(daniel.follow("")?);
    assert_eq!(daniel.following_fresh()?, [""]);
    assert_eq!(db.lookup("").followers_fresh()?, ["daniel"]);
    assert!(daniel.following_history()?.skipped.is_empty());

    assert!(db.lookup("").follow("daniel")?);
    assert_eq!(daniel.friends()?, [""]);
    daniel.unfollow("")?;
    assert!(daniel.following_fresh()?.is_empty());
    Ok(())
}

#[test]
fn unfollow_of_stranger_is_harmless() -> Result<()> {
    let (_dir, db) = open_db();
    let daniel = db.lookup("daniel");
    daniel.follow("alice")?;
    assert!(daniel.unfollow("nobody")?);
    assert_eq!(daniel.following_fresh()?, ["alice"]);
    Ok(())
}

#[test]
fn membership_queries() -> Result<()> {
    let (_dir, db) = open_db();
    let daniel = db.lookup("daniel");
    for other in ["alice", "bob", "joe"] {
        daniel.follow(other)?;
    }
    db.lookup("alice").follow("daniel")?;
    db.lookup("bob").follow("daniel")?;

    assert!(daniel.is_following("alice")?);
    assert!(daniel.is_following("joe")?);
    assert!(!db.lookup("bob").is_following("joe")?);
    assert!(!db.lookup("joe").is_following("daniel")?);

    assert!(daniel.is_followed_by("alice")?);
    assert!(daniel.is_followed_by("bob")?);
    assert!(!daniel.is_followed_by("joe")?);
    assert!(!db.lookup("joe").is_followed_by("bob")?);

    assert_eq!(daniel.followers_fresh()?, ["alice", "bob"]);
    assert_eq!(daniel.friends()?, ["alice", "bob"]);
    assert!(db.lookup("joe").friends()?.is_empty());
    Ok(())
}

#[test]
fn histories_record_every_edit() -> Result<()> {
    let (_dir, db) = open_db();
    let daniel = db.lookup("daniel");
    for other in ["alice", "bob", "joe"] {
        daniel.follow(other)?;
    }
    db.lookup("alice").follow("daniel")?;
    db.lookup("alice").follow("bob")?;
    db.lookup("bob").follow("daniel")?;
    daniel.unfollow("bob")?;
    daniel.unfollow("joe")?;
    daniel.follow("bob")?;

    let history = daniel.following_history()?;
    assert_eq!(
        history_pairs(&history),
        [
            (Action::Add, "alice"),
            (Action::Add, "bob"),
            (Action::Add, "joe"),
            (Action::Remove, "bob"),
            (Action::Remove, "joe"),
            (Action::Add, "bob"),
        ]
    );
    assert!(history
        .records
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp));

    let bob_followers = db.lookup("bob").followers_history()?;
    assert_eq!(
        history_pairs(&bob_followers),
        [
            (Action::Add, "daniel"),
            (Action::Add, "alice"),
            (Action::Remove, "daniel"),
            (Action::Add, "daniel"),
        ]
    );
    Ok(())
}

#[test]
fn delete_user_detaches_every_edge() -> Result<()> {
    let (_dir, db) = open_db();
    let daniel = db.lookup("daniel");
    daniel.follow("alice")?;
    daniel.follow("bob")?;
    db.lookup("alice").follow("daniel")?;
    db.lookup("joe").follow("daniel")?;

    let report = db.delete_user("daniel")?;
    assert_eq!(report.unfollowed, ["alice", "bob"]);
    assert_eq!(report.followers_removed, ["alice", "joe"]);

    assert!(daniel.following_fresh()?.is_empty());
    assert!(daniel.followers_fresh()?.is_empty());
    assert!(!db.user_dir("daniel").exists());
    for name in ["alice", "joe"] {
        assert!(!db.lookup(name).is_following("daniel")?, "{name}");
    }
    for name in ["alice", "bob"] {
        assert!(!db.lookup(name).is_followed_by("daniel")?, "{name}");
    }
    // Untouched edges survive.
    assert!(db.lookup("bob").followers_fresh()?.is_empty());
    assert!(db.lookup("alice").following_fresh()?.is_empty());
    Ok(())
}

#[test]
fn handles_do_not_share_caches() -> Result<()> {
    let (_dir, db) = open_db();
    let first = db.lookup("daniel");
    let second = db.lookup("daniel");
    assert!(first.following(true)?.is_empty());

    second.follow("alice")?;
    assert!(first.following(true)?.is_empty());
    assert_eq!(second.following(true)?, ["alice"]);
    assert_eq!(first.following(false)?, ["alice"]);
    Ok(())
}

#[test]
fn projection_is_repeatable() -> Result<()> {
    let (_dir, db) = open_db();
    let daniel = db.lookup("daniel");
    for other in ["x", "y", "z"] {
        daniel.follow(other)?;
    }
    daniel.unfollow("x")?;
    daniel.follow("x")?;
    let first = daniel.following_fresh()?;
    for _ in 0..5 {
        assert_eq!(daniel.following_fresh()?, first);
    }
    assert_eq!(first, ["x", "y", "z"]);
    Ok(())
}

#[test]
fn initialize_creates_logs_lazily_otherwise() -> Result<()> {
    let (_dir, db) = open_db();
    let joe = db.lookup("joe");
    assert!(!db.user_dir("joe").exists());
    assert!(joe.following_fresh()?.is_empty());
    assert!(!db.user_dir("joe").exists());

    joe.initialize()?;
    let dir = db.user_dir("joe");
    assert!(dir.join("following").is_file());
    assert!(dir.join("followers").is_file());
    Ok(())
}
