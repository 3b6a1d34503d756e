#![allow(missing_docs)]

use std::fs;

use friendlydb::db::{load_config, CONFIG_FILE, FORMAT_VERSION};
use friendlydb::{FriendlyDb, FriendlyError, Result, StoreOptions};
use tempfile::tempdir;

#[test]
fn open_creates_root_and_config() -> Result<()> {
    let dir = tempdir().expect("tempdir");
    let root = dir.path().join("nested").join("friendly");
    let db = FriendlyDb::open(&root, StoreOptions::default())?;

    assert!(root.is_dir());
    assert!(root.join(CONFIG_FILE).is_file());
    let config = load_config(&root)?.expect("config written");
    assert_eq!(config.separator, "::");
    assert_eq!(config.format_version, FORMAT_VERSION);
    assert_eq!(&config, db.config());
    Ok(())
}

#[test]
fn file_root_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path().join("plain-file");
    fs::write(&root, b"not a store").expect("write file");

    let err = FriendlyDb::open(&root, StoreOptions::default())
        .err()
        .expect("file root must fail");
    assert!(matches!(err, FriendlyError::NotADirectory(_)), "{err:?}");
    assert!(err.is_storage());
    assert_eq!(fs::read(&root).expect("read file"), b"not a store");
}

#[test]
fn separator_mismatch_leaves_store_untouched() -> Result<()> {
    let dir = tempdir().expect("tempdir");
    let root = dir.path().join("friendly");
    {
        let db = FriendlyDb::open(&root, StoreOptions::default())?;
        db.lookup("daniel").follow("alice")?;
    }
    let config_before = fs::read(root.join(CONFIG_FILE)).expect("read config");

    let err = FriendlyDb::open(&root, StoreOptions::default().separator("|"))
        .err()
        .expect("separator mismatch must fail");
    assert!(err.is_configuration(), "{err:?}");
    assert!(err.to_string().contains("'::'"));

    assert_eq!(
        fs::read(root.join(CONFIG_FILE)).expect("read config"),
        config_before
    );
    let db = FriendlyDb::open(&root, StoreOptions::default())?;
    assert_eq!(db.lookup("daniel").following_fresh()?, ["alice"]);
    Ok(())
}

#[test]
fn invalid_options_fail_before_touching_disk() {
    let dir = tempdir().expect("tempdir");
    let cases = [
        StoreOptions::default().hash_width(0),
        StoreOptions::default().hash_width(33),
        StoreOptions::default().separator(""),
        StoreOptions::default().separator("\n"),
        StoreOptions::default().separator("1"),
        StoreOptions::default().separator("."),
    ];
    for (idx, options) in cases.into_iter().enumerate() {
        let root = dir.path().join(format!("case-{idx}"));
        let err = FriendlyDb::open(&root, options)
            .err()
            .expect("invalid options must fail");
        assert!(err.is_configuration(), "case {idx}: {err:?}");
        assert!(!root.exists(), "case {idx}");
    }
}

#[test]
fn custom_separator_round_trips() -> Result<()> {
    let dir = tempdir().expect("tempdir");
    let root = dir.path().join("friendly");
    let options = StoreOptions::default().separator("|").hash_width(2);
    {
        let db = FriendlyDb::open(&root, options.clone())?;
        db.lookup("a|b").follow("c")?;
        let user_dir = db.user_dir("a|b");
        let bucket = user_dir.parent().and_then(|p| p.file_name());
        assert_eq!(bucket.map(|name| name.len()), Some(2));
    }
    let db = FriendlyDb::open(&root, options)?;
    assert_eq!(db.config().separator, "|");
    assert_eq!(db.lookup("a|b").following_fresh()?, ["c"]);
    assert_eq!(db.lookup("c").followers_fresh()?, ["a|b"]);
    Ok(())
}

#[test]
fn separator_made_of_tag_letters_round_trips() -> Result<()> {
    let dir = tempdir().expect("tempdir");
    for (idx, separator) in ["A", "D", "AA", "DA"].into_iter().enumerate() {
        let root = dir.path().join(format!("store-{idx}"));
        let db = FriendlyDb::open(&root, StoreOptions::default().separator(separator))?;
        let daniel = db.lookup("daniel");
        daniel.follow("bob")?;
        daniel.follow("ADA")?;
        daniel.unfollow("bob")?;
        daniel.follow("bob")?;

        assert_eq!(daniel.following_fresh()?, ["bob", "ADA"], "{separator:?}");
        assert_eq!(db.lookup("ADA").followers_fresh()?, ["daniel"], "{separator:?}");
        let history = daniel.following_history()?;
        assert_eq!(history.len(), 4, "{separator:?}");
        assert!(history.skipped.is_empty(), "{separator:?}");
    }
    Ok(())
}

#[test]
fn reopen_refreshes_open_time() -> Result<()> {
    let dir = tempdir().expect("tempdir");
    let root = dir.path().join("friendly");
    let first = FriendlyDb::open(&root, StoreOptions::default())?
        .config()
        .last_opened_at;
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = FriendlyDb::open(&root, StoreOptions::default())?
        .config()
        .last_opened_at;
    assert!(second > first);
    Ok(())
}

#[test]
fn legacy_config_without_separator_is_accepted() -> Result<()> {
    let dir = tempdir().expect("tempdir");
    let root = dir.path().join("friendly");
    fs::create_dir_all(&root).expect("create root");
    fs::write(root.join(CONFIG_FILE), br#"{"last_opened_at": 1.5}"#).expect("write config");

    let db = FriendlyDb::open(&root, StoreOptions::default().separator("|"))?;
    assert_eq!(db.config().separator, "|");
    assert_eq!(load_config(&root)?.map(|c| c.separator), Some("|".into()));
    Ok(())
}

#[test]
fn newer_format_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path().join("friendly");
    fs::create_dir_all(&root).expect("create root");
    let future = format!(
        r#"{{"separator": "::", "format_version": {}, "last_opened_at": 1.0}}"#,
        FORMAT_VERSION + 1
    );
    fs::write(root.join(CONFIG_FILE), future).expect("write config");

    let err = FriendlyDb::open(&root, StoreOptions::default())
        .err()
        .expect("newer format must fail");
    assert!(err.is_configuration(), "{err:?}");
}

#[test]
fn clear_wipes_users_and_rewrites_config() -> Result<()> {
    let dir = tempdir().expect("tempdir");
    let root = dir.path().join("friendly");
    let mut db = FriendlyDb::open(&root, StoreOptions::default())?;
    db.lookup("daniel").follow("alice")?;
    db.lookup("bob").follow("daniel")?;
    assert!(db.user_dir("daniel").exists());

    db.clear()?;
    assert!(!db.user_dir("daniel").exists());
    assert!(!db.user_dir("alice").exists());
    assert!(root.join(CONFIG_FILE).is_file());
    assert!(db.lookup("daniel").following_fresh()?.is_empty());
    let entries = fs::read_dir(&root).expect("read root").count();
    assert_eq!(entries, 1);

    db.lookup("daniel").follow("joe")?;
    assert_eq!(db.lookup("joe").followers_fresh()?, ["daniel"]);
    Ok(())
}
