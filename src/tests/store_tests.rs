use super::*;

#[test]
fn file_storage_writes_and_removes_keys_together() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = FileStorage::new(dir.path().join("storage.json"));

    storage.set_many(&[("a", "1".to_string()), ("b", "2".to_string())])?;
    assert_eq!(storage.get("a")?.as_deref(), Some("1"));
    assert_eq!(storage.get("b")?.as_deref(), Some("2"));

    storage.remove_many(&["a", "b"])?;
    assert_eq!(storage.get("a")?, None);
    assert_eq!(storage.get("b")?, None);
    Ok(())
}

#[test]
fn file_storage_survives_reopen() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("storage.json");
    FileStorage::new(path.clone()).set("k", "v".to_string())?;

    let reopened = FileStorage::new(path);
    assert_eq!(reopened.get("k")?.as_deref(), Some("v"));
    Ok(())
}

#[test]
fn missing_or_empty_storage_file_reads_as_empty() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("storage.json");
    let storage = FileStorage::new(path.clone());
    assert_eq!(storage.get("k")?, None);

    fs::write(&path, b"")?;
    assert_eq!(storage.get("k")?, None);
    Ok(())
}

#[test]
fn corrupted_storage_file_is_purged_and_writable_again() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("storage.json");
    fs::write(&path, b"{not json")?;
    let storage = FileStorage::new(path.clone());

    assert_eq!(storage.get("auth_user")?, None);
    let purged: BTreeMap<String, String> = serde_json::from_slice(&fs::read(&path)?)?;
    assert!(purged.is_empty());

    fs::write(&path, b"{not json")?;
    storage.set_many(&[("auth_tokens", "t".to_string()), ("auth_user", "u".to_string())])?;
    assert_eq!(storage.get("auth_tokens")?.as_deref(), Some("t"));
    assert_eq!(storage.get("auth_user")?.as_deref(), Some("u"));
    Ok(())
}

#[test]
fn console_home_init_refuses_to_clobber_without_force() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let cfg = AppConfig::new("http://127.0.0.1:9/");
    ConsoleHome::init(dir.path(), &cfg, false)?;

    assert!(ConsoleHome::init(dir.path(), &cfg, false).is_err());
    let home = ConsoleHome::init(dir.path(), &cfg, true)?;
    assert_eq!(home.read_config()?.base_url, "http://127.0.0.1:9");
    Ok(())
}

#[test]
fn console_home_open_requires_init() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = ConsoleHome::open(dir.path()).expect_err("open should fail");
    assert!(err.to_string().contains("mbo init"));
}
