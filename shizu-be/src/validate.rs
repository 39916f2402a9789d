//! Reference-integrity guards
//!
//! Run before every insert/update of a DJ, theme, promo, event or DJ slot so
//! that no stored record points at a name that does not exist.

use shizu_common::db::models::{Dj, Event, EventDj, File, Promo, Theme};
use shizu_common::db::store::{self, Entity};
use shizu_common::{Error, Result};
use sqlx::SqliteConnection;
use std::path::{Component, Path};

/// Whether the record being validated is new or replaces an existing row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Insert,
    Update,
}

/// Insert of an existing key is `AlreadyExists`, update of a missing one `NotFound`
pub async fn check_key<E: Entity>(
    conn: &mut SqliteConnection,
    key: &[&str],
    mode: WriteMode,
) -> Result<()> {
    let present = store::exists::<E>(conn, key).await?;
    match (mode, present) {
        (WriteMode::Insert, true) => Err(Error::already_exists(E::KIND, key.join("/"))),
        (WriteMode::Update, false) => Err(Error::not_found(E::KIND, key.join("/"))),
        _ => Ok(()),
    }
}

/// `field` must name an existing `E`
pub async fn require<E: Entity>(conn: &mut SqliteConnection, name: &str, field: &str) -> Result<()> {
    if store::exists::<E>(conn, &[name]).await? {
        Ok(())
    } else {
        Err(Error::invalid_reference(E::KIND, name, field))
    }
}

async fn require_optional_file(
    conn: &mut SqliteConnection,
    name: Option<&str>,
    field: &str,
) -> Result<()> {
    match name {
        Some(name) => require::<File>(conn, name, field).await,
        None => Ok(()),
    }
}

/// A single path component: no separators, not `.` or `..`
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// A relative path made only of normal components, so joining it onto a
/// media root stays inside that root
pub fn is_contained_path(path: &str) -> bool {
    !path.is_empty()
        && !path.contains('\\')
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Event names become export file names
pub fn check_event_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("Event name must not be empty".to_string()));
    }
    if !is_plain_file_name(name) {
        return Err(Error::InvalidInput(format!(
            "Event name '{}' must not contain path separators or be '.' or '..'",
            name
        )));
    }
    Ok(())
}

pub async fn validate_file(conn: &mut SqliteConnection, file: &File, mode: WriteMode) -> Result<()> {
    if file.name.trim().is_empty() {
        return Err(Error::InvalidInput("File name must not be empty".to_string()));
    }
    if let Some(path) = file.file_path.as_deref().filter(|p| !p.is_empty()) {
        if !is_contained_path(path) {
            return Err(Error::InvalidInput(format!(
                "File {}: path '{}' must be relative to its media root",
                file.name, path
            )));
        }
    }
    let has_path = file.file_path.as_deref().is_some_and(|p| !p.is_empty());
    let has_url = file.url_path.as_deref().is_some_and(|u| !u.is_empty());
    if !has_path && !has_url {
        return Err(Error::InvalidInput(format!(
            "File {} needs a local path or a URL",
            file.name
        )));
    }
    check_key::<File>(conn, &[file.name.as_str()], mode).await
}

pub async fn validate_theme(conn: &mut SqliteConnection, theme: &Theme, mode: WriteMode) -> Result<()> {
    check_key::<Theme>(conn, &[theme.name.as_str()], mode).await?;
    for (field, file) in theme.file_refs() {
        require::<File>(conn, file, field).await?;
    }
    Ok(())
}

pub async fn validate_promo(conn: &mut SqliteConnection, promo: &Promo, mode: WriteMode) -> Result<()> {
    check_key::<Promo>(conn, &[promo.name.as_str()], mode).await?;
    require_optional_file(conn, promo.promo_file.as_deref(), "promo_file").await
}

pub async fn validate_dj(conn: &mut SqliteConnection, dj: &Dj, mode: WriteMode) -> Result<()> {
    check_key::<Dj>(conn, &[dj.name.as_str()], mode).await?;
    require_optional_file(conn, dj.logo.as_deref(), "logo").await
}

pub async fn validate_event(conn: &mut SqliteConnection, event: &Event, mode: WriteMode) -> Result<()> {
    if mode == WriteMode::Insert {
        check_event_name(&event.name)?;
    }
    check_key::<Event>(conn, &[event.name.as_str()], mode).await?;
    if let Some(theme) = event.theme.as_deref() {
        require::<Theme>(conn, theme, "theme").await?;
    }
    for promo in &event.promos {
        require::<Promo>(conn, promo, "promos").await?;
    }
    Ok(())
}

/// Event must exist, DJ and slot files must exist, and the slot key must
/// be free (insert) or taken (update)
pub async fn validate_event_dj(
    conn: &mut SqliteConnection,
    slot: &EventDj,
    mode: WriteMode,
) -> Result<()> {
    store::fetch::<Event>(conn, &[slot.event.as_str()]).await?;
    require::<Dj>(conn, &slot.dj, "dj").await?;
    require_optional_file(conn, slot.recording.as_deref(), "recording").await?;
    require_optional_file(conn, slot.visuals.as_deref(), "visuals").await?;
    check_key::<EventDj>(conn, &[slot.event.as_str(), slot.dj.as_str()], mode).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use shizu_common::db::init_memory_database;
    use shizu_common::db::models::FileRoot;
    use shizu_common::EntityKind;

    fn recording(name: &str) -> File {
        File {
            name: name.to_string(),
            root: FileRoot::Recordings,
            file_path: Some(format!("{}.mp4", name)),
            url_path: None,
        }
    }

    #[tokio::test]
    async fn test_file_needs_path_or_url() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let mut file = recording("rec1");
        file.file_path = None;
        assert!(matches!(
            validate_file(&mut conn, &file, WriteMode::Insert).await,
            Err(Error::InvalidInput(_))
        ));

        file.url_path = Some("https://files.example/rec1.mp4".into());
        validate_file(&mut conn, &file, WriteMode::Insert).await.unwrap();
    }

    #[test]
    fn test_plain_file_names() {
        assert!(is_plain_file_name("Night Drive.mp4"));
        assert!(is_plain_file_name("a..b"));
        for name in ["", ".", "..", "../escaped", "a/b", "a\\b"] {
            assert!(!is_plain_file_name(name), "{name:?} accepted");
        }
    }

    #[test]
    fn test_contained_paths() {
        assert!(is_contained_path("sets/2024/alice.mp4"));
        assert!(is_contained_path("./alice.mp4"));
        for path in ["", "/etc/passwd", "../alice.mp4", "sets/../../x", "sets\\..\\x"] {
            assert!(!is_contained_path(path), "{path:?} accepted");
        }
    }

    #[tokio::test]
    async fn test_file_path_must_stay_under_root() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let mut file = recording("rec1");
        file.file_path = Some("../outside.mp4".into());
        assert!(matches!(
            validate_file(&mut conn, &file, WriteMode::Insert).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_event_name_cannot_leave_export_dir() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        for name in ["../escaped", "nested/launch", ".."] {
            let event = Event {
                name: name.into(),
                ..Default::default()
            };
            assert!(
                matches!(
                    validate_event(&mut conn, &event, WriteMode::Insert).await,
                    Err(Error::InvalidInput(_))
                ),
                "{name:?} accepted"
            );
        }
    }

    #[tokio::test]
    async fn test_missing_logo_is_invalid_reference() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let dj = Dj {
            name: "alice".into(),
            logo: Some("alice_logo".into()),
            ..Default::default()
        };
        let err = validate_dj(&mut conn, &dj, WriteMode::Insert).await.unwrap_err();
        match err {
            Error::InvalidReference { entity, name, field } => {
                assert_eq!(entity, EntityKind::File);
                assert_eq!(name, "alice_logo");
                assert_eq!(field, "logo");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_insert_and_update_modes() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        store::insert(&mut conn, &recording("rec1")).await.unwrap();
        let promo = Promo {
            name: "summer".into(),
            promo_file: Some("rec1".into()),
        };

        assert!(matches!(
            validate_promo(&mut conn, &promo, WriteMode::Update).await,
            Err(Error::NotFound { .. })
        ));
        validate_promo(&mut conn, &promo, WriteMode::Insert).await.unwrap();

        store::insert(&mut conn, &promo).await.unwrap();
        assert!(matches!(
            validate_promo(&mut conn, &promo, WriteMode::Insert).await,
            Err(Error::AlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn test_event_dj_requires_event_first() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let slot = EventDj {
            event: "launch".into(),
            dj: "alice".into(),
            ..Default::default()
        };
        let err = validate_event_dj(&mut conn, &slot, WriteMode::Insert).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: EntityKind::Event, .. }));
    }
}
