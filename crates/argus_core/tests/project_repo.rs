mod common;

use argus_core::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use argus_core::{
    BlockKind, ModelValidationError, NewBlock, NewProject, ProjectState, RepoError,
};
use argus_core::db::open_db_in_memory;
use common::draft_project;

#[test]
fn new_projects_start_as_drafts() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();

    let mut project = NewProject::new("django", "  Django ");
    project.repository_url = Some("https://github.com/django/django".to_string());
    let id = repo.create_project(&project).unwrap();

    let loaded = repo.get_project(id).unwrap().unwrap();
    assert_eq!(loaded.state, ProjectState::Draft);
    assert_eq!(loaded.name, "Django");
    assert_eq!(loaded.featured_at, None);
    assert_eq!(
        loaded.repository_url.as_deref(),
        Some("https://github.com/django/django")
    );
    assert_eq!(repo.get_project_by_slug("django").unwrap(), Some(loaded));
}

#[test]
fn workflow_moves_forward_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let id = draft_project(&conn, "flask", "Flask");

    assert_eq!(
        repo.transition_state(id, ProjectState::InReview).unwrap(),
        ProjectState::InReview
    );
    // Re-applying the current state is a no-op.
    assert_eq!(
        repo.transition_state(id, ProjectState::InReview).unwrap(),
        ProjectState::InReview
    );
    assert_eq!(
        repo.transition_state(id, ProjectState::Published).unwrap(),
        ProjectState::Published
    );

    let err = repo
        .transition_state(id, ProjectState::Draft)
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ModelValidationError::InvalidTransition {
            from: ProjectState::Published,
            to: ProjectState::Draft,
        })
    ));
    assert!(repo.get_project(id).unwrap().unwrap().is_published());
}

#[test]
fn draft_can_skip_review() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let id = draft_project(&conn, "rocket", "Rocket");

    repo.transition_state(id, ProjectState::Published).unwrap();
    assert!(repo.get_project(id).unwrap().unwrap().is_published());
}

#[test]
fn transition_of_unknown_project_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();

    let err = repo
        .transition_state(404, ProjectState::Published)
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "project", .. }));
}

#[test]
fn featured_timestamp_can_be_set_and_cleared() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let id = draft_project(&conn, "axum", "Axum");

    repo.set_featured_at(id, Some(1_700_000_000_000)).unwrap();
    assert_eq!(
        repo.get_project(id).unwrap().unwrap().featured_at,
        Some(1_700_000_000_000)
    );
    repo.set_featured_at(id, None).unwrap();
    assert_eq!(repo.get_project(id).unwrap().unwrap().featured_at, None);
}

#[test]
fn project_tags_are_replaced_atomically() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let id = draft_project(&conn, "django", "Django");
    let web = repo.create_tag("Web", "web").unwrap();
    let python = repo.create_tag("Python", "python").unwrap();
    let orm = repo.create_tag("ORM", "orm").unwrap();

    repo.set_project_tags(id, &[web, python, web]).unwrap();
    let names: Vec<_> = repo
        .list_project_tags(id)
        .unwrap()
        .into_iter()
        .map(|tag| tag.name)
        .collect();
    assert_eq!(names, vec!["Python", "Web"]);

    repo.set_project_tags(id, &[orm]).unwrap();
    let slugs: Vec<_> = repo
        .list_project_tags(id)
        .unwrap()
        .into_iter()
        .map(|tag| tag.slug)
        .collect();
    assert_eq!(slugs, vec!["orm"]);

    let err = repo.set_project_tags(404, &[orm]).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
}

#[test]
fn tag_names_and_slugs_are_unique() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();

    repo.create_tag("Web", "web").unwrap();
    assert!(repo
        .create_tag("Web", "web-2")
        .unwrap_err()
        .is_constraint_violation());
    assert!(repo
        .create_tag("Web 2", "web")
        .unwrap_err()
        .is_constraint_violation());
    assert_eq!(repo.get_tag_by_slug("web").unwrap().unwrap().name, "Web");
    assert!(repo.get_tag_by_slug("nope").unwrap().is_none());
}

#[test]
fn block_upsert_keeps_one_row_per_kind_and_locale() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let id = draft_project(&conn, "django", "Django");

    let first = repo
        .upsert_block(id, &NewBlock::new(BlockKind::Overview, "EN", "# Django"))
        .unwrap();
    let second = repo
        .upsert_block(
            id,
            &NewBlock::new(BlockKind::Overview, "en", "# Django\nThe web framework"),
        )
        .unwrap();
    assert_eq!(first, second);

    let other = repo
        .upsert_block(id, &NewBlock::new(BlockKind::Overview, "fr", "# Django (fr)"))
        .unwrap();
    assert_ne!(first, other);

    let block = repo
        .get_block(id, BlockKind::Overview, "en")
        .unwrap()
        .unwrap();
    assert_eq!(block.content, "# Django\nThe web framework");
    assert_eq!(block.locale, "en");
    assert!(repo
        .get_block(id, BlockKind::Features, "en")
        .unwrap()
        .is_none());
}

#[test]
fn invalid_block_locale_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let id = draft_project(&conn, "django", "Django");

    let err = repo
        .upsert_block(id, &NewBlock::new(BlockKind::UseCase, "english!", "text"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ModelValidationError::InvalidLocale(_))
    ));
}
