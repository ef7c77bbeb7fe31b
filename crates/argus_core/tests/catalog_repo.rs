mod common;

use argus_core::repo::catalog_repo::{CatalogRepository, SqliteCatalogRepository};
use argus_core::{
    resolve, ModelValidationError, NewCategory, NewField, NewTranslation, RepoError, Resolution,
};
use common::seeded;

#[test]
fn load_catalog_orders_by_weight_then_id() {
    let fixture = seeded();
    let repo = SqliteCatalogRepository::try_new(&fixture.conn).unwrap();

    let catalog = repo.load_catalog().unwrap();
    let categories: Vec<_> = catalog
        .categories
        .iter()
        .map(|node| node.category.slug.as_str())
        .collect();
    assert_eq!(categories, vec!["community", "security"]);

    let security_fields: Vec<_> = catalog.categories[1]
        .fields
        .iter()
        .map(|field| field.slug.as_str())
        .collect();
    assert_eq!(security_fields, vec!["audits", "vulnerabilities"]);
    assert_eq!(catalog.fields().count(), 3);
}

#[test]
fn equal_weights_fall_back_to_insertion_order() {
    let fixture = seeded();
    let repo = SqliteCatalogRepository::try_new(&fixture.conn).unwrap();
    let late = repo
        .create_field(&NewField::new(fixture.community, "governance", 1))
        .unwrap();

    let catalog = repo.load_catalog().unwrap();
    let community = &catalog.categories[0];
    let ids: Vec<_> = community.fields.iter().map(|field| field.id).collect();
    assert_eq!(ids, vec![fixture.activity, late]);
}

#[test]
fn catalog_carries_translations_in_insertion_order() {
    let fixture = seeded();
    let repo = SqliteCatalogRepository::try_new(&fixture.conn).unwrap();

    let category = repo.get_category(fixture.security).unwrap().unwrap();
    let locales: Vec<_> = category
        .translations
        .iter()
        .map(|translation| translation.locale.as_str())
        .collect();
    assert_eq!(locales, vec!["en", "fr"]);

    let name = resolve(&category, "fr_FR");
    assert_eq!(name.name, "Security");
    assert_eq!(name.resolution, Resolution::English);
    assert_eq!(resolve(&category, "FR").name, "Sécurité");
}

#[test]
fn duplicate_locale_translation_is_a_constraint_error() {
    let fixture = seeded();
    let repo = SqliteCatalogRepository::try_new(&fixture.conn).unwrap();

    let err = repo
        .add_category_translation(fixture.security, &NewTranslation::new("en", "Again"))
        .unwrap_err();
    assert!(err.is_constraint_violation());

    repo.add_category_translation(fixture.security, &NewTranslation::new("de", "Sicherheit"))
        .unwrap();
}

#[test]
fn duplicate_slugs_are_rejected_per_scope() {
    let fixture = seeded();
    let repo = SqliteCatalogRepository::try_new(&fixture.conn).unwrap();

    let err = repo
        .create_category(&NewCategory::new("security", 1))
        .unwrap_err();
    assert!(err.is_constraint_violation());

    let err = repo
        .create_field(&NewField::new(fixture.security, "audits", 1))
        .unwrap_err();
    assert!(err.is_constraint_violation());

    // Same field slug under another category is fine.
    repo.create_field(&NewField::new(fixture.community, "audits", 1))
        .unwrap();
}

#[test]
fn failed_translation_rolls_back_the_whole_category() {
    let fixture = seeded();
    let repo = SqliteCatalogRepository::try_new(&fixture.conn).unwrap();

    let err = repo
        .create_category(
            &NewCategory::new("licensing", 1)
                .translated("en", "Licensing")
                .translated("en", "Licensing again"),
        )
        .unwrap_err();
    assert!(err.is_constraint_violation());
    assert!(repo.find_category("licensing").unwrap().is_none());
}

#[test]
fn invalid_input_is_rejected_before_sql() {
    let fixture = seeded();
    let repo = SqliteCatalogRepository::try_new(&fixture.conn).unwrap();

    let err = repo
        .create_category(&NewCategory::new("Not A Slug", 1))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ModelValidationError::InvalidSlug(_))
    ));

    let mut field = NewField::new(fixture.security, "fuzzing", 1);
    field.analysis_periodicity_days = Some(0);
    let err = repo.create_field(&field).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ModelValidationError::InvalidPeriodicity(0))
    ));

    let err = repo
        .add_field_translation(fixture.audits, &NewTranslation::new("en", "   "))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ModelValidationError::BlankName)
    ));
}

#[test]
fn find_by_slugs_walks_the_hierarchy() {
    let fixture = seeded();
    let repo = SqliteCatalogRepository::try_new(&fixture.conn).unwrap();

    let field = repo.find_field("security", "audits").unwrap().unwrap();
    assert_eq!(field.id, fixture.audits);
    assert!(field.translations.is_empty());
    assert!(repo.find_field("community", "audits").unwrap().is_none());

    let metric = repo
        .find_metric("community", "activity", "commits")
        .unwrap()
        .unwrap();
    assert_eq!(metric.id, fixture.commits);
    assert_eq!(
        metric.translations[0].description.as_deref(),
        Some("Commits over the last 30 days")
    );
    assert!(repo
        .find_metric("security", "activity", "commits")
        .unwrap()
        .is_none());
}

#[test]
fn metric_collection_can_be_toggled() {
    let fixture = seeded();
    let repo = SqliteCatalogRepository::try_new(&fixture.conn).unwrap();

    let metrics = repo.list_metrics(fixture.activity).unwrap();
    let enabled: Vec<_> = metrics
        .iter()
        .map(|metric| (metric.slug.as_str(), metric.collection_enabled))
        .collect();
    assert_eq!(enabled, vec![("commits", true), ("stars", false)]);

    repo.set_metric_collection(fixture.stars, true).unwrap();
    let stars = repo
        .find_metric("community", "activity", "stars")
        .unwrap()
        .unwrap();
    assert!(stars.collection_enabled);

    let err = repo.set_metric_collection(9_999, true).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "metric", .. }));
}
