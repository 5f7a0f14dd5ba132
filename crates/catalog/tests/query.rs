//! Integration tests for search and distinct values.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use spice_core::error::CoreError;
use spice_core::filter::{FilterField, FilterSpec, SortKey};
use spice_core::restaurant::{TimeSlot, Weekday};
use spice_db::models::restaurant::Restaurant;

use common::{fixture, fixture_with};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ids(restaurants: &[Restaurant]) -> Vec<i64> {
    restaurants.iter().map(|r| r.id).collect()
}

/// Whether `restaurant` satisfies every constraint in `spec`, checked
/// independently of the SQL translation.
fn satisfies(restaurant: &Restaurant, spec: &FilterSpec) -> bool {
    let name_ok = spec
        .name
        .as_ref()
        .is_none_or(|n| restaurant.name.to_lowercase().contains(&n.to_lowercase()));
    let cuisine_ok = spec.cuisines.is_empty() || spec.cuisines.contains(&restaurant.cuisine);
    let location_ok = spec.locations.is_empty() || spec.locations.contains(&restaurant.location);
    let rating_ok = spec
        .min_rating
        .is_none_or(|min| restaurant.avg_rating.is_some_and(|avg| avg >= min));
    let offering_ok = !spec.constrains_offerings()
        || restaurant.offerings.iter().any(|o| {
            spec.day.is_none_or(|d| o.day == d)
                && spec.time_slot.is_none_or(|t| o.time_slot == t)
                && spec.min_price.is_none_or(|p| o.price >= p)
                && spec.max_price.is_none_or(|p| o.price <= p)
        });

    name_ok && cuisine_ok && location_ok && rating_ok && offering_ok
}

fn sample_specs() -> Vec<FilterSpec> {
    let mut specs = vec![FilterSpec::default()];
    let names = [None, Some("o"), Some("ZUMA")];
    let cuisines: [&[&str]; 3] = [&[], &["Seafood"], &["Cuban", "Korean"]];
    let days = [None, Some(Weekday::Monday), Some(Weekday::Friday)];
    let slots = [None, Some(TimeSlot::Lunch), Some(TimeSlot::Dinner)];
    let prices = [(None, None), (Some(30), None), (None, Some(35)), (Some(35), Some(45))];
    let ratings = [None, Some(3.0), Some(4.5)];

    for name in names {
        for cuisine in cuisines {
            for day in days {
                for slot in slots {
                    for (min_price, max_price) in prices {
                        for min_rating in ratings {
                            specs.push(FilterSpec {
                                name: name.map(str::to_string),
                                cuisines: cuisine.iter().map(|c| c.to_string()).collect(),
                                day,
                                time_slot: slot,
                                min_price,
                                max_price,
                                min_rating,
                                ..Default::default()
                            });
                        }
                    }
                }
            }
        }
    }
    specs
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn seafood_search_finds_joes_and_italian_finds_nothing() {
    let f = fixture().await;

    let seafood = FilterSpec { cuisines: vec!["Seafood".into()], ..Default::default() };
    let found = f.query.search(seafood).await.unwrap();
    assert_eq!(ids(&found), vec![1]);
    assert_eq!(found[0].name, "Joe's Stone Crab");
    assert_eq!(found[0].location, "South Beach");
    let days: Vec<Weekday> = found[0].offerings.iter().map(|o| o.day).collect();
    assert_eq!(days, vec![Weekday::Monday, Weekday::Tuesday]);

    let italian = FilterSpec { cuisines: vec!["Italian".into()], ..Default::default() };
    assert!(f.query.search(italian).await.unwrap().is_empty());
}

#[tokio::test]
async fn search_never_returns_a_violating_restaurant() {
    let f = fixture().await;
    let all = f.query.search(FilterSpec::default()).await.unwrap();

    for spec in sample_specs() {
        let found = f.query.search(spec.clone()).await.unwrap();
        for restaurant in &found {
            assert!(satisfies(restaurant, &spec), "{} violates {spec:?}", restaurant.name);
        }
        let expected: Vec<i64> = all
            .iter()
            .filter(|r| satisfies(r, &spec))
            .map(|r| r.id)
            .collect();
        assert_eq!(ids(&found), expected, "{spec:?}");
    }
}

#[tokio::test]
async fn search_syncs_an_empty_mirror_first() {
    let f = fixture().await;
    assert!(f.sync.status().await.unwrap().last_synced_at.is_none());

    let found = f.query.search(FilterSpec::default()).await.unwrap();
    assert_eq!(found.len(), 4);
    assert_eq!(f.remote.catalog_fetches(), 1);
}

#[tokio::test]
async fn search_with_empty_mirror_and_remote_down_is_unavailable() {
    let f = fixture().await;
    f.remote.set_available(false);

    let err = f.query.search(FilterSpec::default()).await.unwrap_err();
    assert_matches!(err, CoreError::MirrorUnavailable(_));
}

#[tokio::test]
async fn blank_filters_impose_no_constraint() {
    let f = fixture().await;
    let spec = FilterSpec {
        name: Some("   ".into()),
        cuisines: vec!["".into(), " ".into()],
        ..Default::default()
    };
    assert_eq!(f.query.search(spec).await.unwrap().len(), 4);
}

#[tokio::test]
async fn inverted_price_range_is_rejected() {
    let f = fixture().await;
    let spec = FilterSpec { min_price: Some(50), max_price: Some(20), ..Default::default() };
    let err = f.query.search(spec).await.unwrap_err();
    assert_matches!(err, CoreError::Validation(_));
}

#[tokio::test]
async fn rating_sort_puts_unrated_last() {
    let f = fixture().await;
    let spec = FilterSpec { sort: SortKey::Rating, ..Default::default() };
    assert_eq!(ids(&f.query.search(spec).await.unwrap()), vec![2, 3, 1, 4]);
}

#[tokio::test]
async fn restaurant_lookup_reports_missing_id() {
    let f = fixture().await;
    assert_eq!(f.query.restaurant(3).await.unwrap().name, "Cote");

    let err = f.query.restaurant(99).await.unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "restaurant", id: 99 });
}

#[tokio::test]
async fn restaurant_names_are_sorted() {
    let f = fixture().await;
    let names: Vec<String> = f
        .query
        .restaurant_names()
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.name)
        .collect();
    assert_eq!(names, vec!["Cote", "Joe's Stone Crab", "Versailles", "Zuma"]);
}

// ---------------------------------------------------------------------------
// Distinct values
// ---------------------------------------------------------------------------

#[tokio::test]
async fn distinct_values_return_requested_fields_only() {
    let f = fixture().await;
    let values = f
        .query
        .distinct_values(&[FilterField::Cuisine, FilterField::Time])
        .await
        .unwrap();

    assert_eq!(values.len(), 2);
    assert_eq!(*values[&FilterField::Cuisine], vec!["Cuban", "Japanese", "Korean", "Seafood"]);
    assert_eq!(*values[&FilterField::Time], vec!["Brunch", "Lunch", "Dinner"]);
}

#[tokio::test]
async fn distinct_values_within_ttl_are_shared() {
    let f = fixture().await;
    let first = f.query.distinct_values(&[FilterField::Day]).await.unwrap();
    let second = f.query.distinct_values(&[FilterField::Day]).await.unwrap();

    assert!(Arc::ptr_eq(&first[&FilterField::Day], &second[&FilterField::Day]));
}

#[tokio::test]
async fn one_miss_repopulates_every_field() {
    let f = fixture().await;
    let cuisines = f.query.distinct_values(&[FilterField::Cuisine]).await.unwrap();
    let both = f
        .query
        .distinct_values(&[FilterField::Cuisine, FilterField::Price])
        .await
        .unwrap();

    assert!(Arc::ptr_eq(&cuisines[&FilterField::Cuisine], &both[&FilterField::Cuisine]));
    assert_eq!(*both[&FilterField::Price], vec!["28", "35", "45", "60"]);
}

#[tokio::test]
async fn distinct_values_reflect_resync_only_after_expiry() {
    let ttl = Duration::from_millis(200);
    let f = fixture_with(Duration::from_secs(3600), ttl).await;

    let before = f.query.distinct_values(&[FilterField::Cuisine]).await.unwrap();
    assert!(before[&FilterField::Cuisine].contains(&"Japanese".to_string()));

    f.remote.remove_restaurant(4);
    f.remote.upsert_restaurant(5, "Osteria", "Italian", "Brickell");
    f.sync.sync(true).await.unwrap();

    let within_ttl = f.query.distinct_values(&[FilterField::Cuisine]).await.unwrap();
    assert!(Arc::ptr_eq(&before[&FilterField::Cuisine], &within_ttl[&FilterField::Cuisine]));

    tokio::time::sleep(ttl + Duration::from_millis(50)).await;

    let after = f.query.distinct_values(&[FilterField::Cuisine]).await.unwrap();
    assert!(!Arc::ptr_eq(&before[&FilterField::Cuisine], &after[&FilterField::Cuisine]));
    assert_eq!(*after[&FilterField::Cuisine], vec!["Cuban", "Italian", "Korean", "Seafood"]);
}

#[tokio::test]
async fn name_search_folds_non_ascii_case() {
    let f = fixture().await;
    f.remote.upsert_restaurant(5, "Café La Trova", "Cuban", "Little Havana");
    f.remote.upsert_restaurant(6, "Ébano", "Mexican", "Wynwood");

    for needle in ["café", "CAFÉ", "la trova"] {
        let spec = FilterSpec { name: Some(needle.into()), ..Default::default() };
        let found = f.query.search(spec).await.unwrap();
        assert_eq!(ids(&found), vec![5], "{needle}");
    }

    let by_name = FilterSpec { sort: SortKey::Name, ..Default::default() };
    let names: Vec<String> = f
        .query
        .search(by_name)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(
        names,
        vec!["Café La Trova", "Cote", "Ébano", "Joe's Stone Crab", "Versailles", "Zuma"]
    );
}

// ---------------------------------------------------------------------------
// Timing statistics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn operations_are_recorded_with_failures() {
    let f = fixture().await;
    f.query.search(FilterSpec::default()).await.unwrap();
    f.query.search(FilterSpec::default()).await.unwrap();
    f.query.distinct_values(&[FilterField::Day]).await.unwrap();

    f.remote.set_available(false);
    f.sync.sync(true).await.unwrap_err();

    let summary = f.monitor.summary();
    assert_eq!(summary.operations["search"].count, 2);
    assert_eq!(summary.operations["distinct_values"].count, 1);

    let sync = &summary.operations["sync"];
    assert_eq!(sync.count, 2);
    assert_eq!(sync.errors, 1);
    assert_eq!(sync.error_rate, 50.0);
    assert_eq!(summary.total_operations, 5);
}
