use std::collections::HashSet;
use std::sync::Arc;

use pagination::{Cursor, PageRequest};
use rstest::rstest;
use serde_json::json;

use super::*;
use crate::domain::business::RatingTier;
use crate::domain::error::ErrorCode;
use crate::domain::ports::MockDocumentStore;
use crate::outbound::persistence::InMemoryDocumentStore;

fn owner() -> UserId {
    UserId::new("user-owner").expect("id")
}

fn stranger() -> UserId {
    UserId::new("user-stranger").expect("id")
}

fn draft(name: &str) -> BusinessDraft {
    BusinessDraft {
        name: name.to_owned(),
        description: Some(format!("{name} serves the neighbourhood")),
        category: "food".to_owned(),
        city: "Lagos".to_owned(),
        state: "Lagos".to_owned(),
        address: None,
        phone: None,
    }
}

fn review_draft(rating: i64) -> ReviewDraft {
    ReviewDraft {
        rating,
        comment: "solid experience".to_owned(),
    }
}

fn memory_service() -> (Arc<InMemoryDocumentStore>, DirectoryService<InMemoryDocumentStore>) {
    let store = Arc::new(InMemoryDocumentStore::new());
    let service = DirectoryService::new(Arc::clone(&store));
    (store, service)
}

fn page(size: usize, cursor: Option<String>) -> PageRequest {
    PageRequest::new(size, cursor).expect("page size")
}

#[tokio::test]
async fn create_assigns_an_id_and_starts_with_empty_aggregates() {
    let (store, service) = memory_service();
    let business = service
        .create(owner(), draft("Mama Put"))
        .await
        .expect("create");

    assert_ne!(business.id.as_ref(), "pending");
    assert_eq!(business.review_count, 0);
    assert_eq!(business.rating_score, 0.0);
    assert_eq!(business.rating_tier, RatingTier::Silver);

    let stored = store
        .get(Collection::BUSINESSES, business.id.as_ref())
        .await
        .expect("get")
        .expect("present");
    assert_eq!(stored["name"], json!("Mama Put"));
    assert_eq!(stored["ownerId"], json!("user-owner"));
}

#[tokio::test]
async fn create_rejects_blank_names_without_writing() {
    let (store, service) = memory_service();
    let mut bad = draft("  ");
    bad.name = "   ".to_owned();
    let err = service.create(owner(), bad).await.expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);

    let batch = store
        .query(
            Collection::BUSINESSES,
            &[],
            Sort {
                field: "createdAt",
                direction: SortDirection::Desc,
            },
            10,
            None,
        )
        .await
        .expect("query");
    assert!(batch.is_empty());
}

#[tokio::test]
async fn append_review_recomputes_aggregates_and_writes_them_together() {
    let (_store, service) = memory_service();
    let business = service
        .create(owner(), draft("Mama Put"))
        .await
        .expect("create");

    for rating in [5, 4, 4, 5] {
        service
            .append_review(&business.id, stranger(), review_draft(rating))
            .await
            .expect("append");
    }

    let fetched = service.fetch(&business.id).await.expect("fetch");
    assert_eq!(fetched.review_count, 4);
    assert_eq!(fetched.rating_score, 4.5);
    // High score but far too few reviews for a higher tier.
    assert_eq!(fetched.rating_tier, RatingTier::Silver);
    assert_eq!(fetched.reviews.len(), 4);
}

#[tokio::test]
async fn append_review_crossing_a_tier_threshold_promotes_the_listing() {
    let (_store, service) = memory_service();
    let business = service
        .create(owner(), draft("Mama Put"))
        .await
        .expect("create");

    // 49 five-star reviews followed by one four-star: exactly at the gold
    // thresholds (score 4.98, count 50) once the last review lands.
    for _ in 0..49 {
        service
            .append_review(&business.id, stranger(), review_draft(5))
            .await
            .expect("append");
    }
    let before = service.fetch(&business.id).await.expect("fetch");
    assert_eq!(before.rating_tier, RatingTier::Silver);

    let receipt = service
        .append_review(&business.id, stranger(), review_draft(4))
        .await
        .expect("append");
    assert_eq!(receipt.business.review_count, 50);
    assert_eq!(receipt.business.rating_tier, RatingTier::Gold);
}

#[tokio::test]
async fn append_review_on_a_missing_business_writes_nothing() {
    let mut store = MockDocumentStore::new();
    store
        .expect_get()
        .times(1)
        .returning(|_, _| Ok(None));
    store.expect_update().times(0);

    let service = DirectoryService::new(Arc::new(store));
    let id = BusinessId::new("absent").expect("id");
    let err = service
        .append_review(&id, stranger(), review_draft(5))
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(0)]
#[case(6)]
#[case(-1)]
#[tokio::test]
async fn append_review_rejects_out_of_range_ratings_before_any_read(#[case] rating: i64) {
    let mut store = MockDocumentStore::new();
    store.expect_get().times(0);
    store.expect_update().times(0);

    let service = DirectoryService::new(Arc::new(store));
    let id = BusinessId::new("b1").expect("id");
    let err = service
        .append_review(&id, stranger(), review_draft(rating))
        .await
        .expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details().and_then(|d| d.get("field")),
        Some(&json!("rating"))
    );
}

#[tokio::test]
async fn append_review_update_carries_every_aggregate_field() {
    let doc = json!({
        "id": "b1",
        "ownerId": "user-owner",
        "name": "Mama Put",
        "category": "food",
        "city": "Lagos",
        "state": "Lagos",
        "reviews": [],
        "ratingScore": 0.0,
        "reviewCount": 0,
        "ratingTier": "silver",
        "isPinned": false,
        "createdAt": "2026-01-01T00:00:00Z",
    });

    let mut store = MockDocumentStore::new();
    store
        .expect_get()
        .times(1)
        .returning(move |_, _| Ok(Some(doc.clone())));
    store
        .expect_update()
        .times(1)
        .withf(|collection, id, partial| {
            *collection == Collection::BUSINESSES
                && id == "b1"
                && partial.get("reviews").is_some()
                && partial["ratingScore"] == json!(5.0)
                && partial["reviewCount"] == json!(1)
                && partial["ratingTier"] == json!("silver")
        })
        .returning(|_, _, _| Ok(()));

    let service = DirectoryService::new(Arc::new(store));
    let id = BusinessId::new("b1").expect("id");
    let receipt = service
        .append_review(&id, stranger(), review_draft(5))
        .await
        .expect("append");
    assert_eq!(receipt.review.rating, 5);
    assert_eq!(receipt.business.review_count, 1);
}

#[tokio::test]
async fn concurrent_appends_to_one_business_all_land() {
    let (_store, service) = memory_service();
    let service = Arc::new(service);
    let business = service
        .create(owner(), draft("Mama Put"))
        .await
        .expect("create");

    let mut handles = Vec::new();
    for _ in 0..10 {
        let service = Arc::clone(&service);
        let id = business.id.clone();
        handles.push(tokio::spawn(async move {
            service
                .append_review(&id, stranger(), review_draft(5))
                .await
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("append");
    }

    let fetched = service.fetch(&business.id).await.expect("fetch");
    assert_eq!(fetched.review_count, 10);
    assert_eq!(fetched.reviews.len(), 10);
}

#[tokio::test]
async fn updates_by_anyone_but_the_owner_are_forbidden() {
    let (_store, service) = memory_service();
    let business = service
        .create(owner(), draft("Mama Put"))
        .await
        .expect("create");

    let changes = BusinessChanges {
        name: Some("Hijacked".to_owned()),
        ..BusinessChanges::default()
    };
    let err = service
        .update(&business.id, &stranger(), changes)
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    // Even an empty payload is rejected on ownership before validation.
    let err = service
        .update(&business.id, &stranger(), BusinessChanges::default())
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    let fetched = service.fetch(&business.id).await.expect("fetch");
    assert_eq!(fetched.name, "Mama Put");
}

#[tokio::test]
async fn owner_updates_merge_only_the_supplied_fields() {
    let (_store, service) = memory_service();
    let business = service
        .create(owner(), draft("Mama Put"))
        .await
        .expect("create");

    let changes = BusinessChanges {
        phone: Some("+234-800-0000".to_owned()),
        is_pinned: Some(true),
        ..BusinessChanges::default()
    };
    let updated = service
        .update(&business.id, &owner(), changes)
        .await
        .expect("update");
    assert_eq!(updated.phone.as_deref(), Some("+234-800-0000"));
    assert!(updated.is_pinned);
    assert_eq!(updated.name, "Mama Put");

    let fetched = service.fetch(&business.id).await.expect("fetch");
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn updates_cannot_blank_out_validated_fields() {
    let (_store, service) = memory_service();
    let business = service
        .create(owner(), draft("Mama Put"))
        .await
        .expect("create");

    let changes = BusinessChanges {
        name: Some("   ".to_owned()),
        ..BusinessChanges::default()
    };
    let err = service
        .update(&business.id, &owner(), changes)
        .await
        .expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);

    let changes = BusinessChanges {
        category: Some(String::new()),
        ..BusinessChanges::default()
    };
    let err = service
        .update(&business.id, &owner(), changes)
        .await
        .expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);

    let fetched = service.fetch(&business.id).await.expect("fetch");
    assert_eq!(fetched.name, "Mama Put");
    assert_eq!(fetched.category, "food");
}

#[tokio::test]
async fn empty_updates_are_rejected() {
    let (_store, service) = memory_service();
    let business = service
        .create(owner(), draft("Mama Put"))
        .await
        .expect("create");
    let err = service
        .update(&business.id, &owner(), BusinessChanges::default())
        .await
        .expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn deletes_are_owner_only_and_remove_the_document() {
    let (store, service) = memory_service();
    let business = service
        .create(owner(), draft("Mama Put"))
        .await
        .expect("create");

    let err = service
        .delete(&business.id, &stranger())
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    service
        .delete(&business.id, &owner())
        .await
        .expect("delete");
    let gone = store
        .get(Collection::BUSINESSES, business.id.as_ref())
        .await
        .expect("get");
    assert!(gone.is_none());

    let err = service.fetch(&business.id).await.expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(25, vec![10, 10, 5], vec![true, true, false])]
#[case(20, vec![10, 10], vec![true, true])]
#[tokio::test]
async fn pagination_walks_the_whole_collection_without_gaps_or_repeats(
    #[case] total: usize,
    #[case] expected_sizes: Vec<usize>,
    #[case] expected_more: Vec<bool>,
) {
    let (_store, service) = memory_service();
    for n in 0..total {
        service
            .create(owner(), draft(&format!("Listing {n:02}")))
            .await
            .expect("create");
    }

    let mut seen = HashSet::new();
    let mut sizes = Vec::new();
    let mut more = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let result = service
            .list(BusinessFilter::default(), page(10, cursor.clone()))
            .await
            .expect("list");
        if result.items.is_empty() && !sizes.is_empty() {
            assert!(!result.has_more);
            break;
        }
        sizes.push(result.items.len());
        more.push(result.has_more);
        for business in &result.items {
            assert!(seen.insert(business.id.clone()), "duplicate item in page");
        }
        match result.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    assert_eq!(sizes, expected_sizes);
    assert_eq!(more, expected_more);
    assert_eq!(seen.len(), total);
}

#[tokio::test]
async fn listing_the_same_page_twice_is_idempotent() {
    let (_store, service) = memory_service();
    for n in 0..5 {
        service
            .create(owner(), draft(&format!("Listing {n}")))
            .await
            .expect("create");
    }

    let first = service
        .list(BusinessFilter::default(), page(3, None))
        .await
        .expect("list");
    let second = service
        .list(BusinessFilter::default(), page(3, None))
        .await
        .expect("list");
    assert_eq!(first.items, second.items);
    assert_eq!(first.next_cursor, second.next_cursor);
    assert_eq!(first.has_more, second.has_more);
}

#[tokio::test]
async fn cursors_reject_a_changed_filter_scope() {
    let (_store, service) = memory_service();
    for n in 0..15 {
        service
            .create(owner(), draft(&format!("Listing {n:02}")))
            .await
            .expect("create");
    }

    let first = service
        .list(BusinessFilter::default(), page(10, None))
        .await
        .expect("list");
    let cursor = first.next_cursor.expect("cursor");

    let mut narrowed = BusinessFilter::default();
    narrowed.city = Some("Accra".to_owned());
    let err = service
        .list(narrowed, page(10, Some(cursor)))
        .await
        .expect_err("scope mismatch");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details().and_then(|d| d.get("code")),
        Some(&json!("cursor_scope_mismatch"))
    );
}

#[tokio::test]
async fn garbled_cursors_are_an_invalid_request() {
    let (_store, service) = memory_service();
    let err = service
        .list(
            BusinessFilter::default(),
            page(10, Some("not-base64!!".to_owned())),
        )
        .await
        .expect_err("malformed");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details().and_then(|d| d.get("code")),
        Some(&json!("cursor_malformed"))
    );
}

#[tokio::test]
async fn list_forwards_the_cursor_id_to_the_store() {
    let scope = BusinessFilter::default().build().scope();
    let cursor = Cursor::new("b5", &scope).encode();

    let mut store = MockDocumentStore::new();
    store
        .expect_query()
        .times(1)
        .withf(|collection, clauses, _, limit, after| {
            *collection == Collection::BUSINESSES
                && clauses.is_empty()
                && *limit == 10
                && after.as_deref() == Some("b5")
        })
        .returning(|_, _, _, _, _| Ok(Vec::new()));

    let service = DirectoryService::new(Arc::new(store));
    let result = service
        .list(BusinessFilter::default(), page(10, Some(cursor)))
        .await
        .expect("list");
    assert!(result.items.is_empty());
}

#[tokio::test]
async fn cursor_pointing_at_a_deleted_listing_ends_the_walk() {
    let (_store, service) = memory_service();
    for n in 0..6 {
        service
            .create(owner(), draft(&format!("Listing {n}")))
            .await
            .expect("create");
    }

    let first = service
        .list(BusinessFilter::default(), page(3, None))
        .await
        .expect("list");
    let last = first.items.last().expect("page item");
    service
        .delete(&last.id, &owner())
        .await
        .expect("delete");

    let resumed = service
        .list(BusinessFilter::default(), page(3, first.next_cursor.clone()))
        .await
        .expect("list");
    assert!(resumed.items.is_empty());
    assert!(!resumed.has_more);
}

#[tokio::test]
async fn search_shortens_pages_without_skipping_store_positions() {
    let (_store, service) = memory_service();
    for n in 0..8 {
        let name = if n % 2 == 0 {
            format!("Suya Spot {n}")
        } else {
            format!("Listing {n}")
        };
        service.create(owner(), draft(&name)).await.expect("create");
    }

    let mut filter = BusinessFilter::default();
    filter.search_term = Some("suya".to_owned());
    let first = service.list(filter.clone(), page(4, None)).await.expect("list");
    // Four fetched positions, only the matching subset surfaces.
    assert!(first.items.len() <= 4);
    assert!(first.items.iter().all(|b| b.name.contains("Suya")));
    assert!(first.has_more);

    let mut matched: Vec<_> = first.items.iter().map(|b| b.id.clone()).collect();
    let second = service
        .list(filter, page(4, first.next_cursor))
        .await
        .expect("list");
    matched.extend(second.items.iter().map(|b| b.id.clone()));
    let unique: HashSet<_> = matched.iter().cloned().collect();
    assert_eq!(unique.len(), matched.len());
    assert_eq!(matched.len(), 4);
}

#[tokio::test]
async fn filters_scope_the_page_and_its_cursor() {
    let (_store, service) = memory_service();
    for n in 0..4 {
        let mut d = draft(&format!("Food {n}"));
        d.category = "food".to_owned();
        service.create(owner(), d).await.expect("create");
    }
    let mut d = draft("Garage");
    d.category = "auto".to_owned();
    service.create(owner(), d).await.expect("create");

    let mut filter = BusinessFilter::default();
    filter.category = Some("food".to_owned());
    let result = service.list(filter, page(10, None)).await.expect("list");
    assert_eq!(result.items.len(), 4);
    assert!(result.items.iter().all(|b| b.category == "food"));
    assert!(!result.has_more);
}

#[tokio::test]
async fn featured_returns_only_pinned_listings() {
    let (_store, service) = memory_service();
    let pinned = service
        .create(owner(), draft("Pinned Spot"))
        .await
        .expect("create");
    service
        .update(
            &pinned.id,
            &owner(),
            BusinessChanges {
                is_pinned: Some(true),
                ..BusinessChanges::default()
            },
        )
        .await
        .expect("update");
    service
        .create(owner(), draft("Ordinary Spot"))
        .await
        .expect("create");

    let featured = service.featured().await.expect("featured");
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0].id, pinned.id);
}

#[test]
fn cursor_errors_map_to_invalid_request_codes() {
    let raw = Cursor::new("b1", "scope-a").encode();
    let cursor = Cursor::decode(&raw).expect("decode");
    let scope_err = cursor.require_scope("scope-b").expect_err("mismatch");
    let err = invalid_cursor_error(scope_err);
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}
