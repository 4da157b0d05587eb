use homebase_db::StoreError;
use homebase_db::models::{Apartment, Membership, User};
use homebase_services::auth::Session;
use homebase_services::{ProtocolError, Resolution, ResolutionSource};

use crate::fixtures::harness::{TestHarness, resolver, session_for};
use crate::fixtures::memory_store::Op;

fn found(resolution: Resolution) -> (String, homebase_services::ApartmentMetadata) {
    match resolution {
        Resolution::Found {
            apartment_id,
            metadata,
        } => (apartment_id, metadata),
        Resolution::NotFound => panic!("expected a confirmed apartment"),
    }
}

#[tokio::test]
async fn valid_pointer_short_circuits() {
    let h = TestHarness::signed_in("u1");
    h.store.seed_apartment("apt_42", "Maple Street 42", "PWU0VU");
    h.store.seed_user("u1", Some("apt_42"));
    h.store.seed_membership("apt_42", "u1", 1_000);
    h.store.seed_membership("apt_42", "u2", 2_000);

    let resolution = resolver(&h.store)
        .resolve(&session_for("u1"))
        .await
        .unwrap();
    let (apartment_id, metadata) = found(resolution);

    assert_eq!(apartment_id, "apt_42");
    assert_eq!(metadata.source, ResolutionSource::ProfilePointer);
    assert_eq!(metadata.name.as_deref(), Some("Maple Street 42"));
    assert_eq!(metadata.invite_code.as_deref(), Some("PWU0VU"));
    assert_eq!(metadata.member_count, 2);
    // No history lookup and nothing to heal.
    assert_eq!(h.store.calls(Op::Patch, User::COLLECTION), 0);
    assert_eq!(h.store.calls(Op::Query, Membership::COLLECTION), 1);
}

#[tokio::test]
async fn stale_pointer_without_history_is_not_found() {
    let h = TestHarness::signed_in("u1");
    h.store.seed_apartment("apt_old", "Old Flat", "OLD123");
    h.store.seed_user("u1", Some("apt_old"));

    let resolution = resolver(&h.store)
        .resolve(&session_for("u1"))
        .await
        .unwrap();

    assert_eq!(resolution, Resolution::NotFound);
}

#[tokio::test]
async fn stale_pointer_falls_back_to_history_and_heals() {
    let h = TestHarness::signed_in("u1");
    h.store.seed_apartment("apt_old", "Old Flat", "OLD123");
    h.store.seed_apartment("apt_42", "Maple Street 42", "PWU0VU");
    h.store.seed_user("u1", Some("apt_old"));
    h.store.seed_membership("apt_42", "u1", 5_000);

    let resolution = resolver(&h.store)
        .resolve(&session_for("u1"))
        .await
        .unwrap();
    let (apartment_id, metadata) = found(resolution);

    assert_eq!(apartment_id, "apt_42");
    assert_eq!(metadata.source, ResolutionSource::MembershipHistory);
    let profile = h.store.document(User::COLLECTION, "u1").unwrap();
    assert_eq!(profile["current_apartment_id"], "apt_42");
    assert_eq!(profile["display_name"], "User u1");
}

#[tokio::test]
async fn removed_membership_invalidates_pointer() {
    let h = TestHarness::signed_in("u1");
    h.store.seed_apartment("apt_42", "Maple Street 42", "PWU0VU");
    h.store.seed_user("u1", Some("apt_42"));
    h.store.seed_membership("apt_42", "u1", 1_000);
    h.store.remove(Membership::COLLECTION, "apt_42_u1");

    let resolution = resolver(&h.store)
        .resolve(&session_for("u1"))
        .await
        .unwrap();

    assert_eq!(resolution, Resolution::NotFound);
}

#[tokio::test]
async fn history_matching_a_rejected_pointer_is_not_revalidated() {
    let h = TestHarness::signed_in("u1");
    h.store.seed_apartment("apt_42", "Maple Street 42", "PWU0VU");
    h.store.seed_user("u1", Some("apt_42"));
    h.store.seed_membership("apt_42", "u1", 1_000);
    // Rules lag behind the membership row: only the first scoped query is refused.
    h.store.fail_times(
        Op::Query,
        Membership::COLLECTION,
        1,
        StoreError::PermissionDenied("memberships".to_string()),
    );

    let resolution = resolver(&h.store)
        .resolve(&session_for("u1"))
        .await
        .unwrap();

    assert_eq!(resolution, Resolution::NotFound);
    // Pointer validation plus the history lookup, no second validation.
    assert_eq!(h.store.calls(Op::Query, Membership::COLLECTION), 2);
    assert_eq!(h.store.calls(Op::Patch, User::COLLECTION), 0);
}

#[tokio::test]
async fn latest_membership_wins() {
    let h = TestHarness::signed_in("u1");
    h.store.seed_user("u1", None);
    h.store.seed_membership("apt_a", "u1", 2_000);
    h.store.seed_membership("apt_b", "u1", 1_000);

    let resolution = resolver(&h.store)
        .resolve(&session_for("u1"))
        .await
        .unwrap();

    assert_eq!(resolution.apartment_id(), Some("apt_a"));
}

#[tokio::test]
async fn equal_join_times_break_ties_by_document_id() {
    let h = TestHarness::signed_in("u1");
    h.store.seed_user("u1", None);
    h.store.seed_membership("apt_a", "u1", 1_000);
    h.store.seed_membership("apt_b", "u1", 1_000);

    let resolver = resolver(&h.store);
    for _ in 0..3 {
        let resolution = resolver.resolve(&session_for("u1")).await.unwrap();
        assert_eq!(resolution.apartment_id(), Some("apt_b"));
    }
}

#[tokio::test]
async fn missing_profile_uses_history() {
    let h = TestHarness::signed_in("u1");
    h.store.seed_membership("apt_42", "u1", 1_000);

    let resolution = resolver(&h.store)
        .resolve(&session_for("u1"))
        .await
        .unwrap();

    // Healing fails on the missing profile but the answer stands.
    assert_eq!(resolution.apartment_id(), Some("apt_42"));
    assert!(h.store.document(User::COLLECTION, "u1").is_none());
}

#[tokio::test]
async fn malformed_pointer_is_ignored() {
    let h = TestHarness::signed_in("u1");
    h.store.seed_user("u1", Some("bad/pointer"));
    h.store.seed_membership("apt_42", "u1", 1_000);

    let resolution = resolver(&h.store)
        .resolve(&session_for("u1"))
        .await
        .unwrap();

    assert_eq!(resolution.apartment_id(), Some("apt_42"));
}

#[tokio::test]
async fn no_memberships_is_not_found() {
    let h = TestHarness::signed_in("u1");
    h.store.seed_user("u1", None);

    let resolution = resolver(&h.store)
        .resolve(&session_for("u1"))
        .await
        .unwrap();

    assert_eq!(resolution, Resolution::NotFound);
}

#[tokio::test]
async fn transient_profile_failure_propagates_after_retries() {
    let h = TestHarness::signed_in("u1");
    h.store.seed_user("u1", Some("apt_42"));
    h.store.fail_always(
        Op::Get,
        User::COLLECTION,
        StoreError::Unavailable("503".to_string()),
    );

    let err = resolver(&h.store)
        .resolve(&session_for("u1"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProtocolError::NetworkTransient(_)));
    assert_eq!(h.store.calls(Op::Get, User::COLLECTION), 3);
}

#[tokio::test]
async fn rejected_token_requires_authentication() {
    let h = TestHarness::signed_in("u1");
    h.store.seed_user("u1", None);
    let session = Session {
        token: "not-a-token".to_string(),
        ..session_for("u1")
    };

    let err = resolver(&h.store).resolve(&session).await.unwrap_err();

    assert_eq!(err, ProtocolError::AuthRequired);
    assert_eq!(h.store.calls(Op::Get, User::COLLECTION), 1);
}

#[tokio::test]
async fn metadata_is_best_effort() {
    let h = TestHarness::signed_in("u1");
    h.store.seed_apartment("apt_42", "Maple Street 42", "PWU0VU");
    h.store.seed_user("u1", Some("apt_42"));
    h.store.seed_membership("apt_42", "u1", 1_000);
    h.store.fail_always(
        Op::Get,
        Apartment::COLLECTION,
        StoreError::Unavailable("503".to_string()),
    );

    let resolution = resolver(&h.store)
        .resolve(&session_for("u1"))
        .await
        .unwrap();
    let (apartment_id, metadata) = found(resolution);

    assert_eq!(apartment_id, "apt_42");
    assert_eq!(metadata.name, None);
    assert_eq!(metadata.member_count, 1);
}
