//! Grant ownership analysis tests

mod common;

use common::Harness;
use sharegate_authz::{
    AcceptTarget, AccessState, AuthAccount, AuthzError, CircleAccess, CircleId, OwnershipOptions,
    PermissionLevel, RecipeAccess, RecipeId, UserAccess, UserId, VisibilityLevel,
};

const OWNER: UserId = UserId(1);
const FRIEND: UserId = UserId(2);
const RECIPE: RecipeId = RecipeId(99);

/// OWNER administers a private recipe and can see FRIEND
async fn shared_recipe() -> Harness {
    let harness = Harness::new();
    harness.repo.put_resource(RECIPE, VisibilityLevel::Private).await;
    harness
        .grant(RecipeAccess::new(RECIPE, OWNER, PermissionLevel::Admin).accepted())
        .await;
    harness
        .grant(UserAccess::new(FRIEND, OWNER, PermissionLevel::Read).accepted())
        .await;
    harness
}

#[tokio::test]
async fn test_resource_owner_sharing_with_other_user() {
    let harness = shared_recipe().await;
    let request = RecipeAccess::new(RECIPE, FRIEND, PermissionLevel::Write);

    let details = harness
        .analyzer
        .analyze(&AuthAccount::new(OWNER), &request)
        .await
        .unwrap();

    assert!(details.is_resource_owner);
    assert!(!details.is_recipient_owner);
    assert_eq!(details.maximum_permission_level, PermissionLevel::Admin);
    assert_eq!(details.access_state, AccessState::Pending);
    assert_eq!(details.accept_target, AcceptTarget::Recipient);
}

#[tokio::test]
async fn test_owner_sharing_with_self_is_accepted() {
    let harness = shared_recipe().await;
    let request = RecipeAccess::new(RECIPE, OWNER, PermissionLevel::Read);

    let details = harness
        .analyzer
        .analyze(&AuthAccount::new(OWNER), &request)
        .await
        .unwrap();

    assert!(details.is_resource_owner);
    assert!(details.is_recipient_owner);
    assert_eq!(details.access_state, AccessState::Accepted);
    assert_eq!(details.accept_target, AcceptTarget::Unspecified);
}

#[tokio::test]
async fn test_owner_sharing_with_own_circle_is_accepted() {
    let harness = shared_recipe().await;
    harness
        .grant(CircleAccess::new(CircleId(7), OWNER, PermissionLevel::Admin).accepted())
        .await;
    let request = RecipeAccess::new(RECIPE, CircleId(7), PermissionLevel::Read);

    let details = harness
        .analyzer
        .analyze(&AuthAccount::new(OWNER), &request)
        .await
        .unwrap();

    assert_eq!(details.access_state, AccessState::Accepted);
    assert_eq!(details.accept_target, AcceptTarget::Unspecified);
}

#[tokio::test]
async fn test_recipient_owner_requests_public_resource() {
    let harness = Harness::new();
    harness.repo.put_resource(RecipeId(3), VisibilityLevel::Public).await;
    harness
        .grant(CircleAccess::new(CircleId(7), FRIEND, PermissionLevel::Admin).accepted())
        .await;
    let request = RecipeAccess::new(RecipeId(3), CircleId(7), PermissionLevel::Read);

    let details = harness
        .analyzer
        .analyze(&AuthAccount::new(FRIEND), &request)
        .await
        .unwrap();

    assert!(!details.is_resource_owner);
    assert!(details.is_recipient_owner);
    assert_eq!(details.maximum_permission_level, PermissionLevel::Read);
    assert_eq!(details.access_state, AccessState::Pending);
    assert_eq!(details.accept_target, AcceptTarget::Resource);
}

#[tokio::test]
async fn test_new_grant_owned_by_neither_side() {
    let harness = Harness::new();
    harness.repo.put_resource(RecipeId(3), VisibilityLevel::Public).await;
    harness
        .grant(UserAccess::new(FRIEND, OWNER, PermissionLevel::Read).accepted())
        .await;
    let request = RecipeAccess::new(RecipeId(3), FRIEND, PermissionLevel::Read);

    let err = harness
        .analyzer
        .analyze(&AuthAccount::new(OWNER), &request)
        .await
        .unwrap_err();

    assert_eq!(err, AuthzError::internal("unable to determine access state"));
}

#[tokio::test]
async fn test_recipient_is_required() {
    let harness = shared_recipe().await;
    let request = RecipeAccess::new(RECIPE, UserId(0), PermissionLevel::Read);

    let err = harness
        .analyzer
        .analyze(&AuthAccount::new(OWNER), &request)
        .await
        .unwrap_err();

    assert_eq!(err, AuthzError::invalid_argument("recipient is required"));
}

#[tokio::test]
async fn test_unknown_recipient_fails_minimum() {
    let harness = shared_recipe().await;
    let request = RecipeAccess::new(RECIPE, UserId(40), PermissionLevel::Read);

    let err = harness
        .analyzer
        .analyze(&AuthAccount::new(OWNER), &request)
        .await
        .unwrap_err();

    assert_eq!(err, AuthzError::permission_denied("permission level too low"));

    // Lowering the recipient minimum lets the analysis through.
    let details = harness
        .analyzer
        .analyze_with(
            &AuthAccount::new(OWNER),
            &request,
            OwnershipOptions::new()
                .with_minimum_recipient_permission_level(PermissionLevel::Public),
        )
        .await
        .unwrap();
    assert_eq!(details.accept_target, AcceptTarget::Recipient);
}

#[tokio::test]
async fn test_unknown_resource_is_not_found() {
    let harness = Harness::new();
    let request = RecipeAccess::new(RecipeId(404), OWNER, PermissionLevel::Read);

    let err = harness
        .analyzer
        .analyze(&AuthAccount::new(OWNER), &request)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_stored_grant_passes_state_through() {
    let harness = shared_recipe().await;
    let stored = harness
        .grant(
            RecipeAccess::new(RECIPE, FRIEND, PermissionLevel::Read)
                .with_state(AccessState::Pending)
                .with_accept_target(AcceptTarget::Recipient),
        )
        .await;

    let details = harness
        .analyzer
        .analyze(&AuthAccount::new(OWNER), &stored)
        .await
        .unwrap();

    assert!(details.is_resource_owner);
    assert_eq!(details.access_state, AccessState::Pending);
    assert_eq!(details.accept_target, AcceptTarget::Recipient);
}

#[tokio::test]
async fn test_auto_omit_skips_resource_check_for_recipient_target() {
    let harness = shared_recipe().await;
    let stored = harness
        .grant(
            RecipeAccess::new(RECIPE, FRIEND, PermissionLevel::Read)
                .with_state(AccessState::Pending)
                .with_accept_target(AcceptTarget::Recipient),
        )
        .await;
    let friend = AuthAccount::new(FRIEND);

    // FRIEND cannot see the private recipe until the grant is accepted.
    let err = harness.analyzer.analyze(&friend, &stored).await.unwrap_err();
    assert_eq!(err, AuthzError::permission_denied("permission level too low"));

    let details = harness
        .analyzer
        .analyze_with(&friend, &stored, OwnershipOptions::new().allow_auto_omit_access_checks())
        .await
        .unwrap();

    assert!(details.is_recipient_owner);
    assert!(!details.is_resource_owner);
    assert_eq!(details.maximum_permission_level, PermissionLevel::Read);
}

#[tokio::test]
async fn test_forced_omits_skip_both_checks() {
    let harness = Harness::new();
    let stored = harness
        .grant(RecipeAccess::new(RecipeId(404), UserId(40), PermissionLevel::Write).accepted())
        .await;

    let details = harness
        .analyzer
        .analyze_with(
            &AuthAccount::new(OWNER),
            &stored,
            OwnershipOptions::new()
                .force_omit_resource_check()
                .force_omit_recipient_check(),
        )
        .await
        .unwrap();

    assert!(!details.is_either_owner());
    assert_eq!(details.maximum_permission_level, PermissionLevel::Read);
    assert_eq!(details.access_state, AccessState::Accepted);
}
