use super::*;

use input::DryRunDriver;
use shared::{
    domain::CombinationId,
    protocol::{Patch, SessionStateRequest},
};

struct Harness {
    router: ActionRouter,
    session: Arc<SessionStore>,
    driver: DryRunDriver,
}

fn harness_with(driver: DryRunDriver) -> Harness {
    let catalog = Arc::new(CombinationCatalog::from_scripts([
        ("drk_bottom_deck_passage_3.ahk", false),
        ("nw_laboratory_behind_closed_door_3.ahk", false),
        ("nw_ludus_lake_12.ahk", false),
    ]));
    let session = Arc::new(SessionStore::new(Arc::clone(&catalog)));
    let router = ActionRouter::new(Arc::clone(&session), catalog, Arc::new(driver.clone()));
    Harness {
        router,
        session,
        driver,
    }
}

fn harness() -> Harness {
    harness_with(DryRunDriver::new())
}

impl Harness {
    async fn select(&self, id: &str) {
        self.session
            .update(SessionStateRequest {
                combination_id: Patch::Set(Some(CombinationId::new(id))),
                step_size: None,
            })
            .await
            .expect("select");
    }

    async fn step_size(&self, step_size: f64) {
        self.session
            .update(SessionStateRequest {
                combination_id: Patch::Keep,
                step_size: Some(step_size),
            })
            .await
            .expect("step size");
    }
}

#[tokio::test]
async fn context_actions_need_a_selected_combination() {
    let h = harness();
    for name in [("class", "init"), ("map", "navigate"), ("map", "position")] {
        let err = h.router.dispatch(name.0, name.1).await.expect_err("no context");
        assert!(matches!(err, ActionError::NoContext), "{name:?}: {err}");
    }
    assert!(h.driver.played().await.is_empty());

    h.select("drk_bottom_deck_passage_3").await;
    for name in [("class", "init"), ("map", "navigate"), ("map", "position")] {
        let outcome = h.router.dispatch(name.0, name.1).await.expect("with context");
        assert!(outcome.success);
    }
}

#[tokio::test]
async fn class_init_follows_the_selected_class() {
    let h = harness();
    h.select("nw_ludus_lake_12").await;
    let outcome = h.router.perform(Action::ClassInit).await.expect("init");
    assert_eq!(outcome.message, "Night Walker class initialized");
    assert_eq!(
        h.driver.played().await,
        sequences::class_init(catalog::GameClass::NightWalker).to_vec()
    );
}

#[tokio::test]
async fn map_actions_without_a_recorded_route_are_unsupported() {
    let h = harness();
    h.select("nw_ludus_lake_12").await;
    let err = h.router.perform(Action::MapNavigate).await.expect_err("unknown map");
    assert!(matches!(err, ActionError::UnsupportedContext(_)));

    h.select("nw_laboratory_behind_closed_door_3").await;
    let err = h.router.perform(Action::MapPosition).await.expect_err("no route yet");
    assert!(err.to_string().contains("Laboratory Behind Closed Door 3"));
    assert!(h.driver.played().await.is_empty());
}

#[tokio::test]
async fn movement_duration_scales_with_step_size() {
    let h = harness();

    h.step_size(0.5).await;
    let small = h
        .router
        .perform(Action::Move(Direction::Up))
        .await
        .expect("small");
    assert_eq!(small.duration_ms, Some(150));
    assert_eq!(small.message, "Small up movement executed (150ms)");

    h.step_size(2.5).await;
    let huge = h
        .router
        .perform(Action::Move(Direction::Up))
        .await
        .expect("huge");
    assert_eq!(huge.duration_ms, Some(750));

    let played = h.driver.played().await;
    assert_eq!(played[0], InputStep::tap("Up", 150));
    assert_eq!(played[2], InputStep::tap("Up", 750));
}

#[tokio::test]
async fn fractional_movement_durations_are_truncated() {
    let h = harness();

    h.step_size(0.41).await;
    let outcome = h
        .router
        .dispatch("movement", "up")
        .await
        .expect("up");
    assert_eq!(outcome.duration_ms, Some(122));
    assert_eq!(outcome.message, "Tiny up movement executed (122ms)");

    h.step_size(0.333).await;
    let outcome = h
        .router
        .dispatch("movement", "down")
        .await
        .expect("down");
    assert_eq!(outcome.duration_ms, Some(99));
}

#[tokio::test]
async fn horizontal_movement_uses_its_own_base_duration() {
    let h = harness();
    let outcome = h
        .router
        .dispatch("movement", "left")
        .await
        .expect("left");
    assert_eq!(outcome.duration_ms, Some(1200));
    assert_eq!(outcome.message, "Medium left movement executed (1200ms)");
}

#[tokio::test]
async fn bogus_direction_lists_the_valid_ones() {
    let h = harness();
    let err = h
        .router
        .dispatch("movement", "bogus")
        .await
        .expect_err("bogus");
    assert!(matches!(err, ActionError::InvalidDirection { .. }));

    let api: ApiError = err.into();
    assert_eq!(api.code, ErrorCode::InvalidDirection);
    assert_eq!(
        api.allowed,
        Some(vec![
            "up".to_string(),
            "down".to_string(),
            "left".to_string(),
            "right".to_string()
        ])
    );
}

#[tokio::test]
async fn context_free_actions_ignore_the_session() {
    let h = harness();
    for (family, name) in [
        ("movement", "double_jump"),
        ("movement", "jump_down"),
        ("movement", "rope_up"),
        ("movement", "interact"),
        ("utility", "go_to_town"),
        ("utility", "use_consumables"),
        ("utility", "change_channel"),
        ("utility", "quick_travel_setup"),
        ("utility", "inventory_management"),
    ] {
        let outcome = h.router.dispatch(family, name).await.expect(name);
        assert!(outcome.success);
        assert_eq!(outcome.duration_ms, None);
    }
}

#[tokio::test]
async fn jump_down_holds_down_while_tapping_space() {
    let h = harness();
    h.router.perform(Action::JumpDown).await.expect("jump down");
    assert_eq!(
        h.driver.played().await[0],
        InputStep::chord("Down", "Space", 50)
    );
}

#[tokio::test]
async fn unknown_action_is_reported() {
    let h = harness();
    let err = h
        .router
        .dispatch("utility", "go_to_hunting")
        .await
        .expect_err("unknown");
    assert!(matches!(err, ActionError::UnknownAction { .. }));
}

#[tokio::test]
async fn driver_failure_is_surfaced_not_retried() {
    let h = harness_with(DryRunDriver::new().failing_on("f9"));
    let err = h
        .router
        .perform(Action::UseConsumables)
        .await
        .expect_err("dispatch failure");
    assert!(matches!(err, ActionError::Dispatch { .. }));
    assert!(err.to_string().contains("refused key f9"));
    // f7, wait, f8, wait: nothing after the failing key.
    assert_eq!(h.driver.played().await.len(), 4);
}
