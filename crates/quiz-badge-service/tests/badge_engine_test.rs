//! 徽章引擎集成测试
//!
//! 通过提交服务驱动完整流程（内存存储，无需外部依赖）

mod common;

use chrono::Duration;
use quiz_badge::achievement::{FailureStage, codes};
use quiz_badge::dto::SubmitPlayRequest;
use quiz_badge::service::TierLevel;
use quiz_shared::config::QuizConfig;

use common::{MemoryStore, evening, minutes_before, services};

fn request(user_id: i64, theme: &str, score: i32, total: i32) -> SubmitPlayRequest {
    SubmitPlayRequest {
        user_id,
        theme_code: theme.to_string(),
        score,
        total_questions: total,
        elapsed_seconds: 75,
    }
}

// ==================== 首局 ====================

#[tokio::test]
async fn test_first_perfect_quiz_grants_first_quiz_and_perfect() {
    let store = MemoryStore::with_standard_badges().await;
    let user = store.add_user("alice").await;
    for (code, title) in [("rock", "Rock"), ("jazz", "Jazz"), ("rap_fr", "Rap FR")] {
        store.add_theme(code, title, true).await;
    }
    let svc = services(&store, &QuizConfig::default());

    let result = svc
        .submission
        .submit_at(request(user, "rock", 5, 5), evening())
        .await
        .unwrap();

    assert_eq!(result.badges.granted, vec![codes::FIRST_QUIZ, codes::PERFECT]);
    assert!(!result.badges.is_granted(codes::EXPLORATEUR));
    assert!(!result.badges.is_granted(codes::MARATHON));
    assert_eq!(result.result.percentage, 100.0);
    assert_eq!(result.result.tier.level, TierLevel::Confirmed);
    assert_eq!(store.play_count(user).await, 1);
}

#[tokio::test]
async fn test_single_active_theme_makes_first_play_an_exploration() {
    let store = MemoryStore::with_standard_badges().await;
    let user = store.add_user("bob").await;
    store.add_theme("rock", "Rock", true).await;
    let svc = services(&store, &QuizConfig::default());

    let result = svc
        .submission
        .submit_at(request(user, "rock", 2, 5), evening())
        .await
        .unwrap();

    assert_eq!(
        result.badges.granted,
        vec![codes::FIRST_QUIZ, codes::EXPLORATEUR]
    );
}

// ==================== 幂等 ====================

#[tokio::test]
async fn test_reevaluation_grants_nothing_new() {
    let store = MemoryStore::with_standard_badges().await;
    let user = store.add_user("carol").await;
    store.add_theme("rock", "Rock", true).await;
    store.add_theme("jazz", "Jazz", true).await;
    let svc = services(&store, &QuizConfig::default());

    let first = svc
        .submission
        .submit_at(request(user, "rock", 5, 5), evening())
        .await
        .unwrap();
    let again = svc.engine.evaluate_and_grant_at(user, 5, 5, evening()).await;

    assert_eq!(first.badges.granted.len(), 2);
    assert!(again.granted.is_empty());
    assert_eq!(again.already_held, first.badges.granted);
    assert_eq!(store.grant_count(user).await, 2);
}

#[tokio::test]
async fn test_concurrent_evaluations_grant_once() {
    let store = MemoryStore::with_standard_badges().await;
    let user = store.add_user("dave").await;
    let rock = store.add_theme("rock", "Rock", true).await;
    store.add_theme("jazz", "Jazz", true).await;
    store
        .seed_play(user, rock, 4, 4, minutes_before(evening(), 1))
        .await;
    let svc = services(&store, &QuizConfig::default());

    let (a, b) = tokio::join!(
        svc.engine.evaluate_and_grant_at(user, 4, 4, evening()),
        svc.engine.evaluate_and_grant_at(user, 4, 4, evening()),
    );

    let mut granted: Vec<String> = a.granted.into_iter().chain(b.granted).collect();
    granted.sort();
    assert_eq!(granted, vec![codes::FIRST_QUIZ, codes::PERFECT]);
    assert_eq!(store.grant_count(user).await, 2);
}

// ==================== marathon ====================

#[tokio::test]
async fn test_marathon_on_tenth_play_of_the_day() {
    let store = MemoryStore::with_standard_badges().await;
    let user = store.add_user("erin").await;
    let rock = store.add_theme("rock", "Rock", true).await;
    store.add_theme("jazz", "Jazz", true).await;
    for i in 1..=9 {
        store
            .seed_play(user, rock, 2, 5, minutes_before(evening(), i * 10))
            .await;
    }
    let svc = services(&store, &QuizConfig::default());

    let tenth = svc
        .submission
        .submit_at(request(user, "rock", 3, 5), evening())
        .await
        .unwrap();
    assert_eq!(tenth.badges.granted, vec![codes::MARATHON]);

    let eleventh = svc
        .submission
        .submit_at(request(user, "rock", 3, 5), evening() + Duration::minutes(5))
        .await
        .unwrap();
    assert!(eleventh.badges.granted.is_empty());
    assert_eq!(eleventh.badges.already_held, vec![codes::MARATHON]);
}

#[tokio::test]
async fn test_marathon_counts_only_the_local_day() {
    let store = MemoryStore::with_standard_badges().await;
    let user = store.add_user("frank").await;
    let rock = store.add_theme("rock", "Rock", true).await;
    store.add_theme("jazz", "Jazz", true).await;
    // 前一天的九局不计入当天
    for i in 1..=9 {
        store
            .seed_play(user, rock, 2, 5, minutes_before(evening(), 24 * 60 + i))
            .await;
    }
    let svc = services(&store, &QuizConfig::default());

    let result = svc
        .submission
        .submit_at(request(user, "rock", 3, 5), evening())
        .await
        .unwrap();

    assert!(!result.badges.is_granted(codes::MARATHON));
    assert!(result.badges.granted.is_empty());
}

#[tokio::test]
async fn test_marathon_threshold_from_config() {
    let store = MemoryStore::with_standard_badges().await;
    let user = store.add_user("gina").await;
    let rock = store.add_theme("rock", "Rock", true).await;
    store.add_theme("jazz", "Jazz", true).await;
    store
        .seed_play(user, rock, 1, 5, minutes_before(evening(), 30))
        .await;
    let config = QuizConfig {
        marathon_daily_plays: 2,
        ..Default::default()
    };
    let svc = services(&store, &config);

    let result = svc
        .submission
        .submit_at(request(user, "rock", 1, 5), evening())
        .await
        .unwrap();

    assert_eq!(result.badges.granted, vec![codes::MARATHON]);
}

// ==================== explorateur ====================

#[tokio::test]
async fn test_explorateur_after_all_active_themes() {
    let store = MemoryStore::with_standard_badges().await;
    let user = store.add_user("hugo").await;
    store.add_theme("rock", "Rock", true).await;
    store.add_theme("jazz", "Jazz", true).await;
    store.add_theme("disco", "Disco", false).await;
    let svc = services(&store, &QuizConfig::default());

    let first = svc
        .submission
        .submit_at(request(user, "rock", 1, 5), evening())
        .await
        .unwrap();
    assert!(!first.badges.is_granted(codes::EXPLORATEUR));

    let second = svc
        .submission
        .submit_at(request(user, "jazz", 1, 5), evening())
        .await
        .unwrap();
    assert_eq!(second.badges.granted, vec![codes::EXPLORATEUR]);
}

#[tokio::test]
async fn test_explorateur_never_granted_without_active_themes() {
    let store = MemoryStore::with_standard_badges().await;
    let user = store.add_user("ines").await;
    let retired = store.add_theme("disco", "Disco", false).await;
    store
        .seed_play(user, retired, 1, 5, minutes_before(evening(), 5))
        .await;
    let svc = services(&store, &QuizConfig::default());

    let report = svc.engine.evaluate_and_grant_at(user, 1, 5, evening()).await;

    assert!(!report.is_granted(codes::EXPLORATEUR));
    assert_eq!(report.granted, vec![codes::FIRST_QUIZ]);
}

// ==================== 补评 ====================

#[tokio::test]
async fn test_reevaluate_uses_latest_stored_play() {
    let store = MemoryStore::with_standard_badges().await;
    let user = store.add_user("nina").await;
    let rock = store.add_theme("rock", "Rock", true).await;
    store.add_theme("jazz", "Jazz", true).await;
    store
        .seed_play(user, rock, 5, 5, minutes_before(evening(), 3))
        .await;
    let svc = services(&store, &QuizConfig::default());

    let report = svc
        .engine
        .reevaluate_latest_at(user, evening())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.granted, vec![codes::FIRST_QUIZ, codes::PERFECT]);
    assert_eq!(store.play_count(user).await, 1);
}

#[tokio::test]
async fn test_reevaluate_ignores_older_perfect_play() {
    let store = MemoryStore::with_standard_badges().await;
    let user = store.add_user("omar").await;
    let rock = store.add_theme("rock", "Rock", true).await;
    store.add_theme("jazz", "Jazz", true).await;
    store
        .seed_play(user, rock, 5, 5, minutes_before(evening(), 30))
        .await;
    store
        .seed_play(user, rock, 2, 5, minutes_before(evening(), 10))
        .await;
    let svc = services(&store, &QuizConfig::default());

    let report = svc
        .engine
        .reevaluate_latest_at(user, evening())
        .await
        .unwrap()
        .unwrap();

    assert!(!report.is_granted(codes::PERFECT));
    assert!(report.granted.is_empty());
}

#[tokio::test]
async fn test_reevaluate_without_plays_writes_nothing() {
    let store = MemoryStore::with_standard_badges().await;
    let user = store.add_user("pia").await;
    store.add_theme("rock", "Rock", true).await;
    let svc = services(&store, &QuizConfig::default());

    let report = svc
        .engine
        .reevaluate_latest_at(user, evening())
        .await
        .unwrap();

    assert!(report.is_none());
    assert_eq!(store.grant_count(user).await, 0);
}

// ==================== 配置缺失与失败隔离 ====================

#[tokio::test]
async fn test_unconfigured_badge_is_skipped() {
    let store = MemoryStore::with_standard_badges().await;
    store.remove_badge(codes::PERFECT).await;
    let user = store.add_user("jules").await;
    store.add_theme("rock", "Rock", true).await;
    store.add_theme("jazz", "Jazz", true).await;
    let svc = services(&store, &QuizConfig::default());

    let result = svc
        .submission
        .submit_at(request(user, "rock", 5, 5), evening())
        .await
        .unwrap();

    assert_eq!(result.badges.granted, vec![codes::FIRST_QUIZ]);
    assert_eq!(result.badges.not_configured, vec![codes::PERFECT]);
    assert!(!result.badges.has_failures());
}

#[tokio::test]
async fn test_grant_failure_does_not_block_other_rules() {
    let store = MemoryStore::with_standard_badges().await;
    store.fail_grants_for(codes::FIRST_QUIZ).await;
    let user = store.add_user("kim").await;
    store.add_theme("rock", "Rock", true).await;
    store.add_theme("jazz", "Jazz", true).await;
    let svc = services(&store, &QuizConfig::default());

    let result = svc
        .submission
        .submit_at(request(user, "rock", 5, 5), evening())
        .await
        .unwrap();

    assert_eq!(result.badges.granted, vec![codes::PERFECT]);
    assert_eq!(result.badges.failures.len(), 1);
    assert_eq!(result.badges.failures[0].code, codes::FIRST_QUIZ);
    assert_eq!(result.badges.failures[0].stage, FailureStage::Grant);
    assert_eq!(store.granted_codes(user).await, vec![codes::PERFECT]);
}

#[tokio::test]
async fn test_daily_count_failure_only_fails_marathon() {
    let store = MemoryStore::with_standard_badges().await;
    store.fail_daily_count().await;
    let user = store.add_user("lea").await;
    store.add_theme("rock", "Rock", true).await;
    store.add_theme("jazz", "Jazz", true).await;
    let svc = services(&store, &QuizConfig::default());

    let result = svc
        .submission
        .submit_at(request(user, "rock", 5, 5), evening())
        .await
        .unwrap();

    assert_eq!(result.badges.granted, vec![codes::FIRST_QUIZ, codes::PERFECT]);
    assert_eq!(result.badges.failures.len(), 1);
    assert_eq!(result.badges.failures[0].code, codes::MARATHON);
    assert_eq!(result.badges.failures[0].stage, FailureStage::Fact);
}

// ==================== 提交校验 ====================

#[tokio::test]
async fn test_submit_rejects_unknown_and_inactive_themes() {
    let store = MemoryStore::with_standard_badges().await;
    let user = store.add_user("max").await;
    store.add_theme("disco", "Disco", false).await;
    let svc = services(&store, &QuizConfig::default());

    let err = svc
        .submission
        .submit_at(request(user, "opera", 3, 5), evening())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "THEME_NOT_FOUND");

    let err = svc
        .submission
        .submit_at(request(user, "disco", 3, 5), evening())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "THEME_INACTIVE");

    assert_eq!(store.play_count(user).await, 0);
    assert_eq!(store.grant_count(user).await, 0);
}

#[tokio::test]
async fn test_submit_rejects_unknown_user() {
    let store = MemoryStore::with_standard_badges().await;
    store.add_theme("rock", "Rock", true).await;
    let svc = services(&store, &QuizConfig::default());

    let err = svc
        .submission
        .submit_at(request(404, "rock", 3, 5), evening())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "USER_NOT_FOUND");
}
