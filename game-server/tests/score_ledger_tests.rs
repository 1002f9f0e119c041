
use game_server::errors::EngineError;
use game_types::NO_LEADER;
use test_helpers::*;

async fn setup_pair() -> (TestServerSetup, game_types::Game) {
    let setup = TestServerSetup::new().await;
    setup.register(1, "Alice").await;
    setup.register(2, "Bob").await;
    let game = setup.create_game(1, 2, "Weekend").await;
    (setup, game)
}

#[tokio::test]
async fn test_scores_and_leader_after_both_submit() {
    let (setup, game) = setup_pair().await;

    setup.ledger.submit(1, 10, 5).await.unwrap();
    let outcome = setup.ledger.submit(2, 10, 3).await.unwrap();

    assert_eq!(outcome.games_updated, 1);
    let standing = &outcome.standings[0];
    assert_eq!(standing.game_id, game.id);
    assert_eq!(standing.leader_name, "Alice");
    assert_eq!(standing.margin, 2);

    let stored = setup.games.find_by_id(game.id).await.unwrap().unwrap();
    assert_eq!(stored.score_of(1).unwrap().score, 5);
    assert_eq!(stored.score_of(2).unwrap().score, 3);
    assert_eq!(stored.score_of(1).unwrap().last_puzzle_id, 10);
}

#[tokio::test]
async fn test_later_puzzle_first_blocks_earlier_one() {
    let (setup, game) = setup_pair().await;

    setup.ledger.submit(1, 12, 4).await.unwrap();
    let stale = setup.ledger.submit(1, 11, 6).await.unwrap();
    assert_eq!(stale.games_updated, 0);

    let stored = setup.games.find_by_id(game.id).await.unwrap().unwrap();
    let alice = stored.score_of(1).unwrap();
    assert_eq!(alice.score, 4);
    assert_eq!(alice.last_puzzle_id, 12);
}

#[tokio::test]
async fn test_identical_resubmission_is_noop() {
    let (setup, game) = setup_pair().await;

    setup.ledger.submit(1, 10, 5).await.unwrap();
    let before = setup.games.find_by_id(game.id).await.unwrap().unwrap();

    let again = setup.ledger.submit(1, 10, 5).await.unwrap();
    assert_eq!(again.games_updated, 0);

    let after = setup.games.find_by_id(game.id).await.unwrap().unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_leader_none_only_when_level() {
    let (setup, game) = setup_pair().await;

    setup.ledger.submit(1, 10, 4).await.unwrap();
    let outcome = setup.ledger.submit(2, 10, 4).await.unwrap();
    let standing = &outcome.standings[0];
    assert_eq!(standing.leader_name, NO_LEADER);
    assert_eq!(standing.margin, 0);
    assert!(!standing.has_leader());

    let outcome = setup.ledger.submit(2, 11, 1).await.unwrap();
    let standing = &outcome.standings[0];
    assert_eq!(standing.game_id, game.id);
    assert_eq!(standing.leader_name, "Bob");
    assert_eq!(standing.margin, 1);
}

#[tokio::test]
async fn test_failed_attempt_counts_as_played() {
    let (setup, game) = setup_pair().await;

    let outcome = setup
        .ledger
        .submit_text(1, &shared_result(15, "X"))
        .await
        .unwrap()
        .expect("Should be recognized as a result");
    assert_eq!(outcome.score, 0);
    assert_eq!(outcome.games_updated, 1);

    // A later score for the same puzzle is ignored
    let retry = setup.ledger.submit(1, 15, 6).await.unwrap();
    assert_eq!(retry.games_updated, 0);

    let stored = setup.games.find_by_id(game.id).await.unwrap().unwrap();
    assert_eq!(stored.score_of(1).unwrap().score, 0);
    assert_eq!(stored.leader_name, NO_LEADER);
}

#[tokio::test]
async fn test_submit_text_parses_score() {
    let (setup, _) = setup_pair().await;

    let outcome = setup
        .ledger
        .submit_text(1, &shared_result(87, "2"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(outcome.puzzle_id, 87);
    assert_eq!(outcome.score, 5);
    assert_eq!(outcome.standings[0].leader_name, "Alice");
    assert_eq!(outcome.standings[0].margin, 5);
}

#[tokio::test]
async fn test_submit_text_ignores_chatter() {
    let (setup, _) = setup_pair().await;

    let outcome = setup.ledger.submit_text(1, "good morning").await.unwrap();
    assert!(outcome.is_none());
}

#[tokio::test]
async fn test_no_active_games() {
    let setup = TestServerSetup::new().await;
    setup.register(1, "Alice").await;

    let err = setup.ledger.submit(1, 10, 5).await.unwrap_err();
    assert_eq!(err, EngineError::NoActiveGames);

    let err = setup.ledger.standings(1).await.unwrap_err();
    assert_eq!(err, EngineError::NoActiveGames);
}

#[tokio::test]
async fn test_unknown_player() {
    let setup = TestServerSetup::new().await;

    let err = setup.ledger.submit(5, 10, 5).await.unwrap_err();
    assert_eq!(err, EngineError::PlayerUnknown(5));

    let err = setup.ledger.standings(5).await.unwrap_err();
    assert_eq!(err, EngineError::PlayerUnknown(5));
}

#[tokio::test]
async fn test_result_applies_to_every_game() {
    let setup = TestServerSetup::new().await;
    setup.register(1, "Alice").await;
    setup.register(2, "Bob").await;
    setup.register(3, "Carol").await;
    setup.create_game(1, 2, "Weekend").await;
    setup.create_game(3, 1, "Office").await;

    let outcome = setup.ledger.submit(1, 20, 6).await.unwrap();
    assert_eq!(outcome.games_updated, 2);
    assert_eq!(outcome.standings.len(), 2);
    assert!(outcome
        .standings
        .iter()
        .all(|s| s.leader_name == "Alice" && s.margin == 6));

    // Bob only plays in one of them
    let bob = setup.ledger.standings(2).await.unwrap();
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].name, "Weekend");
}

#[tokio::test]
async fn test_concurrent_duplicate_submissions_count_once() {
    let (setup, game) = setup_pair().await;

    let submissions = (0..4).flat_map(|_| {
        [
            setup.ledger.submit(1, 10, 3),
            setup.ledger.submit(2, 10, 2),
        ]
    });
    let results = futures::future::join_all(submissions).await;

    let updates: u32 = results
        .into_iter()
        .map(|r| r.unwrap().games_updated)
        .sum();
    assert_eq!(updates, 2);

    let stored = setup.games.find_by_id(game.id).await.unwrap().unwrap();
    assert_eq!(stored.score_of(1).unwrap().score, 3);
    assert_eq!(stored.score_of(2).unwrap().score, 2);
    assert_eq!(stored.leader_name, "Alice");
    assert_eq!(stored.total_score_margin, 1);
}

#[tokio::test]
async fn test_game_standing_for_member_only() {
    let (setup, game) = setup_pair().await;
    setup.register(3, "Carol").await;

    let standing = setup.ledger.game_standing(2, game.id).await.unwrap();
    assert_eq!(standing.name, "Weekend");

    let err = setup.ledger.game_standing(3, game.id).await.unwrap_err();
    assert_eq!(err, EngineError::GameNotFound(game.id));
}
