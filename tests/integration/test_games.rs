//! End-to-end scenarios for the rule-based games.
//!
//! Every scenario runs through `SessionController` with recording host
//! doubles, so scoring, speech, tones and events are checked together.

mod support;

use std::sync::Arc;

use arcade_engine::testing::ScriptedListener;
use arcade_engine::{
    Config, GameEvent, GameInput, GameState, GameType, InputOutcome, RoundContent, Tone,
};
use arcade_genai::testing::{Scripted, ScriptedFeedback};
use support::{bodoque, count, Arcade, Parts};

/// Three right answers win once with 100 points and one feedback request.
#[tokio::test]
async fn test_three_correct_answers_complete_once() {
    let mut arcade = Arcade::new(Parts::default());
    arcade
        .controller
        .select_game(GameType::Math, bodoque())
        .await
        .expect("select math");

    let mut outcomes = Vec::new();
    for _ in 0..3 {
        let right = arcade.right_choice();
        outcomes.push(arcade.controller.submit(right).await.expect("submit"));
    }
    assert_eq!(
        outcomes,
        vec![
            InputOutcome::LevelComplete { level: 2, score: 33 },
            InputOutcome::LevelComplete { level: 3, score: 66 },
            InputOutcome::GameComplete { final_score: 100 },
        ]
    );

    let session = arcade.controller.session().expect("session");
    assert_eq!(session.state, GameState::GameComplete);
    assert_eq!(session.score, 100);

    // a late tap changes nothing
    assert_eq!(
        arcade.controller.submit(GameInput::Choose(0)).await.unwrap(),
        InputOutcome::Ignored
    );

    let events = arcade.drain_events();
    assert_eq!(
        count(&events, |e| matches!(e, GameEvent::GameComplete { .. })),
        1
    );
    assert_eq!(
        count(&events, |e| matches!(e, GameEvent::RoundStarted { .. })),
        3
    );
    assert_eq!(arcade.feedback.requests().len(), 1);
    assert_eq!(arcade.feedback.requests()[0].score, 100);
    assert_eq!(
        arcade.controller.feedback_text(),
        Some("¡Muy bien, campeón!")
    );
    assert_eq!(arcade.tones.count(Tone::Win), 1);
}

/// A wrong answer costs nothing and the round waits for the right one.
#[tokio::test]
async fn test_wrong_then_right_on_same_level() {
    let mut arcade = Arcade::new(Parts::default());
    arcade
        .controller
        .select_game(GameType::LogicClue, bodoque())
        .await
        .unwrap();
    let round = arcade.controller.round().cloned().unwrap();

    for _ in 0..3 {
        let wrong = arcade.wrong_choice();
        assert_eq!(
            arcade.controller.submit(wrong).await.unwrap(),
            InputOutcome::Wrong
        );
    }
    assert_eq!(arcade.controller.round(), Some(&round));
    let session = arcade.controller.session().unwrap();
    assert_eq!((session.level, session.score), (1, 0));

    let right = arcade.right_choice();
    assert_eq!(
        arcade.controller.submit(right).await.unwrap(),
        InputOutcome::LevelComplete { level: 2, score: 33 }
    );
    assert_eq!(arcade.tones.count(Tone::Wrong), 3);
    assert_eq!(arcade.tones.count(Tone::Correct), 1);
}

/// Sorting every item in order scores per item across all three levels.
#[tokio::test]
async fn test_recycling_partial_credit() {
    let mut arcade = Arcade::new(Parts::default());
    arcade
        .controller
        .select_game(GameType::Recycling, bodoque())
        .await
        .unwrap();

    let mut last = InputOutcome::Ignored;
    while !arcade.controller.session().unwrap().state.is_terminal() {
        let Some(RoundContent::Sorting(items)) =
            arcade.controller.round().map(|round| round.content.clone())
        else {
            panic!("recycling rounds are sorting rounds");
        };
        for item in items {
            last = arcade
                .controller
                .submit(GameInput::Sort(item.bin))
                .await
                .unwrap();
        }
    }
    assert_eq!(last, InputOutcome::GameComplete { final_score: 100 });

    let events = arcade.drain_events();
    assert_eq!(
        count(&events, |e| matches!(e, GameEvent::ItemCleared { .. })),
        6
    );
    assert_eq!(
        count(&events, |e| matches!(e, GameEvent::LevelComplete { .. })),
        2
    );
}

/// Matching every pair of cards clears the memory game.
#[tokio::test]
async fn test_memory_pairs() {
    let mut arcade = Arcade::new(Parts::default());
    arcade
        .controller
        .select_game(GameType::Memory, bodoque())
        .await
        .unwrap();

    let mut last = InputOutcome::Ignored;
    while !arcade.controller.session().unwrap().state.is_terminal() {
        let Some(RoundContent::Memory(cards)) =
            arcade.controller.round().map(|round| round.content.clone())
        else {
            panic!("memory rounds are card rounds");
        };
        let mut done = vec![false; cards.len()];
        for first in 0..cards.len() {
            if done[first] {
                continue;
            }
            let second = (first + 1..cards.len())
                .find(|&other| !done[other] && cards[other].name == cards[first].name)
                .expect("every card has a twin");
            done[first] = true;
            done[second] = true;
            assert_eq!(
                arcade.controller.submit(GameInput::Flip(first)).await.unwrap(),
                InputOutcome::Pending
            );
            last = arcade
                .controller
                .submit(GameInput::Flip(second))
                .await
                .unwrap();
        }
    }
    assert_eq!(last, InputOutcome::GameComplete { final_score: 100 });
}

/// Rotations are neutral until every tile is upright.
#[tokio::test]
async fn test_spatial_map_rotations() {
    let mut arcade = Arcade::new(Parts::default());
    arcade
        .controller
        .select_game(GameType::SpatialMap, bodoque())
        .await
        .unwrap();
    let Some(RoundContent::Rotation(tiles)) =
        arcade.controller.round().map(|round| round.content.clone())
    else {
        panic!("spatial rounds are rotation rounds");
    };

    let mut outcomes = Vec::new();
    for (index, tile) in tiles.iter().enumerate() {
        for _ in 0..(360 - u32::from(tile.angle)) / 90 {
            outcomes.push(arcade.controller.submit(GameInput::Rotate(index)).await.unwrap());
        }
    }
    let (last, neutral) = outcomes.split_last().unwrap();
    assert!(neutral.iter().all(|o| *o == InputOutcome::Pending));
    assert_eq!(*last, InputOutcome::LevelComplete { level: 2, score: 33 });
    assert_eq!(arcade.tones.count(Tone::Wrong), 0);
}

/// The voice game walks through all three rights by speech.
#[tokio::test]
async fn test_voice_game_by_speech() {
    let mut arcade = Arcade::new(Parts {
        listener: Arc::new(ScriptedListener::hearing([
            "quiero comida",
            "me gusta jugar",
            "ir al médico",
            "ir a la escuela",
        ])),
        ..Parts::default()
    });
    arcade
        .controller
        .select_game(GameType::RightsLogic, bodoque())
        .await
        .unwrap();

    let mut outcomes = Vec::new();
    for _ in 0..4 {
        outcomes.push(arcade.controller.listen().await.unwrap());
    }
    assert_eq!(
        outcomes,
        vec![
            InputOutcome::LevelComplete { level: 2, score: 33 },
            InputOutcome::Wrong,
            InputOutcome::LevelComplete { level: 3, score: 66 },
            InputOutcome::GameComplete { final_score: 100 },
        ]
    );
    assert_eq!(
        arcade.feedback.requests()[0].game_type,
        "Calcetín: Derechos"
    );
}

/// A failing feedback service never blocks the win.
#[tokio::test]
async fn test_feedback_failure_uses_fallback() {
    let mut arcade = Arcade::new(Parts {
        feedback: Arc::new(ScriptedFeedback::from_script(
            vec![Scripted::Fail(503)],
            Scripted::Reply("¡Otra vez!".to_string()),
        )),
        ..Parts::default()
    });
    arcade
        .controller
        .select_game(GameType::Vowels, bodoque())
        .await
        .unwrap();
    for _ in 0..3 {
        let right = arcade.right_choice();
        arcade.controller.submit(right).await.unwrap();
    }

    let events = arcade.drain_events();
    assert!(events.contains(&GameEvent::FeedbackReady {
        text: "¡Eres un campeón!".to_string(),
        fallback: true,
    }));
    assert_eq!(
        arcade.speech.texts().last().map(String::as_str),
        Some("¡Eres un campeón!")
    );

    // replay asks again and gets the next scripted answer
    arcade.controller.replay().await.unwrap();
    for _ in 0..3 {
        let right = arcade.right_choice();
        arcade.controller.submit(right).await.unwrap();
    }
    assert_eq!(arcade.controller.feedback_text(), Some("¡Otra vez!"));
    assert_eq!(arcade.feedback.requests().len(), 2);
}

/// Settings come from arcade.json; the same seed replays the same rounds.
#[tokio::test]
async fn test_config_file_drives_the_session() {
    let dir = std::env::temp_dir().join(format!("arcade-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("arcade.json"),
        r#"{ "language": "es-CL", "rngSeed": 99, "feedback": { "fallbackText": "¡Bacán!" } }"#,
    )
    .unwrap();
    let config = Config::load_from_dir(&dir).unwrap();
    std::fs::remove_dir_all(&dir).ok();
    assert_eq!(config.feedback.fallback_text, "¡Bacán!");

    let mut first = Arcade::new(Parts {
        config: config.clone(),
        feedback: Arc::new(ScriptedFeedback::failing()),
        ..Parts::default()
    });
    let mut second = Arcade::new(Parts {
        config,
        ..Parts::default()
    });
    first.controller.select_game(GameType::Math, bodoque()).await.unwrap();
    second.controller.select_game(GameType::Math, bodoque()).await.unwrap();
    assert_eq!(first.controller.round(), second.controller.round());
    assert!(first
        .speech
        .utterances()
        .iter()
        .all(|utterance| utterance.language == "es-CL"));

    for _ in 0..3 {
        let right = first.right_choice();
        first.controller.submit(right).await.unwrap();
    }
    assert_eq!(first.controller.feedback_text(), Some("¡Bacán!"));
}

/// Events reach presentation in the documented wire shape.
#[tokio::test]
async fn test_event_wire_shape() {
    let mut arcade = Arcade::new(Parts::default());
    arcade
        .controller
        .select_game(GameType::Math, bodoque())
        .await
        .unwrap();
    let events = arcade.drain_events();
    let json: serde_json::Value =
        serde_json::from_str(&events[0].to_json().unwrap()).unwrap();
    assert_eq!(json["event"], "session_started");
    assert_eq!(json["payload"]["session"]["gameType"], "math");
    assert_eq!(json["payload"]["session"]["maxLevels"], 3);
    assert_eq!(json["payload"]["character"], "Juan Carlos Bodoque");
}
