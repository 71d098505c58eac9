//! End-to-end scenarios for the camera and video games.
//!
//! Video tests run on paused time, so the ten-second poll interval is
//! simulated rather than waited for.

mod support;

use std::sync::Arc;
use std::time::Duration;

use arcade_engine::{
    ArcadeError, Config, GameEvent, GameInput, GameType, GenerationConfig, InputOutcome, Tone,
};
use arcade_genai::testing::{ScriptedImageEditor, ScriptedVideoService};
use arcade_genai::{AspectRatio, MimeType};
use arcade_media::testing::{FakeDevices, OpenOutcome};
use arcade_media::{CaptureArtifact, CaptureState, JobId, JobStatus, MediaError, VideoAsset};
use support::{bodoque, count, Arcade, Parts, FRAME};
use tokio_test::{assert_err, assert_ok};

fn picture() -> CaptureArtifact {
    CaptureArtifact::new(vec![7u8; 16], MimeType::Png)
}

fn with_max_polls(max_polls: u32) -> Config {
    Config {
        generation: GenerationConfig {
            max_polls,
            ..GenerationConfig::default()
        },
        rng_seed: Some(5),
        ..Config::default()
    }
}

// ============================================================================
// Camera
// ============================================================================

/// A refused camera is reported, and the player can grant it and carry on.
#[tokio::test]
async fn test_camera_denied_then_retry() {
    let devices = Arc::new(FakeDevices::new(OpenOutcome::Deny, FRAME.to_vec()));
    let mut arcade = Arcade::new(Parts {
        devices: devices.clone(),
        ..Parts::default()
    });

    arcade
        .controller
        .select_game(GameType::MagicCamera, bodoque())
        .await
        .expect("selection survives a refused camera");
    assert_eq!(arcade.controller.capture_state(), Some(CaptureState::Failed));
    assert!(arcade.drain_events().contains(&GameEvent::MediaFailed {
        message: "permission denied for camera".to_string(),
        retryable: true,
    }));

    let err = assert_err!(arcade.controller.take_photo().await);
    assert!(matches!(err, ArcadeError::Media(MediaError::NotAcquired)));
    assert_eq!(arcade.controller.session().unwrap().score, 0);

    devices.set_outcome(OpenOutcome::Grant);
    assert_ok!(arcade.controller.acquire_camera().await);
    assert_eq!(arcade.controller.capture_state(), Some(CaptureState::Live));
    assert_eq!(
        arcade.controller.take_photo().await.unwrap(),
        InputOutcome::Pending
    );
}

/// Photo, edit, confirm: the game is won and the camera is let go.
#[tokio::test]
async fn test_photo_edit_and_confirm() {
    let mut arcade = Arcade::new(Parts::default());
    arcade
        .controller
        .select_game(GameType::MagicCamera, bodoque())
        .await
        .unwrap();
    assert!(arcade.devices.is_streaming());

    // nothing to confirm yet
    assert_eq!(
        arcade.controller.submit(GameInput::Confirm).await.unwrap(),
        InputOutcome::Ignored
    );
    assert_eq!(
        arcade.controller.take_photo().await.unwrap(),
        InputOutcome::Pending
    );

    let media = arcade.controller.media().expect("photo result");
    assert_eq!(media.data(), &[0x89, 0x50, 0x4E, 0x47]);
    assert_eq!(media.mime_type(), MimeType::Png);

    let requests = arcade.images.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(&*requests[0].image, &FRAME[..]);
    assert_eq!(
        requests[0].prompt_text,
        "Ponle una nariz de payaso estilo 31 Minutos"
    );

    assert_eq!(
        arcade.controller.submit(GameInput::Confirm).await.unwrap(),
        InputOutcome::GameComplete { final_score: 100 }
    );
    assert!(!arcade.devices.is_streaming());
    assert_eq!(arcade.controller.capture_state(), Some(CaptureState::Released));

    let events = arcade.drain_events();
    assert!(events.contains(&GameEvent::MediaReady {
        kind: arcade_media::GenerationKind::ImageEdit,
        edited: true,
    }));
    assert_eq!(
        count(&events, |e| matches!(e, GameEvent::GameComplete { final_score: 100 })),
        1
    );
}

/// A failed edit still gives the child their photo.
#[tokio::test]
async fn test_failed_edit_keeps_the_still() {
    let mut arcade = Arcade::new(Parts {
        images: Arc::new(ScriptedImageEditor::failing()),
        ..Parts::default()
    });
    arcade
        .controller
        .select_game(GameType::MagicCamera, bodoque())
        .await
        .unwrap();
    assert_eq!(
        arcade.controller.take_photo().await.unwrap(),
        InputOutcome::Pending
    );
    assert_eq!(arcade.controller.media().unwrap().data(), &FRAME[..]);
    assert!(arcade.drain_events().contains(&GameEvent::MediaReady {
        kind: arcade_media::GenerationKind::ImageEdit,
        edited: false,
    }));
    assert!(!arcade.controller.generation().is_busy());
}

// ============================================================================
// Video
// ============================================================================

/// Load, animate, confirm.
#[tokio::test(start_paused = true)]
async fn test_video_generation_success() {
    let mut arcade = Arcade::new(Parts::default());
    arcade
        .controller
        .select_game(GameType::Animation, bodoque())
        .await
        .unwrap();

    assert!(matches!(
        arcade.controller.animate(None).await,
        Err(ArcadeError::NothingToAnimate)
    ));

    arcade.controller.load_image(picture()).unwrap();
    assert_eq!(
        arcade.speech.texts().last().map(String::as_str),
        Some("¡Imagen cargada!")
    );

    assert_eq!(
        arcade.controller.animate(Some("   ")).await.unwrap(),
        InputOutcome::Pending
    );
    let video = arcade.controller.video().expect("video delivered");
    assert_eq!(&*video.data, b"mp4");
    assert_eq!(arcade.videos.poll_count(), 3);

    let submissions = arcade.videos.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(
        submissions[0].prompt_text,
        "Hacer que la imagen cobre vida al estilo 31 minutos"
    );
    assert_eq!(submissions[0].aspect_ratio, AspectRatio::Landscape);

    assert_eq!(
        arcade.controller.submit(GameInput::Confirm).await.unwrap(),
        InputOutcome::GameComplete { final_score: 100 }
    );
    assert_eq!(arcade.tones.count(Tone::Win), 2);

    // let the status forwarder publish its last update
    tokio::time::sleep(Duration::from_millis(1)).await;
    let events = arcade.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::GenerationStatus {
            status: JobStatus::Done,
            polls: 3,
            ..
        }
    )));
}

/// A job that never finishes fails at the poll ceiling, and a fresh
/// submission can still succeed.
#[tokio::test(start_paused = true)]
async fn test_video_timeout_then_retry() {
    let mut arcade = Arcade::new(Parts {
        config: with_max_polls(3),
        videos: Arc::new(ScriptedVideoService::ready_after(5, b"clip".to_vec())),
        ..Parts::default()
    });
    arcade
        .controller
        .select_game(GameType::Animation, bodoque())
        .await
        .unwrap();
    arcade.controller.load_image(picture()).unwrap();

    let err = arcade
        .controller
        .animate(Some("que baile"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ArcadeError::Media(MediaError::GenerationTimedOut { polls: 3 })
    ));
    assert!(err.is_recoverable());
    assert!(arcade.drain_events().iter().any(|e| matches!(
        e,
        GameEvent::MediaFailed {
            retryable: true,
            ..
        }
    )));
    assert!(!arcade.controller.generation().is_busy());

    assert_eq!(
        arcade.controller.animate(Some("que baile")).await.unwrap(),
        InputOutcome::Pending
    );
    assert_eq!(arcade.videos.poll_count(), 5);
    assert_eq!(arcade.videos.submissions().len(), 2);
    assert_eq!(arcade.videos.submissions()[1].prompt_text, "que baile");
}

/// Leaving the game stops polling.
#[tokio::test(start_paused = true)]
async fn test_return_to_menu_cancels_video() {
    let mut arcade = Arcade::new(Parts {
        videos: Arc::new(ScriptedVideoService::never_ready()),
        ..Parts::default()
    });
    arcade
        .controller
        .select_game(GameType::Animation, bodoque())
        .await
        .unwrap();
    arcade.controller.load_image(picture()).unwrap();
    let handle = arcade.controller.start_animation(None).unwrap();

    tokio::time::sleep(Duration::from_secs(25)).await;
    assert_eq!(arcade.videos.poll_count(), 2);
    assert_eq!(handle.status(), JobStatus::Polling);

    arcade.controller.return_to_menu();
    assert_eq!(handle.clone().wait().await, Err(MediaError::Cancelled));
    assert_eq!(handle.status(), JobStatus::Failed);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(arcade.videos.poll_count(), 2);
    assert!(!arcade.controller.generation().is_busy());
    assert!(arcade.drain_events().contains(&GameEvent::SessionEnded {
        game_type: GameType::Animation,
        completed: false,
    }));
}

/// Leaving mid-job frees the slot at once; the old job's progress does
/// not show up in the next session.
#[tokio::test(start_paused = true)]
async fn test_new_session_can_animate_right_after_cancel() {
    let mut arcade = Arcade::new(Parts {
        videos: Arc::new(ScriptedVideoService::never_ready()),
        ..Parts::default()
    });
    arcade
        .controller
        .select_game(GameType::Animation, bodoque())
        .await
        .unwrap();
    arcade.controller.load_image(picture()).unwrap();
    let first = arcade.controller.start_animation(None).unwrap();

    arcade.controller.return_to_menu();
    arcade
        .controller
        .select_game(GameType::Animation, bodoque())
        .await
        .unwrap();
    arcade.controller.load_image(picture()).unwrap();
    arcade.drain_events();
    let second = assert_ok!(arcade.controller.start_animation(Some("que baile")));
    assert_ne!(second.id(), first.id());

    assert_eq!(first.clone().wait().await, Err(MediaError::Cancelled));
    tokio::time::sleep(Duration::from_secs(25)).await;
    assert_eq!(second.status(), JobStatus::Polling);
    assert_eq!(
        arcade.controller.generation().active_job().map(|job| job.id),
        Some(second.id())
    );

    let events = arcade.drain_events();
    assert_eq!(
        count(&events, |e| matches!(
            e,
            GameEvent::GenerationStatus { job_id, .. } if *job_id == first.id()
        )),
        0
    );
    assert!(count(&events, |e| matches!(
        e,
        GameEvent::GenerationStatus { job_id, .. } if *job_id == second.id()
    )) > 0);
}

/// While a video is generating, the round is claimed: taps are dropped and
/// a second job is refused.
#[tokio::test(start_paused = true)]
async fn test_inputs_ignored_while_generating() {
    let mut arcade = Arcade::new(Parts::default());
    arcade
        .controller
        .select_game(GameType::Animation, bodoque())
        .await
        .unwrap();
    arcade.controller.load_image(picture()).unwrap();

    let handle = arcade.controller.start_animation(Some("que vuele")).unwrap();
    assert_eq!(
        arcade.controller.submit(GameInput::Confirm).await.unwrap(),
        InputOutcome::Ignored
    );
    assert!(matches!(
        arcade.controller.start_animation(None),
        Err(ArcadeError::Media(MediaError::JobAlreadyActive))
    ));
    let mut progress = handle.subscribe();
    progress
        .wait_for(|job| job.status == JobStatus::Polling)
        .await
        .unwrap();
    assert_eq!(arcade.videos.submissions().len(), 1);

    // a result for some other job is dropped
    let stray = VideoAsset {
        uri: "scripted://stray".to_string(),
        data: Arc::from(&b"x"[..]),
    };
    assert_eq!(
        arcade
            .controller
            .finish_animation(JobId(999), Ok(stray))
            .unwrap(),
        InputOutcome::Ignored
    );

    let job = handle.id();
    let result = handle.wait().await;
    assert_eq!(
        arcade.controller.finish_animation(job, result).unwrap(),
        InputOutcome::Pending
    );
    assert_eq!(
        arcade.controller.submit(GameInput::Confirm).await.unwrap(),
        InputOutcome::GameComplete { final_score: 100 }
    );
    assert_eq!(
        arcade.feedback.requests()[0].game_type,
        "Cine Mágico"
    );
}
