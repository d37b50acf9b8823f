#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_blur_after_pause_and_survive_repeated_dispose() {
    use common::test_utils::{ScriptedScreen, SessionLog};
    use pause_blur::{BlurScreen, Screen, ScreenConfig, ScreenConstructor};

    let log = SessionLog::default();
    let config = ScreenConfig {
        window_title: "pause-blur smoke test".into(),
        ..Default::default()
    };

    let screen_log = log.clone();
    let screen_config = config.clone();
    let constructor: ScreenConstructor = Box::new(move |ctx| {
        Box::pin(async move {
            let screen = BlurScreen::new(ctx, screen_config).await?;
            Ok(Box::new(ScriptedScreen::new(screen, screen_log, 30)) as Box<dyn Screen>)
        })
    });

    pause_blur::run(&config, constructor).unwrap();

    assert_eq!(log.frames(), 30);
    assert!(log.paused_without_targets());
    assert!(log.zero_resize_survived());
    assert!(log.blurred_frames() > 0);
    assert_eq!(log.frames_after_dispose(), 2);
    assert!(log.disposed());
}
