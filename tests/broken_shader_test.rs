// A winit event loop can only be created once per process, so this lives in
// its own test binary.

#[test]
#[cfg(feature = "integration-tests")]
fn broken_blur_shader_fails_construction() {
    use pause_blur::{BlurScreen, Screen, ScreenConfig, ScreenConstructor};

    let dir = tempfile::tempdir().unwrap();
    let assets = ScreenConfig::default().asset_root();
    for name in ["gui.png", "shaders/blur.vert.wgsl"] {
        let to = dir.path().join(name);
        std::fs::create_dir_all(to.parent().unwrap()).unwrap();
        std::fs::copy(assets.join(name), to).unwrap();
    }
    std::fs::create_dir_all(dir.path().join("models")).unwrap();
    for name in ["models/Low poly House.obj", "models/Low poly House.mtl"] {
        std::fs::copy(assets.join(name), dir.path().join(name)).unwrap();
    }
    std::fs::write(
        dir.path().join("shaders/blur.frag.wgsl"),
        "@fragment fn fs_main() -> @location(0) vec4<f32> { return undefined_value; }",
    )
    .unwrap();

    let config = ScreenConfig {
        asset_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let screen_config = config.clone();
    let constructor: ScreenConstructor = Box::new(move |ctx| {
        Box::pin(async move {
            let screen = BlurScreen::new(ctx, screen_config).await?;
            Ok(Box::new(screen) as Box<dyn Screen>)
        })
    });

    let err = pause_blur::run(&config, constructor).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("blur.frag.wgsl"), "{message}");
    assert!(message.contains("error"), "{message}");
}
