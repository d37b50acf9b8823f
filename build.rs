use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    // Rerun if the model, GUI image or blur shaders change.
    println!("cargo:rerun-if-changed=assets");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets_src = manifest_dir.join("assets");
    if !assets_src.exists() {
        return Ok(());
    }

    // Fallback asset root for binaries started outside the crate directory.
    println!(
        "cargo:rustc-env=PAUSE_BLUR_ASSETS={}",
        assets_src.display()
    );

    // Stage the assets next to the produced binary: OUT_DIR is
    // target/<profile>/build/<pkg>/out, so three levels up is target/<profile>.
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    if let Some(profile_dir) = out_dir.ancestors().nth(3) {
        let mut copy_options = CopyOptions::new();
        copy_options.overwrite = true;
        copy_items(&[assets_src], profile_dir, &copy_options)?;
    }

    Ok(())
}
