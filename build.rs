use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

// The product model and swatches are copied next to the build output so the
// native viewer finds them without depending on the working directory.
fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets = manifest_dir.join("assets");
    if !assets.exists() {
        bail!("missing asset directory {}", assets.display());
    }
    for required in ["untitled.obj", "untitled.mtl"] {
        if !assets.join(required).exists() {
            println!("cargo:warning=assets/{required} is missing, the viewer will start empty");
        }
    }

    let out_dir = env::var("OUT_DIR")?;
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    copy_items(&[assets], out_dir, &copy_options)?;

    Ok(())
}
