use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    // Askama compiles templates into the binary; cargo does not track them by itself.
    println!("cargo:rerun-if-changed=templates");
    if let Err(e) = watch_templates(Path::new("templates")) {
        println!("cargo:warning=could not scan templates: {}", e);
    }

    let build_id = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "dev".to_string());
    println!("cargo:rustc-env=SLOTBOARD_BUILD_ID={}", build_id);
}

fn watch_templates(dir: &Path) -> io::Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            watch_templates(&path)?;
        } else if path.extension().is_some_and(|ext| ext == "html") {
            println!("cargo:rerun-if-changed={}", path.display());
        }
    }
    Ok(())
}
