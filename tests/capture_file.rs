use std::path::PathBuf;

use eyedrop::capture::{CaptureSource, PixelFormat, RawFrameLayout, ScreenSource};
use eyedrop::config::Settings;
use eyedrop::picker::open_source;
use eyedrop::ui::ScriptedFrontend;
use eyedrop::{PickOutcome, PickerParams, Rgb, init_with};

fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("eyedrop-{}-{name}", std::process::id()));
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn pick_from_ppm_screenshot() {
    // 3x1 strip: red, green, blue
    let mut bytes = b"P6\n# screenshot\n3 1\n255\n".to_vec();
    bytes.extend_from_slice(&[0xFF, 0, 0, 0, 0xFF, 0, 0, 0, 0xFF]);
    let path = temp_file("strip.ppm", &bytes);

    let settings = Settings {
        capture_file: Some(path.clone()),
        ..Settings::default()
    };
    let source = open_source(&settings).unwrap();
    assert_eq!(source.dimensions(), (3, 1));

    let mut ui = ScriptedFrontend::from_script("right enter").unwrap();
    let mut updates = Vec::new();
    let outcome = init_with(
        &mut ui,
        source,
        |event| updates.push(event.to_string()),
        PickerParams::new(Rgb::new(0, 0, 0), 1),
        &settings,
    )
    .unwrap();

    std::fs::remove_file(path).unwrap();
    assert_eq!(outcome, PickOutcome::Picked(Rgb::new(0, 0, 0xFF)));
    assert_eq!(updates, vec!["start", "#000000", "#0000FF", "picked #0000FF"]);
}

#[test]
fn raw_dump_needs_layout() {
    let bytes = [0x10, 0x20, 0x30, 0xFF];
    let path = temp_file("pixel.bgra", &bytes);

    assert!(CaptureSource::open(&path, None).is_err());

    let layout = RawFrameLayout {
        width: 1,
        height: 1,
        stride: None,
        offset: 0,
        format: PixelFormat::Bgra32,
    };
    let source = CaptureSource::open(&path, Some(&layout)).unwrap();
    std::fs::remove_file(path).unwrap();
    assert_eq!(source.pixel(0, 0), Some(Rgb::new(0x30, 0x20, 0x10)));
}
