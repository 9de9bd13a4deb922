//! End-to-end tests: raw clip file → pipeline → raw clip file.

mod common;

use f3kdb::error::HostError;
use f3kdb::models::{ClipFormat, DebandConfig};
use f3kdb::services::DebandPipeline;
use f3kdb_core::{Params, PixelMode};
use pretty_assertions::assert_eq;

fn run(format: ClipFormat, params: &Params, threaded: bool, clip: &[u8]) -> Vec<u8> {
    let dir = tempfile::tempdir().unwrap();
    let input = common::write_file(dir.path(), "in.yuv", clip);
    let output = dir.path().join("out.yuv");
    DebandPipeline::process_file(format, params, threaded, &input, &output).unwrap();
    std::fs::read(output).unwrap()
}

#[test]
fn test_flat_grey_clip_unchanged() {
    let format = ClipFormat::new(64, 64, 2);
    let params = Params::default()
        .range(15)
        .threshold(64)
        .grain(0, 0)
        .sample_mode(2)
        .blur_first(true)
        .seed(0);
    let clip = common::flat_clip(&format, 128);

    let output = run(format.frames(0), &params, false, &clip);
    assert_eq!(output, clip);
}

#[test]
fn test_no_op_settings_copy_clip() {
    let format = ClipFormat::new(48, 32, 3);
    let params = DebandConfig::from_yaml(common::NO_OP_YAML)
        .unwrap()
        .to_params()
        .unwrap();
    let clip = common::noisy_ramp_clip(&format, 1);

    assert_eq!(run(format, &params, true, &clip), clip);
}

#[test]
fn test_default_settings_change_banded_clip() {
    let format = ClipFormat::new(48, 32, 1);
    let clip = common::noisy_ramp_clip(&format, 2);
    let output = run(format, &Params::default(), false, &clip);
    assert_eq!(output.len(), clip.len());
    assert!(output != clip, "debanding with grain left the clip untouched");
}

#[test]
fn test_threaded_matches_sequential() {
    let format = ClipFormat::new(80, 48, 4).subsampling(1, 0);
    let params = Params::default().dynamic_grain(true).seed(99);
    let clip = common::noisy_ramp_clip(&format, 3);

    assert_eq!(
        run(format, &params, true, &clip),
        run(format, &params, false, &clip)
    );
}

#[test]
fn test_runs_are_repeatable() {
    let format = ClipFormat::new(32, 32, 3);
    let params = Params::default().dynamic_grain(true);
    let clip = common::noisy_ramp_clip(&format, 4);

    assert_eq!(
        run(format, &params, false, &clip),
        run(format, &params, false, &clip)
    );
}

#[test]
fn test_high_bit_depth_input_to_8_bit_output() {
    let format = ClipFormat::new(32, 32, 1)
        .format(PixelMode::HighBitDepthInterleaved, 16);
    let params = Params::default()
        .grain(0, 0)
        .output(PixelMode::LowBitDepth, 8);
    let clip = common::flat_clip(&format, 200 << 8);

    let output = run(format, &params, false, &clip);
    let expected = common::flat_clip(&ClipFormat::new(32, 32, 1), 200);
    assert_eq!(output, expected);
}

#[test]
fn test_8_bit_input_to_stacked_16_bit_output() {
    let format = ClipFormat::new(32, 32, 1);
    let params = Params::default()
        .grain(0, 0)
        .output(PixelMode::HighBitDepthStacked, 16);
    let clip = common::flat_clip(&format, 60);

    let output = run(format, &params, false, &clip);
    let expected = common::flat_clip(
        &format.format(PixelMode::HighBitDepthStacked, 16),
        60 << 8,
    );
    assert_eq!(output, expected);
}

#[test]
fn test_frame_count_taken_from_file_size() {
    let format = ClipFormat::new(16, 16, 5);
    let clip = common::flat_clip(&format, 30);
    let dir = tempfile::tempdir().unwrap();
    let input = common::write_file(dir.path(), "in.yuv", &clip);
    let output = dir.path().join("out.yuv");

    let stats =
        DebandPipeline::process_file(format.frames(0), &Params::default(), false, &input, &output)
            .unwrap();
    assert_eq!(stats.frames, 5);
}

#[test]
fn test_truncated_file_rejected() {
    let format = ClipFormat::new(16, 16, 0);
    let mut clip = common::flat_clip(&format.frames(2), 30);
    clip.truncate(clip.len() - 10);
    let dir = tempfile::tempdir().unwrap();
    let input = common::write_file(dir.path(), "in.yuv", &clip);

    let err = DebandPipeline::process_file(
        format,
        &Params::default(),
        false,
        &input,
        &dir.path().join("out.yuv"),
    )
    .unwrap_err();
    assert!(matches!(err, HostError::TruncatedFrame { frame: 1, .. }));
}

#[test]
fn test_empty_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = common::write_file(dir.path(), "in.yuv", &[]);
    let err = DebandPipeline::process_file(
        ClipFormat::new(16, 16, 0),
        &Params::default(),
        false,
        &input,
        &dir.path().join("out.yuv"),
    )
    .unwrap_err();
    assert!(matches!(err, HostError::UnsupportedFormat(_)));
}

#[test]
fn test_missing_input_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = DebandPipeline::process_file(
        ClipFormat::new(16, 16, 1),
        &Params::default(),
        false,
        &dir.path().join("missing.yuv"),
        &dir.path().join("out.yuv"),
    )
    .unwrap_err();
    assert!(matches!(err, HostError::Io(_)));
}
