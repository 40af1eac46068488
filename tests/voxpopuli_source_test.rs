//! End-to-end tests for the Voxpopuli corpus source on a real temp tree.

use batchscribe::corpus::{AudioRecordSource, GeneratedSamplesSkipper, VoxpopuliSource};
use batchscribe::error::ScribeError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const RATE: u32 = 8000;

fn write_wav(path: &Path, sample_rate: u32, samples: &[i16]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Lay out a manifest plus the audio tree for two Italian rows and one
/// French row, and return the config path.
fn setup_corpus(dir: &TempDir) -> PathBuf {
    let manifest = dir.path().join("voxpopuli.tsv");
    write_file(
        &manifest,
        "event_id\tsegment_no\n\
         20200113-0900-PLENARY_it\t0\n\
         20200113-0900-PLENARY_it\t1\n\
         20190102-1100-PLENARY_fr\t0\n",
    );
    // Audio for the Italian rows only; the French one must never be read
    let samples = vec![1000i16; 400];
    write_wav(
        &dir.path().join("it/2020/20200113-0900-PLENARY_it_0.ogg"),
        RATE,
        &samples,
    );
    write_wav(
        &dir.path().join("it/2020/20200113-0900-PLENARY_it_1.ogg"),
        RATE,
        &samples,
    );

    let config = dir.path().join("config.toml");
    write_file(
        &config,
        &format!(
            "lang = \"it\"\ntsv_segments = \"{}\"\n",
            manifest.display()
        ),
    );
    config
}

#[test]
fn yields_only_rows_of_the_configured_language() {
    let dir = TempDir::new().unwrap();
    let config = setup_corpus(&dir);

    let mut source = VoxpopuliSource::new(&config, RATE).unwrap();
    let first = source.next_record().unwrap().unwrap();
    assert_eq!(first.id, "20200113-0900-PLENARY_it_0");
    assert_eq!(first.sampling_rate, RATE);
    assert_eq!(first.samples.len(), 400);

    let second = source.next_record().unwrap().unwrap();
    assert_eq!(second.id, "20200113-0900-PLENARY_it_1");

    assert!(source.next_record().unwrap().is_none());
}

#[test]
fn missing_lang_key_fails_construction() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    write_file(&config, "tsv_segments = \"aaa\"\n");

    match VoxpopuliSource::new(&config, RATE) {
        Err(ScribeError::ConfigMissingKey { key, .. }) => assert_eq!(key, "lang"),
        other => panic!("expected ConfigMissingKey, got {other:?}"),
    }
}

#[test]
fn generated_samples_are_skipped_without_io() {
    let dir = TempDir::new().unwrap();
    let config = setup_corpus(&dir);
    // Remove the audio of the already-transcribed row: if the source tried
    // to read it, iteration would fail
    fs::remove_file(dir.path().join("it/2020/20200113-0900-PLENARY_it_0.ogg")).unwrap();

    let artifact = dir.path().join("out.tsv");
    write_file(
        &artifact,
        "id\tlanguage\ttext\n20200113-0900-PLENARY_it_0\tit\tgia fatto\n",
    );

    let mut source = VoxpopuliSource::new(&config, RATE).unwrap();
    source.attach_skipper(Box::new(
        GeneratedSamplesSkipper::from_file(&artifact).unwrap(),
    ));

    let record = source.next_record().unwrap().unwrap();
    assert_eq!(record.id, "20200113-0900-PLENARY_it_1");
    assert!(source.next_record().unwrap().is_none());
}

#[test]
fn reads_at_most_thirty_seconds_when_truncation_is_on() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("voxpopuli.tsv");
    write_file(&manifest, "event_id\tsegment_no\n20210601-0900-PLENARY_de\t0\n");
    // 31 seconds: a few frames more than the engine accepts
    write_wav(
        &dir.path().join("de/2021/20210601-0900-PLENARY_de_0.ogg"),
        RATE,
        &vec![500i16; RATE as usize * 31],
    );

    let config = dir.path().join("config.toml");
    write_file(
        &config,
        &format!("lang = \"de\"\ntsv_segments = \"{}\"\n", manifest.display()),
    );

    let mut source = VoxpopuliSource::new(&config, RATE).unwrap();
    let record = source.next_record().unwrap().unwrap();
    assert_eq!(record.samples.len(), RATE as usize * 30);
}

#[test]
fn truncation_can_be_disabled() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("voxpopuli.tsv");
    write_file(&manifest, "event_id\tsegment_no\n20210601-0900-PLENARY_de\t0\n");
    write_wav(
        &dir.path().join("de/2021/20210601-0900-PLENARY_de_0.ogg"),
        RATE,
        &vec![500i16; RATE as usize * 31],
    );

    let config = dir.path().join("config.toml");
    write_file(
        &config,
        &format!(
            "lang = \"de\"\ntsv_segments = \"{}\"\ntruncate_exceeding_30s = false\n",
            manifest.display()
        ),
    );

    let mut source = VoxpopuliSource::new(&config, RATE).unwrap();
    let record = source.next_record().unwrap().unwrap();
    assert_eq!(record.samples.len(), RATE as usize * 31);
}

#[test]
fn event_names_with_underscores_use_the_rightmost_token() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("voxpopuli.tsv");
    write_file(&manifest, "event_id\tsegment_no\n20180308-FOO_BAR_hr\t0\n");
    write_wav(
        &dir.path().join("hr/2018/20180308-FOO_BAR_hr_0.ogg"),
        RATE,
        &vec![250i16; 100],
    );

    let config = dir.path().join("config.toml");
    write_file(
        &config,
        &format!("lang = \"hr\"\ntsv_segments = \"{}\"\n", manifest.display()),
    );

    let mut source = VoxpopuliSource::new(&config, RATE).unwrap();
    let record = source.next_record().unwrap().unwrap();
    assert_eq!(record.id, "20180308-FOO_BAR_hr_0");
}

#[test]
fn rate_mismatch_aborts_iteration() {
    let dir = TempDir::new().unwrap();
    let config = setup_corpus(&dir);

    let mut source = VoxpopuliSource::new(&config, 16000).unwrap();
    match source.next_record() {
        Err(ScribeError::RateMismatch {
            expected, actual, ..
        }) => {
            assert_eq!(expected, 16000);
            assert_eq!(actual, RATE);
        }
        other => panic!("expected RateMismatch, got {other:?}"),
    }
}

#[test]
fn missing_audio_file_is_a_layout_error() {
    let dir = TempDir::new().unwrap();
    let config = setup_corpus(&dir);
    fs::remove_file(dir.path().join("it/2020/20200113-0900-PLENARY_it_1.ogg")).unwrap();

    let mut source = VoxpopuliSource::new(&config, RATE).unwrap();
    assert!(source.next_record().is_ok(), "first row still present");
    match source.next_record() {
        Err(ScribeError::CorpusLayout { path, .. }) => {
            assert!(path.ends_with("20200113-0900-PLENARY_it_1.ogg"), "got: {path}");
        }
        other => panic!("expected CorpusLayout, got {other:?}"),
    }
}

#[test]
fn missing_manifest_fails_construction() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    write_file(
        &config,
        "lang = \"it\"\ntsv_segments = \"/nonexistent/voxpopuli.tsv\"\n",
    );

    match VoxpopuliSource::new(&config, RATE) {
        Err(ScribeError::CorpusLayout { path, .. }) => {
            assert_eq!(path, "/nonexistent/voxpopuli.tsv");
        }
        other => panic!("expected CorpusLayout, got {other:?}"),
    }
}
