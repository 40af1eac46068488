//! End-to-end tests for the Librilight corpus source on a real temp tree.

use batchscribe::corpus::{AudioRecordSource, GeneratedSamplesSkipper, LibrilightSource, Records};
use batchscribe::error::{Result, ScribeError};
use batchscribe::AudioRecord;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const RATE: u32 = 16000;

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

fn write_config(dir: &TempDir, basedir: &str) -> std::path::PathBuf {
    let config = dir.path().join("config.toml");
    fs::write(&config, format!("basedir = \"{basedir}\"\n")).unwrap();
    config
}

fn sorted_records(source: &mut LibrilightSource) -> Vec<AudioRecord> {
    let mut records: Vec<AudioRecord> = Records::new(source)
        .collect::<Result<_>>()
        .unwrap();
    records.sort_by(|a, b| a.id.cmp(&b.id));
    records
}

#[test]
fn walks_the_speaker_book_utterance_tree() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("librilight");
    let samples = vec![100i16; 320];
    write_wav(
        &corpus.join("111/3/goofy_pluto_lb_64kb_0000.flac"),
        RATE,
        &samples,
    );
    write_wav(
        &corpus.join("111/9/goofy_pluto_lb_64kb_0000.flac"),
        RATE,
        &samples,
    );

    let config = write_config(&dir, &corpus.display().to_string());
    let mut source = LibrilightSource::new(&config, RATE).unwrap();
    let records = sorted_records(&mut source);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "111_3_goofy_pluto_lb_64kb_0000");
    assert_eq!(records[1].id, "111_9_goofy_pluto_lb_64kb_0000");
    assert!(records.iter().all(|r| r.samples.len() == 320));
}

#[test]
fn trailing_slash_in_basedir_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("librilight");
    write_wav(
        &corpus.join("111/3/goofy_pluto_lb_64kb_0000.flac"),
        RATE,
        &vec![100i16; 320],
    );

    let config = write_config(&dir, &format!("{}/", corpus.display()));
    let mut source = LibrilightSource::new(&config, RATE).unwrap();
    let records = sorted_records(&mut source);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "111_3_goofy_pluto_lb_64kb_0000");
}

#[test]
fn long_utterances_are_split_into_thirty_second_chunks() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("librilight");
    // 62 seconds: 30 + 30 + 2
    write_wav(
        &corpus.join("111/9/goofy_pluto_lb_64kb_0000.flac"),
        RATE,
        &vec![100i16; RATE as usize * 62],
    );

    let config = write_config(&dir, &corpus.display().to_string());
    let mut source = LibrilightSource::new(&config, RATE).unwrap();
    let records = sorted_records(&mut source);

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].id, "111_9_goofy_pluto_lb_64kb_0000__0");
    assert_eq!(records[1].id, "111_9_goofy_pluto_lb_64kb_0000__1");
    assert_eq!(records[2].id, "111_9_goofy_pluto_lb_64kb_0000__2");
    assert_eq!(records[0].samples.len(), RATE as usize * 30);
    assert_eq!(records[1].samples.len(), RATE as usize * 30);
    assert_eq!(records[2].samples.len(), RATE as usize * 2);
}

#[test]
fn partially_transcribed_utterance_resumes_chunk_by_chunk() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("librilight");
    write_wav(
        &corpus.join("111/9/goofy_pluto_lb_64kb_0000.flac"),
        RATE,
        &vec![100i16; RATE as usize * 62],
    );

    let artifact = dir.path().join("out.tsv");
    fs::write(
        &artifact,
        "id\tlanguage\ttext\n\
         111_9_goofy_pluto_lb_64kb_0000__0\ten\taa\n\
         111_9_goofy_pluto_lb_64kb_0000__1\ten\taa\n",
    )
    .unwrap();

    let config = write_config(&dir, &corpus.display().to_string());
    let mut source = LibrilightSource::new(&config, RATE).unwrap();
    source.attach_skipper(Box::new(
        GeneratedSamplesSkipper::from_file(&artifact).unwrap(),
    ));

    let record = source.next_record().unwrap().unwrap();
    assert_eq!(record.id, "111_9_goofy_pluto_lb_64kb_0000__2");
    assert_eq!(record.samples.len(), RATE as usize * 2);
    assert!(source.next_record().unwrap().is_none());
}

#[test]
fn splitting_can_be_disabled() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("librilight");
    let rate = 8000;
    write_wav(
        &corpus.join("7/1/long_read_0001.flac"),
        rate,
        &vec![100i16; rate as usize * 35],
    );

    let config = dir.path().join("config.toml");
    fs::write(
        &config,
        format!(
            "basedir = \"{}\"\nsplit_if_longer_than_30s = false\n",
            corpus.display()
        ),
    )
    .unwrap();

    let mut source = LibrilightSource::new(&config, rate).unwrap();
    let record = source.next_record().unwrap().unwrap();
    assert_eq!(record.id, "7_1_long_read_0001");
    assert_eq!(record.samples.len(), rate as usize * 35);
    assert!(source.next_record().unwrap().is_none());
}

#[test]
fn already_transcribed_single_utterance_is_skipped() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("librilight");
    write_wav(
        &corpus.join("111/3/goofy_pluto_lb_64kb_0000.flac"),
        RATE,
        &vec![100i16; 320],
    );
    write_wav(
        &corpus.join("111/3/goofy_pluto_lb_64kb_0001.flac"),
        RATE,
        &vec![100i16; 320],
    );

    let artifact = dir.path().join("out.tsv");
    fs::write(
        &artifact,
        "id\tlanguage\ttext\n111_3_goofy_pluto_lb_64kb_0000\ten\taa\n",
    )
    .unwrap();

    let config = write_config(&dir, &corpus.display().to_string());
    let mut source = LibrilightSource::new(&config, RATE).unwrap();
    source.attach_skipper(Box::new(
        GeneratedSamplesSkipper::from_file(&artifact).unwrap(),
    ));

    let records = sorted_records(&mut source);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "111_3_goofy_pluto_lb_64kb_0001");
}

#[test]
fn missing_basedir_key_fails_construction() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "aaa = \"aaa\"\n").unwrap();

    match LibrilightSource::new(&config, RATE) {
        Err(ScribeError::ConfigMissingKey { key, .. }) => assert_eq!(key, "basedir"),
        other => panic!("expected ConfigMissingKey, got {other:?}"),
    }
}

#[test]
fn nonexistent_basedir_fails_construction() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "/nonexistent/librilight");

    match LibrilightSource::new(&config, RATE) {
        Err(ScribeError::CorpusLayout { path, .. }) => {
            assert_eq!(path, "/nonexistent/librilight");
        }
        other => panic!("expected CorpusLayout, got {other:?}"),
    }
}
