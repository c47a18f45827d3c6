use std::fs;
use std::path::{Path, PathBuf};

use scrivener::engine::{Engine, EngineRequest, Transcription};
use scrivener::{Error, Opts, Scrivener, Task, TimedSegment, TranscriptionInfo};

/// In-memory engine that replays a fixed script of segments and faults.
struct ScriptedEngine {
    script: Vec<anyhow::Result<TimedSegment>>,
    info: TranscriptionInfo,
    fail_to_start: bool,
    reject: Option<&'static str>,
    calls: usize,
    last_request: Option<EngineRequest>,
}

impl ScriptedEngine {
    fn new(segments: Vec<TimedSegment>) -> Self {
        Self {
            script: segments.into_iter().map(Ok).collect(),
            info: TranscriptionInfo {
                language: Some("en".to_owned()),
                language_probability: Some(0.98),
            },
            fail_to_start: false,
            reject: None,
            calls: 0,
            last_request: None,
        }
    }

    fn fault_after(mut self, message: &'static str) -> Self {
        self.script.push(Err(anyhow::anyhow!(message)));
        self.script
            .push(Ok(TimedSegment::new(99.0, 100.0, "never reached")));
        self
    }
}

impl Engine for ScriptedEngine {
    type Segments<'a>
        = std::vec::IntoIter<anyhow::Result<TimedSegment>>
    where
        Self: 'a;

    fn validate(&self, _request: &EngineRequest) -> anyhow::Result<()> {
        match self.reject {
            Some(reason) => anyhow::bail!(reason),
            None => Ok(()),
        }
    }

    fn transcribe<'a>(
        &'a mut self,
        _source: &Path,
        request: &EngineRequest,
    ) -> anyhow::Result<Transcription<Self::Segments<'a>>> {
        self.calls += 1;
        self.last_request = Some(request.clone());
        if self.fail_to_start {
            anyhow::bail!("model exploded");
        }

        Ok(Transcription {
            segments: std::mem::take(&mut self.script).into_iter(),
            info: self.info.clone(),
        })
    }
}

struct Fixture {
    dir: tempfile::TempDir,
    source: PathBuf,
}

impl Fixture {
    fn new() -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let source = dir.path().join("video_demo.mp4");
        fs::write(&source, b"not really media")?;
        Ok(Self { dir, source })
    }

    fn base(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn opts(&self, base: &str) -> Opts {
        let mut opts = Opts::new(&self.source, "small");
        opts.output_base_name = Some(self.base(base));
        opts.progress_interval = 1;
        opts
    }
}

fn demo_segments() -> Vec<TimedSegment> {
    vec![
        TimedSegment::new(0.0, 1.25, " Hello "),
        TimedSegment::new(1.25, 3.0, "world"),
    ]
}

fn outputs(base: &Path) -> [PathBuf; 3] {
    ["srt", "vtt", "txt"].map(|ext| PathBuf::from(format!("{}.{ext}", base.display())))
}

#[test]
fn writes_all_three_files_for_the_demo() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let mut scrivener = Scrivener::new(ScriptedEngine::new(demo_segments()));

    let manifest = scrivener.run(&fx.opts("demo"))?;

    assert_eq!(manifest.segments_count, 2);
    assert_eq!(manifest.language.as_deref(), Some("en"));
    assert_eq!(manifest.language_probability, Some(0.98));
    assert_eq!(manifest.srt, fx.base("demo.srt"));

    assert_eq!(
        fs::read_to_string(&manifest.srt)?,
        "1\n00:00:00,000 --> 00:00:01,250\nHello\n\n\
         2\n00:00:01,250 --> 00:00:03,000\nworld\n\n"
    );
    assert_eq!(
        fs::read_to_string(&manifest.vtt)?,
        "WEBVTT\n\n\
         00:00:00.000 --> 00:00:01.250\nHello\n\n\
         00:00:01.250 --> 00:00:03.000\nworld\n\n"
    );
    assert_eq!(fs::read_to_string(&manifest.txt)?, "Hello\nworld\n");
    Ok(())
}

#[test]
fn many_segments_keep_arrival_order_and_contiguous_indices() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    // Deliberately not sorted by time: arrival order wins.
    let segments: Vec<_> = (0..25)
        .map(|i| {
            let start = ((25 - i) * 2) as f64;
            TimedSegment::new(start, start + 1.0, format!(" line {i} "))
        })
        .collect();
    let mut scrivener = Scrivener::new(ScriptedEngine::new(segments));

    let manifest = scrivener.run(&fx.opts("many"))?;
    assert_eq!(manifest.segments_count, 25);

    let srt = fs::read_to_string(&manifest.srt)?;
    let indices: Vec<usize> = srt
        .split("\n\n")
        .filter(|block| !block.is_empty())
        .map(|block| block.lines().next().unwrap_or_default().parse())
        .collect::<Result<_, _>>()?;
    assert_eq!(indices, (1..=25).collect::<Vec<_>>());

    let txt = fs::read_to_string(&manifest.txt)?;
    let lines: Vec<&str> = txt.lines().collect();
    let expected: Vec<String> = (0..25).map(|i| format!("line {i}")).collect();
    assert_eq!(lines, expected);

    let vtt = fs::read_to_string(&manifest.vtt)?;
    assert_eq!(vtt.matches(" --> ").count(), manifest.segments_count);
    Ok(())
}

#[test]
fn zero_segments_still_produce_a_vtt_header() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let mut scrivener = Scrivener::new(ScriptedEngine::new(Vec::new()));

    let manifest = scrivener.run(&fx.opts("silence"))?;

    assert_eq!(manifest.segments_count, 0);
    assert_eq!(fs::read_to_string(&manifest.vtt)?, "WEBVTT\n\n");
    assert_eq!(fs::read_to_string(&manifest.srt)?, "");
    assert_eq!(fs::read_to_string(&manifest.txt)?, "");
    Ok(())
}

#[test]
fn rerunning_overwrites_instead_of_appending() -> anyhow::Result<()> {
    let fx = Fixture::new()?;

    let first = Scrivener::new(ScriptedEngine::new(demo_segments())).run(&fx.opts("demo"))?;
    let snapshot: Vec<Vec<u8>> = outputs(&fx.base("demo"))
        .iter()
        .map(fs::read)
        .collect::<Result<_, _>>()?;

    let second = Scrivener::new(ScriptedEngine::new(demo_segments())).run(&fx.opts("demo"))?;
    assert_eq!(first, second);

    for (path, before) in outputs(&fx.base("demo")).iter().zip(snapshot) {
        assert_eq!(fs::read(path)?, before, "{} changed", path.display());
    }
    Ok(())
}

#[test]
fn missing_source_fails_before_the_engine_or_any_file() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let mut opts = fx.opts("ghost");
    opts.source_path = fx.dir.path().join("missing.mp4");

    let mut scrivener = Scrivener::new(ScriptedEngine::new(demo_segments()));
    let err = scrivener.run(&opts).unwrap_err();

    assert!(matches!(err, Error::InputNotFound { .. }));
    assert_eq!(scrivener.engine().calls, 0);
    for path in outputs(&fx.base("ghost")) {
        assert!(!path.exists(), "{} should not exist", path.display());
    }
    Ok(())
}

#[test]
fn invalid_configuration_is_rejected_before_the_engine() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let mut opts = fx.opts("bad");
    opts.beam_size = 0;

    let mut scrivener = Scrivener::new(ScriptedEngine::new(demo_segments()));
    let err = scrivener.run(&opts).unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert_eq!(scrivener.engine().calls, 0);
    assert!("paraphrase".parse::<Task>().is_err());
    Ok(())
}

#[test]
fn engine_start_failure_writes_nothing() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let mut engine = ScriptedEngine::new(demo_segments());
    engine.fail_to_start = true;

    let mut scrivener = Scrivener::new(engine);
    let err = scrivener.run(&fx.opts("nostart")).unwrap_err();

    assert!(matches!(err, Error::Engine(_)));
    assert!(err.to_string().contains("model exploded"));
    for path in outputs(&fx.base("nostart")) {
        assert!(!path.exists());
    }
    Ok(())
}

#[test]
fn mid_stream_fault_propagates_and_leaves_previous_outputs_untouched() -> anyhow::Result<()> {
    let fx = Fixture::new()?;

    // A previous successful run.
    Scrivener::new(ScriptedEngine::new(demo_segments())).run(&fx.opts("demo"))?;
    let before = fs::read_to_string(fx.base("demo.srt"))?;

    let engine = ScriptedEngine::new(vec![
        TimedSegment::new(0.0, 1.0, "one"),
        TimedSegment::new(1.0, 2.0, "two"),
        TimedSegment::new(2.0, 3.0, "three"),
    ])
    .fault_after("decoder lost sync");
    let mut scrivener = Scrivener::new(engine);

    let err = scrivener.run(&fx.opts("demo")).unwrap_err();
    assert!(matches!(err, Error::Engine(_)));
    assert!(err.to_string().contains("decoder lost sync"));
    assert_eq!(fs::read_to_string(fx.base("demo.srt"))?, before);

    // And nothing at all for a fresh base name.
    let engine = ScriptedEngine::new(demo_segments()).fault_after("boom");
    let err = Scrivener::new(engine).run(&fx.opts("fresh")).unwrap_err();
    assert!(matches!(err, Error::Engine(_)));
    for path in outputs(&fx.base("fresh")) {
        assert!(!path.exists());
    }
    Ok(())
}

#[test]
fn write_fault_keeps_earlier_files_and_skips_later_ones() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    // A directory where the VTT file should go makes that stage fail.
    fs::create_dir(fx.base("partial.vtt"))?;

    let mut scrivener = Scrivener::new(ScriptedEngine::new(demo_segments()));
    let err = scrivener.run(&fx.opts("partial")).unwrap_err();

    match &err {
        Error::Write { path, .. } => assert_eq!(path, &fx.base("partial.vtt")),
        other => panic!("expected a write error, got {other:?}"),
    }
    assert!(fx.base("partial.srt").is_file());
    assert!(!fx.base("partial.txt").exists());
    Ok(())
}

#[test]
fn unwritable_directory_fails_on_the_first_file() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let mut opts = fx.opts("unused");
    opts.output_base_name = Some(fx.dir.path().join("no-such-dir").join("demo"));

    let err = Scrivener::new(ScriptedEngine::new(demo_segments()))
        .run(&opts)
        .unwrap_err();

    match err {
        Error::Write { path, .. } => assert!(path.ends_with("no-such-dir/demo.srt")),
        other => panic!("expected a write error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn engine_receives_the_configured_request() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let mut opts = fx.opts("req");
    opts.language = Some("vi".to_owned());
    opts.task = Task::Translate;
    opts.voice_activity_filter = true;
    opts.vad_model = Some(fx.source.clone());
    opts.threads = 3;
    opts.beam_size = 2;
    opts.best_of = 4;

    let mut scrivener = Scrivener::new(ScriptedEngine::new(demo_segments()));
    scrivener.run(&opts)?;

    let engine = scrivener.into_engine();
    assert_eq!(engine.calls, 1);
    let request = engine.last_request.expect("engine was called");
    assert_eq!(request.language.as_deref(), Some("vi"));
    assert_eq!(request.task, Task::Translate);
    assert!(request.voice_activity_filter);
    assert_eq!((request.threads, request.beam_size, request.best_of), (3, 2, 4));
    Ok(())
}

#[test]
fn untimed_segments_render_at_zero() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let segment = TimedSegment {
        start: None,
        end: None,
        text: "no timing".to_owned(),
    };
    let manifest = Scrivener::new(ScriptedEngine::new(vec![segment])).run(&fx.opts("untimed"))?;

    let srt = fs::read_to_string(&manifest.srt)?;
    assert_eq!(srt, "1\n00:00:00,000 --> 00:00:00,000\nno timing\n\n");
    Ok(())
}

#[test]
fn multi_line_text_stays_one_entry_per_segment() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let segments = vec![
        TimedSegment::new(0.0, 1.0, "a\n\nb"),
        TimedSegment::new(1.0, 2.0, "c"),
    ];
    let manifest = Scrivener::new(ScriptedEngine::new(segments)).run(&fx.opts("lines"))?;
    assert_eq!(manifest.segments_count, 2);

    let txt = fs::read_to_string(&manifest.txt)?;
    assert_eq!(txt.lines().collect::<Vec<_>>(), ["a b", "c"]);

    let srt = fs::read_to_string(&manifest.srt)?;
    assert_eq!(srt.trim_end().split("\n\n").count(), 2);

    let vtt = fs::read_to_string(&manifest.vtt)?;
    let cues = vtt.trim_end().split("\n\n").skip(1).collect::<Vec<_>>();
    assert_eq!(
        cues,
        [
            "00:00:00.000 --> 00:00:01.000\na b",
            "00:00:01.000 --> 00:00:02.000\nc"
        ]
    );
    Ok(())
}

#[test]
fn engine_can_veto_a_request_before_transcribing() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let mut engine = ScriptedEngine::new(demo_segments());
    engine.reject = Some("unsupported language");

    let mut scrivener = Scrivener::new(engine);
    let err = scrivener.run(&fx.opts("veto")).unwrap_err();

    match &err {
        Error::Config(message) => assert!(message.contains("unsupported language")),
        other => panic!("expected a configuration error, got {other:?}"),
    }
    assert_eq!(scrivener.engine().calls, 0);
    for path in outputs(&fx.base("veto")) {
        assert!(!path.exists());
    }
    Ok(())
}

#[test]
fn voice_filter_without_a_model_is_a_configuration_error() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let mut opts = fx.opts("vad");
    opts.voice_activity_filter = true;

    let mut scrivener = Scrivener::new(ScriptedEngine::new(demo_segments()));
    assert!(matches!(scrivener.run(&opts), Err(Error::Config(_))));

    opts.vad_model = Some(fx.dir.path().join("missing-vad.bin"));
    assert!(matches!(scrivener.run(&opts), Err(Error::Config(_))));
    assert_eq!(scrivener.engine().calls, 0);
    Ok(())
}

#[test]
fn manifest_serializes_to_json() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let manifest = Scrivener::new(ScriptedEngine::new(demo_segments())).run(&fx.opts("json"))?;

    let value = serde_json::to_value(&manifest)?;
    assert_eq!(value["segments_count"], 2);
    assert_eq!(value["language"], "en");
    assert!(value["srt"].as_str().unwrap_or_default().ends_with("json.srt"));
    Ok(())
}
