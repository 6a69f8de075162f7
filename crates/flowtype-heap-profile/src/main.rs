//! DHAT heap profiler for flowtype.
//!
//! Profiles allocation patterns across the layout pipeline:
//! split -> paginate -> cache.
//!
//! Usage:
//!   cargo run -p flowtype-heap-profile --release -- [OPTIONS] [TEXT_FILES...]
//!
//! Outputs dhat-<phase>.json files in the output directory (default: target/memory).
//! Open in https://nnethercote.github.io/dh_view/dh_view.html

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use flowtype::{Justify, Paragraph, ParagraphStyle, TextStyle};
use flowtype_embedded_graphics::{text_style, MonoFace};
use flowtype_render::{text_paragraphs, EnglishHyphenator, LayoutConfig, PageCache, RenderEngine};

const PAGE_WIDTH: f32 = 480.0;
const PAGE_HEIGHT: f32 = 800.0;

/// Paragraph count of the built-in document used when no files are given.
const SYNTHETIC_PARAGRAPHS: usize = 300;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Split,
    Paginate,
    Cache,
    Session,
}

impl Phase {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "split" => Some(Self::Split),
            "paginate" => Some(Self::Paginate),
            "cache" => Some(Self::Cache),
            "session" => Some(Self::Session),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Split => "split",
            Self::Paginate => "paginate",
            Self::Cache => "cache",
            Self::Session => "session",
        }
    }
}

#[derive(Clone)]
enum Source {
    File(PathBuf),
    Synthetic,
}

impl Source {
    fn label(&self) -> String {
        match self {
            Self::File(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unknown".to_string()),
            Self::Synthetic => "synthetic".to_string(),
        }
    }

    fn read(&self) -> String {
        match self {
            Self::File(path) => std::fs::read_to_string(path)
                .unwrap_or_else(|e| panic!("read {}: {}", path.display(), e)),
            Self::Synthetic => synthetic_text(),
        }
    }
}

fn synthetic_text() -> String {
    let sentence = "A paragraph is packed into lines, hyphenated where a long word \
would leave a ragged edge, and continued on the next page when the body is full.";
    let mut out = String::new();
    for idx in 0..SYNTHETIC_PARAGRAPHS {
        for _ in 0..(2 + idx % 5) {
            out.push_str(sentence);
            out.push(' ');
        }
        out.push_str("\n\n");
    }
    out
}

fn build_paragraphs(text: &str, style: &TextStyle) -> Vec<Paragraph> {
    let hyphenator = Arc::new(EnglishHyphenator::default());
    let para_style = ParagraphStyle::default()
        .with_indents(0.0, 0.0, 14.0)
        .with_justify(Justify::Both);
    text_paragraphs(text)
        .into_iter()
        .map(|para| {
            Paragraph::new(para_style.clone())
                .with_hyphenator(hyphenator.clone())
                .text(para, style)
        })
        .collect()
}

fn profile_source(source: &Source, phase: Phase) {
    let label = source.label();
    let text = source.read();
    let style = text_style(MonoFace::Medium);
    let config = LayoutConfig::for_page(PAGE_WIDTH, PAGE_HEIGHT);

    match phase {
        Phase::Split => {
            let mut paragraphs = build_paragraphs(&text, &style);
            let words: usize = paragraphs.iter_mut().map(|p| p.words().len()).sum();
            if words == 0 {
                panic!("{} produced no words", label);
            }
        }
        Phase::Paginate => {
            let mut paragraphs = build_paragraphs(&text, &style);
            let _pages = RenderEngine::new(config)
                .paginate(&mut paragraphs)
                .unwrap_or_else(|e| panic!("paginate {}: {}", label, e));
        }
        Phase::Cache => {
            let mut paragraphs = build_paragraphs(&text, &style);
            let pages = RenderEngine::new(config)
                .paginate(&mut paragraphs)
                .unwrap_or_else(|e| panic!("paginate {}: {}", label, e));
            let bytes =
                PageCache::encode(&pages).unwrap_or_else(|e| panic!("encode {}: {}", label, e));
            let _restored =
                PageCache::decode(&bytes).unwrap_or_else(|e| panic!("decode {}: {}", label, e));
        }
        Phase::Session => {
            // Page flips without retaining pages; the second pass reuses split words.
            let mut paragraphs = build_paragraphs(&text, &style);
            let mut engine = RenderEngine::new(config);
            let mut flips = 0usize;
            for _pass in 0..2 {
                let result = engine.paginate_with(&mut paragraphs, |_| {
                    flips = flips.saturating_add(1);
                });
                if let Err(e) = result {
                    panic!("session {}: {}", label, e);
                }
            }
            if flips == 0 {
                panic!("session {} produced zero pages", label);
            }
        }
    }
}

fn usage() {
    eprintln!("Usage: heap-profile [OPTIONS] [TEXT_FILES...]");
    eprintln!();
    eprintln!("Options:");
    eprintln!(
        "  --phase <split|paginate|cache|session>  Pipeline phase to profile (default: paginate)"
    );
    eprintln!("  --out-dir <DIR>                      Output directory for dhat JSON (default: target/memory)");
    eprintln!(
        "  --aggregate                          Single profile for all files (default: per-file)"
    );
    eprintln!();
    eprintln!("By default, each file gets its own clean DHAT profile (separate process).");
    eprintln!("If no files are given, profiles a built-in synthetic document.");
}

fn value_after(args: &[String], i: usize, flag: &str) -> String {
    match args.get(i) {
        Some(value) => value.clone(),
        None => {
            eprintln!("{} requires a value", flag);
            usage();
            std::process::exit(1);
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut phase = Phase::Paginate;
    let mut out_dir = PathBuf::from("target/memory");
    let mut files: Vec<PathBuf> = Vec::with_capacity(8);
    let mut aggregate = false;
    // Internal flag: when set, we're a child process profiling a single source.
    let mut single_source_mode = false;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--phase" => {
                i += 1;
                let value = value_after(&args, i, "--phase");
                phase = Phase::from_str(&value).unwrap_or_else(|| {
                    eprintln!("Unknown phase: {}", value);
                    usage();
                    std::process::exit(1);
                });
            }
            "--out-dir" => {
                i += 1;
                out_dir = PathBuf::from(value_after(&args, i, "--out-dir"));
            }
            "--aggregate" => {
                aggregate = true;
            }
            "--single-source" => {
                single_source_mode = true;
            }
            "--help" | "-h" => {
                usage();
                std::process::exit(0);
            }
            other => {
                files.push(PathBuf::from(other));
            }
        }
        i += 1;
    }

    let sources: Vec<Source> = if files.is_empty() {
        vec![Source::Synthetic]
    } else {
        files.into_iter().map(Source::File).collect()
    };

    std::fs::create_dir_all(&out_dir).unwrap_or_else(|e| {
        eprintln!("Failed to create output dir {}: {}", out_dir.display(), e);
        std::process::exit(1);
    });

    let phase_name = phase.name();

    // Child process mode: profile exactly one source with DHAT active.
    if single_source_mode {
        assert!(sources.len() == 1, "--single-source expects at most one file");
        let source = &sources[0];
        let json_path = out_dir.join(format!("dhat-{phase_name}-{}.json", source.label()));

        let _profiler = dhat::Profiler::builder().file_name(json_path).build();

        profile_source(source, phase);
        return;
    }

    // Aggregate mode, or a single source: one DHAT session in this process.
    if aggregate || sources.len() == 1 {
        let json_path = if aggregate {
            out_dir.join(format!("dhat-{phase_name}.json"))
        } else {
            out_dir.join(format!("dhat-{phase_name}-{}.json", sources[0].label()))
        };
        eprintln!(
            "heap-profile: phase={}, sources={}, out={}",
            phase_name,
            sources.len(),
            out_dir.display()
        );

        let _profiler = dhat::Profiler::builder()
            .file_name(json_path.clone())
            .build();

        for source in &sources {
            eprintln!("  profiling: {}", source.label());
            profile_source(source, phase);
        }

        eprintln!(
            "Done. Open {} in https://nnethercote.github.io/dh_view/dh_view.html",
            json_path.display()
        );
        return;
    }

    // Per-file mode: spawn a child process per file for clean DHAT sessions.
    let self_exe = std::env::current_exe().unwrap_or_else(|e| {
        eprintln!("Failed to determine own executable path: {}", e);
        std::process::exit(1);
    });

    eprintln!(
        "heap-profile: phase={}, files={} (per-file), out={}",
        phase_name,
        sources.len(),
        out_dir.display()
    );

    let mut any_failed = false;
    for source in &sources {
        let Source::File(path) = source else {
            continue;
        };
        eprintln!(
            "  profiling: {} -> dhat-{}-{}.json",
            path.display(),
            phase_name,
            source.label()
        );

        let status = Command::new(&self_exe)
            .arg("--single-source")
            .arg("--phase")
            .arg(phase_name)
            .arg("--out-dir")
            .arg(&out_dir)
            .arg(path)
            .status();

        match status {
            Ok(s) if s.success() => {}
            Ok(s) => {
                eprintln!("    FAILED (exit {})", s.code().unwrap_or(-1));
                any_failed = true;
            }
            Err(e) => {
                eprintln!("    FAILED to spawn: {}", e);
                any_failed = true;
            }
        }
    }

    eprintln!();
    eprintln!("Profiles saved to {}:", out_dir.display());
    for source in &sources {
        let json_path = out_dir.join(format!("dhat-{phase_name}-{}.json", source.label()));
        if Path::new(&json_path).exists() {
            eprintln!("  {}", json_path.display());
        }
    }
    eprintln!();
    eprintln!("Open in https://nnethercote.github.io/dh_view/dh_view.html");

    if any_failed {
        std::process::exit(1);
    }
}
