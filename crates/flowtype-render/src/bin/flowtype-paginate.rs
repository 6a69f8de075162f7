use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use flowtype::{Font, Justify, LineSpacing, Paragraph, ParagraphStyle, TextStyle};
use flowtype_render::{
    text_paragraphs, EnglishHyphenator, HeuristicMetrics, LayoutConfig, PageCache, RenderEngine,
};

#[derive(Debug)]
struct Args {
    input_path: String,
    page_width: f32,
    page_height: f32,
    margin: f32,
    font_size: f32,
    justify: Justify,
    json: bool,
}

fn main() -> ExitCode {
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let Some(cli) = parse_args(args)? else {
        println!("{}", help_text());
        return Ok(());
    };
    let text = std::fs::read_to_string(&cli.input_path)
        .map_err(|e| format!("cannot read {}: {}", cli.input_path, e))?;

    let font = Font::new(HeuristicMetrics::proportional("Serif"));
    let body = TextStyle::new(font, cli.font_size);
    let style = ParagraphStyle::default()
        .with_indents(0.0, 0.0, cli.font_size * 1.5)
        .with_justify(cli.justify)
        .with_line_spacing(LineSpacing::Proportional(flowtype::style::STANDARD));
    let hyphenator = Arc::new(EnglishHyphenator::default());
    let mut paragraphs: Vec<Paragraph> = text_paragraphs(&text)
        .into_iter()
        .map(|para| {
            Paragraph::new(style.clone())
                .with_hyphenator(hyphenator.clone())
                .text(para, &body)
        })
        .collect();

    let config = LayoutConfig::for_page(cli.page_width, cli.page_height).with_margin(cli.margin);
    let mut engine = RenderEngine::new(config);
    let pages = engine.paginate(&mut paragraphs).map_err(|e| e.to_string())?;

    for paragraph in &paragraphs {
        for diagnostic in paragraph.diagnostics() {
            eprintln!("warning: {}", diagnostic);
        }
    }

    if cli.json {
        println!("{}", PageCache::to_json(&pages).map_err(|e| e.to_string())?);
        return Ok(());
    }
    for page in &pages {
        println!(
            "page {:>4}: runs={:<4} glyphs={:<6} height={:.1}",
            page.page_number,
            page.glyph_runs().count(),
            page.metrics.glyph_count,
            page.metrics.content_height
        );
    }
    println!(
        "paginated {} (paragraphs={}, pages={})",
        cli.input_path,
        paragraphs.len(),
        pages.len()
    );
    Ok(())
}

fn parse_justify(value: &str) -> Result<Justify, String> {
    match value {
        "left" => Ok(Justify::Left),
        "right" => Ok(Justify::Right),
        "center" => Ok(Justify::Center),
        "both" | "justify" => Ok(Justify::Both),
        _ => Err(format!("invalid --justify value '{}'", value)),
    }
}

/// Parsed arguments, or `None` when help was requested.
fn parse_args(args: Vec<String>) -> Result<Option<Args>, String> {
    if args.iter().skip(1).any(|arg| arg == "--help" || arg == "-h") {
        return Ok(None);
    }
    let input_path = match args.get(1) {
        Some(path) if !path.starts_with("--") => path.clone(),
        _ => return Err("missing input file".to_string()),
    };

    let mut cfg = Args {
        input_path,
        page_width: 480.0,
        page_height: 800.0,
        margin: 32.0,
        font_size: 12.0,
        justify: Justify::Both,
        json: false,
    };

    let mut i = 2usize;
    while i < args.len() {
        match args[i].as_str() {
            "--width" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--width requires a value".to_string())?;
                cfg.page_width = v
                    .parse::<f32>()
                    .map_err(|_| format!("invalid --width value '{}'", v))?;
                i += 2;
            }
            "--height" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--height requires a value".to_string())?;
                cfg.page_height = v
                    .parse::<f32>()
                    .map_err(|_| format!("invalid --height value '{}'", v))?;
                i += 2;
            }
            "--margin" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--margin requires a value".to_string())?;
                cfg.margin = v
                    .parse::<f32>()
                    .map_err(|_| format!("invalid --margin value '{}'", v))?;
                i += 2;
            }
            "--font-size" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--font-size requires a value".to_string())?;
                cfg.font_size = v
                    .parse::<f32>()
                    .map_err(|_| format!("invalid --font-size value '{}'", v))?;
                i += 2;
            }
            "--justify" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--justify requires a value".to_string())?;
                cfg.justify = parse_justify(v)?;
                i += 2;
            }
            "--json" => {
                cfg.json = true;
                i += 1;
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }

    if cfg.font_size <= 0.0 {
        return Err("--font-size must be positive".to_string());
    }
    if cfg.page_width <= 2.0 * cfg.margin || cfg.page_height <= 2.0 * cfg.margin {
        return Err("margins leave no room for content".to_string());
    }
    Ok(Some(cfg))
}

fn help_text() -> &'static str {
    r#"flowtype-paginate - lay out a plain-text file into pages

USAGE:
  cargo run -p flowtype-render --bin flowtype-paginate -- <input.txt> [options]

Paragraphs are separated by blank lines.

OPTIONS:
  --width <n>        page width (default: 480)
  --height <n>       page height (default: 800)
  --margin <n>       margin on all sides (default: 32)
  --font-size <n>    body text size (default: 12)
  --justify <mode>   left|right|center|both (default: both)
  --json             print the pages as JSON instead of a summary
"#
}
