use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::browser::Browser;
use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::favorites::FileKeyValueStore;
use crate::filter::{Category, FilterPredicates};
use crate::logging::{self, Verbosity};
use crate::output::{self, OutputFormat};
use crate::store::{build_client, DatasetSource, ProfileStore};

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

const INTERACTIVE_HELP: &str = "\
Commands:
  search <text>        search every field (applied after typing settles)
  gender <value>       filter by gender (no value clears it)
  resident <value>     filter by resident status
  marital <value>      filter by marital status
  subsect <value>      filter by subsect / sakha
  options <category>   list the values present for a category
  favorites            toggle the favorites-only view
  star <n>             toggle the favorite mark of profile #n
  page <n> | next | prev
  show <n>             full details of profile #n
  list                 print the current page again
  reset                clear every filter
  help | quit
";

fn format_kv_line(out: &mut impl Write, label: &str, value: &str) -> Result<(), String> {
    writeln!(out, ":: {:<10}: {}", label, value).map_err(write_error)
}

fn write_error(e: std::io::Error) -> String {
    format!("failed to write output: {e}")
}

#[derive(Clone, Debug)]
struct RunConfig {
    source: DatasetSource,
    favorites_path: PathBuf,
    timeout: u64,
    proxy: Option<String>,
    output_format: OutputFormat,
    no_color: bool,
    interactive: bool,
    predicates: FilterPredicates,
    page: usize,
    star: Vec<usize>,
    show: Option<usize>,
    options: Option<Category>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);
    let interactive = args.interactive || cfg.interactive.unwrap_or(false);
    let timeout = args
        .timeout
        .or(cfg.timeout)
        .unwrap_or(DEFAULT_TIMEOUT_SECONDS);
    if timeout == 0 {
        return Err("invalid timeout, expected positive integer".to_string());
    }
    let proxy = non_empty(args.proxy.or(cfg.proxy));

    let output_format_raw = args
        .output_format
        .or(cfg.output_format)
        .unwrap_or_else(|| "text".to_string());
    let output_format = OutputFormat::parse(&output_format_raw).ok_or_else(|| {
        format!("invalid output format '{output_format_raw}', expected text or json")
    })?;

    // Command-line dataset flags replace the config's pair as a whole.
    let (dataset_file, dataset_url) = match (non_empty(args.dataset_file), non_empty(args.url)) {
        (None, None) => (non_empty(cfg.dataset_file), non_empty(cfg.dataset_url)),
        cli => cli,
    };
    let source = match (dataset_file, dataset_url) {
        (Some(file), _) => DatasetSource::File(config::expand_tilde(&file)),
        (None, Some(url)) => DatasetSource::Url(url),
        (None, None) => DatasetSource::default(),
    };

    let favorites_path = match non_empty(args.favorites_file.or(cfg.favorites_file)) {
        Some(p) => config::expand_tilde(&p),
        None => config::default_favorites_path().ok_or_else(|| {
            "cannot locate a home directory for favorites, use --favorites-file".to_string()
        })?,
    };

    let mut predicates = FilterPredicates {
        search: args.search.unwrap_or_default(),
        favorites_only: args.favorites_only,
        ..FilterPredicates::default()
    };
    predicates.set_category(Category::Gender, non_empty(args.gender));
    predicates.set_category(Category::ResidentStatus, non_empty(args.resident));
    predicates.set_category(Category::MaritalStatus, non_empty(args.marital));
    predicates.set_category(Category::Subsect, non_empty(args.subsect));

    let options = args.options.as_deref().and_then(Category::parse);

    Ok(RunConfig {
        source,
        favorites_path,
        timeout,
        proxy,
        output_format,
        no_color,
        interactive,
        predicates,
        page: args.page.unwrap_or(1),
        star: args.star,
        show: args.show,
        options,
    })
}

fn fetch_spinner(run: &RunConfig) -> Result<ProgressBar, String> {
    let on_terminal = std::io::IsTerminal::is_terminal(&std::io::stderr());
    if run.output_format == OutputFormat::Json || !on_terminal {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_style(
        ProgressStyle::with_template(":: {spinner} {msg} :: [{elapsed_precise}]")
            .map_err(|e| format!("failed to build progress bar style: {e}"))?,
    );
    pb.set_message(format!("Loading profiles from {}", run.source.describe()));
    Ok(pb)
}

fn print_page(
    out: &mut impl Write,
    browser: &Browser,
    format: OutputFormat,
) -> Result<(), String> {
    let page = browser.page();
    match format {
        OutputFormat::Text => out
            .write_all(output::render_page_text(&page).as_bytes())
            .map_err(write_error),
        OutputFormat::Json => {
            out.write_all(&output::render_page_json(&page, browser.predicates()))
                .map_err(write_error)?;
            out.write_all(b"\n").map_err(write_error)
        }
    }
}

fn print_detail(
    out: &mut impl Write,
    browser: &Browser,
    number: usize,
    format: OutputFormat,
) -> Result<bool, String> {
    let position = number.saturating_sub(1);
    let Some(profile) = browser.profile(position) else {
        return Ok(false);
    };
    let detail = output::build_detail(position, profile);
    match format {
        OutputFormat::Text => out
            .write_all(output::render_detail_text(&detail).as_bytes())
            .map_err(write_error)?,
        OutputFormat::Json => {
            out.write_all(&output::render_detail_json(&detail))
                .map_err(write_error)?;
            out.write_all(b"\n").map_err(write_error)?;
        }
    }
    Ok(true)
}

fn print_options(
    out: &mut impl Write,
    browser: &Browser,
    category: Category,
) -> Result<(), String> {
    let values = browser.options(category);
    let listed = if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    };
    writeln!(out, "{}: {}", category.label().bold(), listed).map_err(write_error)
}

fn no_such_profile(number: usize, browser: &Browser) -> String {
    format!(
        "no profile #{number}, {} profiles are loaded",
        browser.store().len()
    )
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    let client = build_client(run.proxy.as_deref(), run.timeout).map_err(|e| e.to_string())?;
    let favorites = FileKeyValueStore::new(run.favorites_path.clone());
    let mut store = ProfileStore::new(Box::new(favorites));

    let pb = fetch_spinner(&run)?;
    let loaded = store.load_all(&client, &run.source).await;
    pb.finish_and_clear();
    let count = match loaded {
        Ok(count) => count,
        Err(e) => {
            warn!(source = %run.source.describe(), error = %e, "dataset load failed");
            if run.output_format == OutputFormat::Text {
                println!("{}", output::LOAD_ERROR.red());
            }
            return Err(e.to_string());
        }
    };
    info!(count, favorites = %run.favorites_path.display(), "profiles ready");

    let mut browser = Browser::new(store);
    let mut stdout = std::io::stdout();

    for &number in &run.star {
        match browser.toggle_favorite(number - 1) {
            Some(value) => debug!(number, favorite = value, "favorite toggled"),
            None => return Err(no_such_profile(number, &browser)),
        }
    }

    if let Some(category) = run.options {
        return print_options(&mut stdout, &browser, category);
    }

    browser.apply_predicates(run.predicates.clone());
    if let Err(e) = browser.go_to_page(run.page) {
        eprintln!("{} {e}, showing page {}", "warning:".yellow(), browser.current_page());
    }

    if run.interactive {
        if run.output_format == OutputFormat::Text {
            format_kv_line(&mut stdout, "Source", &run.source.describe())?;
            format_kv_line(&mut stdout, "Profiles", &count.to_string())?;
            format_kv_line(&mut stdout, "Favorites", &run.favorites_path.display().to_string())?;
            writeln!(stdout, ":: Type 'help' for commands").map_err(write_error)?;
            writeln!(stdout).map_err(write_error)?;
        }
        let input = BufReader::new(tokio::io::stdin());
        run_session(browser, input, &mut stdout, run.output_format).await?;
        return Ok(());
    }

    print_page(&mut stdout, &browser, run.output_format)?;
    if let Some(number) = run.show {
        if !print_detail(&mut stdout, &browser, number, run.output_format)? {
            return Err(no_such_profile(number, &browser));
        }
    }
    stdout.flush().map_err(write_error)?;
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Command {
    Search(String),
    Filter(Category, Option<String>),
    Options(Category),
    Favorites,
    Star(usize),
    Page(usize),
    Next,
    Prev,
    Show(usize),
    List,
    Reset,
    Help,
    Quit,
}

fn parse_number(word: &str, rest: &str) -> Result<usize, String> {
    match rest.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("'{word}' expects a number starting at 1")),
    }
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let word_lower = word.to_lowercase();
    let command = match word_lower.as_str() {
        "search" | "s" => Command::Search(rest.to_string()),
        "options" | "opt" => {
            let category = Category::parse(rest).ok_or_else(|| {
                "'options' expects gender, resident, marital or subsect".to_string()
            })?;
            Command::Options(category)
        }
        "favorites" | "fav" => Command::Favorites,
        "star" => Command::Star(parse_number(word, rest)?),
        "page" | "p" => Command::Page(parse_number(word, rest)?),
        "next" | "n" => Command::Next,
        "prev" | "previous" => Command::Prev,
        "show" => Command::Show(parse_number(word, rest)?),
        "list" | "ls" => Command::List,
        "reset" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => match Category::parse(other) {
            Some(category) => {
                let value = (!rest.is_empty()).then(|| rest.to_string());
                Command::Filter(category, value)
            }
            None => return Err(format!("unknown command '{word}', type 'help'")),
        },
    };
    Ok(Some(command))
}

fn apply_command(
    out: &mut impl Write,
    browser: &mut Browser,
    command: Command,
    format: OutputFormat,
) -> Result<(), String> {
    match command {
        Command::Search(text) => {
            browser.set_search(&text);
            print_page(out, browser, format)
        }
        Command::Filter(category, value) => {
            browser.set_category(category, value);
            print_page(out, browser, format)
        }
        Command::Options(category) => print_options(out, browser, category),
        Command::Favorites => {
            let on = browser.toggle_favorites_only();
            writeln!(out, "favorites only: {}", if on { "on" } else { "off" })
                .map_err(write_error)?;
            print_page(out, browser, format)
        }
        Command::Star(number) => match browser.toggle_favorite(number - 1) {
            Some(true) => {
                writeln!(out, "{} #{number} starred", "★".yellow()).map_err(write_error)?;
                print_page(out, browser, format)
            }
            Some(false) => {
                writeln!(out, "☆ #{number} unstarred").map_err(write_error)?;
                print_page(out, browser, format)
            }
            None => writeln!(out, "{}", no_such_profile(number, browser)).map_err(write_error),
        },
        Command::Page(page) => match browser.go_to_page(page) {
            Ok(()) => print_page(out, browser, format),
            Err(e) => writeln!(out, "{e}").map_err(write_error),
        },
        Command::Next => match browser.next_page() {
            Ok(()) => print_page(out, browser, format),
            Err(_) => writeln!(out, "already on the last page").map_err(write_error),
        },
        Command::Prev => match browser.previous_page() {
            Ok(()) => print_page(out, browser, format),
            Err(_) => writeln!(out, "already on the first page").map_err(write_error),
        },
        Command::Show(number) => {
            if !print_detail(out, browser, number, format)? {
                writeln!(out, "{}", no_such_profile(number, browser)).map_err(write_error)?;
            }
            Ok(())
        }
        Command::List => print_page(out, browser, format),
        Command::Reset => {
            browser.reset_filters();
            print_page(out, browser, format)
        }
        Command::Help => out.write_all(INTERACTIVE_HELP.as_bytes()).map_err(write_error),
        Command::Quit => Ok(()),
    }
}

/// Reads commands line by line until `quit` or end of input. Search text
/// goes through the debouncer; everything else applies immediately.
async fn run_session<R, W>(
    mut browser: Browser,
    input: R,
    out: &mut W,
    format: OutputFormat,
) -> Result<Browser, String>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (search_tx, mut searches) = Debouncer::channel(SEARCH_DEBOUNCE, 64);
    let mut search_tx = Some(search_tx);
    let mut lines = input.lines();

    print_page(out, &browser, format)?;
    out.flush().map_err(write_error)?;

    loop {
        tokio::select! {
            line = lines.next_line(), if search_tx.is_some() => {
                match line {
                    Ok(Some(line)) => match parse_command(&line) {
                        Ok(None) => {}
                        Ok(Some(Command::Quit)) => break,
                        Ok(Some(Command::Search(text))) => {
                            if let Some(tx) = search_tx.as_ref() {
                                if tx.send(text).await.is_err() {
                                    debug!("search channel closed");
                                }
                            }
                        }
                        Ok(Some(command)) => apply_command(out, &mut browser, command, format)?,
                        Err(message) => writeln!(out, "{message}").map_err(write_error)?,
                    },
                    // End of input: release any pending search, then stop.
                    Ok(None) => search_tx = None,
                    Err(e) => return Err(format!("failed to read input: {e}")),
                }
            }
            settled = searches.next() => match settled {
                Some(text) => {
                    debug!(search = %text, "search settled");
                    apply_command(out, &mut browser, Command::Search(text), format)?;
                }
                None => break,
            },
        }
        out.flush().map_err(write_error)?;
    }
    Ok(browser)
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{e}");
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    logging::init_subscriber(Verbosity::from_count(args.verbose), args.no_color);

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));
    if args.init_config {
        let path = user_config_path
            .or_else(config::default_config_path)
            .ok_or_else(|| "cannot locate a home directory, use --config".to_string())?;
        config::ensure_default_config_file(&path)?;
        println!(":: Config    : {}", path.display());
        return Ok(());
    }
    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    debug!(source = %run.source.describe(), "run configured");

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use clap::Parser;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["matribrowse", "--favorites-file", "/tmp/favs.json"];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn defaults_point_at_the_published_dataset() {
        let run = build_run_config(args(&[]), ConfigFile::default()).unwrap();
        assert_eq!(run.source, DatasetSource::default());
        assert_eq!(run.timeout, DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(run.output_format, OutputFormat::Text);
        assert_eq!(run.page, 1);
        assert!(run.predicates.is_unconstrained());
        assert_eq!(run.favorites_path, PathBuf::from("/tmp/favs.json"));
    }

    #[test]
    fn cli_flags_override_config() {
        let cfg = ConfigFile {
            dataset_file: Some("/data/from-config.json".to_string()),
            timeout: Some(30),
            output_format: Some("json".to_string()),
            ..ConfigFile::default()
        };
        let run = build_run_config(args(&["-u", "https://example.com/p.json", "-T", "5"]), cfg)
            .unwrap();
        assert_eq!(
            run.source,
            DatasetSource::Url("https://example.com/p.json".to_string())
        );
        assert_eq!(run.timeout, 5);
        assert_eq!(run.output_format, OutputFormat::Json);
    }

    #[test]
    fn config_dataset_file_wins_over_config_url() {
        let cfg = ConfigFile {
            dataset_file: Some("/data/p.json".to_string()),
            dataset_url: Some("https://example.com/p.json".to_string()),
            ..ConfigFile::default()
        };
        let run = build_run_config(args(&[]), cfg).unwrap();
        assert_eq!(run.source, DatasetSource::File(PathBuf::from("/data/p.json")));
    }

    #[test]
    fn filter_flags_become_predicates() {
        let run = build_run_config(
            args(&["-s", "Engineer", "-g", "female", "-S", "", "-f", "-P", "3", "--star", "2"]),
            ConfigFile::default(),
        )
        .unwrap();
        assert_eq!(run.predicates.search, "Engineer");
        assert_eq!(run.predicates.gender.as_deref(), Some("female"));
        assert_eq!(run.predicates.subsect, None);
        assert!(run.predicates.favorites_only);
        assert_eq!(run.page, 3);
        assert_eq!(run.star, vec![2]);
    }

    #[test]
    fn invalid_config_format_is_rejected() {
        let cfg = ConfigFile {
            output_format: Some("yaml".to_string()),
            ..ConfigFile::default()
        };
        assert!(build_run_config(args(&[]), cfg).is_err());
    }

    #[test]
    fn commands_parse() {
        assert_eq!(parse_command("  ").unwrap(), None);
        assert_eq!(
            parse_command("search  Ravi Teja ").unwrap(),
            Some(Command::Search("Ravi Teja".to_string()))
        );
        assert_eq!(
            parse_command("Gender Female").unwrap(),
            Some(Command::Filter(Category::Gender, Some("Female".to_string())))
        );
        assert_eq!(
            parse_command("sakha").unwrap(),
            Some(Command::Filter(Category::Subsect, None))
        );
        assert_eq!(parse_command("star 3").unwrap(), Some(Command::Star(3)));
        assert!(parse_command("star 0").is_err());
        assert!(parse_command("page x").is_err());
        assert!(parse_command("dance").is_err());
        assert_eq!(parse_command("q").unwrap(), Some(Command::Quit));
    }

    fn browser() -> Browser {
        let body = r#"[
            {"Name": "Person0", "Gender": "Male"},
            {"Name": "Person1", "Gender": "Female"},
            {"Name": "Person2", "Gender": "Female"}
        ]"#;
        let mut store = ProfileStore::default();
        store
            .load_from_json(body, NaiveDate::from_ymd_opt(2024, 6, 16).unwrap(), &Utc)
            .unwrap();
        Browser::new(store)
    }

    #[tokio::test]
    async fn session_applies_commands_and_settled_search() {
        colored::control::set_override(false);
        let input: &[u8] = b"gender female\nstar 2\nshow 2\npage 9\nsearch person2\n";
        let mut out = Vec::new();
        let b = run_session(browser(), input, &mut out, OutputFormat::Text)
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(b.predicates().gender.as_deref(), Some("female"));
        assert_eq!(b.predicates().search, "person2");
        assert_eq!(b.view(), &[2]);
        assert!(b.store().get(1).unwrap().favorite);
        assert!(text.contains("★ #2 starred"));
        assert!(text.contains("★ #2 Person1 (Female)"));
        assert!(text.contains("page 9 is out of range (1-1)"));
    }

    #[tokio::test]
    async fn quit_stops_before_end_of_input() {
        let input: &[u8] = b"quit\nreset\n";
        let mut out = Vec::new();
        let mut start = browser();
        start.set_category(Category::Gender, Some("male".to_string()));
        let b = run_session(start, input, &mut out, OutputFormat::Json)
            .await
            .unwrap();
        assert_eq!(b.view(), &[0]);
    }
}
