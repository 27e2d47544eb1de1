use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "matribrowse",
    version,
    about = "browse, filter, and bookmark matrimonial profiles",
    long_about = "Matribrowse fetches a matrimonial profile dataset, normalizes it, and lets you search, filter, page through, and star profiles from the terminal.\n\nExamples:\n  matribrowse\n  matribrowse -g female -r NRI --page 2\n  matribrowse -s engineer --star 12 --show 12\n  matribrowse -i ./profiles.json --interactive\n\nTip: Use --init-config to write ~/.matribrowse/config.yml and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv, -vvv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format (text or json)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.matribrowse/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write a default config file if none exists, then exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'u',
        long = "u",
        visible_alias = "url",
        value_name = "URL",
        help_heading = "Input",
        help = "Dataset URL (a JSON array of profile records)."
    )]
    pub url: Option<String>,

    #[arg(
        short = 'i',
        long = "df",
        visible_alias = "dataset-file",
        value_name = "FILE",
        help_heading = "Input",
        help = "Load the dataset from a local JSON file instead of the URL."
    )]
    pub dataset_file: Option<String>,

    #[arg(
        long = "ff",
        visible_alias = "favorites-file",
        value_name = "FILE",
        help_heading = "Input",
        help = "Favorites store path (defaults to ~/.matribrowse/favorites.json)."
    )]
    pub favorites_file: Option<String>,

    #[arg(
        short = 'p',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Dataset request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 's',
        long = "q",
        visible_alias = "search",
        value_name = "TEXT",
        help_heading = "Filters",
        help = "Case-insensitive substring search across every profile field."
    )]
    pub search: Option<String>,

    #[arg(
        short = 'g',
        long = "gd",
        visible_alias = "gender",
        value_name = "VALUE",
        help_heading = "Filters",
        help = "Only profiles with this gender (exact match, genders are lower-case)."
    )]
    pub gender: Option<String>,

    #[arg(
        short = 'r',
        long = "rs",
        visible_alias = "resident",
        value_name = "VALUE",
        help_heading = "Filters",
        help = "Only profiles with this resident status (exact match, see --options resident)."
    )]
    pub resident: Option<String>,

    #[arg(
        short = 'm',
        long = "ms",
        visible_alias = "marital",
        value_name = "VALUE",
        help_heading = "Filters",
        help = "Only profiles with this marital status."
    )]
    pub marital: Option<String>,

    #[arg(
        short = 'S',
        long = "ss",
        visible_aliases = ["subsect", "sakha"],
        value_name = "VALUE",
        help_heading = "Filters",
        help = "Only profiles with this subsect / sakha."
    )]
    pub subsect: Option<String>,

    #[arg(
        short = 'f',
        long = "fo",
        visible_alias = "favorites-only",
        help_heading = "Filters",
        help = "Only show starred profiles."
    )]
    pub favorites_only: bool,

    #[arg(
        long = "opt",
        visible_alias = "options",
        value_name = "CATEGORY",
        help_heading = "Filters",
        help = "List the distinct values of a category (gender, resident, marital, subsect) and exit."
    )]
    pub options: Option<String>,

    #[arg(
        short = 'P',
        long = "pg",
        visible_alias = "page",
        value_name = "N",
        help_heading = "View",
        help = "Page to show (1-based, 20 profiles per page)."
    )]
    pub page: Option<usize>,

    #[arg(
        long = "st",
        visible_alias = "star",
        value_name = "N",
        action = ArgAction::Append,
        help_heading = "View",
        help = "Toggle the favorite mark of profile #N (repeatable)."
    )]
    pub star: Vec<usize>,

    #[arg(
        long = "sh",
        visible_alias = "show",
        value_name = "N",
        help_heading = "View",
        help = "Show the full details of profile #N."
    )]
    pub show: Option<usize>,

    #[arg(
        short = 'I',
        long = "it",
        visible_alias = "interactive",
        help_heading = "View",
        help = "Start the interactive browser (type 'help' for commands)."
    )]
    pub interactive: bool,
}
