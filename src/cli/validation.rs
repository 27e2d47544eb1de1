use crate::cli::args::CliArgs;
use crate::filter::Category;
use crate::output::OutputFormat;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if args.page == Some(0) {
        return Err("invalid page, expected positive integer".to_string());
    }
    if args.show == Some(0) {
        return Err("invalid --show, profile numbers start at 1".to_string());
    }
    if args.star.iter().any(|&n| n == 0) {
        return Err("invalid --star, profile numbers start at 1".to_string());
    }
    if args.timeout == Some(0) {
        return Err("invalid timeout, expected positive integer".to_string());
    }
    if let Some(raw) = args.output_format.as_deref() {
        OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid --output-format '{raw}', expected text or json"))?;
    }
    if let Some(raw) = args.options.as_deref() {
        Category::parse(raw).ok_or_else(|| {
            format!("invalid --options '{raw}', expected gender, resident, marital or subsect")
        })?;
    }
    if let Some(raw) = args.url.as_deref() {
        reqwest::Url::parse(raw.trim()).map_err(|e| format!("invalid --url '{raw}': {e}"))?;
    }
    if let Some(raw) = args.proxy.as_deref() {
        reqwest::Url::parse(raw.trim()).map_err(|e| format!("invalid --proxy '{raw}': {e}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["matribrowse"];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&parse(&[])).is_ok());
    }

    #[test]
    fn zero_numbers_are_rejected() {
        assert!(validate(&parse(&["--page", "0"])).is_err());
        assert!(validate(&parse(&["--star", "3", "--star", "0"])).is_err());
        assert!(validate(&parse(&["--show", "0"])).is_err());
        assert!(validate(&parse(&["--timeout", "0"])).is_err());
    }

    #[test]
    fn formats_and_urls_are_checked() {
        assert!(validate(&parse(&["-o", "json"])).is_ok());
        assert!(validate(&parse(&["-o", "html"])).is_err());
        assert!(validate(&parse(&["-u", "not a url"])).is_err());
        assert!(validate(&parse(&["--options", "sakha"])).is_ok());
        assert!(validate(&parse(&["--options", "height"])).is_err());
    }
}
