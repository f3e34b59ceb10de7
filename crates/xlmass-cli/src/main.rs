use clap::{value_parser, Arg, Command, ValueHint};
use xlmass_cli::input::Input;
use xlmass_cli::runner::Runner;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::default()
        .filter_level(log::LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("XLMASS_LOG", "error,xlmass=info"))
        .init();

    let matches = Command::new("xlmass")
        .version(clap::crate_version!())
        .about("Match MGF precursor masses against cross-linked peptide masses")
        .arg(
            Arg::new("candidates")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path to the reference list of cross-link masses. Overrides the \
                     file listed in the parameters file.",
                )
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("scans")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path to the MGF file with scans to match. Overrides the file \
                     listed in the parameters file.",
                )
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("separator")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help("Output field separator; the first character is used (default = tab)")
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("parameters")
                .short('p')
                .long("parameters")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help("Path to matching parameters (JSON file)")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("relative-error")
                .short('e')
                .long("relative-error")
                .value_parser(value_parser!(f64))
                .conflicts_with("ppm")
                .help("Relative mass tolerance (default = 0.00001, i.e. 10 ppm)")
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("ppm")
                .long("ppm")
                .value_parser(value_parser!(f64))
                .help("Mass tolerance in parts-per-million")
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("top")
                .short('k')
                .long("top")
                .value_parser(value_parser!(usize))
                .help("Number of closest candidates reported per scan (default = 10)")
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("workers")
                .short('w')
                .long("workers")
                .value_parser(value_parser!(usize))
                .help("Number of scans matched in parallel (default = 8)")
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help("Write matches to this file instead of stdout")
                .value_hint(ValueHint::FilePath),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    let input = Input::from_arguments(matches)?;

    let search = input.build()?;
    log::debug!("{}", serde_json::to_string_pretty(&search)?);

    let runner = Runner::new(search)?;
    runner.run()?;

    Ok(())
}
