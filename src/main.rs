use clap::{crate_version, App, AppSettings, Arg, SubCommand};
use scrollmark::build::build_site;
use scrollmark::config::Config;
use scrollmark::logging::init_logging;
use std::path::Path;

fn main() {
    let matches = App::new("scrollmark")
        .version(crate_version!())
        .about("Builds a long-form article page with a scroll-synced table of contents")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .global(true)
                .help("Increases log verbosity (-v info, -vv debug, -vvv trace)"),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("Renders the project's article into the output directory")
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .value_name("DIR")
                        .help("Output directory (defaults to <project>/_output)"),
                )
                .arg(
                    Arg::with_name("project")
                        .index(1)
                        .value_name("PROJECT_DIR")
                        .help("Directory in or below the project (defaults to .)"),
                ),
        )
        .get_matches();

    init_logging(matches.occurrences_of("verbose"));

    if let Some(matches) = matches.subcommand_matches("build") {
        let project = Path::new(matches.value_of("project").unwrap_or("."));
        let output = matches.value_of("output").map(Path::new);

        let result = Config::from_directory(project, output)
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
            .and_then(|config| {
                build_site(&config).map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
            });

        match result {
            Ok(page) => println!("{}", page.display()),
            Err(err) => {
                eprintln!("error: {}", err);
                std::process::exit(1);
            }
        }
    }
}
