use colored::Colorize;

use dlt_engine::{merge, MergeOptions, NoticeLevel, Notify};

use crate::cli::Cli;

/// Notice sink that prints progress to the terminal.
struct ConsoleNotify {
    silent: bool,
}

impl Notify for ConsoleNotify {
    fn notice(&self, level: NoticeLevel, message: &str) {
        if self.silent {
            return;
        }
        match level {
            NoticeLevel::Info => println!("{message}"),
            NoticeLevel::Warn => {
                eprintln!("{} {}", "warning:".yellow().bold(), message);
            }
        }
    }
}

pub fn run_merge(cli: Cli) -> anyhow::Result<()> {
    let options = MergeOptions::new().move_files(cli.move_files);
    let notify = ConsoleNotify { silent: cli.silent };

    if let Err(err) = merge(&cli.dirs, &options, &notify) {
        let report = anyhow::Error::new(err);
        return Err(
            if report
                .downcast_ref::<dlt_engine::MergeError>()
                .is_some_and(dlt_engine::MergeError::is_usage_error)
            {
                report.context("invalid arguments (run 'dlt-merge --help' for usage)")
            } else {
                let dest = cli.dirs[cli.dirs.len() - 1].display();
                report.context(format!("failed to merge into {dest}"))
            },
        );
    }

    if !cli.silent {
        let dest = cli.dirs[cli.dirs.len() - 1].display();
        println!(
            "{} Merged {} directories into {}",
            "✓".green().bold(),
            cli.dirs.len() - 1,
            dest.to_string().bold()
        );
    }
    Ok(())
}
