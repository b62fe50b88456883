use clap::Parser;
use miette::Result;
use cogdata::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Init(args) => cogdata::cli::commands::init::run(args, &global),
        Commands::Extract(args) => cogdata::cli::commands::extract::run(args, &global),
        Commands::Wiki(cmd) => cogdata::cli::commands::wiki::run(cmd, &global),
        Commands::Unescape(args) => cogdata::cli::commands::unescape::run(args, &global),
        Commands::Validate(args) => cogdata::cli::commands::validate::run(args, &global),
        Commands::Tables(cmd) => cogdata::cli::commands::tables::run(cmd, &global),
        Commands::Config(cmd) => cogdata::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => cogdata::cli::commands::completions::run(args),
    }
}
