use clap::Parser;
use safelist_scanner::{handle_inject_command, scan, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Handle commands
    match cli.command {
        Commands::Scan(args) => {
            let dry_run = args.dry_run;
            match scan(args).await {
                Ok(summary) => {
                    println!("Scan successful!");
                    println!("  - Scanned {} files", summary.total_files_scanned);
                    println!("  - Extracted {} unique classes", summary.classes.len());
                    if dry_run {
                        println!("  - Dry run: nothing written");
                    } else {
                        println!("  - Safelist written to {}", summary.output_path.display());
                    }
                    Ok(())
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Inject(args) => {
            handle_inject_command(args).await?;
            Ok(())
        }
    }
}
