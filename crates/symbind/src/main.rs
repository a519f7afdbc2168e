use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use symbind_core::paths::{self, PathStyle};
use symbind_core::{demangle, SymbolTable};
use symbind_utils::{debug, init_with_settings, LogLevel, LogSettings};

/// Resolve addresses to symbols and normalise debug-info paths.
#[derive(Parser, Debug)]
#[command(name = "symbind")]
#[command(version)]
#[command(about = "Resolve addresses to symbols and normalise debug-info paths", long_about = None)]
struct Cli
{
    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Show the architecture and symbol count of an object file
    Info
    {
        /// Path to the object file
        object: PathBuf,
    },
    /// Resolve addresses to the function symbols covering them
    Lookup
    {
        /// Path to the object file
        object: PathBuf,
        /// Addresses to resolve (hex format: 0x1000 or decimal)
        #[arg(required = true, value_parser = parse_address)]
        addresses: Vec<u64>,
    },
    /// Demangle Rust symbol names
    Demangle
    {
        /// Mangled names; names that are not Rust symbols are echoed back
        #[arg(required = true)]
        symbols: Vec<String>,
    },
    /// Join two debug-info paths using the dialect of the first
    Join
    {
        /// Base path (e.g. a compilation directory)
        a: String,
        /// Path to append
        b: String,
    },
    /// Remove a leading directory prefix from a debug-info path
    StripPrefix
    {
        /// Path to shorten
        base: String,
        /// Prefix to remove
        prefix: String,
    },
}

fn main()
{
    let cli = Cli::parse();

    let settings = match LogSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };
    let settings = match cli.log_level {
        Some(level) => settings.with_level(level),
        None => settings,
    };
    if let Err(e) = init_with_settings(&settings) {
        eprintln!("Failed to initialize logging: {e}");
        process::exit(1);
    }

    if let Err(e) = run_command(cli.command) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(command: Commands) -> Result<(), Box<dyn std::error::Error>>
{
    match command {
        Commands::Info { object } => {
            debug!(object = %object.display(), "loading symbol table");
            let table = SymbolTable::open(&object)?;
            println!("Object: {}", object.display());
            println!("  Architecture: {}", table.arch()?);
            println!("  Function symbols: {}", table.symbol_count()?);
        }
        Commands::Lookup { object, addresses } => {
            let table = SymbolTable::open(&object)?;
            for address in addresses {
                match table.lookup(address)? {
                    Some(symbol) => {
                        let offset = address - symbol.address;
                        println!("{address:#018x}  {}+{offset:#x}", symbol.display_name());
                    }
                    None => println!("{address:#018x}  ??"),
                }
            }
        }
        Commands::Demangle { symbols } => {
            for symbol in symbols {
                let demangled = demangle(&symbol)?;
                println!("{}", demangled.as_deref().unwrap_or(&symbol));
            }
        }
        Commands::Join { a, b } => {
            debug!(style = %PathStyle::detect(&a), "joining paths");
            println!("{}", paths::join(&a, &b));
        }
        Commands::StripPrefix { base, prefix } => {
            println!("{}", paths::strip_prefix(&base, &prefix));
        }
    }
    Ok(())
}

/// Parse an address given as `0x`-prefixed hex or decimal.
fn parse_address(raw: &str) -> Result<u64, String>
{
    let trimmed = raw.trim();
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => trimmed.replace('_', "").parse::<u64>(),
    };
    parsed.map_err(|e| format!("invalid address '{raw}': {e}"))
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_address()
    {
        assert_eq!(parse_address("0x1000").unwrap(), 0x1000);
        assert_eq!(parse_address("0XfFfF").unwrap(), 0xffff);
        assert_eq!(parse_address("4096").unwrap(), 4096);
        assert_eq!(parse_address(" 0x7fff_0000 ").unwrap(), 0x7fff_0000);
        assert!(parse_address("0x").is_err());
        assert!(parse_address("0xg1").is_err());
        assert!(parse_address("-1").is_err());
        assert!(parse_address("").is_err());
    }

    #[test]
    fn test_cli_parses_lookup()
    {
        let cli = Cli::try_parse_from(["symbind", "lookup", "libfoo.so", "0x10", "32", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        match cli.command {
            Commands::Lookup { object, addresses } => {
                assert_eq!(object, PathBuf::from("libfoo.so"));
                assert_eq!(addresses, vec![0x10, 32]);
            }
            other => panic!("Expected Lookup, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_missing_addresses()
    {
        assert!(Cli::try_parse_from(["symbind", "lookup", "libfoo.so"]).is_err());
        assert!(Cli::try_parse_from(["symbind", "lookup", "libfoo.so", "nope"]).is_err());
    }

    #[test]
    fn test_cli_parses_strip_prefix()
    {
        let cli = Cli::try_parse_from(["symbind", "strip-prefix", "/a/b/c", "/a"]).unwrap();
        assert!(matches!(cli.command, Commands::StripPrefix { .. }));
    }

    #[test]
    fn test_run_path_commands()
    {
        run_command(Commands::Join {
            a: r"C:\src".to_string(),
            b: "lib.rs".to_string(),
        })
        .unwrap();
        run_command(Commands::Demangle {
            symbols: vec!["main".to_string()],
        })
        .unwrap();
    }

    #[test]
    fn test_run_info_missing_object()
    {
        let err = run_command(Commands::Info {
            object: PathBuf::from("/nonexistent/symbind/libmissing.so"),
        })
        .unwrap_err();
        assert!(err.to_string().contains("libmissing.so"));
    }
}
