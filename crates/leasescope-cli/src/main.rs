// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod interactive;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use leasescope_app::CommandRunner;
use leasescope_ssh::{SshRunner, SshTarget};
use leasescope_vendor::{
    CacheStore, FileCacheStore, LookupClient, MemoryCacheStore, Resolver, VendorLookup,
    ttl_from_days,
};
use runtime::{DemoLookup, DemoRouter, LeaseSession};
use std::env;
use std::io;
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

const DEMO_SEED: u64 = 42;
const DEMO_LEASE_COUNT: usize = 24;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    init_tracing();

    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `leasescope --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let cache_path = config.cache_path()?;
    if options.print_cache_path {
        println!("{}", cache_path.display());
        return Ok(());
    }

    if options.prune_cache {
        let store = FileCacheStore::new(&cache_path);
        let removed =
            runtime::prune_vendor_cache(&store, config.cache_ttl_days(), OffsetDateTime::now_utc())?;
        println!(
            "removed {removed} stale vendor entries from {}",
            cache_path.display()
        );
        return Ok(());
    }

    let policy = config.retry_policy()?;
    let ttl = ttl_from_days(config.cache_ttl_days());

    if options.demo {
        if options.check_only {
            return Ok(());
        }
        let resolver = Resolver::new(MemoryCacheStore::default(), DemoLookup)
            .with_policy(policy)
            .with_ttl(ttl);
        let session = LeaseSession::new(DemoRouter::new(DEMO_SEED, DEMO_LEASE_COUNT), resolver);
        return serve_menu(session);
    }

    let lookup = LookupClient::new(config.lookup_base_url(), config.lookup_timeout()?)
        .with_context(|| {
            format!(
                "invalid [lookup] config in {}; fix base_url/timeout values",
                options.config_path.display()
            )
        })?;
    let router_timeout = config.router_timeout()?;
    if options.check_only {
        return Ok(());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();
    let host =
        interactive::prompt_with_default(&mut input, &mut stdout, "Router IP", config.router_host())?;
    let username = interactive::prompt_with_default(
        &mut input,
        &mut stdout,
        "Username",
        config.router_username(),
    )?;
    drop(input);
    let password = match env::var("LEASESCOPE_PASSWORD") {
        Ok(password) => password,
        Err(_) => interactive::read_password("Password")?,
    };

    let target = SshTarget {
        host,
        port: config.router_port(),
        username,
        timeout: router_timeout,
    };
    let display = target.to_string();
    let runner = SshRunner::connect(target, &password)
        .with_context(|| format!("connect to router {display}"))?;

    let resolver = Resolver::new(FileCacheStore::new(cache_path), lookup)
        .with_policy(policy)
        .with_ttl(ttl);
    serve_menu(LeaseSession::new(runner, resolver))
}

fn serve_menu<R, S, L>(mut session: LeaseSession<R, S, L>) -> Result<()>
where
    R: CommandRunner,
    S: CacheStore,
    L: VendorLookup,
{
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();
    interactive::run_menu(&mut input, &mut stdout, || {
        let mut table = session.load_table()?;
        leasescope_tui::run_lease_table(&mut table)
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_cache_path: bool,
    print_example: bool,
    prune_cache: bool,
    demo: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_cache_path: false,
        print_example: false,
        prune_cache: false,
        demo: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-cache-path" => {
                options.print_cache_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--prune-cache" => {
                options.prune_cache = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("leasescope: MikroTik DHCP lease viewer");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-cache-path       Print resolved vendor cache path");
    println!("  --print-example-config   Print a config template");
    println!("  --prune-cache            Drop expired vendor cache entries and exit");
    println!("  --demo                   Browse generated leases without a router");
    println!("  --check                  Validate config and exit before connecting");
    println!("  --help                   Show this help");
    println!();
    println!("Set LEASESCOPE_PASSWORD to skip the password prompt.");
    println!("Set RUST_LOG (for example RUST_LOG=info) to see lookup and connection logs.");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use anyhow::Result;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/leasescope-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_cache_path: false,
                print_example: false,
                prune_cache: false,
                demo: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_config_value() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(!options.print_cache_path);
        assert!(!options.demo);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_cache_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-cache-path", "--prune-cache"],
            default_options_path(),
        )?;
        assert!(options.print_cache_path);
        assert!(options.prune_cache);
        assert!(!options.print_config_path);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_demo_flag() -> Result<()> {
        let options = parse_cli_args(vec!["--demo"], default_options_path())?;
        assert!(options.demo);
        assert!(!options.check_only);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }
}
