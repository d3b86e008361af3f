use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use frame_regs::{Architecture, NumberingScheme, RegisterDescriptor, RegisterResolver};

#[derive(Parser)]
#[command(name = "frame-regs")]
#[command(about = "Inspect register catalogs and resolve debug-info register numbers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every register of an architecture.
    List {
        #[arg(
            short,
            long,
            default_value = "x86_64",
            help = "Target architecture (x86_64, aarch64)"
        )]
        arch: Architecture,

        #[arg(long, help = "Emit JSON instead of a table")]
        json: bool,
    },
    /// Map register numbers to register names.
    Resolve {
        #[arg(
            short,
            long,
            default_value = "x86_64",
            help = "Target architecture (x86_64, aarch64)"
        )]
        arch: Architecture,

        #[arg(short, long, default_value = "dwarf", help = "Numbering scheme (dwarf, eh-frame)")]
        scheme: NumberingScheme,

        #[arg(required = true, help = "Register numbers")]
        ids: Vec<u32>,

        #[arg(long, help = "Emit JSON instead of text")]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List { arch, json } => {
            let resolver = load(arch)?;
            let catalog = resolver.catalog();
            if json {
                let regs: Vec<_> = catalog.iter().map(describe).collect();
                let doc = json!({
                    "arch": arch.to_string(),
                    "block_size": catalog.block_size(),
                    "registers": regs,
                });
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!(
                    "{:<8} {:>6} {:>4} {:>6} {:>8} {:<4}",
                    "name", "offset", "size", "dwarf", "eh-frame", "role"
                );
                for reg in catalog {
                    println!(
                        "{:<8} {:>6} {:>4} {:>6} {:>8} {:<4}",
                        reg.name(),
                        reg.offset(),
                        reg.size(),
                        id_column(reg, NumberingScheme::Dwarf),
                        id_column(reg, NumberingScheme::EhFrame),
                        reg.role().map(|r| r.to_string()).unwrap_or_default(),
                    );
                }
                println!("{} registers, {} byte block", catalog.len(), catalog.block_size());
            }
        }
        Commands::Resolve {
            arch,
            scheme,
            ids,
            json,
        } => {
            let resolver = load(arch)?;
            if json {
                let entries: Vec<_> = ids
                    .iter()
                    .map(|&id| {
                        json!({
                            "id": id,
                            "register": resolver.resolve(scheme, id).map(RegisterDescriptor::name),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for id in ids {
                    let name = resolver
                        .resolve(scheme, id)
                        .map_or("<none>", RegisterDescriptor::name);
                    println!("{scheme} {id} -> {name}");
                }
            }
        }
    }

    Ok(())
}

fn load(arch: Architecture) -> Result<RegisterResolver> {
    let resolver = RegisterResolver::for_arch(arch)
        .with_context(|| format!("Failed to load {arch} register catalog"))?;
    tracing::debug!(
        %arch,
        registers = resolver.catalog().len(),
        block_size = resolver.catalog().block_size(),
        "loaded register catalog"
    );
    Ok(resolver)
}

fn describe(reg: &RegisterDescriptor) -> serde_json::Value {
    json!({
        "name": reg.name(),
        "offset": reg.offset(),
        "size": reg.size(),
        "dwarf": reg.id(NumberingScheme::Dwarf),
        "eh_frame": reg.id(NumberingScheme::EhFrame),
        "big_endian": reg.big_endian(),
        "role": reg.role().map(|r| r.to_string()),
    })
}

fn id_column(reg: &RegisterDescriptor, scheme: NumberingScheme) -> String {
    reg.id(scheme).map_or_else(|| "-".to_string(), |id| id.to_string())
}
