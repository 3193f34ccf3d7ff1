//! TraceVeil CLI
//!
//! Command-line interface for masking log files and protocol traces, and
//! for searching, exporting, and purging the accumulated masking map.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use traceveil_config_file::load_catalog;
use traceveil_observability::{LoggingConfig, Metrics, init_tracing};
use traceveil_pipeline::{CancelToken, FileJob, Pipeline, PipelineConfig, write_export};
use traceveil_store::{
    MappingExport, MappingFilter, MappingStore, MemoryMappingStore, SortDirection, SortKey,
};
use traceveil_store_sqlite::SqliteMappingStore;

#[derive(Parser)]
#[command(name = "traceveil")]
#[command(about = "TraceVeil - Rule-driven PII masking for logs and traces", long_about = None)]
struct Cli {
    /// Emit JSON log lines
    #[arg(long, global = true, default_value = "false")]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortArg {
    Category,
    OriginalValue,
    MaskedValue,
    CreatedAt,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Category => SortKey::Category,
            SortArg::OriginalValue => SortKey::OriginalValue,
            SortArg::MaskedValue => SortKey::MaskedValue,
            SortArg::CreatedAt => SortKey::CreatedAt,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Mask one or more input files
    Mask {
        /// Input files to mask
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Path to the rule-set catalog (YAML or TOML)
        #[arg(long)]
        rules: PathBuf,

        /// Product id used for preset resolution
        #[arg(long)]
        product: String,

        /// Directory masked output is written to
        #[arg(long, default_value = "masked")]
        out_dir: PathBuf,

        /// SQLite mapping database; omitted runs against an in-memory store
        #[arg(long)]
        db: Option<PathBuf>,

        /// Worker pool size
        #[arg(long, default_value = "4")]
        workers: usize,

        /// Directory mapping export artifacts are written to
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
    /// Search accumulated mappings
    Search {
        /// Path to SQLite mapping database
        #[arg(long, default_value = "~/.traceveil/mappings.db")]
        db: PathBuf,

        /// Free-text query over original and masked values
        #[arg(long)]
        query: Option<String>,

        /// Restrict to one category
        #[arg(long)]
        category: Option<String>,

        /// Sort key
        #[arg(long, value_enum, default_value = "created-at")]
        sort: SortArg,

        /// Sort descending
        #[arg(long, default_value = "false")]
        desc: bool,

        #[arg(long, default_value = "50")]
        limit: usize,

        #[arg(long, default_value = "0")]
        offset: usize,
    },
    /// Export mappings as a JSON artifact
    Export {
        /// Path to SQLite mapping database
        #[arg(long, default_value = "~/.traceveil/mappings.db")]
        db: PathBuf,

        /// File id recorded in the artifact
        #[arg(long)]
        file_id: String,

        /// Product name recorded in the artifact
        #[arg(long)]
        product: String,

        /// Restrict to one category
        #[arg(long)]
        category: Option<String>,

        /// Directory the artifact is written to; prints to stdout if omitted
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Bulk-delete accumulated mappings
    Purge {
        /// Path to SQLite mapping database
        #[arg(long, default_value = "~/.traceveil/mappings.db")]
        db: PathBuf,

        /// Only purge mappings older than this many days
        #[arg(long)]
        older_than_days: Option<i64>,
    },
    /// Validate a rule-set catalog without scanning anything
    Validate {
        /// Path to the rule-set catalog (YAML or TOML)
        #[arg(long)]
        rules: PathBuf,
    },
}

fn expand(path: &PathBuf) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string())
}

fn parse_category(raw: Option<String>) -> anyhow::Result<Option<traceveil_core::Category>> {
    raw.map(traceveil_core::Category::new)
        .transpose()
        .map_err(Into::into)
}

async fn open_sqlite(db: &PathBuf) -> anyhow::Result<SqliteMappingStore> {
    Ok(SqliteMappingStore::new(&expand(db)).await?)
}

fn build_filter(
    query: Option<String>,
    category: Option<String>,
    sort: SortArg,
    desc: bool,
    limit: usize,
    offset: usize,
) -> anyhow::Result<MappingFilter> {
    let mut builder = MappingFilter::builder()
        .sort(sort.into())
        .direction(if desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        })
        .limit(limit)
        .offset(offset);

    if let Some(query) = query {
        builder = builder.query(query);
    }
    if let Some(category) = parse_category(category)? {
        builder = builder.category(category);
    }

    builder.build().map_err(|e| anyhow::anyhow!(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_maps_arguments() {
        let filter = build_filter(
            Some("query".to_string()),
            Some("phone_num".to_string()),
            SortArg::OriginalValue,
            true,
            25,
            50,
        )
        .unwrap();

        assert_eq!(filter.query.as_deref(), Some("query"));
        assert_eq!(
            filter.category,
            Some(traceveil_core::Category::phone_num())
        );
        assert_eq!(filter.sort, SortKey::OriginalValue);
        assert_eq!(filter.direction, SortDirection::Desc);
        assert_eq!(filter.limit, 25);
        assert_eq!(filter.offset, 50);
    }

    #[test]
    fn test_build_filter_rejects_bad_category() {
        let result = build_filter(None, Some("Not Valid".to_string()), SortArg::CreatedAt, false, 50, 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parses_mask_command() {
        let cli = Cli::try_parse_from([
            "traceveil", "mask", "trace.log", "--rules", "rules.yaml", "--product", "pbx",
        ])
        .unwrap();

        match cli.command {
            Commands::Mask {
                inputs,
                product,
                workers,
                db,
                ..
            } => {
                assert_eq!(inputs, vec![PathBuf::from("trace.log")]);
                assert_eq!(product, "pbx");
                assert_eq!(workers, 4);
                assert!(db.is_none());
            }
            _ => panic!("expected mask command"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&LoggingConfig {
        json: cli.json_logs,
        ..LoggingConfig::default()
    });

    match cli.command {
        Commands::Mask {
            inputs,
            rules,
            product,
            out_dir,
            db,
            workers,
            export_dir,
        } => {
            let catalog = Arc::new(load_catalog(expand(&rules))?);

            let store: Arc<dyn MappingStore> = match &db {
                Some(db) => Arc::new(open_sqlite(db).await?),
                None => Arc::new(MemoryMappingStore::new()),
            };

            let pipeline = Pipeline::new(
                catalog,
                store,
                Metrics::new()?,
                PipelineConfig {
                    workers,
                    out_dir: expand(&out_dir),
                    export_dir: export_dir.as_ref().map(expand),
                },
            );

            let jobs: Vec<FileJob> = inputs
                .iter()
                .map(|input| FileJob::from_path(expand(input), &product))
                .collect();

            let reports = pipeline.run_many(jobs, &CancelToken::new()).await;

            let mut failures = 0usize;
            for report in &reports {
                println!(
                    "{}\t{}\t{} candidates\t{} new mappings",
                    report.file_id, report.state, report.candidate_count, report.mappings_created
                );
                if !report.is_completed() {
                    failures += 1;
                }
            }
            tracing::info!(files = reports.len(), failures, "mask run finished");

            if failures > 0 {
                anyhow::bail!("{failures} of {} files failed", reports.len());
            }
        }

        Commands::Search {
            db,
            query,
            category,
            sort,
            desc,
            limit,
            offset,
        } => {
            let store = open_sqlite(&db).await?;
            let filter = build_filter(query, category, sort, desc, limit, offset)?;
            let results = store.search(&filter).await?;

            for mapping in &results.items {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    mapping.id,
                    mapping.category,
                    mapping.original_value,
                    mapping.masked_value,
                    mapping.created_at.to_rfc3339()
                );
            }
            println!(
                "{} of {} mappings (offset {})",
                results.items.len(),
                results.total_count,
                results.offset
            );
        }

        Commands::Export {
            db,
            file_id,
            product,
            category,
            out_dir,
        } => {
            let store = open_sqlite(&db).await?;

            let mut builder = MappingFilter::builder().limit(1000);
            if let Some(category) = parse_category(category)? {
                builder = builder.category(category);
            }
            let mut filter = builder.build().map_err(|e| anyhow::anyhow!(e))?;

            // Page through the full result set
            let mut mappings = Vec::new();
            loop {
                let results = store.search(&filter).await?;
                let fetched = results.items.len();
                let more = results.has_more();
                mappings.extend(results.items);
                if !more || fetched == 0 {
                    break;
                }
                filter.offset += fetched;
            }

            let export = MappingExport::new(file_id, product, mappings);
            match out_dir {
                Some(out_dir) => {
                    let path = write_export(&expand(&out_dir), &export)?;
                    println!("wrote {}", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&export)?),
            }
        }

        Commands::Purge { db, older_than_days } => {
            let store = open_sqlite(&db).await?;
            let older_than =
                older_than_days.map(|days| chrono::Utc::now() - chrono::Duration::days(days));
            let purged = store.purge(older_than).await?;
            println!("purged {purged} mappings");
        }

        Commands::Validate { rules } => {
            let catalog = load_catalog(expand(&rules))?;
            println!(
                "ok: {} rules, {} exceptions",
                catalog.registry().len(),
                catalog.exceptions().len()
            );
        }
    }

    Ok(())
}
