//! Resumatch CLI: ranks a directory of plain-text resumes against a job description.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use mimalloc::MiMalloc;
use serde::Serialize;

use resumatch::config::{Config, VectorBackend};
use resumatch::hashing::hash_to_u64;
use resumatch::ingest::{ResumeId, ResumeRecord};
use resumatch::pipeline::{JobQuery, RankOptions, RankingPipeline, RankingResult};
use resumatch::vectordb::{MemoryVectorDb, QdrantClient, VectorDbClient};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "resumatch", version, about = "Rank resumes against a job description")]
struct Cli {
    /// Directory of `.txt` resumes, one candidate per file.
    #[arg(long)]
    resumes: PathBuf,

    /// Job description: a `.json` JobQuery or plain text.
    #[arg(long)]
    job: PathBuf,

    /// Candidates kept after retrieval (overrides RESUMATCH_TOP_K).
    #[arg(long)]
    top_k: Option<usize>,

    /// Candidates returned (overrides RESUMATCH_TOP_N).
    #[arg(long)]
    top_n: Option<usize>,

    /// Chunk size in characters for this run (overrides RESUMATCH_CHUNK_SIZE).
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Chunk overlap in characters for this run (overrides RESUMATCH_CHUNK_OVERLAP).
    #[arg(long)]
    chunk_overlap: Option<usize>,

    /// Load and save the in-memory index here (overrides RESUMATCH_SNAPSHOT_PATH).
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Abort the run after this many seconds.
    #[arg(long, default_value_t = 600)]
    timeout_secs: u64,
}

#[derive(Serialize)]
struct Report<'a> {
    /// Resume id to source file name.
    sources: BTreeMap<ResumeId, String>,
    #[serde(flatten)]
    result: &'a RankingResult,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if cli.snapshot.is_some() {
        config.snapshot_path = cli.snapshot.clone();
    }

    let job = read_job(&cli.job)?;
    let (records, sources) = read_resumes(&cli.resumes)?;
    let options = RankOptions {
        top_k: cli.top_k,
        top_n: cli.top_n,
        chunk_size: cli.chunk_size,
        chunk_overlap: cli.chunk_overlap,
    };
    let timeout = Duration::from_secs(cli.timeout_secs);

    tracing::info!(
        resumes = records.len(),
        backend = %config.vector_backend,
        collection = %config.collection,
        "Resumatch starting"
    );

    let result = match config.vector_backend {
        VectorBackend::Memory => {
            let client = Arc::new(match &config.snapshot_path {
                Some(path) => MemoryVectorDb::open_or_empty(path)?,
                None => MemoryVectorDb::new(),
            });
            let snapshot_path = config.snapshot_path.clone();
            let result = rank(config, Arc::clone(&client), &job, records, options, timeout).await?;

            if let Some(path) = snapshot_path {
                client.save_snapshot(&path)?;
                tracing::info!(path = %path.display(), "Index snapshot saved");
            }
            result
        }
        VectorBackend::Qdrant => {
            let client = Arc::new(QdrantClient::new(&config.qdrant_url).await?);
            client.health_check().await?;
            rank(config, client, &job, records, options, timeout).await?
        }
    };

    let report = Report {
        sources,
        result: &result,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn rank<C: VectorDbClient + 'static>(
    config: Config,
    client: Arc<C>,
    job: &JobQuery,
    records: Vec<ResumeRecord>,
    options: RankOptions,
    timeout: Duration,
) -> anyhow::Result<RankingResult> {
    let pipeline = Arc::new(RankingPipeline::new(config, client)?);
    let run = pipeline.spawn_job(job, records, options);
    let result = run.wait_with_timeout(timeout).await?;

    let diagnostics = &result.diagnostics;
    tracing::info!(
        run_id = %diagnostics.run_id,
        ranked = result.ranked.len(),
        unmatched = diagnostics.unmatched,
        fallbacks = diagnostics.item_fallbacks,
        elapsed_ms = diagnostics.elapsed_ms,
        "Ranking complete"
    );
    Ok(result)
}

fn read_job(path: &Path) -> anyhow::Result<JobQuery> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading job description {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        return serde_json::from_str(&raw)
            .with_context(|| format!("parsing job description {}", path.display()));
    }

    let mut lines = raw.lines();
    let title = lines.next().unwrap_or_default().trim().to_string();
    let description = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    Ok(JobQuery::new(title, description))
}

/// Reads every `.txt` file in `dir`. Ids are derived from file names so they stay
/// stable across runs sharing a snapshot.
fn read_resumes(dir: &Path) -> anyhow::Result<(Vec<ResumeRecord>, BTreeMap<ResumeId, String>)> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading resume directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    paths.sort();

    if paths.is_empty() {
        bail!("no .txt resumes found in {}", dir.display());
    }

    let mut records = Vec::with_capacity(paths.len());
    let mut sources = BTreeMap::new();
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading resume {}", path.display()))?;
        let id = hash_to_u64(name.as_bytes());
        if text.trim().is_empty() {
            tracing::warn!(file = %name, "Skipping empty resume");
            continue;
        }

        sources.insert(id, name);
        records.push(ResumeRecord::new(id, text));
    }
    Ok((records, sources))
}
