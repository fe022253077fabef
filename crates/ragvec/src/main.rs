use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ragvec_common::{logger, AppConfig, EmbeddingBackend};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ragvec")]
#[command(about = "ragvec - persistent exact vector search service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,

        /// Index image path
        #[arg(long)]
        index_path: Option<PathBuf>,

        /// Embedding backend (ollama, hashing)
        #[arg(long)]
        backend: Option<EmbeddingBackend>,
    },

    /// Validate an index image and print its contents
    Inspect {
        /// Index image path (defaults to INDEX_PATH)
        path: Option<PathBuf>,

        /// Number of records to print
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenv::dotenv().ok();

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            index_path,
            backend,
        }) => {
            let mut config = AppConfig::from_env()?;
            if let Some(host) = host {
                config.server_host = host;
            }
            if let Some(port) = port {
                config.server_port = port;
            }
            if let Some(path) = index_path {
                config.index_path = path;
            }
            if let Some(backend) = backend {
                config.embedding_backend = backend;
            }
            config.validate()?;

            serve(config).await?;
        }
        Some(Commands::Inspect { path, limit }) => {
            let path = match path {
                Some(path) => path,
                None => AppConfig::from_env()?.index_path,
            };
            inspect(&path, limit, &mut std::io::stdout().lock())?;
        }
        None => {
            // Default: start server with configuration from the environment
            serve(AppConfig::from_env()?).await?;
        }
    }

    Ok(())
}

async fn serve(config: AppConfig) -> Result<()> {
    logger::setup_logging(Some(&config.log_dir), &config.log_level)?;

    tracing::info!("ragvec starting...");
    tracing::info!("  Bind: {}", config.server_bind_address());
    tracing::info!("  Index: {}", config.index_path.display());
    tracing::info!("  Embedding: {:?} ({})", config.embedding_backend, config.embedding_model);

    ragvec_server::start_server(config)
        .await
        .context("server failed")?;
    Ok(())
}

fn inspect(path: &Path, limit: usize, out: &mut impl Write) -> Result<()> {
    let header = ragvec_vector::persistence::read_header(path)
        .with_context(|| format!("cannot read header of {}", path.display()))?;
    writeln!(
        out,
        "{}: format v{}, dimension {}, {} records",
        path.display(),
        header.version,
        header.dimension,
        header.count
    )?;

    let store = ragvec_vector::persistence::load(path)?
        .with_context(|| format!("{} disappeared while inspecting", path.display()))?;
    for record in store.iter().take(limit) {
        writeln!(out, "  [{}] {}", record.id, record.text)?;
    }
    if store.len() > limit {
        writeln!(out, "  ... {} more", store.len() - limit)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragvec_vector::{persistence, VectorStore};
    use tempfile::tempdir;

    #[test]
    fn test_inspect_prints_header_and_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.rvx");
        let mut store = VectorStore::new(2).unwrap();
        for text in ["alpha", "beta", "gamma"] {
            store.append(&[0.5, -0.5], text).unwrap();
        }
        persistence::save(&store, &path).unwrap();

        let mut out = Vec::new();
        inspect(&path, 2, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("format v1, dimension 2, 3 records"));
        assert!(out.contains("  [0] alpha"));
        assert!(out.contains("  [1] beta"));
        assert!(!out.contains("gamma"));
        assert!(out.contains("  ... 1 more"));
    }

    #[test]
    fn test_inspect_missing_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.rvx");

        let mut out = Vec::new();
        let err = inspect(&path, 10, &mut out).unwrap_err();
        assert!(err.to_string().contains("cannot read header"));
        assert!(out.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_inspect_corrupt_file_fails_without_touching_it() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.rvx");
        std::fs::write(&path, b"definitely not an index image").unwrap();

        let mut out = Vec::new();
        assert!(inspect(&path, 10, &mut out).is_err());
        assert!(out.is_empty());
        assert_eq!(std::fs::read(&path).unwrap(), b"definitely not an index image");
    }

    #[test]
    fn test_inspect_truncated_body_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.rvx");
        let mut store = VectorStore::new(2).unwrap();
        store.append(&[1.0, 2.0], "cut").unwrap();
        let bytes = persistence::encode(&store).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 2]).unwrap();

        // the header alone is intact, the full decode is not
        let mut out = Vec::new();
        assert!(inspect(&path, 10, &mut out).is_err());
        assert!(String::from_utf8(out).unwrap().contains("1 records"));
    }
}
