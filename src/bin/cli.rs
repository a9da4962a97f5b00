//! Desktop test driver for the unpack pipeline
//!
//! Usage:
//! ```bash
//! cargo run --features cli --bin debook-cli -- \
//!     --account 0xWALLET --endpoint https://keys.example.com/debook/api/v1/GetKey book.zip
//! ```

use anyhow::{bail, Context};
use base64::{engine::general_purpose, Engine as _};
use clap::Parser;
use debook_core::{KeyServiceClient, KeyServiceConfig, Viewer};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const DATA_URI_PREFIX: &str = "data:image/png;base64,";

#[derive(Parser)]
#[command(name = "debook-cli", about = "Unpack a debook container and report its pages")]
struct Args {
    /// Book container file
    file: PathBuf,

    /// Account/wallet identifier the license is bound to
    #[arg(long)]
    account: String,

    /// Key service endpoint URL
    #[arg(long)]
    endpoint: Url,

    /// Request timeout in seconds for the key service
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Write each page image as <dir>/page-NNN.png
    #[arg(long)]
    dump_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let mut config = KeyServiceConfig::new(args.endpoint);
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let client = KeyServiceClient::new(config)?;

    let mut viewer = Viewer::new(client);
    viewer.set_account_id(&args.account);

    let count = viewer.load_file(&bytes).await?;
    println!("{}: {} page(s)", args.file.display(), count);

    if let Some(dir) = args.dump_dir {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;

        for page in 1..=count {
            viewer.go_to_page(page);
            let current = viewer.current_page().expect("page index in bounds");

            let Some(encoded) = current.image.strip_prefix(DATA_URI_PREFIX) else {
                bail!("page {page} image is not a data URI");
            };
            let image = general_purpose::STANDARD
                .decode(encoded)
                .with_context(|| format!("page {page} image is not valid base64"))?;

            let path = dir.join(format!("page-{page:03}.png"));
            std::fs::write(&path, image)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("  wrote {}", path.display());
        }
    }

    Ok(())
}
