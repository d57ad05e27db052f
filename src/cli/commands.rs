//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::PathBuf;

/// Commands for the dataset translation agent
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline: download, translate, generate module, publish
    Run {
        /// Hugging Face dataset name (e.g. HAERAE-HUB/QARV)
        #[arg(short, long)]
        dataset: String,

        /// Dataset subset name (first discovered subset if not specified)
        #[arg(long)]
        subset: Option<String>,

        /// Dataset split (default: train)
        #[arg(long, default_value = "train")]
        split: String,

        /// Upload the translated dataset to the HF Hub
        #[arg(long)]
        push: bool,

        /// Open a pull request on the configured GitHub repository
        #[arg(long)]
        pr: bool,

        /// Directory for the generated dataset module
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,
    },

    /// List the subsets available for a dataset
    Subsets {
        /// Hugging Face dataset name
        #[arg(short, long)]
        dataset: String,
    },
}

/// Handle the full pipeline command
pub async fn handle_run(
    dataset: String,
    subset: Option<String>,
    split: String,
    push: bool,
    pr: bool,
    output_dir: PathBuf,
) -> anyhow::Result<()> {
    use crate::codegen;
    use crate::core::client::BatchTranslator;
    use crate::core::config::TranslatorConfig;
    use crate::hub::datasets::HubClient;
    use crate::hub::github::GithubClient;
    use crate::processors::dataset::DatasetProcessor;
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::{Duration, Instant};
    use tracing::{info, warn};

    let start_time = Instant::now();

    info!("Starting dataset translation pipeline");
    info!("Dataset: {}", dataset);
    info!("Split: {}", split);

    let config = TranslatorConfig::load()?;
    let translator = BatchTranslator::new(config.clone())?;
    let processor = DatasetProcessor::new(translator.clone());
    let hub = HubClient::new(&config)?;

    // Subset resolution: first discovered subset, or proceed without one.
    let subset = match subset {
        Some(s) => Some(s),
        None => {
            let subsets = hub.check_subsets(&dataset).await;
            match subsets.first() {
                Some(first) => {
                    info!("Using default subset: {}", first);
                    Some(first.clone())
                }
                None => {
                    info!("No subsets found; proceeding without subset");
                    None
                }
            }
        }
    };

    let table = hub.download(&dataset, subset.as_deref(), &split).await?;
    println!(
        "📥 Downloaded {}: {} rows, {} columns",
        dataset,
        table.n_rows(),
        table.n_cols()
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Translating {} columns...", table.n_cols()));

    let translated = processor.translate_table(&table).await?;
    pb.finish_with_message("Translation complete");

    let markdown_table = translated.head(5).to_markdown();
    let guide_prompt = codegen::guide_prompt(&markdown_table);

    let backend = translator.backend();
    let module_code = codegen::generate_module(backend.as_ref(), &config, &guide_prompt).await?;
    let module_path = codegen::save_module(&module_code, &dataset, &output_dir).await?;

    if push {
        let push_msg = hub.push(&translated, &dataset).await?;
        info!("{}", push_msg);
        println!("📤 {}", push_msg);
    }

    if pr {
        // PR creation never fails the pipeline; a failure is only logged.
        match GithubClient::new(&config) {
            Ok(github) => {
                match github
                    .create_pull_request(
                        "translation-update",
                        "Update translated dataset",
                        "This PR contains the latest translated dataset upload \
                         and the generated dataset module.",
                    )
                    .await
                {
                    Ok(msg) => println!("🔀 {}", msg),
                    Err(e) => warn!("Failed to create PR: {}", e),
                }
            }
            Err(e) => warn!("Skipping PR creation: {}", e),
        }
    }

    let duration = start_time.elapsed();
    info!("Pipeline completed in {:?}", duration);

    println!("\n✅ Pipeline completed!");
    println!("   Dataset: {}", dataset);
    println!("   Rows: {}", translated.n_rows());
    println!("   Columns: {}", translated.n_cols());
    println!("   Module: {}", module_path.display());
    println!("   Time: {:?}", duration);

    Ok(())
}

/// Handle the subsets listing command
pub async fn handle_subsets(dataset: String) -> anyhow::Result<()> {
    use crate::core::config::TranslatorConfig;
    use crate::hub::datasets::HubClient;

    // Subset discovery needs no completion backend, so defaults suffice.
    let config = TranslatorConfig::default();
    let hub = HubClient::new(&config)?;

    let subsets = hub.check_subsets(&dataset).await;

    if subsets.is_empty() {
        println!("No subsets found for {}", dataset);
        return Ok(());
    }

    println!("Subsets of {}:", dataset);
    for subset in subsets {
        println!("  - {}", subset);
    }

    Ok(())
}
