use clap::Parser;
use inference_smoke::utils::{logger, validation::Validate};
use inference_smoke::{load_batch, CliConfig, Inference, Settings, SmokeError, SmokeRunner};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();
    let resolved = cli.resolve().and_then(|settings| {
        settings.validate()?;
        Ok(settings)
    });

    // 設定檔也可以開啟 verbose，所以先解析再初始化日誌
    let verbose = resolved.as_ref().map(|s| s.verbose).unwrap_or(cli.verbose);
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("Starting inference-smoke");
    if verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let settings = match resolved {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            exit_with(&e);
        }
    };

    if settings.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    if let Err(e) = run(&settings).await {
        tracing::error!(
            "❌ Inference smoke test failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        exit_with(&e);
    }
}

async fn run(settings: &Settings) -> inference_smoke::Result<()> {
    let batch = load_batch(settings.instances.as_deref())?;
    let estimator = Inference::from_settings(settings)?;
    let runner = SmokeRunner::new_with_monitoring(estimator, settings.monitor)
        .with_iterations(settings.iterations);

    let mut stdout = std::io::stdout();
    let report = runner.run(&batch, &mut stdout).await?;

    tracing::info!(
        "✅ {} {} calls completed in {} seconds",
        report.outputs.len(),
        report.inference_type,
        report.elapsed_seconds
    );
    Ok(())
}

fn exit_with(e: &SmokeError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}
